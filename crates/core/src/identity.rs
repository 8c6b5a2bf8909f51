//! Space identity supplied by the host and the resolved session handle.

use serde::{Deserialize, Serialize};
use url::Url;
use url::form_urlencoded;

use crate::config::{DEFAULT_API_URL, DEFAULT_SPACES_URL};
use crate::error::{Error, Result};

/// Identifies the Space a session embeds.
///
/// A *new* identity carries no `id`/`access_token` and is created lazily
/// with the publishable key. A *resumed* identity carries both and is only
/// ever re-authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceIdentity {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
	pub environment_id: String,
	pub api_url: String,
	/// Environment-wide key, only used to create Spaces.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub publishable_key: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub spaces_base_url: Option<String>,
}

impl SpaceIdentity {
	/// Identity for a Space that does not exist yet.
	pub fn new_space(environment_id: impl Into<String>, publishable_key: impl Into<String>) -> Self {
		Self {
			id: None,
			access_token: None,
			environment_id: environment_id.into(),
			api_url: DEFAULT_API_URL.to_string(),
			publishable_key: Some(publishable_key.into()),
			spaces_base_url: None,
		}
	}

	/// Identity for an existing Space that must be re-authenticated.
	pub fn existing(id: impl Into<String>, access_token: impl Into<String>, environment_id: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			access_token: Some(access_token.into()),
			environment_id: environment_id.into(),
			api_url: DEFAULT_API_URL.to_string(),
			publishable_key: None,
			spaces_base_url: None,
		}
	}

	pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
		self.api_url = api_url.into();
		self
	}

	pub fn with_spaces_base_url(mut self, url: impl Into<String>) -> Self {
		self.spaces_base_url = Some(url.into());
		self
	}

	/// Whether this identity refers to an already created Space.
	pub fn is_resumed(&self) -> bool {
		self.id.is_some()
	}

	pub fn spaces_base_url(&self) -> &str {
		self.spaces_base_url.as_deref().unwrap_or(DEFAULT_SPACES_URL)
	}
}

/// A resolved, authenticated Space ready to be mounted.
///
/// Immutable once built; both `space_id` and `access_token` are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
	space_id: String,
	access_token: String,
	guest_link: Url,
}

impl SessionHandle {
	/// Builds a handle, deriving the guest link from `spaces_base_url` when
	/// the remote did not supply one.
	pub fn new(space_id: impl Into<String>, access_token: impl Into<String>, guest_link: Option<&str>, spaces_base_url: &str) -> Result<Self> {
		let space_id = space_id.into();
		let access_token = access_token.into();
		if space_id.is_empty() {
			return Err(Error::RemoteCreateFailed("no space id returned".into()));
		}
		if access_token.is_empty() {
			return Err(Error::AuthenticationFailed { space_id });
		}

		let guest_link = match guest_link.filter(|link| !link.is_empty()) {
			Some(link) => Url::parse(link)?,
			None => derive_guest_link(spaces_base_url, &space_id, &access_token)?,
		};

		Ok(Self {
			space_id,
			access_token,
			guest_link,
		})
	}

	pub fn space_id(&self) -> &str {
		&self.space_id
	}

	pub fn access_token(&self) -> &str {
		&self.access_token
	}

	pub fn guest_link(&self) -> &Url {
		&self.guest_link
	}
}

/// Encodes an access token for the `token` query parameter.
pub fn encode_token(token: &str) -> String {
	form_urlencoded::byte_serialize(token.as_bytes()).collect()
}

/// Builds `<base>/space/<space_id>?token=<encoded token>`.
pub fn derive_guest_link(spaces_base_url: &str, space_id: &str, access_token: &str) -> Result<Url> {
	let mut url = join_segments(spaces_base_url, &["space", space_id])?;
	url.set_query(Some(&format!("token={}", encode_token(access_token))));
	Ok(url)
}

/// Appends `segments` to the path of `base`, percent-encoding each one.
///
/// Empty, `.` and `..` segments are rejected rather than collapsed.
pub fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
	if let Some(bad) = segments.iter().copied().find(|s| matches!(*s, "" | "." | "..")) {
		return Err(Error::InvalidPathSegment(bad.to_string()));
	}
	let mut joined = Url::parse(base)?;
	joined
		.path_segments_mut()
		.map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
		.pop_if_empty()
		.extend(segments);
	Ok(joined)
}

/// Origin (`scheme://host[:port]`) of a Spaces base URL, used to validate
/// frame messages.
pub fn frame_origin(spaces_base_url: &str) -> Result<String> {
	Ok(Url::parse(spaces_base_url)?.origin().ascii_serialization())
}
