//! Error types for session resolution and surface management.

use std::fmt;

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote stage of a session resolution, used to label wrapped errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveStage {
	SpaceCreate,
	WorkbookCreate,
	SpaceUpdate,
	DocumentCreate,
	SpaceGet,
}

impl fmt::Display for ResolveStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResolveStage::SpaceCreate => write!(f, "space creation"),
			ResolveStage::WorkbookCreate => write!(f, "workbook creation"),
			ResolveStage::SpaceUpdate => write!(f, "space metadata update"),
			ResolveStage::DocumentCreate => write!(f, "document creation"),
			ResolveStage::SpaceGet => write!(f, "space authentication"),
		}
	}
}

/// Errors that can occur while embedding a Space.
#[derive(Debug, Error)]
pub enum Error {
	/// A credential or identifier required before any remote call is absent.
	#[error("Missing required {0}")]
	MissingCredential(&'static str),

	/// The remote call succeeded but returned no usable access token.
	#[error("Failed to retrieve access token for space {space_id}")]
	AuthenticationFailed { space_id: String },

	/// A create/update stage returned no usable id or payload.
	#[error("Remote create failed: {0}")]
	RemoteCreateFailed(String),

	/// The mount element for the surface does not exist.
	#[error("Mount element not found: {0}")]
	MountPointNotFound(String),

	/// The embedded frame failed to load. Reported through logging only.
	#[error("Frame failed to load: {0}")]
	FrameLoadFailed(String),

	/// An identifier cannot be used as a URL path segment.
	#[error("Invalid path segment: {0:?}")]
	InvalidPathSegment(String),

	/// A resolution stage failed; `source` holds the cause.
	#[error("{stage} failed: {source}")]
	Resolve {
		stage: ResolveStage,
		#[source]
		source: Box<Error>,
	},

	/// The Space API answered with a non-success status.
	#[error("Space API returned {status} for {endpoint}: {body}")]
	Api { status: u16, endpoint: String, body: String },

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Invalid URL: {0}")]
	Url(#[from] url::ParseError),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Wraps `self` with the resolution stage it came from.
	pub fn at(self, stage: ResolveStage) -> Self {
		Error::Resolve {
			stage,
			source: Box::new(self),
		}
	}

	/// Innermost error, skipping stage context.
	pub fn root(&self) -> &Error {
		match self {
			Error::Resolve { source, .. } => source.root(),
			other => other,
		}
	}

	/// Stage that failed, when this error came out of a resolution.
	pub fn stage(&self) -> Option<ResolveStage> {
		match self {
			Error::Resolve { stage, .. } => Some(*stage),
			_ => None,
		}
	}

	pub fn is_missing_credential(&self) -> bool {
		matches!(self.root(), Error::MissingCredential(_))
	}

	pub fn is_authentication_failed(&self) -> bool {
		matches!(self.root(), Error::AuthenticationFailed { .. })
	}

	pub fn is_remote_create_failed(&self) -> bool {
		matches!(self.root(), Error::RemoteCreateFailed(_))
	}

	pub fn is_mount_point_not_found(&self) -> bool {
		matches!(self.root(), Error::MountPointNotFound(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stage_context_names_the_failing_stage() {
		let err = Error::RemoteCreateFailed("no workbook id returned".into()).at(ResolveStage::WorkbookCreate);
		assert_eq!(err.to_string(), "workbook creation failed: Remote create failed: no workbook id returned");
		assert_eq!(err.stage(), Some(ResolveStage::WorkbookCreate));
		assert!(err.is_remote_create_failed());
	}

	#[test]
	fn root_unwraps_nested_context() {
		let err = Error::AuthenticationFailed { space_id: "us_sp_1".into() }
			.at(ResolveStage::SpaceGet)
			.at(ResolveStage::SpaceCreate);
		assert!(matches!(err.root(), Error::AuthenticationFailed { space_id } if space_id == "us_sp_1"));
		assert_eq!(err.stage(), Some(ResolveStage::SpaceCreate));
	}

	#[test]
	fn unwrapped_errors_have_no_stage() {
		let err = Error::MissingCredential("access token");
		assert_eq!(err.stage(), None);
		assert!(err.is_missing_credential());
		assert_eq!(err.to_string(), "Missing required access token");
	}
}
