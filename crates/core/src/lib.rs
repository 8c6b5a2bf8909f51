//! Embedding sessions for hosted Spaces.
//!
//! A [`SessionController`] resolves a Space through the [`SessionResolver`],
//! renders it into a page with the [`SurfaceManager`] and closes it again
//! when the user exits or the frame reports that the configured operation
//! completed, as delivered by the [`MessageChannel`].
//!
//! Pages are reached through the [`Dom`] trait; [`MemoryDom`] is the
//! in-memory implementation used by the CLI and tests.

pub mod api;
pub mod channel;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod fake;
pub mod identity;
pub mod resolver;
pub mod surface;

pub use api::{ApiClientFactory, ApiCredential, HttpClientFactory, HttpSpaceApi, SpaceApi};
pub use channel::{MessageChannel, NotificationClient, Subscription, WindowMessage};
pub use config::{DisplayOptions, EmbedConfig};
pub use controller::{CloseEvent, CloseIntent, SessionController, SessionOptions, SurfaceState};
pub use dom::{Dom, MemoryDom, NodeId, SharedDom};
pub use error::{Error, ResolveStage, Result};
pub use identity::{SessionHandle, SpaceIdentity};
pub use resolver::{SessionResolver, SpaceCreateOptions};
pub use space_embed_protocol as protocol;
pub use surface::{CloseOutcome, Page, Surface, SurfaceEvent, SurfaceManager, SurfaceRegistry};
