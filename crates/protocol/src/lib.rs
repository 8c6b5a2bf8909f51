//! Wire types for the hosted Space API and the embedded frame.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! remote Space API over HTTP and with the embedded frame over
//! cross-window messages. These types represent the "protocol layer":
//! the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Lenient on input: unknown fields are kept or ignored, never rejected
//! * Stable: Changes only when the wire format changes
//!
//! Session resolution and surface management are built on top of these
//! types in `space-embed`.

pub mod document;
pub mod envelope;
pub mod message;
pub mod space;
pub mod workbook;

pub use document::*;
pub use envelope::*;
pub use message::*;
pub use space::*;
pub use workbook::*;
