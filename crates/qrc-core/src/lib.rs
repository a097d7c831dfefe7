//! # qrc-core
//!
//! Value types for the client side of a quorum-replicated key-value store:
//!
//! - [`VClock`]: the opaque causality token a store returns on read
//! - [`Content`]: one sibling value of a record, payload plus metadata
//! - [`Codecs`]: media-type codecs converting payload bytes to values
//!
//! Nothing here performs I/O or knows about conflicts; see `qrc-client`.

pub mod codec;
pub mod content;
pub mod error;
pub mod vclock;

pub use codec::{Codec, Codecs, JsonCodec, TextCodec, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
pub use content::{Content, IndexEntry, IndexValue, Link};
pub use error::{CoreError, Result};
pub use vclock::{Encoding, VClock};

pub use serde_json::Value;
