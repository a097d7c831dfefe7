//! # qrc-client
//!
//! The client-side record of a quorum-replicated key-value store, and the
//! machinery to surface and resolve concurrent writes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use qrc_client::{resolver, Bucket, GetOptions, MemoryTransport, PutOptions};
//! use std::sync::Arc;
//!
//! let bucket = Bucket::new("users", Arc::new(MemoryTransport::default()));
//!
//! // A new record behaves like a single value.
//! let mut record = bucket.new_record("alice")?;
//! record.set_data(serde_json::json!({"plan": "free"}))?;
//! record.store(PutOptions::default()).await?;
//!
//! // A later read may come back with siblings.
//! let mut record = bucket.get("alice", GetOptions::default()).await?;
//! record.set_resolver(Some(resolver::last_written()));
//! record.resolve()?;
//! record.store(PutOptions::default()).await?;
//! ```
//!
//! ## Modules
//!
//! - [`record`] - the replicated record and its sibling guards
//! - [`bucket`] - namespaces and their default policies
//! - [`resolver`] - sibling resolution functions
//! - [`transport`] - the store boundary and request options
//! - [`memory`] - an in-memory store implementing [`Transport`]
//! - [`quorum`] - quorum values
//! - [`error`] - error types

pub mod bucket;
pub mod clock;
pub mod error;
pub mod memory;
pub mod quorum;
pub mod record;
pub mod resolver;
pub mod transport;

pub use bucket::{Bucket, BucketProps, BucketPropsBuilder};
pub use clock::VersionVector;
pub use error::{ClientError, Result, TransportError};
pub use memory::{MemoryConfig, MemoryConfigBuilder, MemoryTransport};
pub use quorum::Quorum;
pub use record::{Record, RecordState};
pub use resolver::Resolver;
pub use transport::{DeleteOptions, GetOptions, PutOptions, Transport};

pub use qrc_core::{
    Codec, Codecs, Content, CoreError, Encoding, IndexEntry, IndexValue, Link, VClock, Value,
};
