//! Content: one concrete value of a replicated record.
//!
//! A record that was written concurrently on diverged replicas comes back
//! from the store with several `Content` values ("siblings"). Each one is a
//! plain container of payload and metadata; conflict handling lives a level
//! up, on the collection of siblings.
//!
//! The payload is held on exactly one side at a time, either the stored
//! bytes or the decoded value. The other side is derived on first read
//! through the codec registered for the media type and cached until the
//! payload, media type or charset changes.

use crate::codec::{Codecs, JSON_CONTENT_TYPE};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// A link to another key, with an optional tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    pub bucket: String,
    pub key: String,
    pub tag: Option<String>,
}

impl Link {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            tag,
        }
    }
}

/// A secondary index value: binary (string) or integer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Int(i64),
    Bin(String),
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::Bin(value.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        IndexValue::Bin(value)
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        IndexValue::Int(value)
    }
}

/// One (index name, value) pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub value: IndexValue,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, value: impl Into<IndexValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Payload {
    #[default]
    Empty,
    Encoded {
        bytes: Vec<u8>,
        decoded: OnceLock<Value>,
    },
    Decoded {
        value: Value,
        encoded: OnceLock<Vec<u8>>,
    },
}

impl Payload {
    /// Drop whichever side was derived, keeping the authoritative one.
    fn invalidate(&mut self) {
        match self {
            Payload::Empty => {}
            Payload::Encoded { decoded, .. } => *decoded = OnceLock::new(),
            Payload::Decoded { encoded, .. } => *encoded = OnceLock::new(),
        }
    }
}

/// A single sibling value of a record: payload plus metadata.
#[derive(Clone, Debug)]
pub struct Content {
    codecs: Codecs,
    payload: Payload,
    content_type: String,
    charset: Option<String>,
    content_encoding: Option<String>,
    last_modified: Option<DateTime<Utc>>,
    etag: Option<String>,
    usermeta: BTreeMap<String, String>,
    links: Vec<Link>,
    indexes: BTreeSet<IndexEntry>,
    exists: bool,
}

impl Content {
    /// A fresh, empty JSON value using the default codecs.
    pub fn new() -> Self {
        Self::with_codecs(Codecs::default())
    }

    /// A fresh, empty JSON value using the given codec registry.
    pub fn with_codecs(codecs: Codecs) -> Self {
        Self {
            codecs,
            payload: Payload::Empty,
            content_type: JSON_CONTENT_TYPE.to_string(),
            charset: None,
            content_encoding: None,
            last_modified: None,
            etag: None,
            usermeta: BTreeMap::new(),
            links: Vec::new(),
            indexes: BTreeSet::new(),
            exists: true,
        }
    }

    /// A deletion marker. It has no payload.
    pub fn tombstone() -> Self {
        Self {
            exists: false,
            ..Self::new()
        }
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Swap the codec registry, e.g. for the one a bucket carries.
    pub fn set_codecs(&mut self, codecs: Codecs) {
        self.codecs = codecs;
        self.payload.invalidate();
    }

    // ========================================================================
    // Payload
    // ========================================================================

    /// The decoded payload, decoding the stored bytes if needed.
    ///
    /// Reading the payload of a tombstone is an error rather than an empty
    /// value.
    pub fn data(&self) -> Result<Option<&Value>> {
        if !self.exists {
            return Err(CoreError::Tombstone);
        }
        match &self.payload {
            Payload::Empty => Ok(None),
            Payload::Decoded { value, .. } => Ok(Some(value)),
            Payload::Encoded { bytes, decoded } => {
                if decoded.get().is_none() {
                    let value = self.codecs.decode(&self.content_type, bytes)?;
                    let _ = decoded.set(value);
                }
                Ok(decoded.get())
            }
        }
    }

    /// Set the decoded payload. Writing a payload revives a tombstone.
    pub fn set_data(&mut self, value: impl Into<Value>) {
        self.payload = Payload::Decoded {
            value: value.into(),
            encoded: OnceLock::new(),
        };
        self.exists = true;
    }

    /// The stored bytes, encoding the decoded payload if needed.
    pub fn encoded_data(&self) -> Result<Option<&[u8]>> {
        if !self.exists {
            return Err(CoreError::Tombstone);
        }
        match &self.payload {
            Payload::Empty => Ok(None),
            Payload::Encoded { bytes, .. } => Ok(Some(bytes.as_slice())),
            Payload::Decoded { value, encoded } => {
                if encoded.get().is_none() {
                    let bytes = self.codecs.encode(&self.content_type, value)?;
                    let _ = encoded.set(bytes);
                }
                Ok(encoded.get().map(Vec::as_slice))
            }
        }
    }

    /// Set the stored bytes. Writing a payload revives a tombstone.
    pub fn set_encoded_data(&mut self, bytes: impl Into<Vec<u8>>) {
        self.payload = Payload::Encoded {
            bytes: bytes.into(),
            decoded: OnceLock::new(),
        };
        self.exists = true;
    }

    /// Whether any payload has been set, on either side.
    pub fn has_payload(&self) -> bool {
        !matches!(self.payload, Payload::Empty)
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Changing the media type re-derives the payload through the new codec.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
        self.payload.invalidate();
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_charset(&mut self, charset: Option<String>) {
        self.charset = charset;
        self.payload.invalidate();
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    pub fn set_content_encoding(&mut self, content_encoding: Option<String>) {
        self.content_encoding = content_encoding;
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, last_modified: Option<DateTime<Utc>>) {
        self.last_modified = last_modified;
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn set_etag(&mut self, etag: Option<String>) {
        self.etag = etag;
    }

    pub fn usermeta(&self) -> &BTreeMap<String, String> {
        &self.usermeta
    }

    pub fn usermeta_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.usermeta
    }

    pub fn set_usermeta(&mut self, usermeta: BTreeMap<String, String>) {
        self.usermeta = usermeta;
    }

    /// False only for tombstones.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    // ========================================================================
    // Links
    // ========================================================================

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn set_links(&mut self, links: Vec<Link>) {
        self.links.clear();
        for link in links {
            self.push_link(link);
        }
    }

    /// Append a link, keeping insertion order. Adding a link that is
    /// already present does nothing.
    pub fn add_link(
        &mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        tag: Option<String>,
    ) {
        self.push_link(Link::new(bucket, key, tag));
    }

    fn push_link(&mut self, link: Link) {
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }

    // ========================================================================
    // Secondary indexes
    // ========================================================================

    pub fn indexes(&self) -> &BTreeSet<IndexEntry> {
        &self.indexes
    }

    pub fn set_indexes(&mut self, indexes: BTreeSet<IndexEntry>) {
        self.indexes = indexes;
    }

    /// Values indexed under `name`, in order.
    pub fn index_values(&self, name: &str) -> Vec<&IndexValue> {
        self.indexes
            .iter()
            .filter(|entry| entry.name == name)
            .map(|entry| &entry.value)
            .collect()
    }

    /// Add a value under `name`. A name may hold many values, but the
    /// same value only once.
    pub fn add_index(&mut self, name: impl Into<String>, value: impl Into<IndexValue>) {
        self.indexes.insert(IndexEntry::new(name, value));
    }

    /// Replace every value under `name`.
    pub fn set_index<V: Into<IndexValue>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) {
        let name = name.into();
        self.remove_index(&name);
        for value in values {
            self.indexes.insert(IndexEntry::new(name.clone(), value));
        }
    }

    /// Remove every value under `name`. Absent names are ignored.
    pub fn remove_index(&mut self, name: &str) {
        self.indexes.retain(|entry| entry.name != name);
    }

    /// Remove one (name, value) pair. Absent pairs are ignored.
    pub fn remove_index_value(&mut self, name: &str, value: &IndexValue) {
        self.indexes
            .retain(|entry| !(entry.name == name && &entry.value == value));
    }

    pub fn remove_indexes(&mut self) {
        self.indexes.clear();
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::new()
    }
}
