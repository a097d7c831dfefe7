//! Replicated records.
//!
//! A [`Record`] is one key in one bucket, as last observed by this client:
//! the vector clock the store handed back plus every sibling it returned.
//! The number of siblings is the record's state:
//!
//! - 0: not found, deleted or cleared ([`RecordState::Empty`])
//! - 1: a single authoritative value ([`RecordState::Resolved`])
//! - more: concurrent writes the caller has to resolve ([`RecordState::Conflicted`])
//!
//! While resolved, the record reads and writes like a single value: every
//! field accessor forwards to the sole sibling. Once conflicted, every one
//! of them fails with [`ClientError::Conflict`] instead of picking a
//! winner, and so does [`Record::store`]. [`Record::resolve`] runs the
//! configured resolver to collapse the siblings.

use crate::bucket::Bucket;
use crate::error::{ClientError, Result};
use crate::resolver::{self, Resolver};
use crate::transport::{DeleteOptions, GetOptions, PutOptions, Transport};
use chrono::{DateTime, Utc};
use qrc_core::{Content, IndexEntry, IndexValue, Link, VClock, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a record stands, by sibling count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordState {
    Empty,
    Resolved,
    Conflicted,
}

/// A key in a bucket together with the siblings last seen for it.
pub struct Record<T: Transport> {
    bucket: Bucket<T>,
    key: Option<String>,
    vclock: Option<VClock>,
    siblings: Vec<Content>,
    resolver: Option<Resolver>,
}

/// Delegates a metadata field to the sole sibling: the getter yields `None`
/// on an empty record, the setter materializes a sibling first, and both
/// fail on a conflicted record.
macro_rules! delegate_fields {
    ($(
        $(#[$doc:meta])*
        $kind:ident $get:ident -> $out:ty, $set:ident($value:ty);
    )*) => {
        $(
            delegate_fields!(@get $kind $(#[$doc])* $get -> $out);

            #[doc = concat!("Set `", stringify!($get), "` on the sole sibling.")]
            pub fn $set(&mut self, value: $value) -> Result<()> {
                self.sole_mut()?.$set(value);
                Ok(())
            }
        )*
    };
    (@get value $(#[$doc:meta])* $get:ident -> $out:ty) => {
        $(#[$doc])*
        pub fn $get(&self) -> Result<Option<$out>> {
            Ok(self.sole()?.map(|content| content.$get()))
        }
    };
    (@get optional $(#[$doc:meta])* $get:ident -> $out:ty) => {
        $(#[$doc])*
        pub fn $get(&self) -> Result<Option<$out>> {
            Ok(self.sole()?.and_then(|content| content.$get()))
        }
    };
}

impl<T: Transport> Record<T> {
    /// A record holding one fresh sibling, ready to be filled in.
    ///
    /// A key, if given, must be non-empty. Without one the store assigns a
    /// key on the first write.
    pub fn new(bucket: Bucket<T>, key: Option<String>) -> Result<Self> {
        let mut record = Self::empty(bucket, key)?;
        let fresh = record.fresh_content();
        record.siblings.push(fresh);
        Ok(record)
    }

    /// A fresh record whose key the store will assign.
    pub fn new_unkeyed(bucket: Bucket<T>) -> Self {
        let mut record = Self {
            bucket,
            key: None,
            vclock: None,
            siblings: Vec::new(),
            resolver: None,
        };
        let fresh = record.fresh_content();
        record.siblings.push(fresh);
        record
    }

    /// A record with no siblings, to be populated by a fetch.
    pub fn empty(bucket: Bucket<T>, key: Option<String>) -> Result<Self> {
        if matches!(key.as_deref(), Some("")) {
            return Err(ClientError::InvalidKey);
        }
        Ok(Self {
            bucket,
            key,
            vclock: None,
            siblings: Vec::new(),
            resolver: None,
        })
    }

    fn fresh_content(&self) -> Content {
        Content::with_codecs(self.bucket.codecs())
    }

    // ========================================================================
    // Identity and raw state
    // ========================================================================

    /// The bucket this record belongs to.
    pub fn bucket(&self) -> &Bucket<T> {
        &self.bucket
    }

    /// The key, or `None` until the store assigns one.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Fill in a key assigned by the store. An already-known key is kept.
    pub fn set_key(&mut self, key: impl Into<String>) {
        if self.key.is_none() {
            self.key = Some(key.into());
        }
    }

    /// The vector clock from the last response, if any.
    pub fn vclock(&self) -> Option<&VClock> {
        self.vclock.as_ref()
    }

    /// Replace the vector clock. Used by transports.
    pub fn set_vclock(&mut self, vclock: Option<VClock>) {
        self.vclock = vclock;
    }

    /// Every sibling, unguarded.
    pub fn siblings(&self) -> &[Content] {
        &self.siblings
    }

    /// Direct access to the sibling list, bypassing the conflict checks.
    pub fn siblings_mut(&mut self) -> &mut Vec<Content> {
        &mut self.siblings
    }

    /// Replace the siblings wholesale. Used by transports and resolvers.
    pub fn set_siblings(&mut self, siblings: Vec<Content>) {
        self.siblings = siblings;
    }

    pub fn sibling_count(&self) -> usize {
        self.siblings.len()
    }

    /// Empty, resolved or conflicted, by sibling count.
    pub fn state(&self) -> RecordState {
        match self.siblings.len() {
            0 => RecordState::Empty,
            1 => RecordState::Resolved,
            _ => RecordState::Conflicted,
        }
    }

    /// False when there are no siblings or the only sibling is a tombstone.
    ///
    /// Several siblings always count as existing, even if every one of them
    /// is a tombstone: contested deletes still need resolving.
    pub fn exists(&self) -> bool {
        match self.siblings.as_slice() {
            [] => false,
            [only] => only.exists(),
            _ => true,
        }
    }

    // ========================================================================
    // Sole-sibling guards
    // ========================================================================

    fn sole(&self) -> Result<Option<&Content>> {
        match self.siblings.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only)),
            many => Err(ClientError::siblings(many.len())),
        }
    }

    /// Like [`sole`](Self::sole), for removals that must not create a sibling.
    fn sole_existing_mut(&mut self) -> Result<Option<&mut Content>> {
        match self.siblings.as_mut_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only)),
            many => Err(ClientError::siblings(many.len())),
        }
    }

    fn sole_mut(&mut self) -> Result<&mut Content> {
        if self.siblings.is_empty() {
            let fresh = self.fresh_content();
            self.siblings.push(fresh);
        }
        match self.siblings.as_mut_slice() {
            [only] => Ok(only),
            many => Err(ClientError::siblings(many.len())),
        }
    }

    // ========================================================================
    // Delegated fields
    // ========================================================================

    /// The decoded payload of the sole sibling.
    pub fn data(&self) -> Result<Option<&Value>> {
        match self.sole()? {
            None => Ok(None),
            Some(content) => Ok(content.data()?),
        }
    }

    /// Set the decoded payload on the sole sibling.
    pub fn set_data(&mut self, value: impl Into<Value>) -> Result<()> {
        self.sole_mut()?.set_data(value);
        Ok(())
    }

    /// The stored bytes of the sole sibling.
    pub fn encoded_data(&self) -> Result<Option<&[u8]>> {
        match self.sole()? {
            None => Ok(None),
            Some(content) => Ok(content.encoded_data()?),
        }
    }

    /// Set the raw payload bytes on the sole sibling.
    pub fn set_encoded_data(&mut self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.sole_mut()?.set_encoded_data(bytes);
        Ok(())
    }

    delegate_fields! {
        /// MIME media type of the payload.
        value content_type -> &str, set_content_type(impl Into<String>);
        /// Character set of the payload.
        optional charset -> &str, set_charset(Option<String>);
        /// Compression of the payload, e.g. `gzip`.
        optional content_encoding -> &str, set_content_encoding(Option<String>);
        optional last_modified -> DateTime<Utc>, set_last_modified(Option<DateTime<Utc>>);
        optional etag -> &str, set_etag(Option<String>);
        /// User metadata, string to string.
        value usermeta -> &BTreeMap<String, String>, set_usermeta(BTreeMap<String, String>);
        /// Links to other keys, in insertion order.
        value links -> &[Link], set_links(Vec<Link>);
        /// Secondary index entries.
        value indexes -> &BTreeSet<IndexEntry>, set_indexes(BTreeSet<IndexEntry>);
    }

    /// Append a link unless an identical one exists.
    pub fn add_link(
        &mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        tag: Option<String>,
    ) -> Result<()> {
        self.sole_mut()?.add_link(bucket, key, tag);
        Ok(())
    }

    /// Add one index entry. Exact duplicates collapse.
    pub fn add_index(
        &mut self,
        name: impl Into<String>,
        value: impl Into<IndexValue>,
    ) -> Result<()> {
        self.sole_mut()?.add_index(name, value);
        Ok(())
    }

    /// Replace every value indexed under `name`.
    pub fn set_index<V: Into<IndexValue>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<()> {
        self.sole_mut()?.set_index(name, values);
        Ok(())
    }

    /// Drop every value indexed under `name`. A no-op on an empty record.
    pub fn remove_index(&mut self, name: &str) -> Result<()> {
        if let Some(content) = self.sole_existing_mut()? {
            content.remove_index(name);
        }
        Ok(())
    }

    /// Drop one indexed value. A no-op on an empty record.
    pub fn remove_index_value(&mut self, name: &str, value: &IndexValue) -> Result<()> {
        if let Some(content) = self.sole_existing_mut()? {
            content.remove_index_value(name, value);
        }
        Ok(())
    }

    /// Drop all index entries. A no-op on an empty record.
    pub fn remove_indexes(&mut self) -> Result<()> {
        if let Some(content) = self.sole_existing_mut()? {
            content.remove_indexes();
        }
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// The effective resolver: this record's own, else the bucket's.
    ///
    /// Fails if the bucket names a resolver that does not exist.
    pub fn resolver(&self) -> Result<Option<Resolver>> {
        match &self.resolver {
            Some(resolver) => Ok(Some(Arc::clone(resolver))),
            None => self.bucket.resolver(),
        }
    }

    /// Override the bucket's resolver for this record; `None` clears the
    /// override.
    pub fn set_resolver(&mut self, resolver: Option<Resolver>) {
        self.resolver = resolver;
    }

    /// Override the resolver with a built-in one, by name.
    pub fn set_resolver_named(&mut self, name: &str) -> Result<()> {
        let resolver =
            resolver::lookup(name).ok_or_else(|| ClientError::InvalidResolver(name.to_string()))?;
        self.resolver = Some(resolver);
        Ok(())
    }

    /// Collapse the siblings with the effective resolver.
    ///
    /// Does nothing unless the record is conflicted and a resolver is
    /// configured. The resolver's output replaces the siblings as is.
    pub fn resolve(&mut self) -> Result<&mut Self> {
        if self.siblings.len() <= 1 {
            return Ok(self);
        }
        if let Some(resolver) = self.resolver()? {
            let before = self.siblings.len();
            let siblings = std::mem::take(&mut self.siblings);
            self.siblings = resolver(siblings);
            debug!(
                bucket = %self.bucket.name(),
                key = ?self.key,
                before,
                after = self.siblings.len(),
                "resolved siblings"
            );
        }
        Ok(self)
    }

    // ========================================================================
    // Store operations
    // ========================================================================

    /// Write the sole sibling, submitting the current vector clock.
    ///
    /// Fails with [`ClientError::Conflict`] unless exactly one sibling is
    /// present. The transport may repopulate the record with what the
    /// store now holds.
    pub async fn store(&mut self, options: PutOptions) -> Result<&mut Self> {
        if self.siblings.len() != 1 {
            return Err(ClientError::Conflict(
                "Attempting to store an invalid object, resolve the siblings first".to_string(),
            ));
        }

        debug!(
            bucket = %self.bucket.name(),
            key = ?self.key,
            vclock = ?self.vclock,
            "storing record"
        );
        let transport = Arc::clone(self.bucket.transport());
        transport.put(self, options).await?;
        Ok(self)
    }

    /// Re-read the key, replacing siblings and vector clock.
    ///
    /// A missing key is not an error: the record just ends up empty.
    pub async fn reload(&mut self, options: GetOptions) -> Result<&mut Self> {
        debug!(bucket = %self.bucket.name(), key = ?self.key, "reloading record");
        let transport = Arc::clone(self.bucket.transport());
        transport.get(self, options).await?;

        if self.siblings.len() > 1 {
            warn!(
                bucket = %self.bucket.name(),
                key = ?self.key,
                siblings = self.siblings.len(),
                "record has siblings"
            );
        }
        Ok(self)
    }

    /// Delete the key, then drop all local siblings.
    ///
    /// The siblings are cleared whatever the transport reports; a transport
    /// error is still returned.
    pub async fn delete(&mut self, options: DeleteOptions) -> Result<&mut Self> {
        debug!(
            bucket = %self.bucket.name(),
            key = ?self.key,
            vclock = ?self.vclock,
            "deleting record"
        );
        let transport = Arc::clone(self.bucket.transport());
        let outcome = transport.delete(self, options).await;
        self.clear();
        outcome?;
        Ok(self)
    }

    /// Drop all siblings.
    pub fn clear(&mut self) -> &mut Self {
        self.siblings.clear();
        self
    }
}

/// Records are equal when key, bucket and vector clock all match. The same
/// key observed at two causal points is two different records.
impl<T: Transport> PartialEq for Record<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.bucket == other.bucket && self.vclock == other.vclock
    }
}

impl<T: Transport> Eq for Record<T> {}

impl<T: Transport> Hash for Record<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.bucket.name().hash(state);
        self.vclock.hash(state);
    }
}

impl<T: Transport> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("bucket", &self.bucket.name())
            .field("key", &self.key)
            .field("vclock", &self.vclock)
            .field("siblings", &self.siblings)
            .field("resolver", &self.resolver.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use serde_json::json;

    fn bucket() -> Bucket<MemoryTransport> {
        Bucket::new("b", Arc::new(MemoryTransport::default()))
    }

    fn sibling(value: &str) -> Content {
        let mut content = Content::new();
        content.set_data(json!(value));
        content
    }

    fn conflicted(values: &[&str]) -> Record<MemoryTransport> {
        let mut record = bucket().record_for_fetch("k").unwrap();
        record.set_siblings(values.iter().map(|v| sibling(v)).collect());
        record
    }

    #[test]
    fn test_new_record_is_resolved() {
        let record = bucket().new_record("k1").unwrap();
        assert_eq!(record.state(), RecordState::Resolved);
        assert_eq!(record.key(), Some("k1"));
        assert!(record.vclock().is_none());
        assert!(record.exists());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert_eq!(
            Record::new(bucket(), Some(String::new())).err(),
            Some(ClientError::InvalidKey)
        );
        assert!(Record::new(bucket(), None).is_ok());
    }

    #[test]
    fn test_getters_on_empty_record() {
        let record = bucket().record_for_fetch("k").unwrap();
        assert_eq!(record.state(), RecordState::Empty);
        assert_eq!(record.data().unwrap(), None);
        assert_eq!(record.encoded_data().unwrap(), None);
        assert_eq!(record.content_type().unwrap(), None);
        assert_eq!(record.charset().unwrap(), None);
        assert_eq!(record.usermeta().unwrap(), None);
        assert_eq!(record.links().unwrap(), None);
        assert!(!record.exists());
    }

    #[test]
    fn test_setter_materializes_sibling() {
        let mut record = bucket().record_for_fetch("k").unwrap();
        record.set_content_type("text/plain").unwrap();
        assert_eq!(record.sibling_count(), 1);
        assert_eq!(record.content_type().unwrap(), Some("text/plain"));
    }

    #[test]
    fn test_mutator_materializes_sibling() {
        let mut record = bucket().record_for_fetch("k").unwrap();
        record.add_index("field_bin", "x").unwrap();
        assert_eq!(record.sibling_count(), 1);
        assert_eq!(record.indexes().unwrap().map(|i| i.len()), Some(1));
    }

    #[test]
    fn test_fields_round_trip_on_sole_sibling() {
        let mut record = bucket().new_record("k").unwrap();
        let when = Utc::now();
        let meta: BTreeMap<String, String> = [("owner".to_string(), "ops".to_string())].into();

        record.set_data(json!({"n": 1})).unwrap();
        record.set_charset(Some("utf-8".to_string())).unwrap();
        record.set_content_encoding(Some("gzip".to_string())).unwrap();
        record.set_last_modified(Some(when)).unwrap();
        record.set_etag(Some("e1".to_string())).unwrap();
        record.set_usermeta(meta.clone()).unwrap();
        record.add_link("people", "bob", None).unwrap();
        record.set_index("tag_bin", ["a", "b"]).unwrap();
        record.remove_index_value("tag_bin", &IndexValue::from("a")).unwrap();

        assert_eq!(record.data().unwrap(), Some(&json!({"n": 1})));
        assert_eq!(record.encoded_data().unwrap(), Some(br#"{"n":1}"#.as_slice()));
        assert_eq!(record.charset().unwrap(), Some("utf-8"));
        assert_eq!(record.content_encoding().unwrap(), Some("gzip"));
        assert_eq!(record.last_modified().unwrap(), Some(when));
        assert_eq!(record.etag().unwrap(), Some("e1"));
        assert_eq!(record.usermeta().unwrap(), Some(&meta));
        assert_eq!(
            record.links().unwrap(),
            Some([Link::new("people", "bob", None)].as_slice())
        );
        assert_eq!(
            record.indexes().unwrap().cloned(),
            Some(BTreeSet::from([IndexEntry::new("tag_bin", "b")]))
        );

        record.remove_indexes().unwrap();
        assert_eq!(record.indexes().unwrap().map(|i| i.len()), Some(0));
    }

    #[test]
    fn test_conflicted_record_refuses_field_access() {
        let mut record = conflicted(&["a", "b"]);
        assert_eq!(record.state(), RecordState::Conflicted);

        assert!(matches!(record.data(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.encoded_data(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.content_type(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.usermeta(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.set_data(json!("c")), Err(ClientError::Conflict(_))));
        assert!(matches!(
            record.set_etag(Some("x".to_string())),
            Err(ClientError::Conflict(_))
        ));
        assert!(matches!(
            record.add_link("b", "k", None),
            Err(ClientError::Conflict(_))
        ));
        assert!(matches!(
            record.remove_index("missing_bin"),
            Err(ClientError::Conflict(_))
        ));
        assert_eq!(record.sibling_count(), 2);
    }

    #[test]
    fn test_conflicted_record_refuses_every_delegated_field() {
        let mut record = conflicted(&["a", "b", "c"]);

        assert!(matches!(record.charset(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.content_encoding(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.last_modified(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.etag(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.links(), Err(ClientError::Conflict(_))));
        assert!(matches!(record.indexes(), Err(ClientError::Conflict(_))));

        let setters: Vec<Result<()>> = vec![
            record.set_encoded_data(b"x".to_vec()),
            record.set_content_type("text/plain"),
            record.set_charset(Some("utf-8".to_string())),
            record.set_content_encoding(Some("gzip".to_string())),
            record.set_last_modified(Some(Utc::now())),
            record.set_usermeta(BTreeMap::new()),
            record.set_links(Vec::new()),
            record.set_indexes(BTreeSet::new()),
            record.add_index("field_bin", "x"),
            record.set_index("field_bin", ["x", "y"]),
            record.remove_index_value("field_bin", &IndexValue::from("x")),
            record.remove_indexes(),
        ];
        for outcome in setters {
            assert!(matches!(outcome, Err(ClientError::Conflict(_))));
        }
        assert_eq!(record.sibling_count(), 3);
        assert!(record.siblings().iter().all(|s| s.indexes().is_empty()));
    }

    #[test]
    fn test_removals_leave_empty_record_empty() {
        let mut record = bucket().record_for_fetch("k").unwrap();
        record.remove_index("missing_bin").unwrap();
        record
            .remove_index_value("missing_bin", &IndexValue::from(1i64))
            .unwrap();
        record.remove_indexes().unwrap();

        assert_eq!(record.state(), RecordState::Empty);
        assert!(!record.exists());
    }

    #[test]
    fn test_exists_rules() {
        let mut record = bucket().record_for_fetch("k").unwrap();
        assert!(!record.exists());

        record.set_siblings(vec![Content::tombstone()]);
        assert!(!record.exists());

        record.set_siblings(vec![sibling("a")]);
        assert!(record.exists());

        record.set_siblings(vec![Content::tombstone(), Content::tombstone()]);
        assert!(record.exists());
    }

    #[test]
    fn test_tombstone_payload_read_is_an_error() {
        let mut record = bucket().record_for_fetch("k").unwrap();
        record.set_siblings(vec![Content::tombstone()]);
        assert!(matches!(
            record.data(),
            Err(ClientError::Content(qrc_core::CoreError::Tombstone))
        ));
    }

    #[test]
    fn test_resolver_falls_back_to_bucket() {
        let mut record = bucket().new_record("k").unwrap();
        assert!(record.resolver().unwrap().is_none());

        record.bucket().set_resolver(Some(resolver::last_written()));
        assert!(record.resolver().unwrap().is_some());

        let own = resolver::keep_all();
        record.set_resolver(Some(Arc::clone(&own)));
        assert!(Arc::ptr_eq(&record.resolver().unwrap().unwrap(), &own));

        record.set_resolver(None);
        assert!(record.resolver().unwrap().is_some());
    }

    #[test]
    fn test_resolver_named() {
        let mut record = bucket().new_record("k").unwrap();
        assert_eq!(
            record.set_resolver_named("coin_flip"),
            Err(ClientError::InvalidResolver("coin_flip".to_string()))
        );
        assert!(record.resolver().unwrap().is_none());

        record.set_resolver_named("last_written").unwrap();
        assert!(record.resolver().unwrap().is_some());
    }

    #[test]
    fn test_resolve_picks_sibling() {
        let mut record = conflicted(&["a", "b"]);
        record.set_resolver(Some(resolver::resolver(|siblings| {
            siblings
                .into_iter()
                .filter(|s| s.data().ok().flatten() == Some(&json!("b")))
                .collect()
        })));

        record.resolve().unwrap();
        assert_eq!(record.state(), RecordState::Resolved);
        assert_eq!(record.data().unwrap(), Some(&json!("b")));
    }

    #[test]
    fn test_resolve_without_resolver_keeps_siblings() {
        let mut record = conflicted(&["a", "b"]);
        record.resolve().unwrap();
        assert_eq!(record.sibling_count(), 2);
    }

    #[test]
    fn test_resolve_accepts_any_output() {
        let mut record = conflicted(&["a", "b"]);
        record.set_resolver(Some(resolver::resolver(|_| Vec::new())));
        record.resolve().unwrap();
        assert_eq!(record.state(), RecordState::Empty);
    }

    #[test]
    fn test_clear() {
        let mut record = conflicted(&["a", "b", "c"]);
        record.clear();
        assert_eq!(record.sibling_count(), 0);
        assert!(!record.exists());
    }

    #[test]
    fn test_identity() {
        let b = bucket();
        let mut r1 = b.new_record("k").unwrap();
        let mut r2 = b.record_for_fetch("k").unwrap();
        assert_eq!(r1, r2);

        r1.set_vclock(Some(VClock::decode("abc", "binary").unwrap()));
        assert_ne!(r1, r2);

        r2.set_vclock(Some(VClock::decode("YWJj", "base64").unwrap()));
        assert_eq!(r1, r2);

        let other_bucket = Bucket::new("c", Arc::clone(b.transport()));
        let mut r3 = other_bucket.new_record("k").unwrap();
        r3.set_vclock(r1.vclock().cloned());
        assert_ne!(r1, r3);

        let mut set = std::collections::HashSet::new();
        set.insert(r1);
        assert!(set.contains(&r2));
    }

    #[test]
    fn test_set_key_only_fills_missing_key() {
        let mut record = bucket().new_record_without_key();
        assert_eq!(record.key(), None);
        record.set_key("assigned");
        assert_eq!(record.key(), Some("assigned"));
        record.set_key("other");
        assert_eq!(record.key(), Some("assigned"));
    }
}
