//! Buckets: the namespace a record lives in, plus its default policies.

use crate::error::{ClientError, Result};
use crate::quorum::Quorum;
use crate::record::Record;
use crate::resolver::{self, Resolver};
use crate::transport::{GetOptions, Transport};
use parking_lot::RwLock;
use qrc_core::{Codec, Codecs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Per-bucket configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketProps {
    /// Replication factor.
    pub n_val: u32,
    /// Keep concurrent writes as siblings instead of letting the last one win.
    pub allow_mult: bool,
    pub r: Quorum,
    pub w: Quorum,
    pub dw: Quorum,
    pub pr: Quorum,
    pub pw: Quorum,
    pub basic_quorum: Option<bool>,
    pub notfound_ok: Option<bool>,
    /// Name of a built-in resolver, see [`resolver::lookup`].
    pub resolver: Option<String>,
}

impl Default for BucketProps {
    fn default() -> Self {
        Self {
            n_val: 3,
            allow_mult: true,
            r: Quorum::Quorum,
            w: Quorum::Quorum,
            dw: Quorum::Quorum,
            pr: Quorum::Count(0),
            pw: Quorum::Count(0),
            basic_quorum: None,
            notfound_ok: None,
            resolver: None,
        }
    }
}

/// Builder for bucket configuration.
pub struct BucketPropsBuilder {
    props: BucketProps,
}

impl BucketPropsBuilder {
    /// Start from the default props.
    pub fn new() -> Self {
        Self {
            props: BucketProps::default(),
        }
    }

    /// Number of replicas per key.
    pub fn n_val(mut self, n_val: u32) -> Self {
        self.props.n_val = n_val;
        self
    }

    /// Keep concurrent writes as siblings.
    pub fn allow_mult(mut self, allow_mult: bool) -> Self {
        self.props.allow_mult = allow_mult;
        self
    }

    /// Default read quorum.
    pub fn r(mut self, r: Quorum) -> Self {
        self.props.r = r;
        self
    }

    /// Default write quorum.
    pub fn w(mut self, w: Quorum) -> Self {
        self.props.w = w;
        self
    }

    /// Default durable-write quorum.
    pub fn dw(mut self, dw: Quorum) -> Self {
        self.props.dw = dw;
        self
    }

    /// Default primary read quorum.
    pub fn pr(mut self, pr: Quorum) -> Self {
        self.props.pr = pr;
        self
    }

    /// Default primary write quorum.
    pub fn pw(mut self, pw: Quorum) -> Self {
        self.props.pw = pw;
        self
    }

    pub fn basic_quorum(mut self, basic_quorum: bool) -> Self {
        self.props.basic_quorum = Some(basic_quorum);
        self
    }

    pub fn notfound_ok(mut self, notfound_ok: bool) -> Self {
        self.props.notfound_ok = Some(notfound_ok);
        self
    }

    /// Name a built-in resolver for the bucket.
    pub fn resolver(mut self, name: impl Into<String>) -> Self {
        self.props.resolver = Some(name.into());
        self
    }

    pub fn build(self) -> BucketProps {
        self.props
    }
}

impl Default for BucketPropsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct BucketInner<T: Transport> {
    name: String,
    transport: Arc<T>,
    props: RwLock<BucketProps>,
    resolver: RwLock<Option<Resolver>>,
    codecs: RwLock<Codecs>,
}

/// A named bucket bound to a transport.
///
/// Cloning yields another handle to the same bucket: a resolver or codec
/// registered through one handle is seen by every record in the bucket.
pub struct Bucket<T: Transport> {
    inner: Arc<BucketInner<T>>,
}

impl<T: Transport> Bucket<T> {
    /// A bucket with default props.
    pub fn new(name: impl Into<String>, transport: Arc<T>) -> Self {
        Self::with_props(name, transport, BucketProps::default())
    }

    /// A bucket with the given props.
    pub fn with_props(name: impl Into<String>, transport: Arc<T>, props: BucketProps) -> Self {
        Self {
            inner: Arc::new(BucketInner {
                name: name.into(),
                transport,
                props: RwLock::new(props),
                resolver: RwLock::new(None),
                codecs: RwLock::new(Codecs::default()),
            }),
        }
    }

    /// The bucket name, also the record namespace.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The transport records in this bucket use.
    pub fn transport(&self) -> &Arc<T> {
        &self.inner.transport
    }

    /// A snapshot of the current props.
    pub fn props(&self) -> BucketProps {
        self.inner.props.read().clone()
    }

    /// Replace the props. Already-created records see the change.
    pub fn set_props(&self, props: BucketProps) {
        *self.inner.props.write() = props;
    }

    /// The bucket-level resolver.
    ///
    /// A resolver set with [`set_resolver`](Self::set_resolver) wins over
    /// one named in the props. A name that matches no built-in resolver
    /// fails with [`ClientError::InvalidResolver`].
    pub fn resolver(&self) -> Result<Option<Resolver>> {
        if let Some(resolver) = self.inner.resolver.read().clone() {
            return Ok(Some(resolver));
        }
        match self.inner.props.read().resolver.as_deref() {
            None => Ok(None),
            Some(name) => resolver::lookup(name)
                .map(Some)
                .ok_or_else(|| ClientError::InvalidResolver(name.to_string())),
        }
    }

    /// Set or clear the bucket-level resolver function.
    pub fn set_resolver(&self, resolver: Option<Resolver>) {
        *self.inner.resolver.write() = resolver;
    }

    /// The codec registry handed to every content created for this bucket.
    pub fn codecs(&self) -> Codecs {
        self.inner.codecs.read().clone()
    }

    /// Register a codec for a media type on this bucket.
    pub fn register_codec(&self, content_type: &str, codec: impl Codec + 'static) {
        self.inner.codecs.write().register(content_type, codec);
    }

    /// A new record holding one empty sibling, ready to be filled in and
    /// stored.
    pub fn new_record(&self, key: impl Into<String>) -> Result<Record<T>> {
        Record::new(self.clone(), Some(key.into()))
    }

    /// A new record whose key the store will assign on first write.
    pub fn new_record_without_key(&self) -> Record<T> {
        Record::new_unkeyed(self.clone())
    }

    /// An empty record to fetch into.
    pub fn record_for_fetch(&self, key: impl Into<String>) -> Result<Record<T>> {
        Record::empty(self.clone(), Some(key.into()))
    }

    /// Fetch a key. A missing key yields a record with no siblings.
    pub async fn get(&self, key: impl Into<String>, options: GetOptions) -> Result<Record<T>> {
        let mut record = self.record_for_fetch(key)?;
        record.reload(options).await?;
        Ok(record)
    }
}

impl<T: Transport> Clone for Bucket<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Buckets compare by name.
impl<T: Transport> PartialEq for Bucket<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl<T: Transport> Eq for Bucket<T> {}

impl<T: Transport> fmt::Debug for Bucket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.inner.name)
            .field("props", &*self.inner.props.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;

    fn bucket(name: &str) -> Bucket<MemoryTransport> {
        Bucket::new(name, Arc::new(MemoryTransport::default()))
    }

    #[test]
    fn test_props_builder() {
        let props = BucketPropsBuilder::new()
            .n_val(5)
            .allow_mult(false)
            .w(Quorum::All)
            .notfound_ok(true)
            .resolver("last_written")
            .build();

        assert_eq!(props.n_val, 5);
        assert!(!props.allow_mult);
        assert_eq!(props.w, Quorum::All);
        assert_eq!(props.notfound_ok, Some(true));
        assert_eq!(props.resolver.as_deref(), Some("last_written"));
    }

    #[test]
    fn test_props_from_json() {
        let props: BucketProps =
            serde_json::from_str(r#"{"n_val": 5, "r": "one", "pw": 2, "resolver": "default"}"#)
                .unwrap();
        assert_eq!(props.n_val, 5);
        assert_eq!(props.r, Quorum::One);
        assert_eq!(props.pw, Quorum::Count(2));
        assert!(props.allow_mult);
        assert_eq!(props.resolver.as_deref(), Some("default"));
    }

    #[test]
    fn test_resolver_unset() {
        assert!(bucket("b").resolver().unwrap().is_none());
    }

    #[test]
    fn test_resolver_by_name() {
        let b = bucket("b");
        b.set_props(BucketPropsBuilder::new().resolver("last_written").build());
        assert!(b.resolver().unwrap().is_some());
    }

    #[test]
    fn test_resolver_unknown_name() {
        let b = bucket("b");
        b.set_props(BucketPropsBuilder::new().resolver("coin_flip").build());
        assert_eq!(
            b.resolver().err(),
            Some(ClientError::InvalidResolver("coin_flip".to_string()))
        );

        // An explicit function shadows the bad name.
        b.set_resolver(Some(resolver::keep_all()));
        assert!(b.resolver().unwrap().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let b = bucket("b");
        let other = b.clone();
        other.set_resolver(Some(resolver::keep_all()));
        other.register_codec("application/x-text", qrc_core::TextCodec);

        assert!(b.resolver().unwrap().is_some());
        assert!(b.codecs().contains("application/x-text"));
        assert_eq!(b, other);
    }

    #[test]
    fn test_new_record_rejects_empty_key() {
        assert_eq!(
            bucket("b").new_record("").err(),
            Some(ClientError::InvalidKey)
        );
    }
}
