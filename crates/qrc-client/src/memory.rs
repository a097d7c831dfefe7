//! In-memory store for tests and simulation.
//!
//! Behaves like a single vnode of a quorum-replicated store that keeps
//! concurrent writes as siblings. Each stored sibling carries its own
//! [`VersionVector`]; the token handed to clients is the merge of all of
//! them. A write or delete drops exactly the siblings its submitted token
//! has seen, so stale or blind writes pile up as siblings.

use crate::clock::VersionVector;
use crate::error::TransportError;
use crate::quorum::Quorum;
use crate::record::Record;
use crate::transport::{DeleteOptions, GetOptions, PutOptions, Transport};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use qrc_core::Content;
use std::collections::HashMap;
use tracing::debug;
use ulid::Ulid;

/// Configuration for the in-memory store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Actor name used in the version vectors this store produces.
    pub node_id: String,
    /// Primary replicas reachable, checked against `pr`/`pw`.
    pub available_primaries: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            node_id: "node-0".to_string(),
            available_primaries: 3,
        }
    }
}

/// Builder for the in-memory store configuration.
pub struct MemoryConfigBuilder {
    config: MemoryConfig,
}

impl MemoryConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MemoryConfig::default(),
        }
    }

    /// Actor name this store stamps into version vectors.
    pub fn node_id(mut self, node_id: impl Into<String>) -> Self {
        self.config.node_id = node_id.into();
        self
    }

    /// Primaries reachable, checked against pr/pw.
    pub fn available_primaries(mut self, available_primaries: u32) -> Self {
        self.config.available_primaries = available_primaries;
        self
    }

    pub fn build(self) -> MemoryConfig {
        self.config
    }
}

impl Default for MemoryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct StoredSibling {
    clock: VersionVector,
    content: Content,
}

type ObjectKey = (String, String);

/// A quorum store held entirely in memory.
pub struct MemoryTransport {
    config: MemoryConfig,
    objects: RwLock<HashMap<ObjectKey, Vec<StoredSibling>>>,
}

impl MemoryTransport {
    /// An empty store.
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Number of keys currently stored, across buckets.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Number of siblings stored under a key, tombstones included.
    pub fn sibling_count(&self, bucket: &str, key: &str) -> usize {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .map_or(0, Vec::len)
    }

    fn check_quorum(requested: Quorum, n_val: u32, limit: u32) -> Result<(), TransportError> {
        let requested = requested.resolve(n_val);
        if requested > limit {
            return Err(TransportError::QuorumNotMet {
                requested,
                available: limit,
            });
        }
        Ok(())
    }

    fn primaries(&self, n_val: u32) -> u32 {
        self.config.available_primaries.min(n_val)
    }

    /// The vector clock the record submits, if any.
    fn context(record: &Record<Self>) -> Result<Option<VersionVector>, TransportError> {
        record
            .vclock()
            .map(VersionVector::from_vclock)
            .transpose()
            .map_err(TransportError::InvalidRequest)
    }

    fn require_key(record: &Record<Self>) -> Result<ObjectKey, TransportError> {
        let key = record
            .key()
            .ok_or_else(|| TransportError::InvalidRequest("record has no key".to_string()))?;
        Ok((record.bucket().name().to_string(), key.to_string()))
    }

    fn merged(siblings: &[StoredSibling]) -> VersionVector {
        siblings.iter().fold(VersionVector::new(), |mut acc, s| {
            acc.merge(&s.clock);
            acc
        })
    }

    /// A clock for a new sibling: the submitted context plus a fresh
    /// counter for this node, above anything stored under the key.
    fn next_clock(&self, context: VersionVector, seen: &VersionVector) -> VersionVector {
        let node = &self.config.node_id;
        let counter = seen.get(node).max(context.get(node)) + 1;
        let mut clock = context;
        clock.set(node.clone(), counter);
        clock
    }

    fn token(siblings: &[StoredSibling]) -> Result<qrc_core::VClock, TransportError> {
        Self::merged(siblings)
            .to_vclock()
            .map_err(TransportError::Unavailable)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn put(
        &self,
        record: &mut Record<Self>,
        options: PutOptions,
    ) -> Result<(), TransportError> {
        let props = record.bucket().props();
        Self::check_quorum(options.w.unwrap_or(props.w), props.n_val, props.n_val)?;
        Self::check_quorum(options.dw.unwrap_or(props.dw), props.n_val, props.n_val)?;
        Self::check_quorum(
            options.pw.unwrap_or(props.pw),
            props.n_val,
            self.primaries(props.n_val),
        )?;
        if let Some(timeout) = options.timeout {
            debug!(?timeout, "memory store does not enforce timeouts");
        }

        let mut content = match record.siblings() {
            [only] => only.clone(),
            other => {
                return Err(TransportError::InvalidRequest(format!(
                    "expected one sibling to store, found {}",
                    other.len()
                )))
            }
        };
        let context = Self::context(record)?;
        let key = record
            .key()
            .map(str::to_string)
            .unwrap_or_else(|| Ulid::new().to_string());
        let object_key = (record.bucket().name().to_string(), key.clone());

        let (stored, token) = {
            let mut objects = self.objects.write();
            let siblings = objects.entry(object_key).or_default();

            if options.if_none_match && siblings.iter().any(|s| s.content.exists()) {
                return Err(TransportError::PreconditionFailed);
            }

            let seen = Self::merged(siblings);
            let context = context.unwrap_or_default();
            let clock = if props.allow_mult {
                siblings.retain(|s| !context.dominates(&s.clock));
                self.next_clock(context, &seen)
            } else {
                siblings.clear();
                self.next_clock(context.merged_with(&seen), &seen)
            };

            content.set_last_modified(Some(Utc::now()));
            content.set_etag(Some(Ulid::new().to_string()));
            siblings.push(StoredSibling { clock, content });

            let stored: Vec<Content> = siblings.iter().map(|s| s.content.clone()).collect();
            (stored, Self::token(siblings)?)
        };

        debug!(
            bucket = %record.bucket().name(),
            key = %key,
            siblings = stored.len(),
            "stored value"
        );
        record.set_key(key);
        record.set_vclock(Some(token));
        if options.return_body {
            record.set_siblings(stored);
        }
        Ok(())
    }

    async fn get(
        &self,
        record: &mut Record<Self>,
        options: GetOptions,
    ) -> Result<(), TransportError> {
        let props = record.bucket().props();
        Self::check_quorum(options.r.unwrap_or(props.r), props.n_val, props.n_val)?;
        Self::check_quorum(
            options.pr.unwrap_or(props.pr),
            props.n_val,
            self.primaries(props.n_val),
        )?;
        debug!(
            basic_quorum = ?options.basic_quorum.or(props.basic_quorum),
            notfound_ok = ?options.notfound_ok.or(props.notfound_ok),
            timeout = ?options.timeout,
            "fetching value"
        );

        let object_key = Self::require_key(record)?;
        let found = {
            let objects = self.objects.read();
            match objects.get(&object_key) {
                Some(siblings) => Some((
                    siblings
                        .iter()
                        .map(|s| s.content.clone())
                        .collect::<Vec<_>>(),
                    Self::token(siblings)?,
                )),
                None => None,
            }
        };

        match found {
            Some((mut siblings, token)) => {
                let codecs = record.bucket().codecs();
                for sibling in &mut siblings {
                    sibling.set_codecs(codecs.clone());
                }
                record.set_siblings(siblings);
                record.set_vclock(Some(token));
            }
            None => {
                record.set_siblings(Vec::new());
                record.set_vclock(None);
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        record: &mut Record<Self>,
        options: DeleteOptions,
    ) -> Result<(), TransportError> {
        let props = record.bucket().props();
        let primaries = self.primaries(props.n_val);
        Self::check_quorum(options.r.unwrap_or(props.r), props.n_val, props.n_val)?;
        Self::check_quorum(options.w.unwrap_or(props.w), props.n_val, props.n_val)?;
        Self::check_quorum(options.dw.unwrap_or(props.dw), props.n_val, props.n_val)?;
        Self::check_quorum(options.pr.unwrap_or(props.pr), props.n_val, primaries)?;
        Self::check_quorum(options.pw.unwrap_or(props.pw), props.n_val, primaries)?;
        if let Some(timeout) = options.timeout {
            debug!(?timeout, "memory store does not enforce timeouts");
        }

        let object_key = Self::require_key(record)?;
        let context = Self::context(record)?;

        let mut objects = self.objects.write();
        let reap = match objects.get_mut(&object_key) {
            None => false,
            Some(siblings) => {
                let seen = Self::merged(siblings);
                match &context {
                    // Without a clock the delete covers everything stored.
                    None => siblings.clear(),
                    Some(context) => siblings.retain(|s| !context.dominates(&s.clock)),
                }

                if siblings.iter().any(|s| s.content.exists()) {
                    let mut tombstone = Content::tombstone();
                    tombstone.set_last_modified(Some(Utc::now()));
                    let clock = self.next_clock(context.unwrap_or_default(), &seen);
                    siblings.push(StoredSibling {
                        clock,
                        content: tombstone,
                    });
                    false
                } else {
                    true
                }
            }
        };
        if reap {
            objects.remove(&object_key);
        }

        debug!(bucket = %object_key.0, key = %object_key.1, reaped = reap, "deleted value");
        Ok(())
    }
}
