//! The boundary to whatever actually talks to the store.
//!
//! A transport performs quorum reads, writes and deletes on behalf of a
//! [`Record`]. It repopulates the record only through the record's public
//! mutators (`set_key`, `set_vclock`, `set_siblings`).

use crate::error::TransportError;
use crate::quorum::Quorum;
use crate::record::Record;
use async_trait::async_trait;
use std::time::Duration;

/// Parameters of a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutOptions {
    /// Replicas that must acknowledge the write.
    pub w: Option<Quorum>,
    /// Replicas that must durably persist the write.
    pub dw: Option<Quorum>,
    /// Primary replicas that must be available.
    pub pw: Option<Quorum>,
    /// Hand the stored state back and repopulate the record with it.
    pub return_body: bool,
    /// Only write if the key holds no value yet.
    pub if_none_match: bool,
    pub timeout: Option<Duration>,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            w: None,
            dw: None,
            pw: None,
            return_body: true,
            if_none_match: false,
            timeout: None,
        }
    }
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write quorum.
    pub fn w(mut self, w: impl Into<Quorum>) -> Self {
        self.w = Some(w.into());
        self
    }

    /// Durable-write quorum.
    pub fn dw(mut self, dw: impl Into<Quorum>) -> Self {
        self.dw = Some(dw.into());
        self
    }

    /// Primary write quorum.
    pub fn pw(mut self, pw: impl Into<Quorum>) -> Self {
        self.pw = Some(pw.into());
        self
    }

    pub fn return_body(mut self, return_body: bool) -> Self {
        self.return_body = return_body;
        self
    }

    pub fn if_none_match(mut self, if_none_match: bool) -> Self {
        self.if_none_match = if_none_match;
        self
    }

    /// Forwarded to the store as is.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Parameters of a read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub r: Option<Quorum>,
    pub pr: Option<Quorum>,
    pub timeout: Option<Duration>,
    /// Return not-found early once a simple majority says so.
    pub basic_quorum: Option<bool>,
    /// Count not-found replies towards the read quorum.
    pub notfound_ok: Option<bool>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read quorum.
    pub fn r(mut self, r: impl Into<Quorum>) -> Self {
        self.r = Some(r.into());
        self
    }

    /// Primary read quorum.
    pub fn pr(mut self, pr: impl Into<Quorum>) -> Self {
        self.pr = Some(pr.into());
        self
    }

    /// Forwarded to the store as is.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn basic_quorum(mut self, basic_quorum: bool) -> Self {
        self.basic_quorum = Some(basic_quorum);
        self
    }

    pub fn notfound_ok(mut self, notfound_ok: bool) -> Self {
        self.notfound_ok = Some(notfound_ok);
        self
    }
}

/// Parameters of a delete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub r: Option<Quorum>,
    pub w: Option<Quorum>,
    pub dw: Option<Quorum>,
    pub pr: Option<Quorum>,
    pub pw: Option<Quorum>,
    pub timeout: Option<Duration>,
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read quorum.
    pub fn r(mut self, r: impl Into<Quorum>) -> Self {
        self.r = Some(r.into());
        self
    }

    /// Write quorum.
    pub fn w(mut self, w: impl Into<Quorum>) -> Self {
        self.w = Some(w.into());
        self
    }

    /// Durable-write quorum.
    pub fn dw(mut self, dw: impl Into<Quorum>) -> Self {
        self.dw = Some(dw.into());
        self
    }

    /// Primary read quorum.
    pub fn pr(mut self, pr: impl Into<Quorum>) -> Self {
        self.pr = Some(pr.into());
        self
    }

    /// Primary write quorum.
    pub fn pw(mut self, pw: impl Into<Quorum>) -> Self {
        self.pw = Some(pw.into());
        self
    }

    /// Forwarded to the store as is.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Performs quorum operations against a store.
#[async_trait]
pub trait Transport: Send + Sync + Sized + 'static {
    /// Write the record's single sibling, submitting its vector clock.
    async fn put(&self, record: &mut Record<Self>, options: PutOptions)
        -> Result<(), TransportError>;

    /// Replace the record's siblings and vector clock with the stored state.
    async fn get(&self, record: &mut Record<Self>, options: GetOptions)
        -> Result<(), TransportError>;

    /// Delete the record's key, submitting its vector clock.
    async fn delete(
        &self,
        record: &mut Record<Self>,
        options: DeleteOptions,
    ) -> Result<(), TransportError>;
}
