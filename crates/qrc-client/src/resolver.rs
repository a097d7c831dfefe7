//! Sibling resolution.
//!
//! A resolver reduces the siblings of a conflicted record, ideally to one.
//! It receives the sibling list by value and returns what should remain; it
//! never sees the record itself. Whatever it returns is accepted: the
//! sibling-count checks on the record enforce the rest.
//!
//! A record's own resolver takes precedence; without one the bucket's is
//! used. Buckets may name a built-in resolver in their configuration, see
//! [`lookup`].

use qrc_core::Content;
use std::sync::Arc;

/// A sibling-reduction function.
pub type Resolver = Arc<dyn Fn(Vec<Content>) -> Vec<Content> + Send + Sync>;

/// Wrap a closure as a [`Resolver`].
pub fn resolver<F>(f: F) -> Resolver
where
    F: Fn(Vec<Content>) -> Vec<Content> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Leaves siblings untouched.
pub fn keep_all() -> Resolver {
    resolver(|siblings| siblings)
}

/// Keeps the sibling with the newest `last_modified`.
///
/// Siblings without a timestamp count as oldest. On a tie the earliest
/// sibling in the list wins.
pub fn last_written() -> Resolver {
    resolver(|siblings| {
        let mut winner: Option<Content> = None;
        for sibling in siblings {
            let newer = match &winner {
                None => true,
                Some(current) => sibling.last_modified() > current.last_modified(),
            };
            if newer {
                winner = Some(sibling);
            }
        }
        winner.into_iter().collect()
    })
}

/// Names accepted by [`lookup`].
pub const BUILTIN_RESOLVERS: [&str; 2] = ["default", "last_written"];

/// Find a built-in resolver by its configuration name.
pub fn lookup(name: &str) -> Option<Resolver> {
    match name {
        "default" => Some(keep_all()),
        "last_written" => Some(last_written()),
        _ => None,
    }
}
