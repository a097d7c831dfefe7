//! Quorum values for read and write requests.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How many replicas must take part in a request.
///
/// Symbolic values are resolved against the bucket's `n_val`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Quorum {
    /// Whatever the store is configured with (a majority).
    #[default]
    Default,
    One,
    Quorum,
    All,
    Count(u32),
}

impl Quorum {
    /// The number of replicas this value asks for out of `n_val`.
    pub fn resolve(self, n_val: u32) -> u32 {
        match self {
            Quorum::Default | Quorum::Quorum => n_val / 2 + 1,
            Quorum::One => 1,
            Quorum::All => n_val,
            Quorum::Count(count) => count,
        }
    }
}

impl From<u32> for Quorum {
    fn from(count: u32) -> Self {
        Quorum::Count(count)
    }
}

impl FromStr for Quorum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Quorum::Default),
            "one" => Ok(Quorum::One),
            "quorum" => Ok(Quorum::Quorum),
            "all" => Ok(Quorum::All),
            other => other
                .parse::<u32>()
                .map(Quorum::Count)
                .map_err(|_| format!("invalid quorum value: {}", other)),
        }
    }
}

impl fmt::Display for Quorum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quorum::Default => f.write_str("default"),
            Quorum::One => f.write_str("one"),
            Quorum::Quorum => f.write_str("quorum"),
            Quorum::All => f.write_str("all"),
            Quorum::Count(count) => write!(f, "{}", count),
        }
    }
}

// Counts travel as numbers, symbolic values as strings.
impl Serialize for Quorum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Quorum::Count(count) => serializer.serialize_u32(*count),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Quorum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(count) => Ok(Quorum::Count(count)),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}
