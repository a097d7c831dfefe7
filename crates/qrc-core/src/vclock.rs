//! Causality tokens
//!
//! A [`VClock`] is the opaque vector clock a store hands back with every
//! read. The client never builds one from scratch: it decodes whatever the
//! store sent, keeps it next to the siblings it describes, and submits it
//! again on the next write so the store can order that write against newer
//! replica state.
//!
//! Two wire encodings are understood at the boundary:
//!  - `base64`: standard alphabet, padded
//!  - `binary`: the raw bytes, unchanged

use crate::error::{CoreError, Result};
use base64ct::{Base64, Encoding as _};
use std::fmt;
use std::str::FromStr;

/// The encodings a vector clock may travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Base64,
    Binary,
}

impl Encoding {
    /// The name used for this encoding on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Binary => "binary",
        }
    }
}

impl FromStr for Encoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "base64" => Ok(Encoding::Base64),
            "binary" => Ok(Encoding::Binary),
            other => Err(CoreError::InvalidEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque vector clock received from the store.
///
/// Equality and hashing are byte-wise. No causal comparison is offered:
/// ordering clocks is the store's job.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VClock {
    raw: Vec<u8>,
}

impl VClock {
    /// Decode a clock sent by the store, naming the encoding as a string.
    ///
    /// Fails with [`CoreError::InvalidEncoding`] for anything other than
    /// `"base64"` or `"binary"`.
    pub fn decode(value: impl AsRef<[u8]>, encoding: &str) -> Result<Self> {
        Self::decode_with(value, encoding.parse()?)
    }

    /// Decode a clock with an already-parsed encoding.
    pub fn decode_with(value: impl AsRef<[u8]>, encoding: Encoding) -> Result<Self> {
        let value = value.as_ref();
        let raw = match encoding {
            Encoding::Binary => value.to_vec(),
            Encoding::Base64 => {
                let text = std::str::from_utf8(value)
                    .map_err(|e| CoreError::MalformedToken(e.to_string()))?;
                Base64::decode_vec(text.trim())
                    .map_err(|e| CoreError::MalformedToken(e.to_string()))?
            }
        };
        Ok(Self { raw })
    }

    /// Encode the clock for the store, naming the encoding as a string.
    pub fn encode(&self, encoding: &str) -> Result<Vec<u8>> {
        Ok(self.encode_with(encoding.parse()?))
    }

    /// Encode the clock with an already-parsed encoding.
    pub fn encode_with(&self, encoding: Encoding) -> Vec<u8> {
        match encoding {
            Encoding::Binary => self.raw.clone(),
            Encoding::Base64 => Base64::encode_string(&self.raw).into_bytes(),
        }
    }

    /// The base64 text form, as sent in HTTP headers.
    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.raw)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Debug for VClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<VClock {}>", self.to_base64())
    }
}

impl fmt::Display for VClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}
