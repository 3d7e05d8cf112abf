//! Revision tokens
//!
//! Format: `<generation>-<digest>`, e.g. `2-68a533f5dc76a65b56b7329b9d4086ab`.
//! The generation starts at 1 and grows by one on every write, deletes
//! included. The digest is 16 bytes of SHA-256 over the previous token and
//! the written body, hex encoded.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::errors::StoreError;

/// A parsed revision token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    generation: u64,
    digest: String,
}

impl Revision {
    /// First revision of a new document
    pub fn initial(body: &Value) -> Self {
        Self::derive(None, body, false)
    }

    /// Revision following `self` after writing `body`
    pub fn next(&self, body: &Value) -> Self {
        Self::derive(Some(self), body, false)
    }

    /// Tombstone revision following `self`
    pub fn tombstone(&self) -> Self {
        Self::derive(Some(self), &Value::Null, true)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    fn derive(previous: Option<&Revision>, body: &Value, deleted: bool) -> Self {
        let mut hasher = Sha256::new();
        if let Some(previous) = previous {
            hasher.update(previous.to_string().as_bytes());
        }
        hasher.update([deleted as u8]);
        // Value's Display is compact JSON and cannot fail
        hasher.update(body.to_string().as_bytes());

        let hash = hasher.finalize();
        let digest = hash[..16].iter().map(|b| format!("{:02x}", b)).collect();

        Self {
            generation: previous.map_or(1, |p| p.generation + 1),
            digest,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.generation, self.digest)
    }
}

impl FromStr for Revision {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::BadRequest(format!("invalid revision: '{}'", s));

        let (generation, digest) = s.split_once('-').ok_or_else(invalid)?;
        let generation: u64 = generation.parse().map_err(|_| invalid())?;
        if generation == 0 || digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self {
            generation,
            digest: digest.to_string(),
        })
    }
}
