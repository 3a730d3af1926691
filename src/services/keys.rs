//! Object key generation.
//!
//! Key format: `{classification}/{random_id}{extension}`, e.g.
//! `landscape/Zm9vYmFy...Q.mp4`. Keys are never checked against the store;
//! uniqueness rests on the 256-bit random id.

use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use std::fmt;
use crate::models::media::{extension_for, Classification};

const RANDOM_ID_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn generate(classification: Classification, content_type: &str) -> Self {
        Self(format!(
            "{}/{}{}",
            classification,
            random_id(),
            extension_for(content_type)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL-safe, unpadded base64 of 32 bytes from the thread-local CSPRNG.
pub fn random_id() -> String {
    let mut random_bytes = [0u8; RANDOM_ID_BYTES];
    rand::thread_rng().fill(&mut random_bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}
