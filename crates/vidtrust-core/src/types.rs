//! Content identifiers for manifests and their renditions.
//!
//! Identifiers are string newtypes: a [`ManifestId`] is the lowercase hex of a
//! 32-byte video id, and a [`StreamId`] appends a rendition label to it.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Length in bytes of a raw video id.
pub const HASH_LENGTH: usize = 32;

/// Length in characters of a hex-encoded video id.
pub const MANIFEST_ID_HEX_LENGTH: usize = 2 * HASH_LENGTH;

/// Draw a fresh 32-byte identifier.
///
/// The thread RNG is seeded from the operating system once per thread, so ids
/// never repeat across process restarts.
pub fn random_id() -> [u8; HASH_LENGTH] {
    let mut id = [0u8; HASH_LENGTH];
    rand::thread_rng().fill_bytes(&mut id);
    id
}

/// Identifier of a media manifest: `hex(video_id)`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(String);

impl ManifestId {
    /// Build a manifest id from a 32-byte video id.
    pub fn new(video_id: &[u8]) -> Result<Self> {
        if video_id.len() != HASH_LENGTH {
            return Err(CoreError::InvalidLength {
                expected: HASH_LENGTH,
                actual: video_id.len(),
            });
        }
        Ok(Self(hex::encode(video_id)))
    }

    /// Build a manifest id with a freshly drawn video id.
    pub fn random() -> Self {
        Self(hex::encode(random_id()))
    }

    /// Wrap an arbitrary string without validation.
    ///
    /// Used for identifiers received from peers and for fixtures; check
    /// [`ManifestId::is_valid`] before relying on the format.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// True iff the id is exactly 64 characters long.
    pub fn is_valid(&self) -> bool {
        self.0.len() == MANIFEST_ID_HEX_LENGTH
    }

    /// Decode the underlying 32-byte video id.
    pub fn video_id(&self) -> Option<[u8; HASH_LENGTH]> {
        decode_video_id(&self.0)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id's UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ManifestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManifestId({})", self.0)
    }
}

impl fmt::Display for ManifestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ManifestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one rendition of a manifest: `hex(video_id) || rendition`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    /// Build a stream id from a 32-byte video id and a non-empty rendition.
    pub fn new(video_id: &[u8], rendition: &str) -> Result<Self> {
        if video_id.len() != HASH_LENGTH {
            return Err(CoreError::InvalidLength {
                expected: HASH_LENGTH,
                actual: video_id.len(),
            });
        }
        if rendition.is_empty() {
            return Err(CoreError::InvalidRendition);
        }
        Ok(Self(format!("{}{}", hex::encode(video_id), rendition)))
    }

    /// Build a stream id for a rendition of an existing manifest.
    pub fn for_manifest(manifest_id: &ManifestId, rendition: &str) -> Result<Self> {
        let video_id = manifest_id.video_id().ok_or_else(|| {
            CoreError::InvalidStreamId(format!("manifest id {manifest_id} is not 64 hex chars"))
        })?;
        Self::new(&video_id, rendition)
    }

    /// Wrap an arbitrary string without validation.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// True iff the id is strictly longer than a manifest id.
    ///
    /// This is a pure length check, independent of [`StreamId::rendition`].
    pub fn is_valid(&self) -> bool {
        self.0.len() > MANIFEST_ID_HEX_LENGTH
    }

    /// Project the stream id back onto its manifest id.
    pub fn manifest_id(&self) -> Result<ManifestId> {
        if !self.is_valid() {
            return Err(CoreError::InvalidStreamId(format!(
                "expected more than {} chars, got {}",
                MANIFEST_ID_HEX_LENGTH,
                self.0.len()
            )));
        }
        let video_id = self.video_id().ok_or_else(|| {
            CoreError::InvalidStreamId("manifest prefix is not valid hex".into())
        })?;
        ManifestId::new(&video_id)
    }

    /// The rendition suffix, or `""` if the id is shorter than the prefix.
    pub fn rendition(&self) -> &str {
        self.0.get(MANIFEST_ID_HEX_LENGTH..).unwrap_or("")
    }

    /// Decode the 32-byte video id held in the prefix.
    pub fn video_id(&self) -> Option<[u8; HASH_LENGTH]> {
        decode_video_id(&self.0)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamId({})", self.0)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn decode_video_id(s: &str) -> Option<[u8; HASH_LENGTH]> {
    let prefix = s.get(..MANIFEST_ID_HEX_LENGTH)?;
    let mut out = [0u8; HASH_LENGTH];
    hex::decode_to_slice(prefix, &mut out).ok()?;
    Some(out)
}
