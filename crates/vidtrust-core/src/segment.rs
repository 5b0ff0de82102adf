//! Segment descriptors and their canonical byte form.
//!
//! The flattened form is what broadcasters sign for every segment, so it is
//! bit-exact and must never change:
//!
//! ```text
//! manifest_id (UTF-8 bytes of the hex string)
//! || seq (big-endian, left-padded to 32 bytes)
//! || content_hash (32 bytes)
//! || profiles (lowercase hex text of the 4-byte profile ids)
//! ```

use std::fmt;

use crate::crypto::Keccak256Hash;
use crate::error::{CoreError, Result};
use crate::types::{ManifestId, MANIFEST_ID_HEX_LENGTH};

/// Width of the padded sequence number field.
pub const SEQ_FIELD_LENGTH: usize = 32;

/// Length of a profile id in bytes.
pub const PROFILE_ID_LENGTH: usize = 4;

/// An output rendition profile.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoProfile {
    pub name: &'static str,
    pub bitrate: &'static str,
    pub framerate: u32,
    pub aspect_ratio: &'static str,
    pub resolution: &'static str,
}

impl VideoProfile {
    pub const P720P60FPS16X9: Self = Self::preset("P720p60fps16x9", "6000k", 60, "16:9", "1280x720");
    pub const P720P30FPS16X9: Self = Self::preset("P720p30fps16x9", "4000k", 30, "16:9", "1280x720");
    pub const P720P30FPS4X3: Self = Self::preset("P720p30fps4x3", "4000k", 30, "4:3", "960x720");
    pub const P576P30FPS16X9: Self = Self::preset("P576p30fps16x9", "1500k", 30, "16:9", "1024x576");
    pub const P360P30FPS16X9: Self = Self::preset("P360p30fps16x9", "1200k", 30, "16:9", "640x360");
    pub const P360P30FPS4X3: Self = Self::preset("P360p30fps4x3", "1000k", 30, "4:3", "480x360");
    pub const P240P30FPS16X9: Self = Self::preset("P240p30fps16x9", "600k", 30, "16:9", "426x240");
    pub const P240P30FPS4X3: Self = Self::preset("P240p30fps4x3", "600k", 30, "4:3", "320x240");
    pub const P144P30FPS16X9: Self = Self::preset("P144p30fps16x9", "400k", 30, "16:9", "256x144");

    /// All built-in presets.
    pub const PRESETS: [Self; 9] = [
        Self::P720P60FPS16X9,
        Self::P720P30FPS16X9,
        Self::P720P30FPS4X3,
        Self::P576P30FPS16X9,
        Self::P360P30FPS16X9,
        Self::P360P30FPS4X3,
        Self::P240P30FPS16X9,
        Self::P240P30FPS4X3,
        Self::P144P30FPS16X9,
    ];

    const fn preset(
        name: &'static str,
        bitrate: &'static str,
        framerate: u32,
        aspect_ratio: &'static str,
        resolution: &'static str,
    ) -> Self {
        Self {
            name,
            bitrate,
            framerate,
            aspect_ratio,
            resolution,
        }
    }

    /// Profile id: the first 4 bytes of `Keccak256(name)`.
    pub fn id(&self) -> [u8; PROFILE_ID_LENGTH] {
        let digest = Keccak256Hash::hash(self.name.as_bytes());
        let mut id = [0u8; PROFILE_ID_LENGTH];
        id.copy_from_slice(&digest.0[..PROFILE_ID_LENGTH]);
        id
    }

    /// Look up a preset by name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::PRESETS.iter().copied().find(|p| p.name == name)
    }

    /// Look up a preset by profile id.
    pub fn from_id(id: &[u8; PROFILE_ID_LENGTH]) -> Option<Self> {
        Self::PRESETS.iter().copied().find(|p| &p.id() == id)
    }
}

impl fmt::Debug for VideoProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoProfile({})", self.name)
    }
}

/// Canonical text form of an ordered profile list.
///
/// Ids are emitted last-to-first. The output is still order-sensitive, and
/// this ordering is fixed by already-issued segment signatures.
pub fn profiles_to_hex(profiles: &[VideoProfile]) -> String {
    let mut out = String::with_capacity(profiles.len() * PROFILE_ID_LENGTH * 2);
    for profile in profiles.iter().rev() {
        out.push_str(&hex::encode(profile.id()));
    }
    out
}

/// Opaque reference to where a segment's bytes are stored.
///
/// Owned by the storage collaborator; never interpreted here and never part
/// of the flattened form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageInfo(Vec<u8>);

impl StorageInfo {
    pub fn new(handle: impl Into<Vec<u8>>) -> Self {
        Self(handle.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for StorageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageInfo({} bytes)", self.0.len())
    }
}

/// Addressable metadata of one submitted media segment.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    manifest_id: ManifestId,
    seq: u64,
    content_hash: Keccak256Hash,
    profiles: Vec<VideoProfile>,
    storage_info: Option<StorageInfo>,
}

impl SegmentDescriptor {
    /// Describe a segment.
    pub fn new(
        manifest_id: ManifestId,
        seq: u64,
        content_hash: Keccak256Hash,
        profiles: Vec<VideoProfile>,
    ) -> Self {
        Self {
            manifest_id,
            seq,
            content_hash,
            profiles,
            storage_info: None,
        }
    }

    /// Describe a segment by hashing its payload.
    pub fn for_payload(
        manifest_id: ManifestId,
        seq: u64,
        payload: &[u8],
        profiles: Vec<VideoProfile>,
    ) -> Self {
        Self::new(manifest_id, seq, Keccak256Hash::hash(payload), profiles)
    }

    /// Attach a storage reference.
    pub fn with_storage_info(mut self, info: StorageInfo) -> Self {
        self.storage_info = Some(info);
        self
    }

    pub fn manifest_id(&self) -> &ManifestId {
        &self.manifest_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn content_hash(&self) -> &Keccak256Hash {
        &self.content_hash
    }

    pub fn profiles(&self) -> &[VideoProfile] {
        &self.profiles
    }

    pub fn storage_info(&self) -> Option<&StorageInfo> {
        self.storage_info.as_ref()
    }

    /// The canonical bytes signed for this segment.
    pub fn flatten(&self) -> Vec<u8> {
        let profiles = profiles_to_hex(&self.profiles);
        let mut buf = Vec::with_capacity(
            self.manifest_id.as_bytes().len() + SEQ_FIELD_LENGTH + 32 + profiles.len(),
        );
        buf.extend_from_slice(self.manifest_id.as_bytes());
        buf.extend_from_slice(&left_pad_seq(self.seq));
        buf.extend_from_slice(&self.content_hash.0);
        buf.extend_from_slice(profiles.as_bytes());
        buf
    }

    /// `Keccak256(flatten())`.
    pub fn digest(&self) -> Keccak256Hash {
        Keccak256Hash::hash(&self.flatten())
    }
}

fn left_pad_seq(seq: u64) -> [u8; SEQ_FIELD_LENGTH] {
    let mut out = [0u8; SEQ_FIELD_LENGTH];
    out[SEQ_FIELD_LENGTH - 8..].copy_from_slice(&seq.to_be_bytes());
    out
}

/// Fields recovered from a flattened descriptor.
///
/// Parsing needs the manifest id to be a full 64-char id, since the
/// flattened form carries no length prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedSegment {
    pub manifest_id: ManifestId,
    pub seq: u64,
    pub content_hash: Keccak256Hash,
    /// Profile ids in descriptor order.
    pub profile_ids: Vec<[u8; PROFILE_ID_LENGTH]>,
}

impl FlattenedSegment {
    /// Parse the output of [`SegmentDescriptor::flatten`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        const FIXED: usize = MANIFEST_ID_HEX_LENGTH + SEQ_FIELD_LENGTH + 32;
        if bytes.len() < FIXED {
            return Err(CoreError::MalformedSegment(format!(
                "expected at least {} bytes, got {}",
                FIXED,
                bytes.len()
            )));
        }

        let (manifest, rest) = bytes.split_at(MANIFEST_ID_HEX_LENGTH);
        let (seq_field, rest) = rest.split_at(SEQ_FIELD_LENGTH);
        let (hash, profiles) = rest.split_at(32);

        if !manifest.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CoreError::MalformedSegment(
                "manifest id is not lowercase hex".into(),
            ));
        }
        let manifest_id = ManifestId::from_raw(String::from_utf8_lossy(manifest).into_owned());

        if seq_field[..SEQ_FIELD_LENGTH - 8].iter().any(|b| *b != 0) {
            return Err(CoreError::MalformedSegment("sequence number overflows u64".into()));
        }
        let mut seq_bytes = [0u8; 8];
        seq_bytes.copy_from_slice(&seq_field[SEQ_FIELD_LENGTH - 8..]);

        let mut content_hash = [0u8; 32];
        content_hash.copy_from_slice(hash);

        if profiles.len() % (PROFILE_ID_LENGTH * 2) != 0 {
            return Err(CoreError::MalformedSegment(format!(
                "profile section has odd length {}",
                profiles.len()
            )));
        }
        let mut profile_ids = profiles
            .chunks(PROFILE_ID_LENGTH * 2)
            .map(|chunk| {
                let mut id = [0u8; PROFILE_ID_LENGTH];
                hex::decode_to_slice(chunk, &mut id)
                    .map_err(|e| CoreError::MalformedSegment(format!("profile id: {e}")))?;
                Ok(id)
            })
            .collect::<Result<Vec<_>>>()?;
        profile_ids.reverse();

        Ok(Self {
            manifest_id,
            seq: u64::from_be_bytes(seq_bytes),
            content_hash: Keccak256Hash(content_hash),
            profile_ids,
        })
    }

    /// Resolve the profile ids against the presets.
    ///
    /// Returns `None` if any id is unknown.
    pub fn profiles(&self) -> Option<Vec<VideoProfile>> {
        self.profile_ids.iter().map(VideoProfile::from_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SegmentDescriptor {
        SegmentDescriptor::new(
            ManifestId::from_raw("abcdef"),
            1234,
            Keccak256Hash::right_padded(b"browns"),
            vec![VideoProfile::P144P30FPS16X9, VideoProfile::P240P30FPS16X9],
        )
    }

    #[test]
    fn test_flatten_reference_vector() {
        assert_eq!(
            fixture().digest().to_hex(),
            "e97461de03dcb5bf7f2e95c4ca9c99db2d049fb18a6df67dd9d557b2c05f6473"
        );
    }

    #[test]
    fn test_flatten_layout() {
        let flat = fixture().flatten();
        assert_eq!(&flat[..6], b"abcdef");
        assert_eq!(&flat[6..36], &[0u8; 30]);
        assert_eq!(&flat[36..38], &1234u16.to_be_bytes());
        assert_eq!(&flat[38..44], b"browns");
        assert_eq!(&flat[70..], b"c0a6517afca40bf9");
    }

    #[test]
    fn test_profile_ids() {
        assert_eq!(hex::encode(VideoProfile::P144P30FPS16X9.id()), "fca40bf9");
        assert_eq!(hex::encode(VideoProfile::P240P30FPS16X9.id()), "c0a6517a");
        assert_eq!(hex::encode(VideoProfile::P720P60FPS16X9.id()), "a7ac137a");
    }

    #[test]
    fn test_profile_lookup() {
        assert_eq!(VideoProfile::lookup("P240p30fps16x9"), Some(VideoProfile::P240P30FPS16X9));
        assert_eq!(VideoProfile::lookup("P240p"), None);
        let id = VideoProfile::P720P60FPS16X9.id();
        assert_eq!(VideoProfile::from_id(&id), Some(VideoProfile::P720P60FPS16X9));
    }

    #[test]
    fn test_profile_order_matters() {
        let a = profiles_to_hex(&[VideoProfile::P144P30FPS16X9, VideoProfile::P240P30FPS16X9]);
        let b = profiles_to_hex(&[VideoProfile::P240P30FPS16X9, VideoProfile::P144P30FPS16X9]);
        assert_ne!(a, b);
        assert_eq!(profiles_to_hex(&[]), "");
    }

    #[test]
    fn test_storage_info_not_flattened() {
        let plain = fixture();
        let stored = fixture().with_storage_info(StorageInfo::new(b"s3://bucket/seg".to_vec()));
        assert_eq!(plain.flatten(), stored.flatten());
        assert!(stored.storage_info().is_some());
    }

    #[test]
    fn test_parse_flattened() {
        let descriptor = SegmentDescriptor::for_payload(
            ManifestId::new(&[7u8; 32]).unwrap(),
            u64::MAX,
            b"segment payload",
            vec![VideoProfile::P360P30FPS16X9, VideoProfile::P720P30FPS16X9],
        );
        let parsed = FlattenedSegment::parse(&descriptor.flatten()).unwrap();
        assert_eq!(&parsed.manifest_id, descriptor.manifest_id());
        assert_eq!(parsed.seq, u64::MAX);
        assert_eq!(&parsed.content_hash, descriptor.content_hash());
        assert_eq!(parsed.profiles().unwrap(), descriptor.profiles());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FlattenedSegment::parse(b"short").is_err());

        // Fixture manifest id is not 64 chars, so the fields do not line up.
        assert!(FlattenedSegment::parse(&fixture().flatten()).is_err());

        let descriptor = SegmentDescriptor::new(
            ManifestId::new(&[1u8; 32]).unwrap(),
            1,
            Keccak256Hash::ZERO,
            vec![VideoProfile::P144P30FPS16X9],
        );
        let mut flat = descriptor.flatten();
        flat.push(b'0');
        assert!(matches!(
            FlattenedSegment::parse(&flat),
            Err(CoreError::MalformedSegment(_))
        ));
    }

    #[test]
    fn test_unknown_profile_ids() {
        let descriptor = SegmentDescriptor::new(
            ManifestId::new(&[1u8; 32]).unwrap(),
            1,
            Keccak256Hash::ZERO,
            vec![],
        );
        let mut flat = descriptor.flatten();
        flat.extend_from_slice(b"deadbeef");
        let parsed = FlattenedSegment::parse(&flat).unwrap();
        assert_eq!(parsed.profile_ids, vec![[0xde, 0xad, 0xbe, 0xef]]);
        assert!(parsed.profiles().is_none());
    }
}
