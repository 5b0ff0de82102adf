//! Proptest generators for property-based testing.

use proptest::prelude::*;

use vidtrust_core::{Keccak256Hash, Keypair, ManifestId, SegmentDescriptor, VideoProfile};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_filter_map("not a valid secret scalar", |seed| {
        Keypair::from_seed(&seed).ok()
    })
}

/// Generate a valid ManifestId.
pub fn manifest_id() -> impl Strategy<Value = ManifestId> {
    any::<[u8; 32]>().prop_filter_map("not a manifest id", |bytes| ManifestId::new(&bytes).ok())
}

/// Generate a Keccak256Hash.
pub fn content_hash() -> impl Strategy<Value = Keccak256Hash> {
    any::<[u8; 32]>().prop_map(Keccak256Hash::from_bytes)
}

/// Generate one of the preset profiles.
pub fn video_profile() -> impl Strategy<Value = VideoProfile> {
    prop::sample::select(VideoProfile::PRESETS.to_vec())
}

/// Generate an ordered profile list.
pub fn profiles(max_len: usize) -> impl Strategy<Value = Vec<VideoProfile>> {
    prop::collection::vec(video_profile(), 0..=max_len)
}

/// Generate a job id.
pub fn job_id() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Parameters for generating a segment descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorParams {
    pub manifest_id: ManifestId,
    pub seq: u64,
    pub content_hash: Keccak256Hash,
    pub profiles: Vec<VideoProfile>,
}

impl Arbitrary for DescriptorParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (manifest_id(), any::<u64>(), content_hash(), profiles(4))
            .prop_map(|(manifest_id, seq, content_hash, profiles)| DescriptorParams {
                manifest_id,
                seq,
                content_hash,
                profiles,
            })
            .boxed()
    }
}

/// Build a descriptor from parameters.
pub fn descriptor_from_params(params: &DescriptorParams) -> SegmentDescriptor {
    SegmentDescriptor::new(
        params.manifest_id.clone(),
        params.seq,
        params.content_hash,
        params.profiles.clone(),
    )
}
