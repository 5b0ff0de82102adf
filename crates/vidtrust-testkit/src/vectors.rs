//! Golden test vectors.
//!
//! Every implementation must reproduce these digests and addresses exactly;
//! segment credentials already in circulation depend on them.

use vidtrust_core::{
    personal_message_digest, Keccak256Hash, Keypair, ManifestId, SegmentDescriptor, VideoProfile,
};

/// A flattened-descriptor vector.
#[derive(Debug, Clone)]
pub struct SegmentVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Manifest id text, used verbatim.
    pub manifest_id: &'static str,
    pub seq: u64,
    /// Right-padded to 32 bytes to form the content hash.
    pub hash_source: &'static [u8],
    pub profiles: &'static [VideoProfile],
    /// Expected `Keccak256(flatten())`, hex.
    pub expected_digest: &'static str,
}

/// A key-to-address vector.
#[derive(Debug, Clone)]
pub struct AddressVector {
    pub name: &'static str,
    pub secret: [u8; 32],
    /// Expected address, lowercase `0x` hex.
    pub expected_address: &'static str,
}

/// A personal-message digest vector.
#[derive(Debug, Clone)]
pub struct DigestVector {
    pub name: &'static str,
    pub payload: &'static [u8],
    pub expected_digest: &'static str,
}

const fn scalar(n: u8) -> [u8; 32] {
    let mut secret = [0u8; 32];
    secret[31] = n;
    secret
}

/// Flattened-descriptor vectors.
pub fn segment_vectors() -> Vec<SegmentVector> {
    vec![
        SegmentVector {
            name: "reference fixture with short manifest id",
            manifest_id: "abcdef",
            seq: 1234,
            hash_source: b"browns",
            profiles: &[VideoProfile::P144P30FPS16X9, VideoProfile::P240P30FPS16X9],
            expected_digest: "e97461de03dcb5bf7f2e95c4ca9c99db2d049fb18a6df67dd9d557b2c05f6473",
        },
        SegmentVector {
            name: "full-length manifest id, single profile",
            manifest_id: "4242424242424242424242424242424242424242424242424242424242424242",
            seq: 4,
            hash_source: b"browns",
            profiles: &[VideoProfile::P240P30FPS16X9],
            expected_digest: "8de32f353029ce8cfecb6c097383caf79daf2e247eb17d3525370bb608ba4c21",
        },
    ]
}

/// Key-to-address vectors.
pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            name: "secret scalar 1",
            secret: scalar(1),
            expected_address: "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
        },
        AddressVector {
            name: "secret scalar 2",
            secret: scalar(2),
            expected_address: "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf",
        },
        AddressVector {
            name: "secret scalar 3",
            secret: scalar(3),
            expected_address: "0x6813eb9362372eef6200f3b1dbc3f819671cba69",
        },
        AddressVector {
            name: "repeated 0x42",
            secret: [0x42; 32],
            expected_address: "0x17c5185167401ed00cf5f5b2fc97d9bbfdb7d025",
        },
    ]
}

/// Personal-message digest vectors.
pub fn digest_vectors() -> Vec<DigestVector> {
    vec![DigestVector {
        name: "reference job id",
        payload: b"iamajobstring",
        expected_digest: "cf834a83b492f61b3daa38af96081b167f9d9c283dcc88e945154869efc2121c",
    }]
}

/// Build the descriptor a segment vector describes.
pub fn descriptor_from_vector(vector: &SegmentVector) -> SegmentDescriptor {
    SegmentDescriptor::new(
        ManifestId::from_raw(vector.manifest_id),
        vector.seq,
        Keccak256Hash::right_padded(vector.hash_source),
        vector.profiles.to_vec(),
    )
}

/// Check every vector; returns a description of each mismatch.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    for vector in segment_vectors() {
        let actual = descriptor_from_vector(&vector).digest().to_hex();
        if actual != vector.expected_digest {
            failures.push(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected_digest, actual
            ));
        }
    }

    for vector in address_vectors() {
        match Keypair::from_seed(&vector.secret) {
            Ok(keypair) => {
                let actual = keypair.address().to_hex();
                if actual != vector.expected_address {
                    failures.push(format!(
                        "{}: expected {}, got {}",
                        vector.name, vector.expected_address, actual
                    ));
                }
            }
            Err(e) => failures.push(format!("{}: {e}", vector.name)),
        }
    }

    for vector in digest_vectors() {
        let actual = personal_message_digest(vector.payload).to_hex();
        if actual != vector.expected_digest {
            failures.push(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected_digest, actual
            ));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
