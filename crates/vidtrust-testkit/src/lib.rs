//! # vidtrust Testkit
//!
//! Testing utilities for vidtrust.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known descriptor digests and key addresses
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Stub identities with signer-fault injection
//!
//! ## Golden Vectors
//!
//! ```rust
//! use vidtrust_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vidtrust_testkit::generators::{descriptor_from_params, DescriptorParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(params: DescriptorParams) {
//!         let d1 = descriptor_from_params(&params);
//!         let d2 = descriptor_from_params(&params);
//!         prop_assert_eq!(d1.digest(), d2.digest());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use vidtrust_testkit::fixtures::StubIdentity;
//! use vidtrust_creds::generate_registration_request;
//!
//! let stub = StubIdentity::failing();
//! assert!(generate_registration_request(&stub).is_err());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, stub_segment, StubIdentity, STUB_JOB_ID};
pub use generators::{descriptor_from_params, DescriptorParams};
pub use vectors::{address_vectors, segment_vectors, verify_all_vectors, SegmentVector};
