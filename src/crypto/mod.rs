//! Cryptographic operations for the share protocol.

pub mod checksum;
pub mod rc4;
pub mod sign;

pub use checksum::{decode_checksum, encode_checksum};
pub use sign::{compute_nonce, sign, SignedRequest};
