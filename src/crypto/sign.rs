//! Request signing for the share download endpoint.
//!
//! Two values authenticate a download-link request: `sign`, an HMAC-SHA1 over the
//! form body, and `rand`, a SHA-1 nonce binding the request time to the account's
//! BDUSS, user id and session key. Both depend only on their inputs and the fixed
//! client identity below.

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

use crate::error::{Result, ShareError};
use crate::session::Credentials;

/// Device id presented as `devuid`.
pub const DEVICE_ID: &str = "BB91C9B818963851F99A99261A70E37E|VUFQKX5JL";

/// MD5 of the Android client's signing certificate.
pub const APP_SIGNATURE_CERT_MD5: &str = "ae5821440fab5e1a61a025f014bd8972";

/// Android client version presented as `version`.
pub const APP_VERSION: &str = "11.10.4";

/// Shared key of the `sign` HMAC.
pub const HMAC_DYNAMIC_KEY: &str = "B8ec24caf34ef7227c66767d29ffd3fb";

type HmacSha1 = Hmac<Sha1>;

/// Compute the `sign` parameter for `body` sent at `timestamp_secs`.
///
/// The MAC covers `body_DEVICEID_millis` and is returned as lowercase hex.
///
/// # Examples
/// ```
/// use panshare::crypto::sign;
///
/// let a = sign("encrypt=0&uk=1", 1_700_000_000);
/// let b = sign("encrypt=0&uk=1", 1_700_000_000);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 40);
/// ```
pub fn sign(body: &str, timestamp_secs: i64) -> String {
    let base = format!("{}_{}_{}", body, DEVICE_ID, timestamp_secs.saturating_mul(1000));
    let mut mac = match HmacSha1::new_from_slice(HMAC_DYNAMIC_KEY.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA1 takes keys of any length"),
    };
    mac.update(base.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compute the `rand` nonce for a request at `timestamp_millis`.
///
/// # Errors
/// Returns [`ShareError::MissingCredentials`] if any credential field is empty.
pub fn compute_nonce(timestamp_millis: i64, credentials: &Credentials) -> Result<String> {
    if credentials.bduss().is_empty()
        || credentials.uid().is_empty()
        || credentials.session_key().is_empty()
    {
        return Err(ShareError::MissingCredentials);
    }

    let bduss_hash = hex::encode(Sha1::digest(credentials.bduss().as_bytes()));

    let mut hasher = Sha1::new();
    hasher.update(bduss_hash.as_bytes());
    hasher.update(credentials.uid().as_bytes());
    hasher.update(credentials.session_key());
    hasher.update(timestamp_millis.to_string().as_bytes());
    hasher.update(DEVICE_ID.as_bytes());
    hasher.update(APP_VERSION.as_bytes());
    hasher.update(APP_SIGNATURE_CERT_MD5.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Signature material for one download-link request. Never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub nonce: String,
    pub signature: String,
    pub timestamp_secs: i64,
    pub timestamp_millis: i64,
}

impl SignedRequest {
    /// Sign `body` for a request issued at `timestamp_secs`.
    pub fn new(body: &str, timestamp_secs: i64, credentials: &Credentials) -> Result<Self> {
        let timestamp_millis = timestamp_secs.saturating_mul(1000);
        let nonce = compute_nonce(timestamp_millis, credentials)?;
        Ok(Self {
            nonce,
            signature: sign(body, timestamp_secs),
            timestamp_secs,
            timestamp_millis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"encrypt=0&uk=1100123&product=share&primaryid=5566&fid_list=["987654321012"]&extra={"sekey":"ab+c/d=="}"#;

    fn credentials() -> Credentials {
        Credentials::new("XYZ123", "123456", "f3a9c1e07b2d4e8a")
    }

    #[test]
    fn test_sign_golden() {
        assert_eq!(
            sign(BODY, 1_700_000_000),
            "1dba1a16579ad98bc79f41722d67f7872c80f022"
        );
    }

    #[test]
    fn test_sign_depends_on_timestamp() {
        assert_ne!(sign(BODY, 1_700_000_000), sign(BODY, 1_700_000_001));
    }

    #[test]
    fn test_nonce_golden() {
        let nonce = compute_nonce(1_700_000_000_000, &credentials()).unwrap();
        assert_eq!(nonce, "d180ba9ecdc90e179d1eadb2d9b1b1b2c2563ee3");
    }

    #[test]
    fn test_nonce_hashes_raw_session_key_bytes() {
        let creds = Credentials::new("XYZ123", "123456", vec![0x61, 0xff, 0x62]);
        assert_eq!(
            compute_nonce(1_700_000_000_000, &creds).unwrap(),
            "556c5cf91bb08e590b3ebe0b7270af9411f9e5db"
        );
    }

    #[test]
    fn test_extreme_timestamp_saturates() {
        let signed = SignedRequest::new(BODY, i64::MAX, &credentials()).unwrap();
        assert_eq!(signed.timestamp_millis, i64::MAX);
        assert_eq!(sign(BODY, i64::MIN).len(), 40);
    }

    #[test]
    fn test_nonce_requires_credentials() {
        let partial = Credentials::new("XYZ123", "123456", "");
        assert!(matches!(
            compute_nonce(1, &partial),
            Err(ShareError::MissingCredentials)
        ));
        let empty = Credentials::new("", "", "");
        assert!(matches!(
            compute_nonce(1, &empty),
            Err(ShareError::MissingCredentials)
        ));
    }

    #[test]
    fn test_signed_request_fields() {
        let signed = SignedRequest::new(BODY, 1_700_000_000, &credentials()).unwrap();
        assert_eq!(signed.timestamp_millis, 1_700_000_000_000);
        assert_eq!(signed.signature, sign(BODY, 1_700_000_000));
        assert_eq!(
            signed.nonce,
            compute_nonce(1_700_000_000_000, &credentials()).unwrap()
        );
    }
}
