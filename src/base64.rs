//! Seed-key alphabet repair.
//!
//! The share listing returns `seckey` in a URL-friendly variant of base64:
//! - `+` travels as `-`
//! - `=` travels as `~`
//! - `/` travels as `_`
//!
//! The download endpoint expects the standard alphabet back.

/// Restore the standard base64 alphabet of a seed key.
///
/// # Example
/// ```
/// use panshare::base64::repair_seed_key;
/// assert_eq!(repair_seed_key("ab-c_d~~"), "ab+c/d==");
/// ```
pub fn repair_seed_key(seckey: &str) -> String {
    seckey.replace('-', "+").replace('~', "=").replace('_', "/")
}
