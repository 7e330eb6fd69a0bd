//! Cookie string parsing.

use crate::error::{Result, ShareError};

/// Name of the login token cookie.
pub const BDUSS: &str = "BDUSS";

/// Split a `k=v; k=v` cookie string into pairs, skipping malformed segments.
pub fn parse_cookie(cookie: &str) -> Vec<(&str, &str)> {
    cookie
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                None
            } else {
                Some((name, value.trim()))
            }
        })
        .collect()
}

/// Re-join the parsed pairs as a `Cookie` header value.
pub fn normalize_cookie(cookie: &str) -> String {
    parse_cookie(cookie)
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extract the `BDUSS` token.
///
/// # Errors
/// Returns [`ShareError::CredentialExtraction`] if the cookie has no non-empty `BDUSS`.
///
/// # Examples
/// ```
/// use panshare::session::extract_bduss;
///
/// let token = extract_bduss("a=1; BDUSS=XYZ123; b=2").unwrap();
/// assert_eq!(token, "XYZ123");
/// ```
pub fn extract_bduss(cookie: &str) -> Result<String> {
    parse_cookie(cookie)
        .into_iter()
        .find(|(name, value)| *name == BDUSS && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or(ShareError::CredentialExtraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bduss() {
        assert_eq!(extract_bduss("a=1; BDUSS=XYZ123; b=2").unwrap(), "XYZ123");
        assert_eq!(extract_bduss("BDUSS=only").unwrap(), "only");
    }

    #[test]
    fn test_extract_bduss_missing() {
        assert!(matches!(
            extract_bduss("a=1; b=2"),
            Err(ShareError::CredentialExtraction)
        ));
        assert!(matches!(
            extract_bduss("BDUSS=; b=2"),
            Err(ShareError::CredentialExtraction)
        ));
    }

    #[test]
    fn test_extract_bduss_ignores_similar_names() {
        let cookie = "BDUSS_BFESS=other; STOKEN=s; BDUSS=real";
        assert_eq!(extract_bduss(cookie).unwrap(), "real");
        assert!(extract_bduss("BDUSS_BFESS=other").is_err());
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(extract_bduss("BDUSS=ab==; x=1").unwrap(), "ab==");
    }

    #[test]
    fn test_normalize_cookie() {
        assert_eq!(
            normalize_cookie(" a=1 ;BDUSS=XYZ;;junk; b = 2"),
            "a=1; BDUSS=XYZ; b=2"
        );
    }
}
