//! Session bootstrap: BDUSS → user id → session key.

use base64::{engine::general_purpose, Engine};
use tracing::debug;

use crate::api::client::USER_REPORT_PATH;
use crate::api::types::{Envelope, SyncData, UserReport};
use crate::api::ApiClient;
use crate::crypto::rc4::rc4_apply;
use crate::error::{Rejection, Result, ShareError};
use crate::http::HttpRequest;
use crate::session::cookie::extract_bduss;

/// Identity of the logged-in account, established once per driver.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    bduss: String,
    uid: String,
    session_key: Vec<u8>,
}

impl Credentials {
    pub fn new(
        bduss: impl Into<String>,
        uid: impl Into<String>,
        session_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            bduss: bduss.into(),
            uid: uid.into(),
            session_key: session_key.into(),
        }
    }

    /// Login token taken from the cookie.
    pub fn bduss(&self) -> &str {
        &self.bduss
    }

    /// Numeric user id, as a decimal string.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Decrypted session key, as the raw RC4 output bytes.
    pub fn session_key(&self) -> &[u8] {
        &self.session_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bduss", &"<redacted>")
            .field("uid", &self.uid)
            .field("session_key", &"<redacted>")
            .finish()
    }
}

/// Decrypt the `uinfo` value: base64, then RC4 keyed by the user id bytes.
///
/// # Errors
/// Returns [`ShareError::Decryption`] on malformed base64.
pub fn decrypt_session_key(encrypted: &str, uid: &str) -> Result<Vec<u8>> {
    let sealed = general_purpose::STANDARD.decode(encrypted)?;
    Ok(rc4_apply(uid.as_bytes(), &sealed))
}

/// Run the full handshake for `cookie` at Unix time `now_secs`.
pub async fn bootstrap(api: &ApiClient, cookie: &str, now_secs: i64) -> Result<Credentials> {
    let bduss = extract_bduss(cookie)?;

    debug!("attempting to get user UID via sync API");
    let uid = fetch_uid(api).await?;
    debug!(uid = %uid, "obtained UID");

    debug!("attempting to get encrypted SK");
    let encrypted = fetch_encrypted_session_key(api, &uid, now_secs).await?;
    let session_key = decrypt_session_key(&encrypted, &uid)?;
    debug!("session key decrypted");

    Ok(Credentials {
        bduss,
        uid,
        session_key,
    })
}

async fn fetch_uid(api: &ApiClient) -> Result<String> {
    let (reply, body): (Envelope<SyncData>, String) = api
        .call_with_excerpt(
            HttpRequest::get(api.identity_url()),
            ShareError::IdentityResolution,
        )
        .await?;

    match reply.data {
        Some(data) if !data.user_id.is_empty() => Ok(data.user_id),
        _ => Err(ShareError::IdentityResolution(Rejection::MissingField {
            field: "user_id",
            excerpt: body,
        })),
    }
}

async fn fetch_encrypted_session_key(api: &ApiClient, uid: &str, now_secs: i64) -> Result<String> {
    let request = HttpRequest::get(api.pan_url(USER_REPORT_PATH))
        .query("action", "ANDROID_ACTIVE_BACKGROUND_UPLOAD_AND_DOWNLOAD")
        .query("clienttype", "1")
        .query("needrookie", "1")
        .query("timestamp", now_secs.to_string())
        .query("bind_uid", uid)
        .query("channel", "android");

    let (report, body): (UserReport, String) =
        api.call_with_excerpt(request, ShareError::SessionKey).await?;
    if report.uinfo.is_empty() {
        return Err(ShareError::SessionKey(Rejection::MissingField {
            field: "uinfo",
            excerpt: body,
        }));
    }
    Ok(report.uinfo)
}
