//! Direct download-link resolution.

use serde_json::json;
use tracing::{debug, warn};

use crate::api::client::SHARE_DOWNLOAD_PATH;
use crate::api::types::DownloadLinkResult;
use crate::api::ApiClient;
use crate::crypto::sign::{SignedRequest, APP_VERSION, DEVICE_ID};
use crate::error::{Result, ShareError};
use crate::http::HttpRequest;
use crate::session::Credentials;
use crate::share::ShareMetadata;

/// Form body of a share download request.
///
/// Sent verbatim and signed verbatim, so it is built by hand rather than
/// form-encoded: the server verifies `sign` over exactly these bytes.
pub fn canonical_body(meta: &ShareMetadata, file_id: &str) -> String {
    let extra = json!({ "sekey": meta.seed_key });
    format!(
        "encrypt=0&uk={}&product=share&primaryid={}&fid_list=[\"{}\"]&extra={}",
        meta.owner_key, meta.share_id, file_id, extra
    )
}

/// Resolve a time-limited direct URL for `file_id` at Unix time `now_secs`.
///
/// # Errors
/// [`ShareError::LinkApi`] if the request fails, [`ShareError::EmptyLinkList`] if
/// the response carries no usable `dlink`, [`ShareError::MissingCredentials`] if
/// the session is incomplete.
pub async fn resolve_download_link(
    api: &ApiClient,
    credentials: &Credentials,
    meta: &ShareMetadata,
    file_id: &str,
    now_secs: i64,
) -> Result<String> {
    debug!(file_id, "attempting to get download link");

    let body = canonical_body(meta, file_id);
    let signed = SignedRequest::new(&body, now_secs, credentials)?;

    let request = HttpRequest::post(api.pan_url(SHARE_DOWNLOAD_PATH))
        .query("sign", signed.signature)
        .query("timestamp", signed.timestamp_secs.to_string())
        .query("rand", signed.nonce)
        .query("time", signed.timestamp_millis.to_string())
        .query("devuid", DEVICE_ID)
        .query("channel", "android")
        .query("clienttype", "1")
        .query("version", APP_VERSION)
        .raw_form(body);

    let (result, body): (DownloadLinkResult, String) =
        api.call_with_excerpt(request, ShareError::LinkApi).await?;
    let Some(dlink) = result
        .list
        .into_iter()
        .next()
        .map(|item| item.dlink)
        .filter(|dlink| !dlink.trim().is_empty())
    else {
        warn!(file_id, response = %body, "dlink not found in response");
        return Err(ShareError::EmptyLinkList(body));
    };

    debug!(file_id, "retrieved download link");
    Ok(dlink)
}
