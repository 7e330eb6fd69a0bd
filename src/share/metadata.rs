//! Share-level metadata.

use tracing::{debug, warn};

use crate::api::client::LIST_PATH;
use crate::api::types::{Envelope, ListData};
use crate::api::ApiClient;
use crate::base64::repair_seed_key;
use crate::error::{Result, ShareError};
use crate::fs::path::parent_dir;
use crate::http::HttpRequest;

/// Constants of one share, fetched once and shared by listing and link resolution.
#[derive(Clone, PartialEq, Eq)]
pub struct ShareMetadata {
    /// Server directory that holds the share's top-level entries.
    pub root: String,
    pub share_id: String,
    /// Owner account id (`uk`).
    pub owner_key: String,
    /// Seed key in the standard base64 alphabet.
    pub seed_key: String,
}

impl std::fmt::Debug for ShareMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareMetadata")
            .field("root", &self.root)
            .field("share_id", &self.share_id)
            .field("owner_key", &self.owner_key)
            .field("seed_key", &"<redacted>")
            .finish()
    }
}

/// List the share root once and derive its metadata.
///
/// # Errors
/// [`ShareError::ShareAccess`] if the request fails, [`ShareError::EmptyShare`] if
/// the root lists nothing (which is also what a wrong password looks like).
pub async fn fetch_metadata(api: &ApiClient, surl: &str, pwd: &str) -> Result<ShareMetadata> {
    debug!(surl, "attempting to initialize share info");

    let request = HttpRequest::post(api.pan_url(LIST_PATH)).form(&[
        ("pwd", pwd),
        ("root", "1"),
        ("shorturl", surl),
    ]);
    let reply: Envelope<ListData> = api.call(request, ShareError::ShareAccess).await?;
    let data = reply.data.unwrap_or_default();

    let Some(first) = data.list.first() else {
        warn!(surl, "API response successful but file list is empty");
        return Err(ShareError::EmptyShare);
    };

    let metadata = ShareMetadata {
        root: parent_dir(&first.path),
        share_id: data.shareid,
        owner_key: data.uk,
        seed_key: repair_seed_key(&data.seckey),
    };
    debug!(
        share_id = %metadata.share_id,
        uk = %metadata.owner_key,
        root = %metadata.root,
        "initialized share info"
    );
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::ClientOptions;
    use crate::error::{BoxError, Rejection};
    use crate::http::{HttpResponse, Transport};

    struct Once {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Once {
        async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn client_for(response: HttpResponse) -> (ApiClient, Arc<Once>) {
        let transport = Arc::new(Once {
            response,
            seen: Mutex::new(Vec::new()),
        });
        let api = ApiClient::with_transport("BDUSS=x", &ClientOptions::default(), transport.clone());
        (api, transport)
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let (api, transport) = client_for(HttpResponse::ok(
            r#"{"errno":0,"request_id":1,"data":{"has_more":false,"uk":1100123,"shareid":"5566",
                "seckey":"ab-c_d~~","list":[{"fs_id":1,"isdir":1,"path":"/sharelink1100123-5566/docs",
                "server_filename":"docs","md5":""}]}}"#,
        ));

        let meta = fetch_metadata(&api, "1abcDEF", "wxyz").await.unwrap();
        assert_eq!(meta.root, "/sharelink1100123-5566");
        assert_eq!(meta.share_id, "5566");
        assert_eq!(meta.owner_key, "1100123");
        assert_eq!(meta.seed_key, "ab+c/d==");

        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].url.ends_with(LIST_PATH));
        let form: Vec<(String, String)> =
            url::form_urlencoded::parse(seen[0].body.as_deref().unwrap().as_bytes())
                .into_owned()
                .collect();
        assert!(form.contains(&("root".to_string(), "1".to_string())));
        assert!(form.contains(&("shorturl".to_string(), "1abcDEF".to_string())));
        assert!(form.contains(&("pwd".to_string(), "wxyz".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_metadata_empty_share() {
        let (api, _) = client_for(HttpResponse::ok(r#"{"errno":0,"data":{"list":[]}}"#));
        let err = fetch_metadata(&api, "1abc", "").await.unwrap_err();
        assert!(matches!(err, ShareError::EmptyShare));
    }

    #[tokio::test]
    async fn test_fetch_metadata_api_error() {
        let (api, _) = client_for(HttpResponse::ok(r#"{"errno":-9,"data":null}"#));
        let err = fetch_metadata(&api, "1abc", "bad").await.unwrap_err();
        assert!(matches!(err, ShareError::ShareAccess(Rejection::Api { errno: -9, .. })));
    }

    #[test]
    fn test_metadata_debug_redacts_seed_key() {
        let meta = ShareMetadata {
            root: "/r".to_string(),
            share_id: "1".to_string(),
            owner_key: "2".to_string(),
            seed_key: "very-secret".to_string(),
        };
        assert!(!format!("{:?}", meta).contains("very-secret"));
    }
}
