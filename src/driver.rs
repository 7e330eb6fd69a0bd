//! Share driver: one session, one share, many listings.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::{ClientOptions, ShareConfig};
use crate::error::{Result, ShareError};
use crate::fs::DirectoryEntry;
use crate::http::Transport;
use crate::session::{bootstrap, Credentials};
use crate::share::{fetch_metadata, list_directory, resolve_download_link, ShareMetadata};

/// A resolved download: the URL and the `User-Agent` the download host requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectLink {
    pub url: String,
    pub user_agent: String,
}

/// Client for a single Baidu Netdisk share.
///
/// The handshake (user id, session key) and the share metadata are fetched at
/// most once, even under concurrent callers. A failed step leaves nothing
/// cached, so the next call starts over. `ShareDriver` is `Send + Sync`; wrap it
/// in an `Arc` to share it across tasks.
///
/// # Example
/// ```no_run
/// use panshare::{ClientOptions, ShareConfig, ShareDriver};
///
/// # async fn example() -> panshare::Result<()> {
/// let config = ShareConfig::new("1AbCdEf", "wxyz", "BDUSS=...");
/// let driver = ShareDriver::new(config, ClientOptions::default())?;
///
/// for entry in driver.list("/").await? {
///     println!("{} ({} bytes)", entry.name, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ShareDriver {
    api: ApiClient,
    config: ShareConfig,
    user_agent: String,
    credentials: OnceCell<Credentials>,
    metadata: OnceCell<ShareMetadata>,
}

impl std::fmt::Debug for ShareDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareDriver")
            .field("surl", &self.config.surl)
            .field("root_folder_path", &self.config.root_folder_path)
            .field("initialized", &self.metadata.initialized())
            .finish_non_exhaustive()
    }
}

impl ShareDriver {
    /// Create a driver that talks to upstream over `reqwest`.
    pub fn new(config: ShareConfig, options: ClientOptions) -> Result<Self> {
        let api = ApiClient::new(&config.cookie, &options)?;
        Ok(Self::from_parts(api, config, &options))
    }

    /// Create a driver on a custom transport.
    pub fn with_transport(
        config: ShareConfig,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let api = ApiClient::with_transport(&config.cookie, &options, transport);
        Self::from_parts(api, config, &options)
    }

    fn from_parts(api: ApiClient, config: ShareConfig, options: &ClientOptions) -> Self {
        Self {
            api,
            config,
            user_agent: options.user_agent.clone(),
            credentials: OnceCell::new(),
            metadata: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Bootstrap the session, then load the share metadata.
    ///
    /// Idempotent once it has succeeded.
    pub async fn init(&self) -> Result<()> {
        self.ensure_credentials().await?;
        self.ensure_metadata().await?;
        Ok(())
    }

    /// Credentials, if the session has been bootstrapped.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.get()
    }

    /// Share metadata, if it has been loaded.
    pub fn metadata(&self) -> Option<&ShareMetadata> {
        self.metadata.get()
    }

    /// List the entries of `path`, initializing first if needed.
    pub async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let meta = self.ensure_metadata().await?;
        list_directory(
            &self.api,
            meta,
            &self.config.surl,
            &self.config.pwd,
            &self.config.root_folder_path,
            path,
        )
        .await
    }

    /// Resolve a direct download link for the file with id `file_id`.
    pub async fn link(&self, file_id: &str) -> Result<DirectLink> {
        let credentials = self.ensure_credentials().await?;
        let meta = self.ensure_metadata().await?;
        let url = resolve_download_link(&self.api, credentials, meta, file_id, now_secs()).await?;
        Ok(DirectLink {
            url,
            user_agent: self.user_agent.clone(),
        })
    }

    /// Cancel in-flight and future requests.
    pub fn shutdown(&self) {
        info!(surl = %self.config.surl, "shutting down share driver");
        self.api.cancel_token().cancel();
    }

    async fn ensure_credentials(&self) -> Result<&Credentials> {
        self.check_live()?;
        self.credentials
            .get_or_try_init(|| async {
                debug!("bootstrapping session");
                bootstrap(&self.api, &self.config.cookie, now_secs()).await
            })
            .await
    }

    async fn ensure_metadata(&self) -> Result<&ShareMetadata> {
        self.ensure_credentials().await?;
        self.metadata
            .get_or_try_init(|| fetch_metadata(&self.api, &self.config.surl, &self.config.pwd))
            .await
    }

    fn check_live(&self) -> Result<()> {
        if self.api.cancel_token().is_cancelled() {
            return Err(ShareError::Cancelled);
        }
        Ok(())
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{BoxError, Rejection};
    use crate::http::{HttpRequest, HttpResponse};

    const UINFO: &str = "ZssfXkcCcKxIVRDSzVt5rw==";

    /// Fake upstream: answers by URL, counts calls per endpoint.
    #[derive(Default)]
    struct Upstream {
        identity_down: AtomicBool,
        identity_calls: AtomicUsize,
        report_calls: AtomicUsize,
        list_calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Upstream {
        async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
            tokio::task::yield_now().await;
            self.seen.lock().unwrap().push(request.url.clone());
            let url = request.url.as_str();
            let body = if url.contains("mo/q/sync") {
                self.identity_calls.fetch_add(1, Ordering::SeqCst);
                if self.identity_down.load(Ordering::SeqCst) {
                    r#"{"errno":-6}"#.to_string()
                } else {
                    r#"{"errno":0,"data":{"user_id":"123456"}}"#.to_string()
                }
            } else if url.contains("api/report/user") {
                self.report_calls.fetch_add(1, Ordering::SeqCst);
                format!(r#"{{"errno":0,"uinfo":"{}"}}"#, UINFO)
            } else if url.contains("share/wxlist") {
                self.list_calls.fetch_add(1, Ordering::SeqCst);
                r#"{"errno":0,"data":{"has_more":false,"uk":"1100123","shareid":"5566","seckey":"ab-c_d~~",
                    "list":[{"fs_id":987654321012,"isdir":0,"path":"/sharelink1100123-5566/a.bin",
                    "server_filename":"a.bin","size":7,"md5":"8e23f7635tb64136eddb0719602bc477"}]}}"#
                    .to_string()
            } else if url.contains("api/sharedownload") {
                r#"{"errno":0,"list":[{"dlink":"https://d.pcs.baidu.com/file/a.bin"}]}"#.to_string()
            } else {
                return Err("unexpected url".into());
            };
            Ok(HttpResponse::ok(body))
        }
    }

    fn driver(upstream: Arc<Upstream>) -> ShareDriver {
        ShareDriver::with_transport(
            ShareConfig::new("1AbC", "wxyz", "BDUSS=XYZ123"),
            ClientOptions::default(),
            upstream,
        )
    }

    #[tokio::test]
    async fn test_concurrent_init_handshakes_once() {
        let upstream = Arc::new(Upstream::default());
        let driver = driver(upstream.clone());

        let (a, b, c) = tokio::join!(driver.init(), driver.init(), driver.init());
        a.unwrap();
        b.unwrap();
        c.unwrap();
        driver.init().await.unwrap();

        assert_eq!(upstream.identity_calls.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.report_calls.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(driver.credentials().unwrap().session_key(), b"f3a9c1e07b2d4e8a".as_slice());
        assert_eq!(driver.metadata().unwrap().root, "/sharelink1100123-5566");
    }

    #[tokio::test]
    async fn test_list_and_link() {
        let upstream = Arc::new(Upstream::default());
        let driver = driver(upstream.clone());

        let entries = driver.list("/").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "987654321012");
        assert_eq!(
            entries[0].checksum.as_deref(),
            Some("d41d8cd98f00b204e9800998ecf8427e")
        );

        let link = driver.link(&entries[0].id).await.unwrap();
        assert_eq!(link.url, "https://d.pcs.baidu.com/file/a.bin");
        assert_eq!(link.user_agent, "netdisk");
    }

    #[tokio::test]
    async fn test_failed_bootstrap_blocks_listing_and_retries() {
        let upstream = Arc::new(Upstream::default());
        upstream.identity_down.store(true, Ordering::SeqCst);
        let driver = driver(upstream.clone());

        let err = driver.list("/").await.unwrap_err();
        assert!(matches!(err, ShareError::IdentityResolution(Rejection::Api { errno: -6, .. })));
        assert!(driver.credentials().is_none());
        assert_eq!(upstream.list_calls.load(Ordering::SeqCst), 0);

        upstream.identity_down.store(false, Ordering::SeqCst);
        driver.init().await.unwrap();
        assert_eq!(upstream.identity_calls.load(Ordering::SeqCst), 2);
        assert!(driver.metadata().is_some());
    }

    #[tokio::test]
    async fn test_shutdown_cancels() {
        let upstream = Arc::new(Upstream::default());
        let driver = driver(upstream.clone());
        driver.shutdown();

        assert!(matches!(driver.init().await, Err(ShareError::Cancelled)));
        assert!(upstream.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_driver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShareDriver>();
    }
}
