//! Share configuration and client options.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Default base URL of the netdisk API.
pub const DEFAULT_PAN_BASE_URL: &str = "https://pan.baidu.com/";

/// Default identity-resolution endpoint.
pub const DEFAULT_IDENTITY_URL: &str = "https://tieba.baidu.com/mo/q/sync";

/// User agent expected by both the API and the download hosts.
pub const DEFAULT_USER_AGENT: &str = "netdisk";

/// What a host supplies to open one share.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Share short URL token (the `surl` part of the link).
    pub surl: String,
    /// Share password, empty when the share is public.
    #[serde(default)]
    pub pwd: String,
    /// Cookie string of a logged-in account; must contain `BDUSS`.
    pub cookie: String,
    /// Path under which the host mounts the share root.
    #[serde(default = "default_root_folder_path")]
    pub root_folder_path: String,
}

fn default_root_folder_path() -> String {
    "/".to_string()
}

impl std::fmt::Debug for ShareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareConfig")
            .field("surl", &self.surl)
            .field("pwd", &"<redacted>")
            .field("cookie", &"<redacted>")
            .field("root_folder_path", &self.root_folder_path)
            .finish()
    }
}

impl ShareConfig {
    pub fn new(surl: impl Into<String>, pwd: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self {
            surl: surl.into(),
            pwd: pwd.into(),
            cookie: cookie.into(),
            root_folder_path: default_root_folder_path(),
        }
    }

    pub fn with_root_folder_path(mut self, path: impl Into<String>) -> Self {
        self.root_folder_path = path.into();
        self
    }
}

/// Transport-level options for [`ShareDriver`](crate::ShareDriver).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub pan_base_url: String,
    pub identity_url: String,
    pub user_agent: String,
    /// Deadline applied to each request.
    pub request_timeout: Duration,
    pub proxy: Option<String>,
    /// Cancelling this token aborts every in-flight and future request.
    pub cancel: CancellationToken,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            pan_base_url: DEFAULT_PAN_BASE_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(20),
            proxy: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl ClientOptions {
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
