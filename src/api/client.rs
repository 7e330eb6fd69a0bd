//! Upstream API client with request/response handling.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::api::error::ApiErrno;
use crate::api::types::Errno;
use crate::config::ClientOptions;
use crate::error::{excerpt, Rejection, Result, ShareError};
use crate::http::{send, HttpClient, HttpRequest, SendError, Transport};
use crate::session::cookie::normalize_cookie;

/// Share listing path; the query string is fixed by the mini-program client it imitates.
pub(crate) const LIST_PATH: &str = "share/wxlist?channel=weixin&version=2.2.2&clienttype=25&web=1";

/// Share download-link path.
pub(crate) const SHARE_DOWNLOAD_PATH: &str = "api/sharedownload";

/// Session-key report path.
pub(crate) const USER_REPORT_PATH: &str = "api/report/user";

/// Client for the upstream endpoints.
///
/// Carries the account cookie on every request and bounds each request by the
/// configured timeout and cancellation token. Never retries.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    pan_base_url: String,
    identity_url: String,
    user_agent: String,
    cookie: String,
    timeout: Duration,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("pan_base_url", &self.pan_base_url)
            .field("identity_url", &self.identity_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client backed by `reqwest`.
    pub fn new(cookie: &str, options: &ClientOptions) -> Result<Self> {
        let http = match &options.proxy {
            Some(proxy) => HttpClient::with_proxy(proxy)?,
            None => HttpClient::new(),
        };
        Ok(Self::with_transport(cookie, options, Arc::new(http)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        cookie: &str,
        options: &ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let mut pan_base_url = options.pan_base_url.clone();
        if !pan_base_url.ends_with('/') {
            pan_base_url.push('/');
        }
        Self {
            transport,
            pan_base_url,
            identity_url: options.identity_url.clone(),
            user_agent: options.user_agent.clone(),
            cookie: normalize_cookie(cookie),
            timeout: options.request_timeout,
            cancel: options.cancel.clone(),
        }
    }

    /// Absolute URL of a path under the netdisk base.
    pub fn pan_url(&self, path: &str) -> String {
        format!("{}{}", self.pan_base_url, path.trim_start_matches('/'))
    }

    /// URL of the identity-resolution endpoint.
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// The token every request observes.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Send `request` and decode a JSON body whose top level carries `errno`.
    ///
    /// Success means HTTP 200 and `errno == 0`. Any other outcome is wrapped by
    /// `stage` into the caller's error variant; cancellation and timeouts are
    /// reported as-is.
    pub async fn call<T, F>(&self, request: HttpRequest, stage: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(Rejection) -> ShareError,
    {
        self.call_with_excerpt(request, stage)
            .await
            .map(|(value, _)| value)
    }

    /// Like [`call`](Self::call), also returning an excerpt of the body for
    /// errors the caller raises after decoding.
    pub async fn call_with_excerpt<T, F>(&self, request: HttpRequest, stage: F) -> Result<(T, String)>
    where
        T: DeserializeOwned,
        F: Fn(Rejection) -> ShareError,
    {
        let request = request
            .header("User-Agent", self.user_agent.as_str())
            .header("Cookie", self.cookie.as_str());
        let url = request.url.clone();
        debug!(url = %url, "api request");

        let response = match send(self.transport.as_ref(), request, &self.cancel, self.timeout).await {
            Ok(response) => response,
            Err(SendError::Cancelled) => return Err(ShareError::Cancelled),
            Err(SendError::TimedOut) => return Err(ShareError::TimedOut),
            Err(SendError::Failed(e)) => {
                error!(url = %url, "HTTP request execution failed: {}", e);
                return Err(stage(Rejection::Transport(e)));
            }
        };
        debug!(url = %url, status = response.status, bytes = response.body.len(), "api response");

        if response.status != 200 {
            return Err(stage(Rejection::HttpStatus {
                status: response.status,
                excerpt: excerpt(&response.body),
            }));
        }

        let errno = serde_json::from_str::<Errno>(&response.body)
            .map_err(|source| {
                stage(Rejection::Malformed {
                    source,
                    excerpt: excerpt(&response.body),
                })
            })?
            .errno;
        if errno != 0 {
            error!(url = %url, errno, "API returned an error: {}", excerpt(&response.body));
            return Err(stage(Rejection::Api {
                status: response.status,
                errno,
                errno_kind: ApiErrno::from(errno),
                excerpt: excerpt(&response.body),
            }));
        }

        let value = serde_json::from_str(&response.body).map_err(|source| {
            stage(Rejection::Malformed {
                source,
                excerpt: excerpt(&response.body),
            })
        })?;
        Ok((value, excerpt(&response.body)))
    }
}
