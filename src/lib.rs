//! # panshare
//!
//! Rust client for Baidu Netdisk share links.
//!
//! ## Features
//!
//! - **Session bootstrap**: derive the user id and the RC4-sealed session key
//!   from a logged-in account's `BDUSS` cookie.
//! - **Share browsing**:
//!   - Open a share by its short URL and password.
//!   - List directories, following pages until the listing is complete.
//!   - Decode the obfuscated MD5 checksums the listing returns.
//!   - Rewrite thumbnail URLs to a fixed preview size.
//! - **Direct links**: resolve time-limited download URLs with the signed
//!   (`sign` HMAC-SHA1 and `rand` nonce) share download request.
//!
//! Every request is bounded by a timeout and a cancellation token.
//!
//! ## Example
//!
//! ```no_run
//! use panshare::{ClientOptions, ShareConfig, ShareDriver};
//!
//! # async fn example() -> panshare::Result<()> {
//! let config = ShareConfig::new("1AbCdEf", "wxyz", "BDUSS=...; STOKEN=...");
//! let driver = ShareDriver::new(config, ClientOptions::default())?;
//!
//! let entries = driver.list("/").await?;
//! for entry in &entries {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//!
//! if let Some(file) = entries.iter().find(|e| e.is_file()) {
//!     let link = driver.link(&file.id).await?;
//!     println!("GET {} with User-Agent: {}", link.url, link.user_agent);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod base64;
pub mod config;
pub mod crypto;
pub mod driver;
pub mod error;
pub mod fs;
pub mod http;
pub mod session;
pub mod share;

// Re-export commonly used types
pub use config::{ClientOptions, ShareConfig};
pub use crypto::{decode_checksum, encode_checksum};
pub use driver::{DirectLink, ShareDriver};
pub use error::{Rejection, Result, ShareError};
pub use fs::{DirectoryEntry, EntryKind};
pub use http::{cancellable, HttpClient, HttpRequest, HttpResponse, Transport};
pub use session::Credentials;
pub use share::ShareMetadata;
