//! Share access: metadata, directory listing and download links.

pub mod browse;
pub mod link;
pub mod metadata;

pub use browse::{list_directory, resolve_dir, PAGE_SIZE};
pub use link::{canonical_body, resolve_download_link};
pub use metadata::{fetch_metadata, ShareMetadata};
