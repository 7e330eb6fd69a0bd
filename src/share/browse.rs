//! Paginated directory listing.

use tracing::debug;

use crate::api::client::LIST_PATH;
use crate::api::types::{Envelope, ListData};
use crate::api::ApiClient;
use crate::error::{Result, ShareError};
use crate::fs::path::normalize_path;
use crate::fs::DirectoryEntry;
use crate::http::HttpRequest;
use crate::share::ShareMetadata;

/// Entries requested per page; the server maximum.
pub const PAGE_SIZE: u32 = 1000;

/// Server directory to query for `path`, and whether it is the share root.
///
/// The host mounts the share at `root_folder_path`; listing that path lists the
/// share's server root instead. Upstream answers root and nested listings
/// differently, so the flag travels as its own `root` parameter.
pub fn resolve_dir(path: &str, root_folder_path: &str, meta: &ShareMetadata) -> (String, bool) {
    let requested = normalize_path(path);
    let dir = if requested == normalize_path(root_folder_path) {
        meta.root.clone()
    } else {
        requested
    };
    let at_root = normalize_path(&dir) == normalize_path(&meta.root);
    (dir, at_root)
}

/// List every entry of `path`, following pages until upstream reports no more.
///
/// Entries are returned in arrival order. There is no cap on the total.
pub async fn list_directory(
    api: &ApiClient,
    meta: &ShareMetadata,
    surl: &str,
    pwd: &str,
    root_folder_path: &str,
    path: &str,
) -> Result<Vec<DirectoryEntry>> {
    let (dir, at_root) = resolve_dir(path, root_folder_path, meta);
    let root_flag = if at_root { "1" } else { "0" };
    let num = PAGE_SIZE.to_string();

    let mut entries = Vec::new();
    let mut page: u64 = 1;
    loop {
        let page_str = page.to_string();
        let request = HttpRequest::post(api.pan_url(LIST_PATH)).form(&[
            ("dir", dir.as_str()),
            ("num", num.as_str()),
            ("order", "time"),
            ("page", page_str.as_str()),
            ("pwd", pwd),
            ("root", root_flag),
            ("shorturl", surl),
        ]);
        let reply: Envelope<ListData> = api.call(request, ShareError::Listing).await?;
        let data = reply.data.unwrap_or_default();
        debug!(dir = %dir, page, count = data.list.len(), more = data.has_more, "listed page");

        entries.reserve(data.list.len());
        for item in data.list {
            entries.push(DirectoryEntry::from_item(item)?);
        }

        if !data.has_more {
            break;
        }
        page += 1;
    }
    Ok(entries)
}
