//! Directory entries of a shared folder.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use url::Url;

use crate::api::types::ListItem;
use crate::crypto::decode_checksum;
use crate::error::Result;

/// Thumbnail variant requested from the preview service.
pub const THUMB_WIDTH: u32 = 800;
pub const THUMB_HEIGHT: u32 = 800;
pub const THUMB_QUALITY: u32 = 100;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    File,
    Folder,
}

/// A file or folder inside a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Server file id (`fs_id`), used to resolve download links.
    pub id: String,
    /// Absolute server path.
    pub path: String,
    pub name: String,
    /// Size in bytes (0 for folders).
    pub size: u64,
    /// Modification time (Unix seconds).
    pub modified: i64,
    /// Creation time (Unix seconds).
    pub created: i64,
    pub kind: EntryKind,
    /// Canonical MD5 hex digest, absent for folders.
    pub checksum: Option<String>,
    /// Preview URL, when upstream offers one.
    pub thumbnail: Option<String>,
}

impl DirectoryEntry {
    /// Build an entry from a listing item, decoding its checksum.
    pub fn from_item(item: ListItem) -> Result<Self> {
        let checksum = if item.md5.is_empty() {
            None
        } else {
            Some(decode_checksum(&item.md5)?)
        };
        let thumbnail = item
            .thumbs
            .get("icon")
            .and_then(|t| rewrite_thumbnail(t, THUMB_WIDTH, THUMB_HEIGHT, THUMB_QUALITY));

        Ok(Self {
            id: item.fs_id,
            path: item.path,
            name: item.server_filename,
            size: item.size.max(0) as u64,
            modified: item.server_mtime,
            created: item.server_ctime,
            kind: if item.isdir == 1 {
                EntryKind::Folder
            } else {
                EntryKind::File
            },
            checksum,
            thumbnail,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Modification time as a `SystemTime`.
    pub fn modified_at(&self) -> SystemTime {
        unix_to_system_time(self.modified)
    }

    /// Creation time as a `SystemTime`.
    pub fn created_at(&self) -> SystemTime {
        unix_to_system_time(self.created)
    }
}

fn unix_to_system_time(secs: i64) -> SystemTime {
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    }
}

/// Rewrite a thumbnail template to `size=c{width}_u{height}` and `quality={quality}`.
///
/// Other query parameters keep their order; missing ones are appended. Returns
/// `None` if the template is empty or not a URL.
///
/// # Examples
/// ```
/// use panshare::fs::rewrite_thumbnail;
///
/// let url = rewrite_thumbnail("http://x/y?size=a&quality=b", 800, 800, 100).unwrap();
/// assert_eq!(url, "http://x/y?size=c800_u800&quality=100");
/// ```
pub fn rewrite_thumbnail(template: &str, width: u32, height: u32, quality: u32) -> Option<String> {
    if template.trim().is_empty() {
        return None;
    }
    let mut url = Url::parse(template).ok()?;

    let size = format!("c{}_u{}", width, height);
    let quality = quality.to_string();
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut saw_size = false;
    let mut saw_quality = false;
    for (key, value) in pairs.iter_mut() {
        match key.as_str() {
            "size" => {
                *value = size.clone();
                saw_size = true;
            }
            "quality" => {
                *value = quality.clone();
                saw_quality = true;
            }
            _ => {}
        }
    }
    if !saw_size {
        pairs.push(("size".to_string(), size));
    }
    if !saw_quality {
        pairs.push(("quality".to_string(), quality));
    }

    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Some(url.to_string())
}
