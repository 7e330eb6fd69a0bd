//! Listing entries and server paths.

pub mod entry;
pub(crate) mod path;

pub use entry::{rewrite_thumbnail, DirectoryEntry, EntryKind};
