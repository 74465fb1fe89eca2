//! Blob path layout.
//!
//! Every owner gets one flat directory named after their id. Committed blobs
//! are named `<stem>-<file_id><ext>` so two files with the same display name
//! never collide; staged uploads are named `temp-<millis>-<random><ext>`
//! until the commit pipeline renames them.

use stowage_core::types::{FileId, OwnerId};

/// Prefix shared by every staged upload.
pub const STAGING_PREFIX: &str = "temp-";

/// Longest file name, in bytes, most filesystems accept (`NAME_MAX`).
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Longest extension, in bytes and including the dot, kept on disk.
pub const MAX_EXT_BYTES: usize = 32;

/// Bytes `final_path` adds around the stem: `-` plus a hyphenated UUID.
const ID_SUFFIX_BYTES: usize = 1 + 36;

/// Directory holding all blobs of `owner_id`.
pub fn owner_dir(owner_id: OwnerId) -> String {
    owner_id.to_string()
}

/// Split a file name into stem and extension (the extension keeps its
/// leading dot). Dotfiles like `.env` have no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

/// Replace characters that would escape the owner directory.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Sanitized extension, cut to [`MAX_EXT_BYTES`].
fn disk_ext(ext: &str) -> String {
    truncate_bytes(&sanitize(ext), MAX_EXT_BYTES).to_string()
}

/// Final blob path for a committed file.
///
/// The file name never exceeds [`MAX_FILE_NAME_BYTES`]; long stems are cut
/// on a character boundary. The id suffix alone keeps the path unique.
pub fn final_path(owner_id: OwnerId, file_id: FileId, original_name: &str) -> String {
    let (stem, ext) = split_name(original_name);
    let ext = disk_ext(ext);
    let stem = sanitize(stem);
    let stem = truncate_bytes(&stem, MAX_FILE_NAME_BYTES - ID_SUFFIX_BYTES - ext.len());
    format!("{}/{}-{}{}", owner_dir(owner_id), stem, file_id, ext)
}

/// A fresh staging path for an incoming upload.
pub fn staging_path(owner_id: OwnerId, original_name: &str) -> String {
    let (_, ext) = split_name(original_name);
    format!(
        "{}/{}{}-{}{}",
        owner_dir(owner_id),
        STAGING_PREFIX,
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>(),
        disk_ext(ext)
    )
}

/// Whether `path` names a staged, not yet committed, blob.
pub fn is_staging_path(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with(STAGING_PREFIX))
}
