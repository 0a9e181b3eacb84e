//! File filtering for the crawl

use letterstat_core::{EntryKind, RepositoryEntry};

/// File name suffixes eligible for analysis, compared case-insensitively
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".js", ".ts"];

/// Whether `name` ends with one of the accepted suffixes
pub fn has_accepted_extension(name: &str) -> bool {
    ACCEPTED_EXTENSIONS.iter().any(|ext| {
        name.len() >= ext.len()
            && name
                .get(name.len() - ext.len()..)
                .is_some_and(|suffix| suffix.eq_ignore_ascii_case(ext))
    })
}

/// Content reference of a file entry that should be fetched, if any
pub fn eligible_ref(entry: &RepositoryEntry) -> Option<&str> {
    if entry.kind != EntryKind::File || !has_accepted_extension(&entry.name) {
        return None;
    }
    entry.fetchable_ref()
}
