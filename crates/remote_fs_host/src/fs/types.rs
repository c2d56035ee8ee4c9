//! Remote filesystem data types shared across host contracts and implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filename used for downloads whose response carries no usable content-disposition header.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "download";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
/// Opaque server-issued identifier for a file or directory.
///
/// The backend may issue identifiers as JSON strings or integers. The received representation is
/// preserved so request bodies echo the identifier back exactly as it was received.
pub enum EntryId {
    /// Identifier issued as a non-negative JSON integer.
    Number(u64),
    /// Identifier issued as a negative JSON integer.
    Signed(i64),
    /// Identifier issued as a JSON string.
    Text(String),
}

impl EntryId {
    /// Renders the identifier as header-safe text.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Signed(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        u64::try_from(value).map_or(Self::Signed(value), Self::Number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Remote entry kind.
pub enum EntryKind {
    /// File entry.
    File,
    /// Directory entry.
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One item of a directory listing.
pub struct DirectoryEntry {
    /// Server-issued identifier.
    pub id: EntryId,
    /// Display name. Uniqueness within a directory is enforced by the server only.
    pub name: String,
    /// Whether the entry can be expanded into further entries.
    pub is_directory: bool,
    /// Size in bytes (directories report their total size).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Creator user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Owner user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Last modification time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_last_edit: Option<u64>,
    /// Last access time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_last_access: Option<u64>,
    /// Creation time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_creation: Option<u64>,
}

impl DirectoryEntry {
    /// Builds a directory entry without optional metadata.
    pub fn directory(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self::bare(id.into(), name.into(), true)
    }

    /// Builds a file entry without optional metadata.
    pub fn file(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self::bare(id.into(), name.into(), false)
    }

    fn bare(id: EntryId, name: String, is_directory: bool) -> Self {
        Self {
            id,
            name,
            is_directory,
            size_bytes: None,
            creator: None,
            owner: None,
            unix_last_edit: None,
            unix_last_access: None,
            unix_creation: None,
        }
    }

    /// Returns the entry kind derived from [`Self::is_directory`].
    pub fn kind(&self) -> EntryKind {
        if self.is_directory {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Root or favourite directory reference as returned by the listing endpoints.
pub struct DirectoryRef {
    /// Server-issued directory identifier.
    pub id: EntryId,
    /// Display name.
    pub name: String,
}

impl From<DirectoryRef> for DirectoryEntry {
    fn from(value: DirectoryRef) -> Self {
        DirectoryEntry::directory(value.id, value.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Result payload for a directory lookup. Always replaces any previously held listing.
pub struct DirectoryListing {
    /// Child entries in server order.
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    /// Number of entries in the listing.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the directory holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by identifier.
    pub fn find(&self, id: &EntryId) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Downloaded file content.
pub struct DownloadedFile {
    /// Filename taken from response metadata, or [`DEFAULT_DOWNLOAD_FILENAME`].
    pub filename: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Request body for `directory-lookup`.
pub struct DirectoryLookupRequest {
    /// Directory to resolve.
    pub directory: EntryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Request body for creating a file or directory.
pub struct CreateEntryRequest {
    /// Parent directory.
    pub directory: EntryId,
    /// Name of the new entry.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Request body for deleting a file or directory.
pub struct DeleteEntryRequest {
    /// Entry to delete.
    pub file: EntryId,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn entry_ids_keep_their_json_representation() {
        let text: EntryId = serde_json::from_value(json!("dir-7")).expect("text id");
        let number: EntryId = serde_json::from_value(json!(42)).expect("numeric id");
        assert_eq!(text, EntryId::from("dir-7"));
        assert_eq!(number, EntryId::Number(42));

        let body = serde_json::to_value(DirectoryLookupRequest { directory: number })
            .expect("serialize");
        assert_eq!(body, json!({ "directory": 42 }));
        assert_eq!(EntryId::from(42u64).to_header_value(), "42");
    }

    #[test]
    fn negative_integer_ids_are_accepted_and_echoed() {
        let listing: Vec<DirectoryRef> = serde_json::from_value(json!([
            { "id": -3, "name": "Scratch" },
            { "id": 7, "name": "Home" }
        ]))
        .expect("listing with a negative id");
        assert_eq!(listing[0].id, EntryId::Signed(-3));
        assert_eq!(listing[1].id, EntryId::from(7i64));
        assert_eq!(listing[0].id.to_header_value(), "-3");

        let body = serde_json::to_value(DeleteEntryRequest {
            file: listing[0].id.clone(),
        })
        .expect("serialize");
        assert_eq!(body, json!({ "file": -3 }));
    }

    #[test]
    fn directory_entry_reads_camel_case_and_optional_metadata() {
        let entry: DirectoryEntry = serde_json::from_value(json!({
            "id": "f-1",
            "name": "notes.txt",
            "isDirectory": false,
            "sizeBytes": 12,
            "owner": "alice"
        }))
        .expect("deserialize");

        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.size_bytes, Some(12));
        assert_eq!(entry.owner.as_deref(), Some("alice"));
        assert_eq!(entry.creator, None);
    }

    #[test]
    fn directory_entry_requires_discriminator() {
        let result = serde_json::from_value::<DirectoryEntry>(json!({ "id": 1, "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn directory_refs_become_directory_entries() {
        let roots: Vec<DirectoryRef> =
            serde_json::from_value(json!([{ "id": 1, "name": "Home" }])).expect("deserialize");
        let entry = DirectoryEntry::from(roots[0].clone());
        assert!(entry.is_directory);
        assert_eq!(entry.name, "Home");
    }

    #[test]
    fn listing_find_matches_by_id() {
        let listing = DirectoryListing {
            entries: vec![
                DirectoryEntry::directory("a", "Docs"),
                DirectoryEntry::file("b", "readme.md"),
            ],
        };
        assert_eq!(listing.len(), 2);
        assert_eq!(
            listing.find(&EntryId::from("b")).map(|e| e.name.as_str()),
            Some("readme.md")
        );
        assert!(listing.find(&EntryId::from("zzz")).is_none());
    }
}
