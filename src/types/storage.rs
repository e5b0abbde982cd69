use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::lenient_enum;

lenient_enum! {
    pub enum FileType {
        File => "file",
        Dir => "dir",
    }
}

/// One entry of a remote directory listing.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileType,
    pub path: Option<String>,
    pub size: Option<u64>,
    pub mod_time: Option<String>,
}

/// Usage of one storage volume.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystem {
    pub name: Option<String>,
    pub total_bytes: Option<u64>,
    pub used_bytes: Option<u64>,
}

/// One object in an object-storage bucket.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectList {
    #[serde(default)]
    pub items: Vec<ObjectInfo>,
}
