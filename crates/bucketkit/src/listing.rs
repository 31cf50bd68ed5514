//! Listing results.

use bucketkit_core::Value;
use bucketkit_core::path::SEPARATOR;
use bucketkit_storage::ObjectEntry;
use serde::Serialize;

/// An object returned by [`ObjectStore::list_objects`](crate::ObjectStore::list_objects).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedObject {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Decoded content, present when the listing was asked to load it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<ObjectEntry> for ListedObject {
    fn from(entry: ObjectEntry) -> Self {
        Self {
            key: entry.key,
            size: entry.size,
            data: None,
        }
    }
}

/// A parent directory of listed objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DirectoryName {
    /// Full directory key.
    pub key: String,
    /// Directory relative to the listed directory key.
    pub short_key: String,
}

impl DirectoryName {
    /// Derives the parent directory of `object_key`, relative to `dir_key`.
    pub(crate) fn of(object_key: &str, dir_key: &str) -> Self {
        let key = match object_key.rfind(SEPARATOR) {
            Some(index) => &object_key[..index],
            None => "",
        };

        let short_key = key
            .strip_prefix(dir_key)
            .map(|rest| rest.strip_prefix(SEPARATOR).unwrap_or(rest))
            .unwrap_or_default();

        Self {
            key: key.to_owned(),
            short_key: short_key.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_name_under_dir_key() {
        let name = DirectoryName::of("default/svc/reports/2024/a.json", "default/svc/reports");
        assert_eq!(name.key, "default/svc/reports/2024");
        assert_eq!(name.short_key, "2024");
    }

    #[test]
    fn test_directory_name_with_trailing_separator() {
        let name = DirectoryName::of("default/svc/d1/a", "default/svc/");
        assert_eq!(name.key, "default/svc/d1");
        assert_eq!(name.short_key, "d1");
    }

    #[test]
    fn test_directory_name_equal_to_dir_key() {
        let name = DirectoryName::of("default/svc/reports/a", "default/svc/reports");
        assert_eq!(name.key, "default/svc/reports");
        assert_eq!(name.short_key, "");
    }

    #[test]
    fn test_listed_object_serialization() {
        let listed = ListedObject::from(ObjectEntry::new("default/svc/a", 3));
        assert_eq!(
            serde_json::to_value(&listed).unwrap(),
            serde_json::json!({"key": "default/svc/a", "size": 3})
        );
    }
}
