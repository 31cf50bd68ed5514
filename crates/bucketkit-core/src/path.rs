//! Logical path normalization and storage key construction.
//!
//! Every object lives under `<namespace>/<service>/`:
//!
//! ```text
//! default/{service}/[{YYYY-MM-DD}/]{logical_path}
//! cache/{service}/{logical_path}
//! ```
//!
//! The layout is shared with data written by earlier clients, so the
//! normalization rules below are kept bit-compatible, quirks included.

use derive_more::{Deref, Display};
use jiff::Zoned;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::{Error, Result, TRACING_TARGET_PATH};

/// Key separator.
pub const SEPARATOR: char = '/';

/// Top-level key prefix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, StrumDisplay, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Namespace {
    /// Ordinary objects.
    #[default]
    Default,
    /// Cache envelopes.
    Cache,
}

/// Whether a key addresses a single object or a listing prefix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A single object; the logical path must be non-empty.
    #[default]
    File,
    /// A listing prefix; the logical path may be empty.
    Dir,
}

/// Normalizes a logical path.
///
/// Backslashes become forward slashes, then `//` is replaced by `/` in a
/// single left-to-right pass, so `a///b` becomes `a//b`. A result of exactly
/// `/` is rejected and one leading separator is stripped.
pub fn normalize(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::invalid_path("path's length is zero"));
    }

    let path = path.replace('\\', "/").replace("//", "/");
    if path == "/" {
        return Err(Error::invalid_path("path is a bare separator '/'"));
    }

    Ok(match path.strip_prefix(SEPARATOR) {
        Some(rest) => rest.to_owned(),
        None => path,
    })
}

/// Returns the local calendar date, used for date-prefixed keys.
pub fn today() -> Date {
    Zoned::now().date()
}

/// A fully-qualified, normalized backend object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Display)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Normalizes `key` and wraps it.
    pub fn parse(key: &str) -> Result<Self> {
        normalize(key).map(Self)
    }

    /// Wraps a key that is already normalized, such as one returned by a
    /// backend listing.
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the final path component.
    pub fn file_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(index) => &self.0[index + 1..],
            None => &self.0,
        }
    }

    /// Returns everything before the final separator, or `""` when there is
    /// none.
    pub fn parent(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(index) => &self.0[..index],
            None => "",
        }
    }

    /// Returns the extension of the final component including its dot.
    ///
    /// Leading dots of the component are not extension separators, so
    /// `dir/.hidden` has no extension and `a.tar.gz` has `.gz`.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        let stem_start = name.len() - name.trim_start_matches('.').len();
        name[stem_start..]
            .rfind('.')
            .map(|index| &name[stem_start + index..])
    }

    /// Returns a key in the same directory with the file name replaced by
    /// `stem` followed by this key's extension.
    pub fn with_file_stem(&self, stem: &str) -> Self {
        let extension = self.extension().unwrap_or_default();
        match self.0.rfind(SEPARATOR) {
            Some(_) => Self(format!("{}{SEPARATOR}{stem}{extension}", self.parent())),
            None => Self(format!("{stem}{extension}")),
        }
    }

    /// Returns `true` when the extension matches `extension` (with its dot).
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension() == Some(extension)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds storage keys for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBuilder {
    service: String,
}

impl PathBuilder {
    /// Creates a builder for `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Builds `normalize("<namespace>/<service>/[<date>/]<path>")`.
    ///
    /// For [`PathKind::File`] the path must not be empty or a bare
    /// separator, and one leading separator is stripped before namespacing.
    /// [`PathKind::Dir`] uses the path as-is, so an empty path addresses the
    /// whole service.
    pub fn build_key(
        &self,
        path: &str,
        namespace: Namespace,
        kind: PathKind,
        date: Option<Date>,
    ) -> Result<StorageKey> {
        let path = match kind {
            PathKind::File => {
                if path.is_empty() {
                    return Err(Error::invalid_path("path's length is zero"));
                }
                if path == "/" {
                    return Err(Error::invalid_path("path is a bare separator '/'"));
                }
                path.strip_prefix(SEPARATOR).unwrap_or(path)
            }
            PathKind::Dir => path,
        };

        let date = date
            .map(|date| format!("{}{SEPARATOR}", date.strftime("%Y-%m-%d")))
            .unwrap_or_default();

        let key = StorageKey::parse(&format!(
            "{namespace}{SEPARATOR}{}{SEPARATOR}{date}{path}",
            self.service
        ))?;

        tracing::trace!(
            target: TRACING_TARGET_PATH,
            key = %key,
            namespace = %namespace,
            "Built storage key"
        );

        Ok(key)
    }

    /// Builds an object key, dated with [`today`] when `use_date_prefix`.
    pub fn file_key(&self, path: &str, use_date_prefix: bool) -> Result<StorageKey> {
        let date = use_date_prefix.then(today);
        self.build_key(path, Namespace::Default, PathKind::File, date)
    }

    /// Builds the listing prefix for `path`.
    pub fn dir_key(&self, path: &str) -> Result<StorageKey> {
        self.build_key(path, Namespace::Default, PathKind::Dir, None)
    }

    /// Builds `normalize("cache/<service>/<path>")`. Cache keys are never
    /// dated.
    pub fn cache_key(&self, path: &str) -> Result<StorageKey> {
        StorageKey::parse(&format!(
            "{}{SEPARATOR}{}{SEPARATOR}{path}",
            Namespace::Cache,
            self.service
        ))
    }
}
