//! Prelude module for convenient imports.

pub use crate::cache::{CacheEnvelope, NEVER_EXPIRES};
pub use crate::codec::{Compression, content_type_for, decode, encode, encode_tabular};
pub use crate::error::{Error, Result};
pub use crate::path::{Namespace, PathBuilder, PathKind, StorageKey, normalize};
pub use crate::value::{Record, Value};
