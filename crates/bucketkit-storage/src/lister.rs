//! Lazy, page-at-a-time enumeration of listing results.

use std::sync::Arc;

use futures::Stream;

use crate::{ListRequest, ObjectBackend, ObjectEntry, StorageResult, TRACING_TARGET};

/// Cursor over the pages of a listing.
///
/// Pages are requested on demand; dropping the lister stops enumeration
/// without fetching further pages.
pub struct ObjectLister {
    backend: Arc<dyn ObjectBackend>,
    bucket: String,
    request: ListRequest,
    exhausted: bool,
    pages_fetched: usize,
}

impl ObjectLister {
    /// Creates a lister starting at the first page of `request`.
    pub fn new(
        backend: Arc<dyn ObjectBackend>,
        bucket: impl Into<String>,
        request: ListRequest,
    ) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            request,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Returns the request for the next page.
    pub fn request(&self) -> &ListRequest {
        &self.request
    }

    /// Returns how many pages have been requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetches the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> StorageResult<Option<Vec<ObjectEntry>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .backend
            .list_objects_page(&self.bucket, &self.request)
            .await?;
        self.pages_fetched += 1;

        tracing::trace!(
            target: TRACING_TARGET,
            bucket = %self.bucket,
            prefix = %self.request.prefix,
            page = self.pages_fetched,
            entries = page.entries.len(),
            truncated = page.is_truncated(),
            "Fetched listing page"
        );

        match page.next_continuation_token {
            Some(token) => self.request.continuation_token = Some(token),
            None => self.exhausted = true,
        }

        Ok(Some(page.entries))
    }

    /// Converts the lister into a stream of entries, fetching pages as the
    /// stream is polled.
    pub fn into_stream(self) -> impl Stream<Item = StorageResult<ObjectEntry>> + Send {
        async_stream::try_stream! {
            let mut lister = self;
            while let Some(entries) = lister.next_page().await? {
                for entry in entries {
                    yield entry;
                }
            }
        }
    }

    /// Drains every remaining page.
    pub async fn collect_all(mut self) -> StorageResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        while let Some(page) = self.next_page().await? {
            entries.extend(page);
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for ObjectLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectLister")
            .field("bucket", &self.bucket)
            .field("request", &self.request)
            .field("exhausted", &self.exhausted)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}
