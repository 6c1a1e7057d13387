use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::types::Page;
use crate::util::catch_task_panic;

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend could not be reached or failed mid-request.
    #[error("Request failed: {0}")]
    Transport(String),
    /// The cursor was not issued by this source.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    /// The backend answered with data that could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A paginated list of `T`.
pub trait PageSource<T>: Send + Sync + 'static {
    /// Fetch the page at `cursor`, or the first page when `cursor` is `None`.
    fn fetch_page(
        &self,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<Page<T>, SourceError>> + Send;
}

// ============================================================================
// Pagination
// ============================================================================

/// A page load the host should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub generation: u64,
    /// True for a first-page reload that replaces the list wholesale.
    pub replace: bool,
}

/// Completion event for a [`PageRequest`].
#[derive(Debug)]
pub struct PageLoaded<T> {
    pub generation: u64,
    pub replace: bool,
    pub result: Result<Page<T>, String>,
}

/// Cursor bookkeeping for one paginated list.
///
/// At most one load is in flight. A reload bumps the generation, so a
/// next-page load that was already running comes back stale and is dropped.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    cursor: Option<String>,
    exhausted: bool,
    loading: bool,
    generation: u64,
}

impl Pagination {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start over from the first page.
    pub fn begin_reload(&mut self) -> PageRequest {
        self.generation = self.generation.wrapping_add(1);
        self.cursor = None;
        self.exhausted = false;
        self.loading = true;
        PageRequest {
            cursor: None,
            generation: self.generation,
            replace: true,
        }
    }

    /// Request the page after the last one loaded.
    ///
    /// `None` while a load is running, once the end of the list was reached,
    /// or before the first page has arrived.
    pub fn begin_next(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.loading = true;
        Some(PageRequest {
            cursor: Some(cursor),
            generation: self.generation,
            replace: false,
        })
    }

    /// Record a successful load. Returns false when `generation` is stale and
    /// the page must be discarded.
    pub fn finish(&mut self, generation: u64, next_cursor: Option<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.exhausted = next_cursor.is_none();
        self.cursor = next_cursor;
        true
    }

    /// Record a failed load. The cursor is kept so the same page is retried.
    pub fn fail(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }
}

/// Fetch one page in the background and send a [`PageLoaded`] back.
pub fn spawn_page_load<S, T, E>(
    source: Arc<S>,
    request: PageRequest,
    tx: mpsc::Sender<E>,
) -> JoinHandle<()>
where
    S: PageSource<T>,
    T: Send + 'static,
    E: From<PageLoaded<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let generation = request.generation;
        let outcome = catch_task_panic(source.fetch_page(request.cursor.as_deref())).await;
        let result = match outcome {
            Ok(Ok(page)) => {
                tracing::debug!(
                    items = page.items.len(),
                    more = page.next_cursor.is_some(),
                    generation,
                    "Page loaded"
                );
                Ok(page)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, cursor = ?request.cursor, "Page load failed");
                Err(e.to_string())
            }
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, "Page load task panicked");
                Err(format!("Task panicked: {panic_msg}"))
            }
        };

        let event = PageLoaded {
            generation,
            replace: request.replace,
            result,
        };
        if let Err(e) = tx.send(E::from(event)).await {
            tracing::warn!(error = %e, event = "PageLoaded", "Channel send failed (receiver dropped)");
        }
    })
}
