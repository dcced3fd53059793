//! Query snapshots — the only shape the cache exposes to consumers.

use crate::error::SdkError;
use std::sync::Arc;

/// Read-side view of one cache entry.
///
/// Exactly one of three states holds:
/// - loading: `is_loading == true`, no data, no error (first fetch pending);
/// - data: `data` is `Some` — possibly stale while a revalidation runs;
/// - error: `error` is `Some` and `data` is `None`.
///
/// A successful fetch returning zero rows is the data state with an empty
/// collection, never an error.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<SdkError>>,
    pub is_loading: bool,
}

impl<T> QuerySnapshot<T> {
    pub(crate) fn loading() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
        }
    }

    pub(crate) fn ready(data: Arc<T>) -> Self {
        Self {
            data: Some(data),
            error: None,
            is_loading: false,
        }
    }

    pub(crate) fn failed(error: Arc<SdkError>) -> Self {
        Self {
            data: None,
            error: Some(error),
            is_loading: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Transform the payload while carrying the load/error state through.
    /// Used to derive composed views from cached streams.
    pub fn map<U>(self, f: impl FnOnce(&T) -> U) -> QuerySnapshot<U> {
        QuerySnapshot {
            data: self.data.map(|d| Arc::new(f(&d))),
            error: self.error,
            is_loading: self.is_loading,
        }
    }
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}
