use chrono::{DateTime, Utc};
use shared::Error;

/// Lifecycle of one query key.
///
/// `Idle -> Fetching -> Success | Error`. A refetch from `Success` or `Error`
/// goes back through `Fetching` while the last known data stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Fetching,
    Success,
    Error,
}

/// Snapshot of a query as seen by a caller or subscriber.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    pub data: Option<V>,
    pub error: Option<Error>,
    /// Data is older than the staleness window or was invalidated.
    pub is_stale: bool,
    pub data_updated_at: Option<DateTime<Utc>>,
}

impl<V> QueryState<V> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_stale: false,
            data_updated_at: None,
        }
    }

    pub(crate) fn success(data: V, updated_at: DateTime<Utc>, is_stale: bool) -> Self {
        Self {
            status: QueryStatus::Success,
            data: Some(data),
            error: None,
            is_stale,
            data_updated_at: Some(updated_at),
        }
    }

    /// First load: fetching with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Fetching && self.data.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Fetching
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.status = QueryStatus::Fetching;
        self.error = None;
    }

    /// A detached fetch settled and nothing else is running for the key.
    pub(crate) fn finish_detached(&mut self) {
        if self.status == QueryStatus::Fetching {
            self.status = if self.data.is_some() {
                QueryStatus::Success
            } else {
                QueryStatus::Idle
            };
        }
    }

    pub(crate) fn fail(&mut self, error: Error) {
        self.status = QueryStatus::Error;
        self.error = Some(error);
    }
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self::idle()
    }
}
