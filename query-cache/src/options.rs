use shared::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type SuccessCallback<V> = Arc<dyn Fn(&V) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Per-call query options.
///
/// Callbacks fire when a fetch started or joined by this call settles,
/// including a background refetch. A fresh cache hit fires nothing.
pub struct QueryOptions<V> {
    pub enabled: bool,
    pub stale_time: Option<Duration>,
    pub on_success: Option<SuccessCallback<V>>,
    pub on_error: Option<ErrorCallback>,
}

impl<V> QueryOptions<V> {
    pub fn new() -> Self {
        Self {
            enabled: true,
            stale_time: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    /// Use `stale_time` unless the caller already set one.
    pub fn or_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time.get_or_insert(stale_time);
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&V) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub(crate) fn notify(&self, result: &Result<V, Error>) {
        match result {
            Ok(data) => {
                if let Some(callback) = &self.on_success {
                    callback(data);
                }
            }
            Err(error) => {
                if let Some(callback) = &self.on_error {
                    callback(error);
                }
            }
        }
    }
}

impl<V> Default for QueryOptions<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for QueryOptions<V> {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            stale_time: self.stale_time,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<V> fmt::Debug for QueryOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("enabled", &self.enabled)
            .field("stale_time", &self.stale_time)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
