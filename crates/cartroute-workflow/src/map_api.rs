//! One-time, process-wide readiness of the map API.

use std::future::Future;
use std::sync::OnceLock;

use tokio::sync::OnceCell;

use crate::error::MapApiError;

/// Shared init-once gate. The first caller runs the loader while concurrent
/// callers wait on the same attempt. A failed load is not remembered, so the
/// next caller tries again.
#[derive(Debug, Default)]
pub struct MapApiGate {
    ready: OnceCell<()>,
}

impl MapApiGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide gate.
    pub fn global() -> &'static MapApiGate {
        static GATE: OnceLock<MapApiGate> = OnceLock::new();
        GATE.get_or_init(MapApiGate::new)
    }

    /// Waits until the map API is loaded, running `loader` if nobody has yet.
    ///
    /// # Errors
    ///
    /// Returns the loader's [`MapApiError`] when this call ran the loader and
    /// it failed.
    pub async fn ensure_ready<F, Fut>(&self, loader: F) -> Result<(), MapApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), MapApiError>>,
    {
        self.ready
            .get_or_try_init(move || async move {
                tracing::debug!("loading map API");
                loader().await?;
                tracing::info!("map API ready");
                Ok::<(), MapApiError>(())
            })
            .await
            .map(|_| ())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }
}
