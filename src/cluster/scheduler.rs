//! Periodic refresh driver, owned explicitly by the composition root.
//! Nothing is registered in global state: dropping the scheduler stops the
//! background task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cluster::factory::ProxyFactory;
use crate::cluster::proxy::ClusterProxy;
use crate::control_plane::ControlPlaneConnector;

pub struct RefreshScheduler {
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Spawns a task that reinitializes `proxy` every `interval`. A failed
    /// periodic refresh is logged and retried on the next tick, never
    /// propagated.
    pub fn start<B: ControlPlaneConnector>(
        interval: Duration,
        factory: Arc<ProxyFactory<B>>,
        proxy: Arc<ClusterProxy<B::Client>>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // skip the immediate first tick
            loop {
                ticker.tick().await;
                info!("[RefreshScheduler] Refreshing '{}'", proxy.endpoint());
                if let Err(e) = factory.reinitialize(&proxy).await {
                    warn!("[RefreshScheduler] Periodic refresh failed: {}", e);
                }
            }
        });
        Self { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
