//! ProxyFactory: one proxy per broker endpoint, reused across reconnects.
//!
//! Every (re)initialization opens a fresh control-plane client; the proxy
//! closes the previous one at the start of its refresh, so at most one
//! connection per proxy is alive at a time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::cluster::proxy::ClusterProxy;
use crate::config::AdminTimeoutsConfig;
use crate::control_plane::{ControlPlaneConnector, HostPort};
use crate::errors::ClusterError;

pub struct ProxyFactory<B: ControlPlaneConnector> {
    connector: B,
    timeouts: AdminTimeoutsConfig,
    proxies: Mutex<HashMap<HostPort, Arc<ClusterProxy<B::Client>>>>,
}

impl<B: ControlPlaneConnector> ProxyFactory<B> {
    pub fn new(connector: B, timeouts: AdminTimeoutsConfig) -> Self {
        Self {
            connector,
            timeouts,
            proxies: Mutex::new(HashMap::new()),
        }
    }

    /// Reuses the proxy already held for `endpoint` or constructs a new one,
    /// then reinitializes it (fresh connection + full refresh).
    pub async fn obtain(
        &self,
        endpoint: &HostPort,
    ) -> Result<Arc<ClusterProxy<B::Client>>, ClusterError> {
        let proxy = {
            let mut proxies = self.proxies.lock();
            match proxies.get(endpoint) {
                Some(existing) => {
                    trace!("[ProxyFactory] Reusing existing proxy for '{}'", endpoint);
                    existing.clone()
                }
                None => {
                    trace!("[ProxyFactory] Creating new proxy for '{}'", endpoint);
                    let created = Arc::new(ClusterProxy::new(
                        endpoint.clone(),
                        self.timeouts.clone(),
                    ));
                    proxies.insert(endpoint.clone(), created.clone());
                    created
                }
            }
        };

        self.reinitialize(&proxy).await?;
        Ok(proxy)
    }

    /// Opens a fresh control-plane client and runs one refresh pass. Also
    /// used for manual reconnect and by the periodic scheduler.
    pub async fn reinitialize(&self, proxy: &ClusterProxy<B::Client>) -> Result<(), ClusterError> {
        let client = self
            .connector
            .connect(proxy.endpoint())
            .await
            .map_err(ClusterError::ControlPlane)?;
        proxy.refresh(client).await
    }
}
