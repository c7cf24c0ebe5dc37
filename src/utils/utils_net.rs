use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

/// Probes whether an advertised listener accepts TCP connections from this
/// process. The connect attempt runs on its own task with a hard timeout and
/// is aborted on expiry; every fault collapses to `false`, nothing
/// propagates.
pub async fn is_host_reachable(host: &str, port: u16, limit: Duration) -> bool {
    let addr = format!("{}:{}", host, port);
    debug!("[Net] Checking if '{}' is reachable (timeout: {:?})", addr, limit);

    let probe_addr = addr.clone();
    let mut probe = tokio::spawn(async move { TcpStream::connect(&probe_addr).await.is_ok() });

    match tokio::time::timeout(limit, &mut probe).await {
        Ok(Ok(reachable)) => reachable,
        Ok(Err(_)) => {
            debug!("[Net] Probe task for '{}' failed", addr);
            false
        }
        Err(_) => {
            probe.abort();
            debug!("[Net] Probe of '{}' timed out", addr);
            false
        }
    }
}
