pub mod cluster;
pub mod config;
pub mod control_plane;
pub mod errors;
pub mod utils;

pub use cluster::{
    ClusterProxy, ClusterSnapshot, NodeCapabilityInfo, NodePropertyConsistency, ProxyFactory,
    RefreshScheduler, TopicAdmin, UNKNOWN_PARTITION_COUNT,
};
pub use control_plane::{ControlPlane, ControlPlaneConnector, ControlPlaneError, HostPort};
pub use errors::ClusterError;

/// Installs the global tracing subscriber. `RUST_LOG` wins over the supplied
/// default level. Call once from the composition root.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
