//! Control plane: the cluster's administrative query/mutation surface.
//!
//! Everything the proxy knows about the cluster comes through the
//! `ControlPlane` trait. One client is owned per proxy and replaced on every
//! refresh; `ControlPlaneConnector` opens the fresh client for an endpoint.

pub mod types;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

pub use types::{
    ClusterDescription, ConfigEntry, HostPort, MemberDescription, NewTopicRequest,
    NodeDescription, PartitionBounds, PartitionDescription, TopicDescription, TopicPartition,
};

/// Failure reported by a control-plane call. `TopicExists`/`UnknownTopic`
/// are inspected by the create-conflict resolution protocol; the rest are
/// infrastructure faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneError {
    TopicExists(String),
    UnknownTopic(String),
    Unavailable(String),
    Io(String),
}

impl std::fmt::Display for ControlPlaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPlaneError::TopicExists(name) => write!(f, "topic '{}' already exists", name),
            ControlPlaneError::UnknownTopic(name) => write!(f, "unknown topic '{}'", name),
            ControlPlaneError::Unavailable(msg) => write!(f, "control plane unavailable: {}", msg),
            ControlPlaneError::Io(msg) => write!(f, "control plane i/o error: {}", msg),
        }
    }
}

impl std::error::Error for ControlPlaneError {}

/// Administrative operations consumed by the proxy, all keyed by resource id.
/// Callers bound every observational call with their own timeout; methods
/// return `Send` futures so stages can be driven from spawned tasks.
pub trait ControlPlane: Send + Sync + 'static {
    /// Cluster id, controller node id and the full node list.
    fn describe_cluster(
        &self,
    ) -> impl Future<Output = Result<ClusterDescription, ControlPlaneError>> + Send;

    /// Full configuration set of one broker node.
    fn describe_broker_config(
        &self,
        node_id: &str,
    ) -> impl Future<Output = Result<Vec<ConfigEntry>, ControlPlaneError>> + Send;

    /// Names of all non-internal topics.
    fn list_topics(&self) -> impl Future<Output = Result<Vec<String>, ControlPlaneError>> + Send;

    /// Partition/replica/leader layout of one topic.
    fn describe_topic(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<TopicDescription, ControlPlaneError>> + Send;

    /// Resource configuration of one topic.
    fn describe_topic_config(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<ConfigEntry>, ControlPlaneError>> + Send;

    /// Incremental config update on one topic.
    fn alter_topic_config(
        &self,
        name: &str,
        entries: Vec<ConfigEntry>,
    ) -> impl Future<Output = Result<(), ControlPlaneError>> + Send;

    fn list_consumer_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, ControlPlaneError>> + Send;

    /// Member descriptions of one consumer group.
    fn describe_consumer_group(
        &self,
        group_id: &str,
    ) -> impl Future<Output = Result<Vec<MemberDescription>, ControlPlaneError>> + Send;

    /// Committed offset per (topic, partition) of one consumer group. The
    /// value is `None` for a partition the group tracks without a usable
    /// committed offset.
    fn list_group_offsets(
        &self,
        group_id: &str,
    ) -> impl Future<Output = Result<HashMap<TopicPartition, Option<u64>>, ControlPlaneError>> + Send;

    /// Begin/end offsets of the given partitions, read with a throw-away
    /// client bound to `group_id`.
    fn fetch_partition_bounds(
        &self,
        group_id: &str,
        partitions: &[TopicPartition],
    ) -> impl Future<Output = Result<HashMap<TopicPartition, PartitionBounds>, ControlPlaneError>> + Send;

    fn create_topic(
        &self,
        request: &NewTopicRequest,
    ) -> impl Future<Output = Result<(), ControlPlaneError>> + Send;

    fn delete_topic(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), ControlPlaneError>> + Send;

    /// Release the client's resources, waiting at most `grace`.
    fn close(&self, grace: Duration) -> impl Future<Output = ()> + Send;
}

/// Opens a fresh control-plane client for an endpoint. The factory calls this
/// once per refresh so a proxy never reuses a stale connection.
pub trait ControlPlaneConnector: Send + Sync + 'static {
    type Client: ControlPlane;

    fn connect(
        &self,
        endpoint: &HostPort,
    ) -> impl Future<Output = Result<Self::Client, ControlPlaneError>> + Send;
}
