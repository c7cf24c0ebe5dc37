use serde::Serialize;

use crate::control_plane::{ConfigEntry, PartitionDescription};

// Well-known resource property names.
pub const RETENTION_MS_CONFIG: &str = "retention.ms";
pub const CLEANUP_POLICY_CONFIG: &str = "cleanup.policy";
pub const CLEANUP_POLICY_COMPACT: &str = "compact";

/// Identity fields reported for an offset record with no matching assigned
/// consumer.
pub const UNMATCHED_CONSUMER_PLACEHOLDER: &str = "-";

/// One broker node of the aggregated snapshot. Identity is the node id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub is_controller: bool,
    pub node_id: String,
    pub config_entries: Vec<ConfigEntry>,
}

/// One topic of the aggregated snapshot. Identity is the topic name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicInfo {
    pub topic_name: String,
    pub partitions: Vec<PartitionDescription>,
    pub config_entries: Vec<ConfigEntry>,
}

/// A consumer-group member with a partition assignment; one record per
/// assigned partition. `offset` is the committed offset for that partition,
/// absent when the group never committed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssignedConsumer {
    pub consumer_group_id: String,
    pub consumer_id: String,
    pub client_id: String,
    pub host: String,
    pub topic: String,
    pub partition: u32,
    pub offset: Option<u64>,
}

/// A consumer-group member holding no partition assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnassignedConsumer {
    pub consumer_group_id: String,
    pub consumer_id: String,
    pub client_id: String,
    pub host: String,
}

/// Offset/lag state of one (topic, partition, consumer group) triple.
/// `current_offset` and `lag` are absent when no committed offset exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetRecord {
    pub topic_name: String,
    pub partition: u32,
    pub consumer_group: String,
    pub begin_offset: u64,
    pub end_offset: u64,
    pub current_offset: Option<u64>,
    pub lag: Option<u64>,
    pub message_count: u64,
}

/// Derived per-topic counts; never stored, always recomputed from the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TopicAggregate {
    pub name: String,
    pub consumer_count: usize,
    pub consumer_group_count: usize,
    pub partition_count: usize,
}

/// One row of the consumer-group detail view: an offset record joined
/// against the assigned consumer holding that (topic, partition), with "-"
/// placeholders when no member holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerGroupDetailRecord {
    pub topic_name: String,
    pub partition: u32,
    pub current_offset: Option<u64>,
    pub end_offset: u64,
    pub lag: Option<u64>,
    pub consumer_id: String,
    pub host: String,
    pub client_id: String,
    pub consumer_group: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CleanupPolicy {
    Delete,
    Compact,
}

/// Topic creation parameters as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicToCreate {
    pub name: String,
    pub partitions: u32,
    pub replication_factor: u16,
    pub cleanup_policy: CleanupPolicy,
}

/// Cluster-wide flag derived from per-node properties: `Unknown` when the
/// evidence is absent or conflicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { TriState::True } else { TriState::False }
    }
}

/// The subset of topic properties the presentation layer may edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicAlterableProperties {
    pub topic_name: String,
    pub retention_ms: u64,
}
