//! ClusterSnapshot: the mutable aggregated cluster state.
//!
//! Written only by the refresh pipeline (one coordinating merge step per
//! stage), shared-readable by any number of readers at any time. A reader may
//! observe a partially repopulated snapshot while a refresh is in flight;
//! each container is individually consistent, so readers see incompleteness
//! but never corruption.

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;

use crate::cluster::types::{
    AssignedConsumer, ConsumerGroupDetailRecord, NodeInfo, OffsetRecord, TopicAggregate,
    TopicInfo, UnassignedConsumer, UNMATCHED_CONSUMER_PLACEHOLDER,
};
use crate::control_plane::ConfigEntry;
use crate::errors::ClusterError;

/// Sentinel returned by `partitions_for_topic` for a topic the snapshot does
/// not know.
pub const UNKNOWN_PARTITION_COUNT: i32 = -1;

#[derive(Debug, Default)]
pub struct ClusterSnapshot {
    cluster_id: RwLock<String>,
    nodes: DashMap<String, NodeInfo>,
    topics: DashMap<String, TopicInfo>,
    assigned_consumers: DashSet<AssignedConsumer>,
    unassigned_consumers: DashSet<UnassignedConsumer>,
    offset_records: RwLock<Vec<OffsetRecord>>,
    consumer_group_ids: RwLock<Vec<String>>,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl ClusterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipes every container. No entity survives a refresh unless re-added.
    pub fn clear(&self) {
        self.cluster_id.write().clear();
        self.nodes.clear();
        self.topics.clear();
        self.assigned_consumers.clear();
        self.unassigned_consumers.clear();
        self.offset_records.write().clear();
        self.consumer_group_ids.write().clear();
        *self.refreshed_at.write() = None;
    }

    // --- Mutation (refresh pipeline only) ---

    pub fn set_cluster_id(&self, cluster_id: &str) {
        *self.cluster_id.write() = cluster_id.to_string();
    }

    /// Idempotent: re-adding a node with the same id replaces it in place.
    pub fn add_node(&self, node: NodeInfo) {
        self.nodes.insert(node.node_id.clone(), node);
    }

    /// Idempotent: re-adding a topic with the same name replaces it in place.
    pub fn add_topic(&self, topic: TopicInfo) {
        self.topics.insert(topic.topic_name.clone(), topic);
    }

    pub fn add_assigned_consumer(&self, consumer: AssignedConsumer) {
        self.assigned_consumers.insert(consumer);
    }

    pub fn add_unassigned_consumer(&self, consumer: UnassignedConsumer) {
        self.unassigned_consumers.insert(consumer);
    }

    /// Wholesale replace of the offset-record list.
    pub fn set_offset_records(&self, records: Vec<OffsetRecord>) {
        *self.offset_records.write() = records;
    }

    pub fn set_consumer_group_ids(&self, group_ids: Vec<String>) {
        *self.consumer_group_ids.write() = group_ids;
    }

    pub fn mark_refreshed(&self) {
        *self.refreshed_at.write() = Some(Utc::now());
    }

    // --- Queries ---

    pub fn cluster_id(&self) -> String {
        self.cluster_id.read().clone()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self.refreshed_at.read()
    }

    pub fn has_topic(&self, topic_name: &str) -> bool {
        self.topics.contains_key(topic_name)
    }

    /// Partition count of a topic, or `UNKNOWN_PARTITION_COUNT` for a topic
    /// the snapshot does not know. Never an error.
    pub fn partitions_for_topic(&self, topic_name: &str) -> i32 {
        self.topics
            .get(topic_name)
            .map(|topic| topic.partitions.len() as i32)
            .unwrap_or(UNKNOWN_PARTITION_COUNT)
    }

    /// Nodes in id order: numeric when both ids parse as integers (so "10"
    /// sorts after "2"), lexical otherwise.
    pub fn nodes(&self) -> Vec<NodeInfo> {
        let mut nodes: Vec<NodeInfo> = self.nodes.iter().map(|e| e.value().clone()).collect();
        nodes.sort_by(|a, b| match (a.node_id.parse::<u64>(), b.node_id.parse::<u64>()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => a.node_id.cmp(&b.node_id),
        });
        nodes
    }

    pub fn topics(&self) -> Vec<TopicInfo> {
        let mut topics: Vec<TopicInfo> = self.topics.iter().map(|e| e.value().clone()).collect();
        topics.sort_by(|a, b| a.topic_name.cmp(&b.topic_name));
        topics
    }

    /// Config entries of a topic; empty when the topic is unknown. They are
    /// the same on every node, so the first description wins.
    pub fn topic_properties(&self, topic_name: &str) -> Vec<ConfigEntry> {
        self.topics
            .get(topic_name)
            .map(|topic| topic.config_entries.clone())
            .unwrap_or_default()
    }

    /// Fails fast when the topic or the named property is absent; that is a
    /// caller error, not a transient condition.
    pub fn topic_property_by_name(
        &self,
        topic_name: &str,
        property: &str,
    ) -> Result<String, ClusterError> {
        let topic = self
            .topics
            .get(topic_name)
            .ok_or_else(|| ClusterError::TopicNotFound(topic_name.to_string()))?;
        topic
            .config_entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(property))
            .map(|entry| entry.value.clone())
            .ok_or_else(|| ClusterError::PropertyNotFound {
                topic: topic_name.to_string(),
                property: property.to_string(),
            })
    }

    pub fn consumers_for_topic(&self, topic_name: &str) -> Vec<AssignedConsumer> {
        let mut consumers: Vec<AssignedConsumer> = self
            .assigned_consumers
            .iter()
            .filter(|c| c.topic == topic_name)
            .map(|c| c.clone())
            .collect();
        consumers.sort_by(|a, b| (a.partition, &a.consumer_id).cmp(&(b.partition, &b.consumer_id)));
        consumers
    }

    pub fn assigned_consumers(&self) -> Vec<AssignedConsumer> {
        self.assigned_consumers.iter().map(|c| c.clone()).collect()
    }

    pub fn unassigned_consumers(&self) -> Vec<UnassignedConsumer> {
        self.unassigned_consumers.iter().map(|c| c.clone()).collect()
    }

    pub fn offset_records(&self) -> Vec<OffsetRecord> {
        self.offset_records.read().clone()
    }

    pub fn consumer_group_ids(&self) -> Vec<String> {
        self.consumer_group_ids.read().clone()
    }

    /// For each known topic: distinct consumer ids and distinct consumer
    /// group ids among assigned consumers referencing it, plus partition
    /// count. Sorted by topic name.
    pub fn aggregated_topic_summary(&self) -> Vec<TopicAggregate> {
        let assigned = self.assigned_consumers();
        let mut summaries: Vec<TopicAggregate> = self
            .topics
            .iter()
            .map(|entry| {
                let topic = entry.value();
                let mut consumers = std::collections::HashSet::new();
                let mut groups = std::collections::HashSet::new();
                for consumer in assigned.iter().filter(|c| c.topic == topic.topic_name) {
                    consumers.insert(consumer.consumer_id.as_str());
                    groups.insert(consumer.consumer_group_id.as_str());
                }
                TopicAggregate {
                    name: topic.topic_name.clone(),
                    consumer_count: consumers.len(),
                    consumer_group_count: groups.len(),
                    partition_count: topic.partitions.len(),
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// For every known consumer-group id, for every offset record of that
    /// group, join against assigned consumers on (topic, partition).
    /// Unmatched records report "-" for consumer id, host and client id.
    pub fn consumer_group_details(&self) -> Vec<ConsumerGroupDetailRecord> {
        let group_ids = self.consumer_group_ids();
        let offsets = self.offset_records();
        let assigned = self.assigned_consumers();

        let mut rows = Vec::new();
        for group_id in &group_ids {
            let group_consumers: Vec<&AssignedConsumer> = assigned
                .iter()
                .filter(|c| &c.consumer_group_id == group_id)
                .collect();

            for record in offsets.iter().filter(|r| &r.consumer_group == group_id) {
                let matched = group_consumers
                    .iter()
                    .find(|c| c.partition == record.partition && c.topic == record.topic_name);

                let (consumer_id, host, client_id) = match matched {
                    Some(c) => (c.consumer_id.clone(), c.host.clone(), c.client_id.clone()),
                    None => (
                        UNMATCHED_CONSUMER_PLACEHOLDER.to_string(),
                        UNMATCHED_CONSUMER_PLACEHOLDER.to_string(),
                        UNMATCHED_CONSUMER_PLACEHOLDER.to_string(),
                    ),
                };

                rows.push(ConsumerGroupDetailRecord {
                    topic_name: record.topic_name.clone(),
                    partition: record.partition,
                    current_offset: record.current_offset,
                    end_offset: record.end_offset,
                    lag: record.lag,
                    consumer_id,
                    host,
                    client_id,
                    consumer_group: group_id.clone(),
                });
            }
        }
        rows
    }
}
