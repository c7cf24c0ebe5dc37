use std::collections::HashMap;

use serde::Serialize;

/// Broker endpoint as supplied by the configuration loader (host + port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl std::fmt::Display for HostPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A single (name, value) configuration entry of a broker or topic resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDescription {
    pub cluster_id: String,
    pub controller_id: Option<String>,
    pub nodes: Vec<NodeDescription>,
}

/// A broker node as reported by describe-cluster. Host/port is the node's
/// advertised listener, not the control-plane endpoint used to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescription {
    pub node_id: String,
    pub host: String,
    pub port: u16,
}

impl NodeDescription {
    pub fn advertised_listener(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicDescription {
    pub name: String,
    pub partitions: Vec<PartitionDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionDescription {
    pub partition: u32,
    pub leader: Option<String>,
    pub replicas: Vec<String>,
}

/// One member of a consumer group, with its topic-partition assignment
/// (empty when the member holds no assignment).
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescription {
    pub consumer_id: String,
    pub client_id: String,
    pub host: String,
    pub assignment: Vec<TopicPartition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: u32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self { topic: topic.into(), partition }
    }
}

impl std::fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// Begin/end offsets of one partition as seen by a throw-away read client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionBounds {
    pub begin: u64,
    pub end: u64,
}

/// Topic creation request as submitted to the control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopicRequest {
    pub name: String,
    pub partitions: u32,
    pub replication_factor: u16,
    pub configs: HashMap<String, String>,
}
