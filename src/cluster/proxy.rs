//! ClusterProxy: the refresh pipeline and the read/mutation surface.
//!
//! One `refresh()` pass walks ReleasingPrior -> Validating -> DescribingCluster
//! -> DescribingTopics -> DescribingConsumers. Each describing stage fans out
//! one future per node/topic/group; the futures produce task-local partial
//! results and a single coordinating loop merges each completed result into
//! the snapshot, so no completion mutates shared containers on its own.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::stream::{FuturesUnordered, StreamExt};
use parking_lot::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::cluster::capability::{NodeCapabilityInfo, INTER_NODE_PROTOCOL_VERSION_PROP};
use crate::cluster::consistency::NodePropertyConsistency;
use crate::cluster::snapshot::ClusterSnapshot;
use crate::cluster::topic_admin::TopicAdmin;
use crate::cluster::types::{
    AssignedConsumer, ConsumerGroupDetailRecord, NodeInfo, OffsetRecord, TopicAggregate,
    TopicAlterableProperties, TopicToCreate, TriState, UnassignedConsumer, RETENTION_MS_CONFIG,
};
use crate::config::AdminTimeoutsConfig;
use crate::control_plane::{
    ConfigEntry, ControlPlane, HostPort, NodeDescription, TopicPartition,
};
use crate::errors::ClusterError;
use crate::utils::utils_net::is_host_reachable;

pub struct ClusterProxy<C: ControlPlane> {
    id: Uuid,
    endpoint: HostPort,
    timeouts: AdminTimeoutsConfig,
    control: RwLock<Option<Arc<C>>>,
    snapshot: ClusterSnapshot,
    node_properties: NodePropertyConsistency,
    capabilities: DashMap<String, NodeCapabilityInfo>,
}

/// Partial result of one per-node probe, merged by the coordinating loop.
struct NodeProbe {
    node_id: String,
    capability: Option<NodeCapabilityInfo>,
    info: Option<NodeInfo>,
}

/// Partial result of one per-group probe.
struct GroupProbe {
    offset_records: Vec<OffsetRecord>,
    assigned: Vec<AssignedConsumer>,
    unassigned: Vec<UnassignedConsumer>,
}

impl<C: ControlPlane> ClusterProxy<C> {
    pub fn new(endpoint: HostPort, timeouts: AdminTimeoutsConfig) -> Self {
        let id = Uuid::new_v4();
        trace!("[ClusterProxy] New proxy {} for '{}'", id, endpoint);
        Self {
            id,
            endpoint,
            timeouts,
            control: RwLock::new(None),
            snapshot: ClusterSnapshot::new(),
            node_properties: NodePropertyConsistency::new(),
            capabilities: DashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &HostPort {
        &self.endpoint
    }

    pub fn snapshot(&self) -> &ClusterSnapshot {
        &self.snapshot
    }

    /// Runs one full refresh pass with a freshly connected client.
    ///
    /// Validation failure aborts before any snapshot mutation, so the
    /// previous snapshot (if any) stays visible to readers. Callers must not
    /// invoke `refresh` concurrently with itself on the same proxy.
    pub async fn refresh(&self, client: C) -> Result<(), ClusterError> {
        self.release_prior().await;

        let client = Arc::new(client);
        self.ensure_advertised_listeners_reachable(&client).await?;

        self.snapshot.clear();
        self.node_properties.clear();
        self.capabilities.clear();
        *self.control.write() = Some(client.clone());

        self.describe_cluster_stage(&client).await;
        self.describe_topics_stage(&client).await;
        self.describe_consumers_stage(&client).await;

        self.snapshot.mark_refreshed();
        info!("[ClusterProxy] Refresh of '{}' complete", self.endpoint);
        Ok(())
    }

    // --- Read accessors (delegate to the snapshot) ---

    pub fn has_topic(&self, topic_name: &str) -> bool {
        self.snapshot.has_topic(topic_name)
    }

    pub fn partitions_for_topic(&self, topic_name: &str) -> i32 {
        self.snapshot.partitions_for_topic(topic_name)
    }

    pub fn nodes(&self) -> Vec<NodeInfo> {
        self.snapshot.nodes()
    }

    pub fn topic_properties(&self, topic_name: &str) -> Vec<ConfigEntry> {
        self.snapshot.topic_properties(topic_name)
    }

    pub fn consumers_for_topic(&self, topic_name: &str) -> Vec<AssignedConsumer> {
        self.snapshot.consumers_for_topic(topic_name)
    }

    pub fn unassigned_consumers(&self) -> Vec<UnassignedConsumer> {
        self.snapshot.unassigned_consumers()
    }

    pub fn offset_records(&self) -> Vec<OffsetRecord> {
        self.snapshot.offset_records()
    }

    pub fn aggregated_topic_summary(&self) -> Vec<TopicAggregate> {
        self.snapshot.aggregated_topic_summary()
    }

    pub fn consumer_group_details(&self) -> Vec<ConsumerGroupDetailRecord> {
        self.snapshot.consumer_group_details()
    }

    pub fn node_capability(&self, node_id: &str) -> Option<NodeCapabilityInfo> {
        self.capabilities.get(node_id).map(|c| c.clone())
    }

    pub fn is_topic_auto_creation_enabled(&self) -> TriState {
        if self.node_properties.is_empty() {
            return TriState::False;
        }
        self.node_properties.topic_auto_creation_enabled()
    }

    pub fn is_topic_deletion_enabled(&self) -> TriState {
        if self.node_properties.is_empty() {
            return TriState::False;
        }
        self.node_properties.topic_deletion_enabled()
    }

    /// Pushes the configuration-divergence diagnostic to `reporter`, only
    /// when there is something to report. Pull-based: nothing is delivered
    /// unless a caller asks.
    pub fn report_inconsistent_config_to<F: FnOnce(&str)>(&self, reporter: F) {
        if let Some(message) = self.inconsistent_config_message() {
            reporter(&message);
        }
    }

    pub fn inconsistent_config_message(&self) -> Option<String> {
        let differing = self.node_properties.properties_that_differ();
        if differing.is_empty() {
            return None;
        }
        Some(format!(
            "Cluster configuration is inconsistent!\n\
             Below properties are different between nodes but should be the same:\n\n\
             [{}]",
            differing.join(", ")
        ))
    }

    // --- Mutations ---

    pub async fn create_topic(&self, to_create: &TopicToCreate) -> Result<(), ClusterError> {
        self.topic_admin()?.create_topic(to_create).await
    }

    pub async fn delete_topic(&self, topic_name: &str) -> Result<(), ClusterError> {
        self.topic_admin()?.delete_topic(topic_name).await
    }

    /// Alterable properties of a topic, read from the snapshot. Fails fast
    /// on an unknown topic or property.
    pub fn alterable_topic_properties(
        &self,
        topic_name: &str,
    ) -> Result<TopicAlterableProperties, ClusterError> {
        let raw = self
            .snapshot
            .topic_property_by_name(topic_name, RETENTION_MS_CONFIG)?;
        let retention_ms = raw.parse::<u64>().map_err(|_| ClusterError::InvalidPropertyValue {
            topic: topic_name.to_string(),
            property: RETENTION_MS_CONFIG.to_string(),
            value: raw.clone(),
        })?;
        Ok(TopicAlterableProperties {
            topic_name: topic_name.to_string(),
            retention_ms,
        })
    }

    pub async fn update_topic(
        &self,
        properties: &TopicAlterableProperties,
    ) -> Result<(), ClusterError> {
        let control = self.current_control()?;
        timeout(
            self.timeouts.request_timeout(),
            control.alter_topic_config(
                &properties.topic_name,
                vec![ConfigEntry::new(RETENTION_MS_CONFIG, properties.retention_ms.to_string())],
            ),
        )
        .await
        .map_err(|_| ClusterError::Timeout { operation: "alter-topic-config" })?
        .map_err(ClusterError::ControlPlane)
    }

    // --- Pipeline stages ---

    async fn release_prior(&self) {
        let prior = self.control.write().take();
        if let Some(prior) = prior {
            trace!("[ClusterProxy] Closing previous control-plane connection");
            prior.close(self.timeouts.close_timeout()).await;
            trace!("[ClusterProxy] Closing done");
        }
    }

    /// Cluster usability check: the control plane may answer while none of
    /// the advertised listeners is usable from this process, which makes the
    /// cluster worthless to producers/consumers. Stops at the first
    /// reachable host.
    async fn ensure_advertised_listeners_reachable(
        &self,
        control: &Arc<C>,
    ) -> Result<(), ClusterError> {
        let described = timeout(self.timeouts.request_timeout(), control.describe_cluster())
            .await
            .map_err(|_| ClusterError::Timeout { operation: "describe-cluster" })?
            .map_err(ClusterError::ControlPlane)?;

        let mut advertised = Vec::new();
        for node in &described.nodes {
            let listener = node.advertised_listener();
            debug!("[ClusterProxy] Found advertised listener: {}", listener);
            if is_host_reachable(&node.host, node.port, self.timeouts.reachability_timeout()).await
            {
                trace!("[ClusterProxy] Listener '{}' is reachable", listener);
                return Ok(());
            }
            trace!("[ClusterProxy] Listener '{}' is not reachable", listener);
            advertised.push(listener);
        }
        Err(ClusterError::ClusterConfiguration { unreachable: advertised })
    }

    async fn describe_cluster_stage(&self, control: &Arc<C>) {
        let described = match timeout(self.timeouts.request_timeout(), control.describe_cluster())
            .await
        {
            Ok(Ok(described)) => described,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] describe-cluster failed: {}", e);
                return;
            }
            Err(_) => {
                warn!("[ClusterProxy] describe-cluster timed out");
                return;
            }
        };

        self.snapshot.set_cluster_id(&described.cluster_id);

        let controller_id = described.controller_id.as_deref();
        let mut probes: FuturesUnordered<_> = described
            .nodes
            .iter()
            .map(|node| self.probe_node(control, node, controller_id))
            .collect();

        while let Some(probe) = probes.next().await {
            if let Some(capability) = probe.capability {
                self.capabilities.insert(probe.node_id.clone(), capability);
            }
            if let Some(info) = probe.info {
                for entry in &info.config_entries {
                    self.node_properties.record(&entry.name, &entry.value);
                }
                self.snapshot.add_node(info);
            }
        }
    }

    async fn describe_topics_stage(&self, control: &Arc<C>) {
        let admin = TopicAdmin::new(control.clone(), self.timeouts.clone());
        let outcome = admin
            .describe_topics(|topic| self.snapshot.add_topic(topic))
            .await;
        if let Err(e) = outcome {
            warn!("[ClusterProxy] Topic enumeration failed: {}", e);
        }
    }

    async fn describe_consumers_stage(&self, control: &Arc<C>) {
        let group_ids = match timeout(
            self.timeouts.request_timeout(),
            control.list_consumer_groups(),
        )
        .await
        {
            Ok(Ok(ids)) => ids,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] Consumer-group enumeration failed: {}", e);
                Vec::new()
            }
            Err(_) => {
                warn!("[ClusterProxy] Consumer-group enumeration timed out");
                Vec::new()
            }
        };

        self.snapshot.set_consumer_group_ids(group_ids.clone());

        let mut probes: FuturesUnordered<_> = group_ids
            .iter()
            .map(|group_id| self.probe_group(control, group_id))
            .collect();

        let mut offset_records = Vec::new();
        while let Some(probe) = probes.next().await {
            offset_records.extend(probe.offset_records);
            for consumer in probe.assigned {
                self.snapshot.add_assigned_consumer(consumer);
            }
            for consumer in probe.unassigned {
                self.snapshot.add_unassigned_consumer(consumer);
            }
        }
        self.snapshot.set_offset_records(offset_records);
    }

    // --- Per-resource probes (task-local, no shared mutation) ---

    async fn probe_node(
        &self,
        control: &Arc<C>,
        node: &NodeDescription,
        controller_id: Option<&str>,
    ) -> NodeProbe {
        let mut probe = NodeProbe {
            node_id: node.node_id.clone(),
            capability: None,
            info: None,
        };

        // Protocol version first, full config only if the node passes the gate.
        let entries = match timeout(
            self.timeouts.request_timeout(),
            control.describe_broker_config(&node.node_id),
        )
        .await
        {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] Version probe of node '{}' failed: {}", node.node_id, e);
                return probe;
            }
            Err(_) => {
                warn!("[ClusterProxy] Version probe of node '{}' timed out", node.node_id);
                return probe;
            }
        };

        let Some(version) = entries
            .iter()
            .find(|e| e.name == INTER_NODE_PROTOCOL_VERSION_PROP)
        else {
            warn!(
                "[ClusterProxy] Node '{}' did not report a protocol version. Cannot show its properties",
                node.node_id
            );
            return probe;
        };

        debug!(
            "[ClusterProxy] Protocol version for node '{}': '{}'",
            node.node_id, version.value
        );
        let capability = NodeCapabilityInfo::new(&version.value);
        let capable = capability.supports_describe_config();
        probe.capability = Some(capability);

        if !capable {
            warn!(
                "[ClusterProxy] Node '{}' does not support config describes. Cannot show cluster properties",
                node.node_id
            );
            return probe;
        }

        let config_entries = match timeout(
            self.timeouts.request_timeout(),
            control.describe_broker_config(&node.node_id),
        )
        .await
        {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] Config fetch of node '{}' failed: {}", node.node_id, e);
                return probe;
            }
            Err(_) => {
                warn!("[ClusterProxy] Config fetch of node '{}' timed out", node.node_id);
                return probe;
            }
        };

        probe.info = Some(NodeInfo {
            is_controller: controller_id == Some(node.node_id.as_str()),
            node_id: node.node_id.clone(),
            config_entries,
        });
        probe
    }

    async fn probe_group(&self, control: &Arc<C>, group_id: &str) -> GroupProbe {
        let committed: HashMap<TopicPartition, Option<u64>> = match timeout(
            self.timeouts.request_timeout(),
            control.list_group_offsets(group_id),
        )
        .await
        {
            Ok(Ok(offsets)) => offsets,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] Offset fetch for group '{}' failed: {}", group_id, e);
                HashMap::new()
            }
            Err(_) => {
                warn!("[ClusterProxy] Offset fetch for group '{}' timed out", group_id);
                HashMap::new()
            }
        };
        debug!(
            "[ClusterProxy] Fetched {} committed offsets for group '{}'",
            committed.len(),
            group_id
        );

        let mut partitions: Vec<TopicPartition> = committed.keys().cloned().collect();
        partitions.sort();

        let bounds = if partitions.is_empty() {
            HashMap::new()
        } else {
            match timeout(
                self.timeouts.request_timeout(),
                control.fetch_partition_bounds(group_id, &partitions),
            )
            .await
            {
                Ok(Ok(bounds)) => bounds,
                Ok(Err(e)) => {
                    warn!("[ClusterProxy] Bounds fetch for group '{}' failed: {}", group_id, e);
                    HashMap::new()
                }
                Err(_) => {
                    warn!("[ClusterProxy] Bounds fetch for group '{}' timed out", group_id);
                    HashMap::new()
                }
            }
        };

        let mut offset_records = Vec::with_capacity(bounds.len());
        for partition in &partitions {
            let Some(bounds) = bounds.get(partition) else {
                continue;
            };
            let current_offset = committed.get(partition).copied().flatten();
            let lag = current_offset.map(|current| bounds.end.saturating_sub(current));
            offset_records.push(OffsetRecord {
                topic_name: partition.topic.clone(),
                partition: partition.partition,
                consumer_group: group_id.to_string(),
                begin_offset: bounds.begin,
                end_offset: bounds.end,
                current_offset,
                lag,
                message_count: bounds.end.saturating_sub(bounds.begin),
            });
        }

        let members = match timeout(
            self.timeouts.request_timeout(),
            control.describe_consumer_group(group_id),
        )
        .await
        {
            Ok(Ok(members)) => members,
            Ok(Err(e)) => {
                warn!("[ClusterProxy] Member fetch for group '{}' failed: {}", group_id, e);
                Vec::new()
            }
            Err(_) => {
                warn!("[ClusterProxy] Member fetch for group '{}' timed out", group_id);
                Vec::new()
            }
        };

        let mut assigned = Vec::new();
        let mut unassigned = Vec::new();
        for member in members {
            if member.assignment.is_empty() {
                unassigned.push(UnassignedConsumer {
                    consumer_group_id: group_id.to_string(),
                    consumer_id: member.consumer_id,
                    client_id: member.client_id,
                    host: member.host,
                });
            } else {
                for partition in &member.assignment {
                    assigned.push(AssignedConsumer {
                        consumer_group_id: group_id.to_string(),
                        consumer_id: member.consumer_id.clone(),
                        client_id: member.client_id.clone(),
                        host: member.host.clone(),
                        topic: partition.topic.clone(),
                        partition: partition.partition,
                        offset: committed.get(partition).copied().flatten(),
                    });
                }
            }
        }

        GroupProbe { offset_records, assigned, unassigned }
    }

    // --- Internal ---

    fn topic_admin(&self) -> Result<TopicAdmin<C>, ClusterError> {
        Ok(TopicAdmin::new(self.current_control()?, self.timeouts.clone()))
    }

    fn current_control(&self) -> Result<Arc<C>, ClusterError> {
        self.control
            .read()
            .clone()
            .ok_or(ClusterError::Disconnected)
    }
}
