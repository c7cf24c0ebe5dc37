#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use kafscope::config::AdminTimeoutsConfig;
use kafscope::control_plane::{
    ClusterDescription, ConfigEntry, ControlPlane, ControlPlaneConnector, ControlPlaneError,
    HostPort, MemberDescription, NewTopicRequest, NodeDescription, PartitionBounds,
    PartitionDescription, TopicDescription, TopicPartition,
};

pub fn test_timeouts() -> AdminTimeoutsConfig {
    AdminTimeoutsConfig {
        request_timeout_ms: 1000,
        close_timeout_ms: 100,
        reachability_timeout_ms: 500,
        delete_topic_timeout_ms: 1000,
        refresh_interval_secs: 30,
    }
}

/// Keeps the listener alive so the advertised address stays reachable.
pub async fn reachable_port() -> (tokio::net::TcpListener, u16) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Bind-then-drop to learn a port that is certainly closed.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn member(
    consumer_id: &str,
    client_id: &str,
    host: &str,
    assignment: &[(&str, u32)],
) -> MemberDescription {
    MemberDescription {
        consumer_id: consumer_id.to_string(),
        client_id: client_id.to_string(),
        host: host.to_string(),
        assignment: assignment
            .iter()
            .map(|(topic, partition)| TopicPartition::new(*topic, *partition))
            .collect(),
    }
}

// ==========================================
// FAKE CONTROL PLANE (scriptable, shared state)
// ==========================================

#[derive(Default)]
struct FakeState {
    cluster_id: String,
    controller_id: Option<String>,
    nodes: Vec<NodeDescription>,
    broker_configs: HashMap<String, Vec<ConfigEntry>>,
    topics: HashMap<String, TopicDescription>,
    topic_configs: HashMap<String, Vec<ConfigEntry>>,
    groups: Vec<String>,
    group_members: HashMap<String, Vec<MemberDescription>>,
    group_offsets: HashMap<String, HashMap<TopicPartition, Option<u64>>>,
    bounds: HashMap<TopicPartition, PartitionBounds>,
    broker_config_errors: HashMap<String, ControlPlaneError>,
    describe_topic_errors: HashMap<String, ControlPlaneError>,
    topic_config_errors: HashMap<String, ControlPlaneError>,
    group_offset_errors: HashMap<String, ControlPlaneError>,
    create_results: VecDeque<Result<(), ControlPlaneError>>,
    delete_results: VecDeque<Result<(), ControlPlaneError>>,
    create_requests: Vec<NewTopicRequest>,
    alter_calls: Vec<(String, Vec<ConfigEntry>)>,
    close_count: usize,
}

/// In-memory control plane. Clones share state, so a "fresh client" handed
/// out by the fake connector still answers from the same scripted cluster.
#[derive(Clone, Default)]
pub struct FakeControlPlane {
    state: Arc<Mutex<FakeState>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    // --- scripting ---

    pub fn set_cluster(&self, cluster_id: &str, controller_id: Option<&str>) {
        let mut state = self.state.lock();
        state.cluster_id = cluster_id.to_string();
        state.controller_id = controller_id.map(str::to_string);
    }

    pub fn add_node(&self, node_id: &str, host: &str, port: u16) {
        self.state.lock().nodes.push(NodeDescription {
            node_id: node_id.to_string(),
            host: host.to_string(),
            port,
        });
    }

    pub fn set_broker_config(&self, node_id: &str, entries: &[(&str, &str)]) {
        self.state.lock().broker_configs.insert(
            node_id.to_string(),
            entries.iter().map(|(n, v)| ConfigEntry::new(*n, *v)).collect(),
        );
    }

    pub fn add_topic(&self, name: &str, partitions: u32) {
        self.state.lock().topics.insert(
            name.to_string(),
            TopicDescription {
                name: name.to_string(),
                partitions: (0..partitions)
                    .map(|p| PartitionDescription {
                        partition: p,
                        leader: Some("1".to_string()),
                        replicas: vec!["1".to_string()],
                    })
                    .collect(),
            },
        );
    }

    pub fn remove_topic(&self, name: &str) {
        let mut state = self.state.lock();
        state.topics.remove(name);
        state.topic_configs.remove(name);
    }

    pub fn set_topic_config(&self, name: &str, entries: &[(&str, &str)]) {
        self.state.lock().topic_configs.insert(
            name.to_string(),
            entries.iter().map(|(n, v)| ConfigEntry::new(*n, *v)).collect(),
        );
    }

    pub fn add_group(&self, group_id: &str, members: Vec<MemberDescription>) {
        let mut state = self.state.lock();
        state.groups.push(group_id.to_string());
        state.group_members.insert(group_id.to_string(), members);
    }

    pub fn set_group_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: u32,
        offset: Option<u64>,
    ) {
        self.state
            .lock()
            .group_offsets
            .entry(group_id.to_string())
            .or_default()
            .insert(TopicPartition::new(topic, partition), offset);
    }

    pub fn set_bounds(&self, topic: &str, partition: u32, begin: u64, end: u64) {
        self.state
            .lock()
            .bounds
            .insert(TopicPartition::new(topic, partition), PartitionBounds { begin, end });
    }

    // Scripted failures for the observational calls; each one keeps failing
    // for the named resource until the test clears it.

    pub fn fail_broker_config(&self, node_id: &str, error: ControlPlaneError) {
        self.state
            .lock()
            .broker_config_errors
            .insert(node_id.to_string(), error);
    }

    pub fn fail_describe_topic(&self, name: &str, error: ControlPlaneError) {
        self.state
            .lock()
            .describe_topic_errors
            .insert(name.to_string(), error);
    }

    pub fn fail_topic_config(&self, name: &str, error: ControlPlaneError) {
        self.state
            .lock()
            .topic_config_errors
            .insert(name.to_string(), error);
    }

    pub fn fail_group_offsets(&self, group_id: &str, error: ControlPlaneError) {
        self.state
            .lock()
            .group_offset_errors
            .insert(group_id.to_string(), error);
    }

    pub fn push_create_result(&self, result: Result<(), ControlPlaneError>) {
        self.state.lock().create_results.push_back(result);
    }

    pub fn push_delete_result(&self, result: Result<(), ControlPlaneError>) {
        self.state.lock().delete_results.push_back(result);
    }

    // --- observation ---

    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    pub fn create_requests(&self) -> Vec<NewTopicRequest> {
        self.state.lock().create_requests.clone()
    }

    pub fn alter_calls(&self) -> Vec<(String, Vec<ConfigEntry>)> {
        self.state.lock().alter_calls.clone()
    }
}

impl ControlPlane for FakeControlPlane {
    async fn describe_cluster(&self) -> Result<ClusterDescription, ControlPlaneError> {
        let state = self.state.lock();
        Ok(ClusterDescription {
            cluster_id: state.cluster_id.clone(),
            controller_id: state.controller_id.clone(),
            nodes: state.nodes.clone(),
        })
    }

    async fn describe_broker_config(
        &self,
        node_id: &str,
    ) -> Result<Vec<ConfigEntry>, ControlPlaneError> {
        let state = self.state.lock();
        if let Some(error) = state.broker_config_errors.get(node_id) {
            return Err(error.clone());
        }
        Ok(state.broker_configs.get(node_id).cloned().unwrap_or_default())
    }

    async fn list_topics(&self) -> Result<Vec<String>, ControlPlaneError> {
        let mut names: Vec<String> = self.state.lock().topics.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn describe_topic(&self, name: &str) -> Result<TopicDescription, ControlPlaneError> {
        let state = self.state.lock();
        if let Some(error) = state.describe_topic_errors.get(name) {
            return Err(error.clone());
        }
        state
            .topics
            .get(name)
            .cloned()
            .ok_or_else(|| ControlPlaneError::UnknownTopic(name.to_string()))
    }

    async fn describe_topic_config(
        &self,
        name: &str,
    ) -> Result<Vec<ConfigEntry>, ControlPlaneError> {
        let state = self.state.lock();
        if let Some(error) = state.topic_config_errors.get(name) {
            return Err(error.clone());
        }
        Ok(state.topic_configs.get(name).cloned().unwrap_or_default())
    }

    async fn alter_topic_config(
        &self,
        name: &str,
        entries: Vec<ConfigEntry>,
    ) -> Result<(), ControlPlaneError> {
        self.state.lock().alter_calls.push((name.to_string(), entries));
        Ok(())
    }

    async fn list_consumer_groups(&self) -> Result<Vec<String>, ControlPlaneError> {
        Ok(self.state.lock().groups.clone())
    }

    async fn describe_consumer_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<MemberDescription>, ControlPlaneError> {
        Ok(self
            .state
            .lock()
            .group_members
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_group_offsets(
        &self,
        group_id: &str,
    ) -> Result<HashMap<TopicPartition, Option<u64>>, ControlPlaneError> {
        let state = self.state.lock();
        if let Some(error) = state.group_offset_errors.get(group_id) {
            return Err(error.clone());
        }
        Ok(state.group_offsets.get(group_id).cloned().unwrap_or_default())
    }

    async fn fetch_partition_bounds(
        &self,
        _group_id: &str,
        partitions: &[TopicPartition],
    ) -> Result<HashMap<TopicPartition, PartitionBounds>, ControlPlaneError> {
        let state = self.state.lock();
        Ok(partitions
            .iter()
            .filter_map(|tp| state.bounds.get(tp).map(|b| (tp.clone(), *b)))
            .collect())
    }

    async fn create_topic(&self, request: &NewTopicRequest) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        state.create_requests.push(request.clone());
        if let Some(result) = state.create_results.pop_front() {
            return result;
        }
        state.topics.insert(
            request.name.clone(),
            TopicDescription {
                name: request.name.clone(),
                partitions: (0..request.partitions)
                    .map(|p| PartitionDescription {
                        partition: p,
                        leader: Some("1".to_string()),
                        replicas: vec!["1".to_string()],
                    })
                    .collect(),
            },
        );
        Ok(())
    }

    async fn delete_topic(&self, name: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        if let Some(result) = state.delete_results.pop_front() {
            return result;
        }
        state.topics.remove(name);
        Ok(())
    }

    async fn close(&self, _grace: Duration) {
        self.state.lock().close_count += 1;
    }
}

// ==========================================
// FAKE CONNECTOR
// ==========================================

/// Clones share the connect counter, so a test can keep one handle while the
/// factory owns the other.
#[derive(Clone)]
pub struct FakeConnector {
    client: FakeControlPlane,
    connect_count: Arc<Mutex<usize>>,
}

impl FakeConnector {
    pub fn new(client: FakeControlPlane) -> Self {
        Self {
            client,
            connect_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn connect_count(&self) -> usize {
        *self.connect_count.lock()
    }
}

impl ControlPlaneConnector for FakeConnector {
    type Client = FakeControlPlane;

    async fn connect(&self, _endpoint: &HostPort) -> Result<FakeControlPlane, ControlPlaneError> {
        *self.connect_count.lock() += 1;
        Ok(self.client.clone())
    }
}
