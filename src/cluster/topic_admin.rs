//! Topic lifecycle operations plus the conflict-resolution protocol for
//! "topic already exists": a create failure is disambiguated with a secondary
//! existence probe, so a genuine duplicate and a create/delete race surface
//! as different errors.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::cluster::types::{
    CleanupPolicy, TopicInfo, TopicToCreate, CLEANUP_POLICY_COMPACT, CLEANUP_POLICY_CONFIG,
};
use crate::config::AdminTimeoutsConfig;
use crate::control_plane::{ConfigEntry, ControlPlane, ControlPlaneError, NewTopicRequest};
use crate::errors::ClusterError;

pub struct TopicAdmin<C: ControlPlane> {
    control: Arc<C>,
    timeouts: AdminTimeoutsConfig,
}

impl<C: ControlPlane> TopicAdmin<C> {
    pub fn new(control: Arc<C>, timeouts: AdminTimeoutsConfig) -> Self {
        Self { control, timeouts }
    }

    pub async fn create_topic(&self, to_create: &TopicToCreate) -> Result<(), ClusterError> {
        info!(
            "[TopicAdmin] Creating topic '{}' [partitions:{}, replication factor:{}, cleanup policy:{:?}]",
            to_create.name, to_create.partitions, to_create.replication_factor, to_create.cleanup_policy
        );

        let request = NewTopicRequest {
            name: to_create.name.clone(),
            partitions: to_create.partitions,
            replication_factor: to_create.replication_factor,
            configs: config_overrides(to_create),
        };

        let outcome = timeout(
            self.timeouts.request_timeout(),
            self.control.create_topic(&request),
        )
        .await
        .map_err(|_| ClusterError::Timeout { operation: "create-topic" })?;

        match outcome {
            Ok(()) => {
                info!("[TopicAdmin] Topic '{}' created", to_create.name);
                Ok(())
            }
            Err(ControlPlaneError::TopicExists(_)) => {
                // The name is taken, but the topic may be mid-deletion.
                if self.topic_exists_on_cluster(&to_create.name).await? {
                    Err(ClusterError::TopicAlreadyExists(to_create.name.clone()))
                } else {
                    Err(ClusterError::TopicMarkedForDeletion(to_create.name.clone()))
                }
            }
            Err(e) => Err(ClusterError::ControlPlane(e)),
        }
    }

    pub async fn delete_topic(&self, topic_name: &str) -> Result<(), ClusterError> {
        info!("[TopicAdmin] Deleting topic '{}'", topic_name);
        timeout(
            self.timeouts.delete_topic_timeout(),
            self.control.delete_topic(topic_name),
        )
        .await
        .map_err(|_| ClusterError::Timeout { operation: "delete-topic" })?
        .map_err(ClusterError::ControlPlane)
    }

    /// Enumerates non-internal topics and describes each one concurrently;
    /// `on_topic` fires per topic as its full info becomes available, in no
    /// guaranteed order.
    pub async fn describe_topics<F>(&self, mut on_topic: F) -> Result<(), ClusterError>
    where
        F: FnMut(TopicInfo),
    {
        let names = timeout(self.timeouts.request_timeout(), self.control.list_topics())
            .await
            .map_err(|_| ClusterError::Timeout { operation: "list-topics" })?
            .map_err(ClusterError::ControlPlane)?;

        let mut describes: FuturesUnordered<_> = names
            .into_iter()
            .map(|name| self.describe_one_topic(name))
            .collect();

        while let Some(topic) = describes.next().await {
            if let Some(topic) = topic {
                on_topic(topic);
            }
        }
        Ok(())
    }

    /// Resource configuration of one topic; empty on failure, which is
    /// tolerated (the topic still shows up without properties).
    pub async fn topic_config_entries(&self, topic_name: &str) -> Vec<ConfigEntry> {
        match timeout(
            self.timeouts.request_timeout(),
            self.control.describe_topic_config(topic_name),
        )
        .await
        {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                error!("[TopicAdmin] Could not retrieve config for topic '{}': {}", topic_name, e);
                Vec::new()
            }
            Err(_) => {
                error!("[TopicAdmin] Config fetch for topic '{}' timed out", topic_name);
                Vec::new()
            }
        }
    }

    async fn describe_one_topic(&self, name: String) -> Option<TopicInfo> {
        let (description, config_entries) = futures_util::join!(
            timeout(
                self.timeouts.request_timeout(),
                self.control.describe_topic(&name),
            ),
            self.topic_config_entries(&name),
        );

        match description {
            Ok(Ok(description)) => Some(TopicInfo {
                topic_name: description.name,
                partitions: description.partitions,
                config_entries,
            }),
            Ok(Err(e)) => {
                warn!("[TopicAdmin] Describe of topic '{}' failed: {}", name, e);
                None
            }
            Err(_) => {
                warn!("[TopicAdmin] Describe of topic '{}' timed out", name);
                None
            }
        }
    }

    async fn topic_exists_on_cluster(&self, topic_name: &str) -> Result<bool, ClusterError> {
        let probed = timeout(
            self.timeouts.request_timeout(),
            self.control.describe_topic(topic_name),
        )
        .await
        .map_err(|_| ClusterError::Timeout { operation: "describe-topic" })?;

        match probed {
            Ok(_) => Ok(true),
            Err(ControlPlaneError::UnknownTopic(_)) => Ok(false),
            Err(e) => Err(ClusterError::ControlPlane(e)),
        }
    }
}

fn config_overrides(to_create: &TopicToCreate) -> HashMap<String, String> {
    let mut configs = HashMap::new();
    if to_create.cleanup_policy == CleanupPolicy::Compact {
        configs.insert(CLEANUP_POLICY_CONFIG.to_string(), CLEANUP_POLICY_COMPACT.to_string());
    }
    configs
}
