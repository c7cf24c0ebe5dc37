use crate::control_plane::ControlPlaneError;

/// Failure taxonomy of the administration proxy.
///
/// `ClusterConfiguration` is fatal for a refresh; the topic variants are the
/// two disambiguated outcomes of a create conflict; lookup variants signal
/// caller misuse against the snapshot, not infrastructure flakiness.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    ClusterConfiguration { unreachable: Vec<String> },
    TopicAlreadyExists(String),
    TopicMarkedForDeletion(String),
    TopicNotFound(String),
    PropertyNotFound { topic: String, property: String },
    InvalidPropertyValue { topic: String, property: String, value: String },
    Timeout { operation: &'static str },
    Disconnected,
    ControlPlane(ControlPlaneError),
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterError::ClusterConfiguration { unreachable } => write!(
                f,
                "Cluster config for advertised listeners is invalid.\n\
                 * None of the advertised listeners [{}] are reachable from this process.\n\
                 * Producers/consumers will be unable to use this cluster.",
                unreachable.join(", ")
            ),
            ClusterError::TopicAlreadyExists(name) => {
                write!(f, "topic '{}' already exists", name)
            }
            ClusterError::TopicMarkedForDeletion(name) => write!(
                f,
                "topic '{}' already exists but is marked for deletion.\n\
                 Note: if broker property 'delete.topic.enable' is 'false' it will never be deleted",
                name
            ),
            ClusterError::TopicNotFound(name) => write!(f, "topic '{}' not found", name),
            ClusterError::PropertyNotFound { topic, property } => {
                write!(f, "property '{}' not found for topic '{}'", property, topic)
            }
            ClusterError::InvalidPropertyValue { topic, property, value } => write!(
                f,
                "property '{}' of topic '{}' has unusable value '{}'",
                property, topic, value
            ),
            ClusterError::Timeout { operation } => write!(f, "operation '{}' timed out", operation),
            ClusterError::Disconnected => write!(f, "no active control-plane connection"),
            ClusterError::ControlPlane(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClusterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClusterError::ControlPlane(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ControlPlaneError> for ClusterError {
    fn from(error: ControlPlaneError) -> Self {
        ClusterError::ControlPlane(error)
    }
}
