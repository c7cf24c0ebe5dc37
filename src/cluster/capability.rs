//! Per-node feature gate derived from the node's reported inter-node
//! protocol version. Nodes below the threshold cannot answer detailed
//! configuration queries and are skipped during a refresh.

pub const INTER_NODE_PROTOCOL_VERSION_PROP: &str = "inter.broker.protocol.version";

/// Last legacy minor release whose nodes already support config describes.
const LEGACY_CAPABLE_PREFIX: &str = "0.11";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCapabilityInfo {
    protocol_version: String,
}

impl NodeCapabilityInfo {
    pub fn new(protocol_version: impl Into<String>) -> Self {
        Self { protocol_version: protocol_version.into() }
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Whether the node's detailed configuration can be queried at all.
    pub fn supports_describe_config(&self) -> bool {
        if self.protocol_version.starts_with(LEGACY_CAPABLE_PREFIX) {
            return true;
        }
        self.protocol_version
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .map(|major| major > 0)
            .unwrap_or(false)
    }
}
