pub mod capability;
pub mod consistency;
pub mod factory;
pub mod proxy;
pub mod snapshot;
pub mod topic_admin;
pub mod types;

mod scheduler;

pub use capability::NodeCapabilityInfo;
pub use consistency::NodePropertyConsistency;
pub use factory::ProxyFactory;
pub use proxy::ClusterProxy;
pub use scheduler::RefreshScheduler;
pub use snapshot::{ClusterSnapshot, UNKNOWN_PARTITION_COUNT};
pub use topic_admin::TopicAdmin;
