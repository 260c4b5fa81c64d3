use crate::shared::ids::{KafkaId, NamespaceId};
use serde::{Deserialize, Serialize};

/// A messaging cluster the connector will attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaInstance {
    pub id: KafkaId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_server: Option<String>,
}

impl KafkaInstance {
    pub fn new(id: KafkaId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            bootstrap_server: None,
        }
    }
}

/// A deployment namespace inside a cluster, possibly expiring (eval namespaces).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: NamespaceId,
    pub name: String,
    pub cluster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

impl Namespace {
    pub fn new(id: NamespaceId, name: &str, cluster_id: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            cluster_id: cluster_id.to_string(),
            expiration: None,
        }
    }
}
