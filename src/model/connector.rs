use crate::shared::ids::ConnectorTypeId;
use serde::{Deserialize, Serialize};

/// Identity plus catalog metadata for a selectable connector type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorTypeRef {
    pub id: ConnectorTypeId,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ConnectorTypeRef {
    pub fn new(id: ConnectorTypeId, name: &str, version: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            version: version.to_string(),
            description: None,
        }
    }
}
