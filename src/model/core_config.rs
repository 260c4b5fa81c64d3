use serde::{Deserialize, Serialize};

/// Credentials the connector uses against the messaging cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub client_id: String,
    pub client_secret: String,
}

impl ServiceAccount {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_empty() && self.client_secret.is_empty()
    }
}

/// Output of the core-configuration step: connector name plus credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfiguration {
    pub name: String,
    pub service_account: ServiceAccount,
    #[serde(default)]
    pub account_confirmed: bool,
}
