use crate::configurator::ConfiguratorDescriptor;
use crate::model::{
    ConnectorTypeRef, CoreConfiguration, ErrorHandlerConfig, KafkaInstance, Namespace,
    ServiceAccount,
};
use crate::shared::ids::ConnectorTypeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configurator descriptor cached for the connector type it was resolved
/// for; discarded whenever the selection changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedConfigurator {
    pub connector_type: ConnectorTypeId,
    pub descriptor: ConfiguratorDescriptor,
}

/// Everything the wizard has collected so far. Owned exclusively by the
/// coordinator: each field is written by exactly one step's completion and
/// read by later steps or the final save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardContext {
    pub connector_type: Option<ConnectorTypeRef>,
    pub kafka: Option<KafkaInstance>,
    pub namespace: Option<Namespace>,
    pub core_configuration: Option<CoreConfiguration>,
    pub connector_configuration: Option<Value>,
    pub error_handler: Option<ErrorHandlerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurator: Option<CachedConfigurator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saving_error: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("wizard context is missing {field}")]
    MissingField { field: &'static str },
}

impl WizardContext {
    /// Prefill for duplicate/edit entry: rebuilds a context from a stored
    /// connector definition plus the catalog objects the host resolved for
    /// its ids. Every stage starts answered; the configurator cache stays
    /// empty so the descriptor is re-resolved for the current catalog.
    pub fn prefill(
        connector_type: ConnectorTypeRef,
        kafka: KafkaInstance,
        namespace: Namespace,
        core_configuration: CoreConfiguration,
        connector_configuration: Value,
        error_handler: ErrorHandlerConfig,
    ) -> Self {
        Self {
            connector_type: Some(connector_type),
            kafka: Some(kafka),
            namespace: Some(namespace),
            core_configuration: Some(core_configuration),
            connector_configuration: Some(connector_configuration),
            error_handler: Some(error_handler),
            configurator: None,
            saving_error: None,
        }
    }

    pub fn cached_descriptor_for(&self, id: &ConnectorTypeId) -> Option<&ConfiguratorDescriptor> {
        self.configurator
            .as_ref()
            .filter(|cached| &cached.connector_type == id)
            .map(|cached| &cached.descriptor)
    }

    /// Assembles the save payload. Fails naming the first missing field;
    /// the coordinator's confirm-gated flow means this cannot fail once the
    /// review stage is reached.
    pub fn assemble(&self) -> Result<ConnectorPayload, ContextError> {
        let connector_type = self
            .connector_type
            .as_ref()
            .ok_or(ContextError::MissingField {
                field: "connector type",
            })?;
        let kafka = self.kafka.as_ref().ok_or(ContextError::MissingField {
            field: "kafka instance",
        })?;
        let namespace = self.namespace.as_ref().ok_or(ContextError::MissingField {
            field: "namespace",
        })?;
        let core = self
            .core_configuration
            .as_ref()
            .ok_or(ContextError::MissingField {
                field: "core configuration",
            })?;
        let connector = self
            .connector_configuration
            .clone()
            .ok_or(ContextError::MissingField {
                field: "connector configuration",
            })?;
        let error_handler = self
            .error_handler
            .as_ref()
            .ok_or(ContextError::MissingField {
                field: "error handler",
            })?;

        // Empty credentials mean "keep the stored service account" in edit
        // mode; the API then omits the field.
        let service_account = if core.service_account.is_empty() {
            None
        } else {
            Some(core.service_account.clone())
        };

        Ok(ConnectorPayload {
            name: core.name.clone(),
            connector_type_id: connector_type.id.clone(),
            kafka_id: kafka.id.as_str().to_string(),
            namespace_id: namespace.id.as_str().to_string(),
            service_account,
            connector,
            error_handler: error_handler.as_payload_value(),
        })
    }
}

/// Fully assembled connector definition handed to the save collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorPayload {
    pub name: String,
    pub connector_type_id: ConnectorTypeId,
    pub kafka_id: String,
    pub namespace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<ServiceAccount>,
    pub connector: Value,
    pub error_handler: Value,
}
