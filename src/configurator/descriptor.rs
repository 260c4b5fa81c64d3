use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which configuration UI the host should render for a connector type.
/// The core never interprets either variant beyond carrying it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Configurator {
    /// Schema-driven generic form; the schema is the connector type's own.
    GenericForm { schema: Value },
    /// Dynamically loaded federated module, referenced by name.
    Federated { module: String },
}

/// Result of configurator resolution. `steps: None` means the configurator
/// renders as a single page; `Some(..)` names the pages of a multi-page
/// federated configurator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    pub configurator: Configurator,
}

impl ConfiguratorDescriptor {
    pub fn generic_form(schema: Value) -> Self {
        Self {
            steps: None,
            configurator: Configurator::GenericForm { schema },
        }
    }

    pub fn federated(module: &str, steps: Vec<String>) -> Self {
        Self {
            steps: Some(steps),
            configurator: Configurator::Federated {
                module: module.to_string(),
            },
        }
    }

    pub fn step_count(&self) -> usize {
        match self.steps.as_ref() {
            Some(steps) if !steps.is_empty() => steps.len(),
            _ => 1,
        }
    }

    pub fn step_name(&self, index: usize) -> Option<&str> {
        self.steps
            .as_ref()
            .and_then(|steps| steps.get(index))
            .map(String::as_str)
    }
}
