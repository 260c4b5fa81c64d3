pub mod connector;
pub mod core_config;
pub mod error_handler;
pub mod targets;

pub use connector::ConnectorTypeRef;
pub use core_config::{CoreConfiguration, ServiceAccount};
pub use error_handler::{ErrorHandlerConfig, ErrorHandlerKind};
pub use targets::{KafkaInstance, Namespace};
