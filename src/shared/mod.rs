pub mod ids;
pub mod random;

pub use ids::{validate_identifier_value, ConnectorTypeId, KafkaId, NamespaceId, TopicName};
pub use random::{duplicate_name, session_id};
