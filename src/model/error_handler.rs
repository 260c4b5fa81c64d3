use crate::shared::ids::TopicName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlerKind {
    Stop,
    Log,
    DeadLetterQueue,
}

impl ErrorHandlerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorHandlerKind::Stop => "stop",
            ErrorHandlerKind::Log => "log",
            ErrorHandlerKind::DeadLetterQueue => "dead_letter_queue",
        }
    }

    pub fn requires_topic(self) -> bool {
        self == ErrorHandlerKind::DeadLetterQueue
    }
}

/// Output of the error-handling step. The topic is only meaningful for
/// the dead-letter-queue strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorHandlerConfig {
    pub kind: ErrorHandlerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_topic: Option<TopicName>,
}

impl ErrorHandlerConfig {
    pub fn stop() -> Self {
        Self {
            kind: ErrorHandlerKind::Stop,
            dead_letter_topic: None,
        }
    }

    pub fn log() -> Self {
        Self {
            kind: ErrorHandlerKind::Log,
            dead_letter_topic: None,
        }
    }

    pub fn dead_letter_queue(topic: TopicName) -> Self {
        Self {
            kind: ErrorHandlerKind::DeadLetterQueue,
            dead_letter_topic: Some(topic),
        }
    }

    /// Management-API shape: `{"stop":{}}`, `{"log":{}}` or
    /// `{"dead_letter_queue":{"topic":"..."}}`.
    pub fn as_payload_value(&self) -> Value {
        match (self.kind, self.dead_letter_topic.as_ref()) {
            (ErrorHandlerKind::DeadLetterQueue, Some(topic)) => {
                json!({ "dead_letter_queue": { "topic": topic.as_str() } })
            }
            (ErrorHandlerKind::DeadLetterQueue, None) => {
                json!({ "dead_letter_queue": {} })
            }
            (ErrorHandlerKind::Stop, _) => json!({ "stop": {} }),
            (ErrorHandlerKind::Log, _) => json!({ "log": {} }),
        }
    }
}
