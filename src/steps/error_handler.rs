use crate::model::{ErrorHandlerConfig, ErrorHandlerKind};
use crate::shared::ids::TopicName;
use crate::steps::StepStatus;

/// Error-handling step: any defined strategy passes, except that the
/// dead-letter queue additionally needs a well-formed target topic.
pub struct ErrorHandlerStep {
    kind: Option<ErrorHandlerKind>,
    topic: String,
    status: StepStatus,
}

impl ErrorHandlerStep {
    pub fn new(initial: Option<&ErrorHandlerConfig>) -> Self {
        let mut step = Self {
            kind: initial.map(|config| config.kind),
            topic: initial
                .and_then(|config| config.dead_letter_topic.as_ref())
                .map(|topic| topic.as_str().to_string())
                .unwrap_or_default(),
            status: StepStatus::Typing,
        };
        step.verify();
        step
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn kind(&self) -> Option<ErrorHandlerKind> {
        self.kind
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn parsed_topic(&self) -> Option<TopicName> {
        TopicName::parse(&self.topic).ok()
    }

    fn complete(&self) -> bool {
        match self.kind {
            None => false,
            Some(ErrorHandlerKind::DeadLetterQueue) => self.parsed_topic().is_some(),
            Some(_) => true,
        }
    }

    fn verify(&mut self) -> StepStatus {
        self.status = if self.complete() {
            StepStatus::Valid
        } else {
            StepStatus::Typing
        };
        self.status
    }

    /// Switching strategies keeps the typed topic text so flipping to DLQ
    /// and back does not lose it.
    pub fn set_kind(&mut self, kind: ErrorHandlerKind) -> StepStatus {
        self.kind = Some(kind);
        self.verify()
    }

    pub fn set_topic(&mut self, topic: &str) -> StepStatus {
        self.topic = topic.to_string();
        self.verify()
    }

    pub fn confirm(&mut self) -> Option<ErrorHandlerConfig> {
        if !self.complete() {
            return None;
        }
        let kind = self.kind?;
        let dead_letter_topic = if kind.requires_topic() {
            self.parsed_topic()
        } else {
            None
        };
        self.status = StepStatus::Done;
        Some(ErrorHandlerConfig {
            kind,
            dead_letter_topic,
        })
    }
}
