pub mod context;
pub mod coordinator;

pub use context::{CachedConfigurator, ConnectorPayload, ContextError, WizardContext};
pub use coordinator::{
    Collaborators, ConnectorSaver, SaveCompletion, StepFailure, WizardCoordinator, WizardEffect,
    WizardEvent, WizardMode, WizardStage,
};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("event `{event}` is not applicable in stage `{stage}`")]
    EventNotApplicable {
        stage: &'static str,
        event: &'static str,
    },
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("wizard randomness unavailable: {0}")]
    Randomness(String),
}
