pub mod connector_config;
pub mod core_config;
pub mod error_handler;
pub mod selection;

pub use connector_config::ConnectorConfigStep;
pub use core_config::CoreConfigStep;
pub use error_handler::ErrorHandlerStep;
pub use selection::SelectionStep;

/// Common shape of every wizard step: re-verified on each field update,
/// `Valid` unlocks the parent's advance affordance, `Done` is terminal and
/// only reachable through a successful `confirm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Typing,
    Valid,
    Done,
}

impl StepStatus {
    pub fn is_valid(self) -> bool {
        self == StepStatus::Valid
    }
}
