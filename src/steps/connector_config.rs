use crate::configurator::ConfiguratorDescriptor;
use crate::steps::StepStatus;
use serde_json::Value;

/// Connector-specific configuration step. The configuration value is opaque
/// to the wizard; validity is whatever the rendered configurator reported
/// alongside the value. Multi-page federated configurators advance through a
/// substep cursor and only the last page can confirm.
pub struct ConnectorConfigStep {
    descriptor: ConfiguratorDescriptor,
    configuration: Option<Value>,
    configuration_valid: bool,
    substep: usize,
    status: StepStatus,
}

impl ConnectorConfigStep {
    pub fn new(descriptor: ConfiguratorDescriptor, initial: Option<Value>) -> Self {
        // A configuration carried over from a duplicated or edited connector
        // was valid when it was saved.
        let configuration_valid = initial.is_some();
        let mut step = Self {
            descriptor,
            configuration: initial,
            configuration_valid,
            substep: 0,
            status: StepStatus::Typing,
        };
        step.verify();
        step
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn descriptor(&self) -> &ConfiguratorDescriptor {
        &self.descriptor
    }

    pub fn configuration(&self) -> Option<&Value> {
        self.configuration.as_ref()
    }

    pub fn substep(&self) -> usize {
        self.substep
    }

    pub fn substep_name(&self) -> Option<&str> {
        self.descriptor.step_name(self.substep)
    }

    pub fn has_next_substep(&self) -> bool {
        self.substep + 1 < self.descriptor.step_count()
    }

    fn complete(&self) -> bool {
        self.configuration_valid && self.configuration.is_some() && !self.has_next_substep()
    }

    fn verify(&mut self) -> StepStatus {
        self.status = if self.complete() {
            StepStatus::Valid
        } else {
            StepStatus::Typing
        };
        self.status
    }

    /// The host reports the edited value together with the configurator's
    /// own validity verdict; the core never inspects the value.
    pub fn set_configuration(&mut self, value: Value, valid: bool) -> StepStatus {
        self.configuration = Some(value);
        self.configuration_valid = valid;
        self.verify()
    }

    /// Guarded by the current page's validity, like every forward move.
    pub fn next_substep(&mut self) -> Option<usize> {
        if !self.has_next_substep() || !self.configuration_valid {
            return None;
        }
        self.substep += 1;
        self.verify();
        Some(self.substep)
    }

    pub fn prev_substep(&mut self) -> Option<usize> {
        if self.substep == 0 {
            return None;
        }
        self.substep -= 1;
        self.verify();
        Some(self.substep)
    }

    pub fn confirm(&mut self) -> Option<Value> {
        if !self.complete() {
            return None;
        }
        self.status = StepStatus::Done;
        self.configuration.clone()
    }
}
