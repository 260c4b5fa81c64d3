use crate::configurator::{ConfiguratorLoader, ConfiguratorResolver, LoaderOutcome};
use crate::model::{ConnectorTypeRef, ErrorHandlerKind, KafkaInstance, Namespace};
use crate::pagination::{ListFilter, PageFetcher, PageRequest};
use crate::shared::random::{duplicate_name, session_id};
use crate::steps::{
    ConnectorConfigStep, CoreConfigStep, ErrorHandlerStep, SelectionStep, StepStatus,
};
use crate::telemetry::{AnalyticsEvent, AnalyticsSink, NullSink};
use crate::wizard::context::{CachedConfigurator, ConnectorPayload, WizardContext};
use crate::wizard::WizardError;
use chrono::Utc;
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Duplicate,
    Edit,
}

/// The wizard's steps in their fixed linear order, plus the two terminal
/// states. `Closed` is reachable from any stage; `Saved` only through a
/// successful save from `Review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStage {
    SelectConnectorType,
    SelectKafkaInstance,
    SelectNamespace,
    CoreConfiguration,
    ConnectorConfiguration,
    ErrorHandling,
    Review,
    Saved,
    Closed,
}

impl WizardStage {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardStage::SelectConnectorType => "select-connector-type",
            WizardStage::SelectKafkaInstance => "select-kafka-instance",
            WizardStage::SelectNamespace => "select-namespace",
            WizardStage::CoreConfiguration => "core-configuration",
            WizardStage::ConnectorConfiguration => "connector-configuration",
            WizardStage::ErrorHandling => "error-handling",
            WizardStage::Review => "review",
            WizardStage::Saved => "saved",
            WizardStage::Closed => "closed",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            WizardStage::SelectConnectorType => Some(WizardStage::SelectKafkaInstance),
            WizardStage::SelectKafkaInstance => Some(WizardStage::SelectNamespace),
            WizardStage::SelectNamespace => Some(WizardStage::CoreConfiguration),
            WizardStage::CoreConfiguration => Some(WizardStage::ConnectorConfiguration),
            WizardStage::ConnectorConfiguration => Some(WizardStage::ErrorHandling),
            WizardStage::ErrorHandling => Some(WizardStage::Review),
            WizardStage::Review | WizardStage::Saved | WizardStage::Closed => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            WizardStage::SelectConnectorType => None,
            WizardStage::SelectKafkaInstance => Some(WizardStage::SelectConnectorType),
            WizardStage::SelectNamespace => Some(WizardStage::SelectKafkaInstance),
            WizardStage::CoreConfiguration => Some(WizardStage::SelectNamespace),
            WizardStage::ConnectorConfiguration => Some(WizardStage::CoreConfiguration),
            WizardStage::ErrorHandling => Some(WizardStage::ConnectorConfiguration),
            WizardStage::Review => Some(WizardStage::ErrorHandling),
            WizardStage::Saved | WizardStage::Closed => None,
        }
    }
}

impl std::fmt::Display for WizardStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the coordinator: navigation, the save trigger, and
/// field updates forwarded to whichever step actor is active.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    Next,
    Prev,
    Close,
    Save,
    Query {
        page: u32,
        size: u32,
        search: Option<String>,
    },
    NextPage,
    PrevPage,
    Refresh,
    SelectConnectorType(ConnectorTypeRef),
    SelectKafka(KafkaInstance),
    SelectNamespace(Namespace),
    Deselect,
    SetName(String),
    SetClientId(String),
    SetClientSecret(String),
    SetAccountConfirmed(bool),
    SetConfiguration {
        value: Value,
        valid: bool,
    },
    SetErrorHandler(ErrorHandlerKind),
    SetDeadLetterTopic(String),
}

impl WizardEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardEvent::Next => "next",
            WizardEvent::Prev => "prev",
            WizardEvent::Close => "close",
            WizardEvent::Save => "save",
            WizardEvent::Query { .. } => "query",
            WizardEvent::NextPage => "next_page",
            WizardEvent::PrevPage => "prev_page",
            WizardEvent::Refresh => "refresh",
            WizardEvent::SelectConnectorType(_) => "select_connector_type",
            WizardEvent::SelectKafka(_) => "select_kafka",
            WizardEvent::SelectNamespace(_) => "select_namespace",
            WizardEvent::Deselect => "deselect",
            WizardEvent::SetName(_) => "set_name",
            WizardEvent::SetClientId(_) => "set_client_id",
            WizardEvent::SetClientSecret(_) => "set_client_secret",
            WizardEvent::SetAccountConfirmed(_) => "set_account_confirmed",
            WizardEvent::SetConfiguration { .. } => "set_configuration",
            WizardEvent::SetErrorHandler(_) => "set_error_handler",
            WizardEvent::SetDeadLetterTopic(_) => "set_dead_letter_topic",
        }
    }
}

/// What a `handle`/`pump` round did, for hosts that drive rendering off
/// transitions instead of polling the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    None,
    Ignored,
    StageChanged(WizardStage),
    SubstepChanged(usize),
    ConfiguratorReady,
    StepFailed { reason: String },
    SaveDispatched,
    SaveFailed { message: String },
    Closed,
}

/// Terminal failure of the configuration step, distinct from a retryable
/// save error. Cleared only by leaving the stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub stage: WizardStage,
    pub reason: String,
}

enum SaveDelivery {
    Succeeded { seq: u64 },
    Failed { seq: u64, message: String },
}

/// One-shot completion for the save collaborator.
pub struct SaveCompletion {
    seq: u64,
    tx: Sender<SaveDelivery>,
}

impl SaveCompletion {
    pub fn succeed(self) {
        let _ = self.tx.send(SaveDelivery::Succeeded { seq: self.seq });
    }

    pub fn fail(self, message: &str) {
        let _ = self.tx.send(SaveDelivery::Failed {
            seq: self.seq,
            message: message.to_string(),
        });
    }
}

/// Submits the assembled connector definition to the management API.
pub trait ConnectorSaver {
    fn save(&mut self, payload: &ConnectorPayload, completion: SaveCompletion);
}

/// The external collaborators the wizard calls through narrow interfaces.
pub struct Collaborators {
    pub connector_types: Box<dyn PageFetcher<ConnectorTypeRef, ListFilter>>,
    pub kafka_instances: Box<dyn PageFetcher<KafkaInstance, ListFilter>>,
    pub namespaces: Box<dyn PageFetcher<Namespace, ListFilter>>,
    pub configurators: Box<dyn ConfiguratorResolver>,
    pub saver: Box<dyn ConnectorSaver>,
}

enum ActiveStep {
    ConnectorTypes(SelectionStep<ConnectorTypeRef>),
    KafkaInstances(SelectionStep<KafkaInstance>),
    Namespaces(SelectionStep<Namespace>),
    Core(CoreConfigStep),
    ConfiguratorLoading(ConfiguratorLoader),
    ConfiguratorFailed(StepFailure),
    ConnectorConfig(ConnectorConfigStep),
    ErrorHandler(ErrorHandlerStep),
    Review,
    None,
}

/// Top-level wizard state machine. Owns the accumulated context (single
/// writer: child actors report results upward and only the coordinator's
/// merge actions fold them in) and exactly one active step actor, spawned
/// on stage entry and torn down on exit.
pub struct WizardCoordinator {
    mode: WizardMode,
    stage: WizardStage,
    context: WizardContext,
    active: ActiveStep,
    collaborators: Collaborators,
    telemetry: Box<dyn AnalyticsSink>,
    session_id: String,
    saving: bool,
    save_seq: u64,
    save_tx: Sender<SaveDelivery>,
    save_rx: Receiver<SaveDelivery>,
}

impl WizardCoordinator {
    pub fn new(collaborators: Collaborators) -> Result<Self, WizardError> {
        Self::with_context(WizardContext::default(), WizardMode::Create, collaborators)
    }

    /// Duplicate/edit entry point: the context comes pre-populated from an
    /// existing connector. Duplicate mode proposes a fresh name and forces
    /// the credentials to be re-confirmed; the machine shape is unchanged.
    pub fn with_context(
        mut context: WizardContext,
        mode: WizardMode,
        collaborators: Collaborators,
    ) -> Result<Self, WizardError> {
        let session_id =
            session_id(Utc::now().timestamp()).map_err(WizardError::Randomness)?;
        context.saving_error = None;
        if mode == WizardMode::Duplicate {
            if let Some(core) = context.core_configuration.as_mut() {
                core.name = duplicate_name(&core.name).map_err(WizardError::Randomness)?;
                core.account_confirmed = false;
            }
        }
        let (save_tx, save_rx) = channel();
        let mut coordinator = Self {
            mode,
            stage: WizardStage::SelectConnectorType,
            context,
            active: ActiveStep::None,
            collaborators,
            telemetry: Box::new(NullSink),
            session_id,
            saving: false,
            save_seq: 0,
            save_tx,
            save_rx,
        };
        coordinator.active = coordinator.build_step(WizardStage::SelectConnectorType);
        coordinator.note_entry_validity();
        Ok(coordinator)
    }

    pub fn with_telemetry(mut self, telemetry: Box<dyn AnalyticsSink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn saving_error(&self) -> Option<&str> {
        self.context.saving_error.as_deref()
    }

    pub fn step_failure(&self) -> Option<&StepFailure> {
        match &self.active {
            ActiveStep::ConfiguratorFailed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the active step has reported valid, i.e. whether the host
    /// should enable its "Next" control. Validity only unlocks the
    /// affordance; advancing remains a distinct `Next` event.
    pub fn can_advance(&self) -> bool {
        self.active_status()
            .map(StepStatus::is_valid)
            .unwrap_or(false)
    }

    /// Aggregate spinner: true while any child is waiting on a collaborator.
    pub fn is_loading(&self) -> bool {
        if self.saving {
            return true;
        }
        match &self.active {
            ActiveStep::ConnectorTypes(step) => step.is_loading(),
            ActiveStep::KafkaInstances(step) => step.is_loading(),
            ActiveStep::Namespaces(step) => step.is_loading(),
            ActiveStep::ConfiguratorLoading(loader) => loader.is_loading(),
            _ => false,
        }
    }

    pub fn connector_type_step(&self) -> Option<&SelectionStep<ConnectorTypeRef>> {
        match &self.active {
            ActiveStep::ConnectorTypes(step) => Some(step),
            _ => None,
        }
    }

    pub fn kafka_step(&self) -> Option<&SelectionStep<KafkaInstance>> {
        match &self.active {
            ActiveStep::KafkaInstances(step) => Some(step),
            _ => None,
        }
    }

    pub fn namespace_step(&self) -> Option<&SelectionStep<Namespace>> {
        match &self.active {
            ActiveStep::Namespaces(step) => Some(step),
            _ => None,
        }
    }

    pub fn core_step(&self) -> Option<&CoreConfigStep> {
        match &self.active {
            ActiveStep::Core(step) => Some(step),
            _ => None,
        }
    }

    pub fn connector_config_step(&self) -> Option<&ConnectorConfigStep> {
        match &self.active {
            ActiveStep::ConnectorConfig(step) => Some(step),
            _ => None,
        }
    }

    pub fn error_handler_step(&self) -> Option<&ErrorHandlerStep> {
        match &self.active {
            ActiveStep::ErrorHandler(step) => Some(step),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: WizardEvent) -> Result<WizardEffect, WizardError> {
        if matches!(self.stage, WizardStage::Saved | WizardStage::Closed) {
            return Err(WizardError::EventNotApplicable {
                stage: self.stage.as_str(),
                event: event.as_str(),
            });
        }
        match event {
            WizardEvent::Close => {
                self.teardown_active();
                // Supersede any in-flight save: its completion must not pull
                // a closed wizard into Saved or write a save error.
                self.saving = false;
                self.save_seq += 1;
                self.stage = WizardStage::Closed;
                Ok(WizardEffect::Closed)
            }
            WizardEvent::Next => Ok(self.advance()),
            WizardEvent::Prev => Ok(self.retreat()),
            WizardEvent::Save => self.dispatch_save(),
            other => self.forward_to_step(other),
        }
    }

    /// Drains every child inbox and folds the outcomes: paginated results
    /// into the active list step, configurator resolution into either a
    /// spawned configuration step or an escalated step failure, and save
    /// completions into `Saved` or a retryable `saving_error`.
    pub fn pump(&mut self) -> Vec<WizardEffect> {
        let mut effects = Vec::new();

        match &mut self.active {
            ActiveStep::ConnectorTypes(step) => {
                step.pump();
            }
            ActiveStep::KafkaInstances(step) => {
                step.pump();
            }
            ActiveStep::Namespaces(step) => {
                step.pump();
            }
            _ => {}
        }

        let loader_outcome = match &mut self.active {
            ActiveStep::ConfiguratorLoading(loader) => loader.pump(),
            _ => None,
        };
        if let Some(outcome) = loader_outcome {
            match outcome {
                LoaderOutcome::Ready(descriptor) => {
                    if let Some(connector_type) = self.context.connector_type.as_ref() {
                        self.context.configurator = Some(CachedConfigurator {
                            connector_type: connector_type.id.clone(),
                            descriptor: descriptor.clone(),
                        });
                    }
                    let step = ConnectorConfigStep::new(
                        descriptor,
                        self.context.connector_configuration.clone(),
                    );
                    let valid = step.status().is_valid();
                    self.active = ActiveStep::ConnectorConfig(step);
                    if valid {
                        self.record(WizardStage::ConnectorConfiguration.as_str(), "valid");
                    }
                    effects.push(WizardEffect::ConfiguratorReady);
                }
                LoaderOutcome::Fatal {
                    connector_type,
                    reason,
                } => {
                    let reason = format!(
                        "configurator resolution failed for connector type `{connector_type}`: {reason}"
                    );
                    self.active = ActiveStep::ConfiguratorFailed(StepFailure {
                        stage: WizardStage::ConnectorConfiguration,
                        reason: reason.clone(),
                    });
                    effects.push(WizardEffect::StepFailed { reason });
                }
            }
        }

        while let Ok(delivery) = self.save_rx.try_recv() {
            match delivery {
                SaveDelivery::Succeeded { seq } if seq == self.save_seq && self.saving => {
                    self.saving = false;
                    self.teardown_active();
                    self.stage = WizardStage::Saved;
                    self.record(WizardStage::Review.as_str(), "saved");
                    effects.push(WizardEffect::StageChanged(WizardStage::Saved));
                }
                SaveDelivery::Failed { seq, message } if seq == self.save_seq && self.saving => {
                    self.saving = false;
                    self.context.saving_error = Some(message.clone());
                    effects.push(WizardEffect::SaveFailed { message });
                }
                // Completion of a superseded save attempt.
                SaveDelivery::Succeeded { .. } | SaveDelivery::Failed { .. } => {}
            }
        }

        effects
    }

    fn advance(&mut self) -> WizardEffect {
        let active = std::mem::replace(&mut self.active, ActiveStep::None);
        match (self.stage, active) {
            (WizardStage::SelectConnectorType, ActiveStep::ConnectorTypes(mut step)) => {
                let Some(selection) = step.confirm() else {
                    self.active = ActiveStep::ConnectorTypes(step);
                    return WizardEffect::Ignored;
                };
                step.shutdown();
                self.record(WizardStage::SelectConnectorType.as_str(), "confirm");
                // Changing the connector type invalidates everything the
                // previous type's configurator produced.
                if self.context.connector_type.as_ref().map(|c| &c.id) != Some(&selection.id) {
                    self.context.configurator = None;
                    self.context.connector_configuration = None;
                }
                self.context.connector_type = Some(selection);
                self.enter(WizardStage::SelectKafkaInstance)
            }
            (WizardStage::SelectKafkaInstance, ActiveStep::KafkaInstances(mut step)) => {
                let Some(selection) = step.confirm() else {
                    self.active = ActiveStep::KafkaInstances(step);
                    return WizardEffect::Ignored;
                };
                step.shutdown();
                self.record(WizardStage::SelectKafkaInstance.as_str(), "confirm");
                self.context.kafka = Some(selection);
                self.enter(WizardStage::SelectNamespace)
            }
            (WizardStage::SelectNamespace, ActiveStep::Namespaces(mut step)) => {
                let Some(selection) = step.confirm() else {
                    self.active = ActiveStep::Namespaces(step);
                    return WizardEffect::Ignored;
                };
                step.shutdown();
                self.record(WizardStage::SelectNamespace.as_str(), "confirm");
                self.context.namespace = Some(selection);
                self.enter(WizardStage::CoreConfiguration)
            }
            (WizardStage::CoreConfiguration, ActiveStep::Core(mut step)) => {
                let Some(core) = step.confirm() else {
                    self.active = ActiveStep::Core(step);
                    return WizardEffect::Ignored;
                };
                self.record(WizardStage::CoreConfiguration.as_str(), "confirm");
                self.context.core_configuration = Some(core);
                self.enter(WizardStage::ConnectorConfiguration)
            }
            (WizardStage::ConnectorConfiguration, ActiveStep::ConnectorConfig(mut step)) => {
                if step.has_next_substep() {
                    let moved = step.next_substep();
                    let effect = match moved {
                        Some(substep) => WizardEffect::SubstepChanged(substep),
                        None => WizardEffect::Ignored,
                    };
                    self.active = ActiveStep::ConnectorConfig(step);
                    return effect;
                }
                let Some(value) = step.confirm() else {
                    self.active = ActiveStep::ConnectorConfig(step);
                    return WizardEffect::Ignored;
                };
                self.record(WizardStage::ConnectorConfiguration.as_str(), "confirm");
                self.context.connector_configuration = Some(value);
                self.enter(WizardStage::ErrorHandling)
            }
            (WizardStage::ErrorHandling, ActiveStep::ErrorHandler(mut step)) => {
                let Some(config) = step.confirm() else {
                    self.active = ActiveStep::ErrorHandler(step);
                    return WizardEffect::Ignored;
                };
                self.record(WizardStage::ErrorHandling.as_str(), "confirm");
                self.context.error_handler = Some(config);
                self.enter(WizardStage::Review)
            }
            // Loading or failed configurator, review, terminal stages: Next
            // has nothing to confirm.
            (_, active) => {
                self.active = active;
                WizardEffect::Ignored
            }
        }
    }

    fn retreat(&mut self) -> WizardEffect {
        if self.saving {
            return WizardEffect::Ignored;
        }
        // A multi-page configurator walks its own pages before the wizard
        // leaves the stage.
        if let ActiveStep::ConnectorConfig(step) = &mut self.active {
            if let Some(substep) = step.prev_substep() {
                return WizardEffect::SubstepChanged(substep);
            }
        }
        match self.stage.prev() {
            Some(prev) => self.enter(prev),
            None => WizardEffect::Ignored,
        }
    }

    fn dispatch_save(&mut self) -> Result<WizardEffect, WizardError> {
        if self.stage != WizardStage::Review {
            return Err(WizardError::EventNotApplicable {
                stage: self.stage.as_str(),
                event: "save",
            });
        }
        if self.saving {
            return Ok(WizardEffect::Ignored);
        }
        let payload = self.context.assemble()?;
        self.context.saving_error = None;
        self.save_seq += 1;
        let completion = SaveCompletion {
            seq: self.save_seq,
            tx: self.save_tx.clone(),
        };
        self.collaborators.saver.save(&payload, completion);
        self.saving = true;
        self.record(WizardStage::Review.as_str(), "save");
        Ok(WizardEffect::SaveDispatched)
    }

    fn forward_to_step(&mut self, event: WizardEvent) -> Result<WizardEffect, WizardError> {
        let stage = self.stage;
        let statuses: Result<(StepStatus, StepStatus), WizardError> =
            match (&mut self.active, event) {
                (ActiveStep::ConnectorTypes(step), WizardEvent::SelectConnectorType(item)) => {
                    let before = step.status();
                    Ok((before, step.select(item)))
                }
                (ActiveStep::ConnectorTypes(step), WizardEvent::Deselect) => {
                    let before = step.status();
                    Ok((before, step.deselect()))
                }
                (ActiveStep::ConnectorTypes(step), WizardEvent::Query { page, size, search }) => {
                    let before = step.status();
                    step.query(
                        PageRequest {
                            page,
                            size,
                            filter: ListFilter { search },
                        },
                        self.collaborators.connector_types.as_mut(),
                    );
                    Ok((before, before))
                }
                (ActiveStep::ConnectorTypes(step), WizardEvent::NextPage) => {
                    let before = step.status();
                    step.next_page(self.collaborators.connector_types.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::ConnectorTypes(step), WizardEvent::PrevPage) => {
                    let before = step.status();
                    step.prev_page(self.collaborators.connector_types.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::ConnectorTypes(step), WizardEvent::Refresh) => {
                    let before = step.status();
                    step.refresh(self.collaborators.connector_types.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::SelectKafka(item)) => {
                    let before = step.status();
                    Ok((before, step.select(item)))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::Deselect) => {
                    let before = step.status();
                    Ok((before, step.deselect()))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::Query { page, size, search }) => {
                    let before = step.status();
                    step.query(
                        PageRequest {
                            page,
                            size,
                            filter: ListFilter { search },
                        },
                        self.collaborators.kafka_instances.as_mut(),
                    );
                    Ok((before, before))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::NextPage) => {
                    let before = step.status();
                    step.next_page(self.collaborators.kafka_instances.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::PrevPage) => {
                    let before = step.status();
                    step.prev_page(self.collaborators.kafka_instances.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::KafkaInstances(step), WizardEvent::Refresh) => {
                    let before = step.status();
                    step.refresh(self.collaborators.kafka_instances.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::Namespaces(step), WizardEvent::SelectNamespace(item)) => {
                    let before = step.status();
                    Ok((before, step.select(item)))
                }
                (ActiveStep::Namespaces(step), WizardEvent::Deselect) => {
                    let before = step.status();
                    Ok((before, step.deselect()))
                }
                (ActiveStep::Namespaces(step), WizardEvent::Query { page, size, search }) => {
                    let before = step.status();
                    step.query(
                        PageRequest {
                            page,
                            size,
                            filter: ListFilter { search },
                        },
                        self.collaborators.namespaces.as_mut(),
                    );
                    Ok((before, before))
                }
                (ActiveStep::Namespaces(step), WizardEvent::NextPage) => {
                    let before = step.status();
                    step.next_page(self.collaborators.namespaces.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::Namespaces(step), WizardEvent::PrevPage) => {
                    let before = step.status();
                    step.prev_page(self.collaborators.namespaces.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::Namespaces(step), WizardEvent::Refresh) => {
                    let before = step.status();
                    step.refresh(self.collaborators.namespaces.as_mut());
                    Ok((before, before))
                }
                (ActiveStep::Core(step), WizardEvent::SetName(name)) => {
                    let before = step.status();
                    Ok((before, step.set_name(&name)))
                }
                (ActiveStep::Core(step), WizardEvent::SetClientId(client_id)) => {
                    let before = step.status();
                    Ok((before, step.set_client_id(&client_id)))
                }
                (ActiveStep::Core(step), WizardEvent::SetClientSecret(client_secret)) => {
                    let before = step.status();
                    Ok((before, step.set_client_secret(&client_secret)))
                }
                (ActiveStep::Core(step), WizardEvent::SetAccountConfirmed(confirmed)) => {
                    let before = step.status();
                    Ok((before, step.set_account_confirmed(confirmed)))
                }
                (
                    ActiveStep::ConnectorConfig(step),
                    WizardEvent::SetConfiguration { value, valid },
                ) => {
                    let before = step.status();
                    Ok((before, step.set_configuration(value, valid)))
                }
                (ActiveStep::ErrorHandler(step), WizardEvent::SetErrorHandler(kind)) => {
                    let before = step.status();
                    Ok((before, step.set_kind(kind)))
                }
                (ActiveStep::ErrorHandler(step), WizardEvent::SetDeadLetterTopic(topic)) => {
                    let before = step.status();
                    Ok((before, step.set_topic(&topic)))
                }
                (_, event) => Err(WizardError::EventNotApplicable {
                    stage: stage.as_str(),
                    event: event.as_str(),
                }),
            };
        let (before, after) = statuses?;
        if !before.is_valid() && after.is_valid() {
            self.record(stage.as_str(), "valid");
        }
        Ok(WizardEffect::None)
    }

    fn enter(&mut self, stage: WizardStage) -> WizardEffect {
        self.teardown_active();
        self.stage = stage;
        self.active = self.build_step(stage);
        self.note_entry_validity();
        WizardEffect::StageChanged(stage)
    }

    fn build_step(&mut self, stage: WizardStage) -> ActiveStep {
        match stage {
            WizardStage::SelectConnectorType => ActiveStep::ConnectorTypes(SelectionStep::new(
                WizardStage::SelectConnectorType.as_str(),
                self.context.connector_type.clone(),
            )),
            WizardStage::SelectKafkaInstance => ActiveStep::KafkaInstances(SelectionStep::new(
                WizardStage::SelectKafkaInstance.as_str(),
                self.context.kafka.clone(),
            )),
            WizardStage::SelectNamespace => ActiveStep::Namespaces(SelectionStep::new(
                WizardStage::SelectNamespace.as_str(),
                self.context.namespace.clone(),
            )),
            WizardStage::CoreConfiguration => {
                let require_confirmation = self.mode == WizardMode::Duplicate;
                let credentials_optional = self.mode == WizardMode::Edit;
                match self.context.core_configuration.as_ref() {
                    Some(core) => ActiveStep::Core(CoreConfigStep::hydrate(
                        core,
                        require_confirmation,
                        credentials_optional,
                    )),
                    None => ActiveStep::Core(CoreConfigStep::new(
                        require_confirmation,
                        credentials_optional,
                    )),
                }
            }
            WizardStage::ConnectorConfiguration => {
                let Some(connector_type) = self.context.connector_type.clone() else {
                    return ActiveStep::ConfiguratorFailed(StepFailure {
                        stage: WizardStage::ConnectorConfiguration,
                        reason: "no connector type selected".to_string(),
                    });
                };
                if let Some(descriptor) =
                    self.context.cached_descriptor_for(&connector_type.id).cloned()
                {
                    ActiveStep::ConnectorConfig(ConnectorConfigStep::new(
                        descriptor,
                        self.context.connector_configuration.clone(),
                    ))
                } else {
                    ActiveStep::ConfiguratorLoading(ConfiguratorLoader::start(
                        self.collaborators.configurators.as_mut(),
                        connector_type,
                    ))
                }
            }
            WizardStage::ErrorHandling => ActiveStep::ErrorHandler(ErrorHandlerStep::new(
                self.context.error_handler.as_ref(),
            )),
            WizardStage::Review => ActiveStep::Review,
            WizardStage::Saved | WizardStage::Closed => ActiveStep::None,
        }
    }

    fn teardown_active(&mut self) {
        match std::mem::replace(&mut self.active, ActiveStep::None) {
            ActiveStep::ConnectorTypes(mut step) => step.shutdown(),
            ActiveStep::KafkaInstances(mut step) => step.shutdown(),
            ActiveStep::Namespaces(mut step) => step.shutdown(),
            _ => {}
        }
    }

    fn active_status(&self) -> Option<StepStatus> {
        match &self.active {
            ActiveStep::ConnectorTypes(step) => Some(step.status()),
            ActiveStep::KafkaInstances(step) => Some(step.status()),
            ActiveStep::Namespaces(step) => Some(step.status()),
            ActiveStep::Core(step) => Some(step.status()),
            ActiveStep::ConnectorConfig(step) => Some(step.status()),
            ActiveStep::ErrorHandler(step) => Some(step.status()),
            ActiveStep::ConfiguratorLoading(_)
            | ActiveStep::ConfiguratorFailed(_)
            | ActiveStep::Review
            | ActiveStep::None => None,
        }
    }

    fn note_entry_validity(&mut self) {
        let stage = self.stage;
        if self
            .active_status()
            .map(StepStatus::is_valid)
            .unwrap_or(false)
        {
            self.record(stage.as_str(), "valid");
        }
    }

    fn record(&mut self, stage: &str, action: &str) {
        self.telemetry
            .record(AnalyticsEvent::now(&self.session_id, stage, action));
    }
}
