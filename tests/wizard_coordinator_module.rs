use patchbay::configurator::{ConfiguratorDescriptor, ConfiguratorResolver, ResolveCompletion};
use patchbay::model::{
    ConnectorTypeRef, CoreConfiguration, ErrorHandlerConfig, ErrorHandlerKind, KafkaInstance,
    Namespace, ServiceAccount,
};
use patchbay::pagination::{CancelFn, ListFilter, PageCompletion, PageFetcher, PageRequest};
use patchbay::shared::ids::{ConnectorTypeId, KafkaId, NamespaceId, TopicName};
use patchbay::telemetry::{AnalyticsEvent, AnalyticsSink};
use patchbay::wizard::{
    CachedConfigurator, Collaborators, ConnectorPayload, ConnectorSaver, SaveCompletion,
    WizardContext, WizardCoordinator, WizardEffect, WizardError, WizardEvent, WizardMode,
    WizardStage,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Remote {
    connector_types: Vec<(PageRequest<ListFilter>, PageCompletion<ConnectorTypeRef>)>,
    kafka: Vec<(PageRequest<ListFilter>, PageCompletion<KafkaInstance>)>,
    namespaces: Vec<(PageRequest<ListFilter>, PageCompletion<Namespace>)>,
    resolutions: Vec<(ConnectorTypeRef, ResolveCompletion)>,
    saves: Vec<(ConnectorPayload, SaveCompletion)>,
    cancelled: usize,
}

struct TypeFetcher(Rc<RefCell<Remote>>);

impl PageFetcher<ConnectorTypeRef, ListFilter> for TypeFetcher {
    fn fetch(
        &mut self,
        request: &PageRequest<ListFilter>,
        completion: PageCompletion<ConnectorTypeRef>,
    ) -> CancelFn {
        self.0
            .borrow_mut()
            .connector_types
            .push((request.clone(), completion));
        let remote = Rc::clone(&self.0);
        Box::new(move || remote.borrow_mut().cancelled += 1)
    }
}

struct KafkaFetcher(Rc<RefCell<Remote>>);

impl PageFetcher<KafkaInstance, ListFilter> for KafkaFetcher {
    fn fetch(
        &mut self,
        request: &PageRequest<ListFilter>,
        completion: PageCompletion<KafkaInstance>,
    ) -> CancelFn {
        self.0.borrow_mut().kafka.push((request.clone(), completion));
        let remote = Rc::clone(&self.0);
        Box::new(move || remote.borrow_mut().cancelled += 1)
    }
}

struct NamespaceFetcher(Rc<RefCell<Remote>>);

impl PageFetcher<Namespace, ListFilter> for NamespaceFetcher {
    fn fetch(
        &mut self,
        request: &PageRequest<ListFilter>,
        completion: PageCompletion<Namespace>,
    ) -> CancelFn {
        self.0
            .borrow_mut()
            .namespaces
            .push((request.clone(), completion));
        let remote = Rc::clone(&self.0);
        Box::new(move || remote.borrow_mut().cancelled += 1)
    }
}

struct Resolver(Rc<RefCell<Remote>>);

impl ConfiguratorResolver for Resolver {
    fn resolve(&mut self, connector_type: &ConnectorTypeRef, completion: ResolveCompletion) {
        self.0
            .borrow_mut()
            .resolutions
            .push((connector_type.clone(), completion));
    }
}

struct Saver(Rc<RefCell<Remote>>);

impl ConnectorSaver for Saver {
    fn save(&mut self, payload: &ConnectorPayload, completion: SaveCompletion) {
        self.0.borrow_mut().saves.push((payload.clone(), completion));
    }
}

struct SharedSink(Rc<RefCell<Vec<String>>>);

impl AnalyticsSink for SharedSink {
    fn record(&mut self, event: AnalyticsEvent) {
        self.0.borrow_mut().push(event.name);
    }
}

fn collaborators(remote: &Rc<RefCell<Remote>>) -> Collaborators {
    Collaborators {
        connector_types: Box::new(TypeFetcher(Rc::clone(remote))),
        kafka_instances: Box::new(KafkaFetcher(Rc::clone(remote))),
        namespaces: Box::new(NamespaceFetcher(Rc::clone(remote))),
        configurators: Box::new(Resolver(Rc::clone(remote))),
        saver: Box::new(Saver(Rc::clone(remote))),
    }
}

fn connector_type(raw: &str) -> ConnectorTypeRef {
    let id = ConnectorTypeId::parse(raw).expect("connector type id");
    ConnectorTypeRef::new(id, raw, "0.1")
}

fn kafka_instance(raw: &str) -> KafkaInstance {
    KafkaInstance::new(KafkaId::parse(raw).expect("kafka id"), raw)
}

fn namespace(raw: &str) -> Namespace {
    Namespace::new(NamespaceId::parse(raw).expect("namespace id"), raw, "cluster-1")
}

fn populated_context() -> WizardContext {
    let selected = connector_type("aws-s3-sink");
    WizardContext {
        connector_type: Some(selected.clone()),
        kafka: Some(kafka_instance("kafka-1")),
        namespace: Some(namespace("ns-1")),
        core_configuration: Some(CoreConfiguration {
            name: "orders-sink".to_string(),
            service_account: ServiceAccount {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
            account_confirmed: false,
        }),
        connector_configuration: Some(json!({ "bucket": "orders" })),
        error_handler: Some(ErrorHandlerConfig::dead_letter_queue(
            TopicName::parse("dlq").expect("topic"),
        )),
        configurator: Some(CachedConfigurator {
            connector_type: selected.id,
            descriptor: ConfiguratorDescriptor::generic_form(json!({})),
        }),
        saving_error: None,
    }
}

/// Drives a fresh create-mode wizard through the three selection stages.
fn drive_past_selections(
    wizard: &mut WizardCoordinator,
    remote: &Rc<RefCell<Remote>>,
) {
    wizard
        .handle(WizardEvent::Query {
            page: 1,
            size: 10,
            search: None,
        })
        .expect("query connector types");
    let (_, completion) = remote.borrow_mut().connector_types.remove(0);
    completion.succeed(vec![connector_type("aws-s3-sink")], 1);
    wizard.pump();
    wizard
        .handle(WizardEvent::SelectConnectorType(connector_type("aws-s3-sink")))
        .expect("select connector type");
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::SelectKafkaInstance)
    );

    wizard
        .handle(WizardEvent::SelectKafka(kafka_instance("kafka-1")))
        .expect("select kafka");
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::SelectNamespace)
    );

    wizard
        .handle(WizardEvent::SelectNamespace(namespace("ns-1")))
        .expect("select namespace");
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::CoreConfiguration)
    );
}

#[test]
fn wizard_coordinator_module_create_flow_reaches_saved() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let names = Rc::new(RefCell::new(Vec::new()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote))
        .expect("coordinator")
        .with_telemetry(Box::new(SharedSink(Rc::clone(&names))));
    assert_eq!(wizard.stage(), WizardStage::SelectConnectorType);
    assert!(!wizard.can_advance());
    // Next with nothing selected is a no-op.
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::Ignored
    );

    drive_past_selections(&mut wizard, &remote);

    wizard
        .handle(WizardEvent::SetName("orders-sink".to_string()))
        .expect("set name");
    wizard
        .handle(WizardEvent::SetClientId("id".to_string()))
        .expect("set client id");
    assert!(!wizard.can_advance());
    wizard
        .handle(WizardEvent::SetClientSecret("secret".to_string()))
        .expect("set client secret");
    assert!(wizard.can_advance());
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::ConnectorConfiguration)
    );

    // Resolution is in flight: the wizard is loading and Next does nothing.
    assert!(wizard.is_loading());
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::Ignored
    );
    let (requested, completion) = remote.borrow_mut().resolutions.remove(0);
    assert_eq!(requested.id.as_str(), "aws-s3-sink");
    completion.resolve(ConfiguratorDescriptor::generic_form(json!({ "type": "object" })));
    assert_eq!(wizard.pump(), vec![WizardEffect::ConfiguratorReady]);
    assert!(!wizard.is_loading());

    wizard
        .handle(WizardEvent::SetConfiguration {
            value: json!({ "bucket": "orders" }),
            valid: true,
        })
        .expect("set configuration");
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::ErrorHandling)
    );

    wizard
        .handle(WizardEvent::SetErrorHandler(ErrorHandlerKind::Log))
        .expect("set error handler");
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("advance"),
        WizardEffect::StageChanged(WizardStage::Review)
    );

    assert_eq!(
        wizard.handle(WizardEvent::Save).expect("save"),
        WizardEffect::SaveDispatched
    );
    assert!(wizard.is_saving());
    let (payload, completion) = remote.borrow_mut().saves.remove(0);
    assert_eq!(payload.name, "orders-sink");
    assert_eq!(payload.connector_type_id.as_str(), "aws-s3-sink");
    assert_eq!(payload.kafka_id, "kafka-1");
    assert_eq!(payload.connector, json!({ "bucket": "orders" }));
    assert_eq!(payload.error_handler, json!({ "log": {} }));
    completion.succeed();
    assert_eq!(
        wizard.pump(),
        vec![WizardEffect::StageChanged(WizardStage::Saved)]
    );
    assert_eq!(wizard.stage(), WizardStage::Saved);

    // The terminal stage refuses further events.
    assert!(matches!(
        wizard.handle(WizardEvent::Next),
        Err(WizardError::EventNotApplicable { .. })
    ));

    let names = names.borrow();
    assert_eq!(
        names.as_slice(),
        [
            "select-connector-type:valid",
            "select-connector-type:confirm",
            "select-kafka-instance:valid",
            "select-kafka-instance:confirm",
            "select-namespace:valid",
            "select-namespace:confirm",
            "core-configuration:valid",
            "core-configuration:confirm",
            "connector-configuration:valid",
            "connector-configuration:confirm",
            "error-handling:valid",
            "error-handling:confirm",
            "review:save",
            "review:saved",
        ]
    );
}

#[test]
fn wizard_coordinator_module_prev_rehydrates_the_earlier_selection() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote)).expect("coordinator");
    drive_past_selections(&mut wizard, &remote);
    assert_eq!(wizard.stage(), WizardStage::CoreConfiguration);

    assert_eq!(
        wizard.handle(WizardEvent::Prev).expect("prev"),
        WizardEffect::StageChanged(WizardStage::SelectNamespace)
    );
    let step = wizard.namespace_step().expect("namespace step");
    assert_eq!(step.selected().map(|ns| ns.id.as_str()), Some("ns-1"));
    assert!(wizard.can_advance());

    assert_eq!(
        wizard.handle(WizardEvent::Prev).expect("prev"),
        WizardEffect::StageChanged(WizardStage::SelectKafkaInstance)
    );
    assert_eq!(
        wizard
            .kafka_step()
            .and_then(|step| step.selected())
            .map(|k| k.id.as_str()),
        Some("kafka-1")
    );
}

#[test]
fn wizard_coordinator_module_deselect_retracts_the_advance_affordance() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote)).expect("coordinator");
    wizard
        .handle(WizardEvent::SelectConnectorType(connector_type("aws-s3-sink")))
        .expect("select");
    assert!(wizard.can_advance());
    wizard.handle(WizardEvent::Deselect).expect("deselect");
    assert!(!wizard.can_advance());
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::Ignored
    );
    assert_eq!(wizard.stage(), WizardStage::SelectConnectorType);
}

#[test]
fn wizard_coordinator_module_configurator_failure_is_terminal_until_prev() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote)).expect("coordinator");
    drive_past_selections(&mut wizard, &remote);
    wizard
        .handle(WizardEvent::SetName("orders-sink".to_string()))
        .expect("set name");
    wizard
        .handle(WizardEvent::SetClientId("id".to_string()))
        .expect("set client id");
    wizard
        .handle(WizardEvent::SetClientSecret("secret".to_string()))
        .expect("set client secret");
    wizard.handle(WizardEvent::Next).expect("advance");

    let (_, completion) = remote.borrow_mut().resolutions.remove(0);
    completion.reject("module bundle 404");
    let effects = wizard.pump();
    assert!(matches!(effects.as_slice(), [WizardEffect::StepFailed { .. }]));

    let failure = wizard.step_failure().expect("step failure");
    assert!(failure.reason.contains("module bundle 404"));
    assert!(failure.reason.contains("aws-s3-sink"));
    assert!(!wizard.can_advance());
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::Ignored
    );

    // Going back is the documented recovery path.
    assert_eq!(
        wizard.handle(WizardEvent::Prev).expect("prev"),
        WizardEffect::StageChanged(WizardStage::CoreConfiguration)
    );
    assert!(wizard.step_failure().is_none());
}

#[test]
fn wizard_coordinator_module_save_failure_is_recoverable() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Edit,
        collaborators(&remote),
    )
    .expect("coordinator");

    // Everything is hydrated: six Next events walk straight to review.
    for _ in 0..6 {
        wizard.handle(WizardEvent::Next).expect("advance");
    }
    assert_eq!(wizard.stage(), WizardStage::Review);

    wizard.handle(WizardEvent::Save).expect("save");
    // Prev is refused while the save is in flight.
    assert_eq!(
        wizard.handle(WizardEvent::Prev).expect("prev"),
        WizardEffect::Ignored
    );
    let (_, completion) = remote.borrow_mut().saves.remove(0);
    completion.fail("name already taken");
    assert_eq!(
        wizard.pump(),
        vec![WizardEffect::SaveFailed {
            message: "name already taken".to_string()
        }]
    );
    assert_eq!(wizard.stage(), WizardStage::Review);
    assert_eq!(wizard.saving_error(), Some("name already taken"));
    assert!(!wizard.is_saving());

    // Retrying clears the stored error and can succeed.
    wizard.handle(WizardEvent::Save).expect("retry save");
    assert!(wizard.saving_error().is_none());
    let (_, completion) = remote.borrow_mut().saves.remove(0);
    completion.succeed();
    wizard.pump();
    assert_eq!(wizard.stage(), WizardStage::Saved);
}

#[test]
fn wizard_coordinator_module_duplicate_mode_renames_and_requires_reconfirmation() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Duplicate,
        collaborators(&remote),
    )
    .expect("coordinator");

    for _ in 0..3 {
        wizard.handle(WizardEvent::Next).expect("advance");
    }
    assert_eq!(wizard.stage(), WizardStage::CoreConfiguration);
    let core = wizard.core_step().expect("core step");
    assert!(core.name().starts_with("orders-sink-copy-"));
    // Carried credentials need an explicit go-ahead.
    assert!(!wizard.can_advance());
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::Ignored
    );
    wizard
        .handle(WizardEvent::SetAccountConfirmed(true))
        .expect("confirm account");
    assert!(wizard.can_advance());

    // The cached descriptor avoids a second resolution round.
    wizard.handle(WizardEvent::Next).expect("advance");
    assert_eq!(wizard.stage(), WizardStage::ConnectorConfiguration);
    assert!(remote.borrow().resolutions.is_empty());
    assert!(wizard.can_advance());
}

#[test]
fn wizard_coordinator_module_changing_connector_type_discards_the_cached_configurator() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Edit,
        collaborators(&remote),
    )
    .expect("coordinator");

    wizard
        .handle(WizardEvent::SelectConnectorType(connector_type("gcs-sink")))
        .expect("reselect");
    wizard.handle(WizardEvent::Next).expect("advance");
    assert!(wizard.context().configurator.is_none());
    assert!(wizard.context().connector_configuration.is_none());

    // Re-confirming the same type keeps downstream answers.
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Edit,
        collaborators(&remote),
    )
    .expect("coordinator");
    wizard.handle(WizardEvent::Next).expect("advance");
    assert!(wizard.context().configurator.is_some());
    assert!(wizard.context().connector_configuration.is_some());
}

#[test]
fn wizard_coordinator_module_multi_page_configurator_walks_substeps() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let selected = connector_type("debezium-postgres");
    let mut context = populated_context();
    context.connector_type = Some(selected.clone());
    context.configurator = Some(CachedConfigurator {
        connector_type: selected.id,
        descriptor: ConfiguratorDescriptor::federated(
            "debezium-configurator",
            vec!["Properties".to_string(), "Filters".to_string()],
        ),
    });
    let mut wizard =
        WizardCoordinator::with_context(context, WizardMode::Edit, collaborators(&remote))
            .expect("coordinator");

    for _ in 0..4 {
        wizard.handle(WizardEvent::Next).expect("advance");
    }
    assert_eq!(wizard.stage(), WizardStage::ConnectorConfiguration);
    let step = wizard.connector_config_step().expect("config step");
    assert_eq!(step.substep_name(), Some("Properties"));

    // Next walks the configurator's own pages before leaving the stage.
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::SubstepChanged(1)
    );
    assert_eq!(
        wizard.handle(WizardEvent::Prev).expect("prev"),
        WizardEffect::SubstepChanged(0)
    );
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::SubstepChanged(1)
    );
    assert_eq!(
        wizard.handle(WizardEvent::Next).expect("next"),
        WizardEffect::StageChanged(WizardStage::ErrorHandling)
    );
}

#[test]
fn wizard_coordinator_module_rejects_events_for_other_stages() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote)).expect("coordinator");

    assert!(matches!(
        wizard.handle(WizardEvent::SetName("x".to_string())),
        Err(WizardError::EventNotApplicable {
            stage: "select-connector-type",
            event: "set_name",
        })
    ));
    assert!(matches!(
        wizard.handle(WizardEvent::Save),
        Err(WizardError::EventNotApplicable { .. })
    ));
}

#[test]
fn wizard_coordinator_module_close_during_save_stays_closed() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Edit,
        collaborators(&remote),
    )
    .expect("coordinator");
    for _ in 0..6 {
        wizard.handle(WizardEvent::Next).expect("advance");
    }
    wizard.handle(WizardEvent::Save).expect("save");
    assert_eq!(
        wizard.handle(WizardEvent::Close).expect("close"),
        WizardEffect::Closed
    );
    assert!(!wizard.is_saving());

    // The transport finishes the save anyway; the wizard must not leave
    // its terminal stage.
    let (_, completion) = remote.borrow_mut().saves.remove(0);
    completion.succeed();
    assert!(wizard.pump().is_empty());
    assert_eq!(wizard.stage(), WizardStage::Closed);

    // Same for a late failure: no error is written into a closed context.
    let mut wizard = WizardCoordinator::with_context(
        populated_context(),
        WizardMode::Edit,
        collaborators(&remote),
    )
    .expect("coordinator");
    for _ in 0..6 {
        wizard.handle(WizardEvent::Next).expect("advance");
    }
    wizard.handle(WizardEvent::Save).expect("save");
    wizard.handle(WizardEvent::Close).expect("close");
    let (_, completion) = remote.borrow_mut().saves.remove(0);
    completion.fail("gateway timeout");
    assert!(wizard.pump().is_empty());
    assert_eq!(wizard.stage(), WizardStage::Closed);
    assert!(wizard.saving_error().is_none());
}

#[test]
fn wizard_coordinator_module_close_cancels_the_outstanding_fetch() {
    let remote = Rc::new(RefCell::new(Remote::default()));
    let mut wizard = WizardCoordinator::new(collaborators(&remote)).expect("coordinator");
    wizard
        .handle(WizardEvent::Query {
            page: 1,
            size: 10,
            search: Some("sink".to_string()),
        })
        .expect("query");
    assert!(wizard.is_loading());

    assert_eq!(
        wizard.handle(WizardEvent::Close).expect("close"),
        WizardEffect::Closed
    );
    assert_eq!(wizard.stage(), WizardStage::Closed);
    assert_eq!(remote.borrow().cancelled, 1);
}
