use crate::configurator::descriptor::ConfiguratorDescriptor;
use crate::model::ConnectorTypeRef;
use crate::shared::ids::ConnectorTypeId;
use std::sync::mpsc::{channel, Receiver, Sender};

enum ResolveDelivery {
    Resolved(ConfiguratorDescriptor),
    Rejected(String),
}

/// One-shot, promise-style completion for configurator resolution. A
/// resolver that finds no federated module for a type must still resolve
/// with a generic-form descriptor; `reject` is reserved for true failures.
pub struct ResolveCompletion {
    tx: Sender<ResolveDelivery>,
}

impl ResolveCompletion {
    pub fn resolve(self, descriptor: ConfiguratorDescriptor) {
        let _ = self.tx.send(ResolveDelivery::Resolved(descriptor));
    }

    pub fn reject(self, message: &str) {
        let _ = self.tx.send(ResolveDelivery::Rejected(message.to_string()));
    }
}

/// Resolves which configuration UI to use for a connector type, possibly by
/// loading an external module at runtime.
pub trait ConfiguratorResolver {
    fn resolve(&mut self, connector_type: &ConnectorTypeRef, completion: ResolveCompletion);
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoaderState {
    Loading,
    Ready(ConfiguratorDescriptor),
    Failed(String),
}

/// Outcome surfaced to the parent. `Fatal` is escalated: a missing or broken
/// external configurator is terminal for the configuration step until the
/// user goes back and picks a different connector type.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderOutcome {
    Ready(ConfiguratorDescriptor),
    Fatal {
        connector_type: ConnectorTypeId,
        reason: String,
    },
}

pub struct ConfiguratorLoader {
    connector_type: ConnectorTypeRef,
    state: LoaderState,
    rx: Receiver<ResolveDelivery>,
}

impl ConfiguratorLoader {
    pub fn start(resolver: &mut dyn ConfiguratorResolver, connector_type: ConnectorTypeRef) -> Self {
        let (tx, rx) = channel();
        resolver.resolve(&connector_type, ResolveCompletion { tx });
        Self {
            connector_type,
            state: LoaderState::Loading,
            rx,
        }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoaderState::Loading)
    }

    pub fn connector_type(&self) -> &ConnectorTypeRef {
        &self.connector_type
    }

    /// Applies the resolution once. Later deliveries on the same channel are
    /// ignored because the loader has left `Loading`.
    pub fn pump(&mut self) -> Option<LoaderOutcome> {
        if !self.is_loading() {
            return None;
        }
        match self.rx.try_recv() {
            Ok(ResolveDelivery::Resolved(descriptor)) => {
                self.state = LoaderState::Ready(descriptor.clone());
                Some(LoaderOutcome::Ready(descriptor))
            }
            Ok(ResolveDelivery::Rejected(reason)) => {
                self.state = LoaderState::Failed(reason.clone());
                Some(LoaderOutcome::Fatal {
                    connector_type: self.connector_type.id.clone(),
                    reason,
                })
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SharedResolver(Rc<RefCell<Vec<(ConnectorTypeRef, ResolveCompletion)>>>);

    impl ConfiguratorResolver for SharedResolver {
        fn resolve(&mut self, connector_type: &ConnectorTypeRef, completion: ResolveCompletion) {
            self.0.borrow_mut().push((connector_type.clone(), completion));
        }
    }

    fn connector_type(raw: &str) -> ConnectorTypeRef {
        let id = ConnectorTypeId::parse(raw).expect("connector type id");
        ConnectorTypeRef::new(id, raw, "0.1")
    }

    #[test]
    fn loader_surfaces_resolved_descriptor_once() {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let mut resolver = SharedResolver(Rc::clone(&pending));
        let mut loader = ConfiguratorLoader::start(&mut resolver, connector_type("aws-s3-sink"));
        assert!(loader.is_loading());
        assert!(loader.pump().is_none());

        let (_, completion) = pending.borrow_mut().remove(0);
        completion.resolve(ConfiguratorDescriptor::generic_form(json!({})));
        let outcome = loader.pump().expect("outcome");
        assert!(matches!(outcome, LoaderOutcome::Ready(_)));
        assert!(matches!(loader.state(), LoaderState::Ready(_)));
        assert!(loader.pump().is_none());
    }

    #[test]
    fn rejection_escalates_as_fatal_with_connector_type() {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let mut resolver = SharedResolver(Rc::clone(&pending));
        let mut loader = ConfiguratorLoader::start(&mut resolver, connector_type("broken-type"));

        let (_, completion) = pending.borrow_mut().remove(0);
        completion.reject("module fetch failed");
        match loader.pump() {
            Some(LoaderOutcome::Fatal {
                connector_type,
                reason,
            }) => {
                assert_eq!(connector_type.as_str(), "broken-type");
                assert_eq!(reason, "module fetch failed");
            }
            other => panic!("expected fatal outcome, got {other:?}"),
        }
        assert!(matches!(loader.state(), LoaderState::Failed(_)));
    }
}
