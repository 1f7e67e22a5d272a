//! Lifecycle controller
//!
//! Discovers component roots in a document, creates one instance per
//! (component, element) pair and tears instances down when their element
//! leaves the document.

use std::collections::HashMap;

use rivet_dom::{Document, NodeId};
use tracing::debug;

use crate::component::{Behavior, Component, Registry};
use crate::{ComponentError, Config};

struct Instance {
    descriptor: usize,
    behavior: Box<dyn Behavior>,
}

/// Outcome of [`Controller::process_mutations`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    pub initialized: usize,
    pub destroyed: usize,
}

/// Owns the registry, the configuration and every live instance
pub struct Controller {
    registry: Registry,
    config: Config,
    instances: Vec<Instance>,
}

impl Controller {
    pub fn new(registry: Registry, config: Config) -> Self {
        Self {
            registry,
            config,
            instances: Vec::new(),
        }
    }

    /// Controller over the built-in components with default configuration
    pub fn with_defaults() -> Result<Self, ComponentError> {
        Ok(Self::new(Registry::with_defaults()?, Config::default()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialise every component root in the document.
    /// Returns the number of instances created.
    pub fn init(&mut self, doc: &mut Document) -> Result<usize, ComponentError> {
        let root = doc.root();
        self.init_within(doc, root)
    }

    /// Initialise component roots at or below `root`, in registration
    /// order, then document order. Elements already bound to a component
    /// are skipped.
    pub fn init_within(&mut self, doc: &mut Document, root: NodeId) -> Result<usize, ComponentError> {
        if self.config.observe_mutations && !doc.tree().mutations().is_observing() {
            doc.observe_mutations();
        }

        let mut created = 0;
        for (index, descriptor) in self.registry.iter().enumerate() {
            for element in doc.select_inclusive(root, descriptor.selector()) {
                let bound = self
                    .instances
                    .iter()
                    .any(|i| i.descriptor == index && i.behavior.root() == element);
                if bound || !doc.is_connected(element) {
                    continue;
                }

                let behavior = descriptor.instantiate(doc, element, &self.config)?;
                if let Err(err) = behavior.attach(doc) {
                    release(doc, behavior.as_ref());
                    return Err(err);
                }

                debug!(component = descriptor.name(), element = ?element, "initialized");
                self.instances.push(Instance {
                    descriptor: index,
                    behavior,
                });
                created += 1;
            }
        }

        Ok(created)
    }

    /// Tear down every instance rooted at or inside `element`
    pub fn destroy(&mut self, doc: &mut Document, element: NodeId) -> usize {
        self.teardown_where(doc, |doc, root| doc.contains(element, root))
    }

    /// Tear down every instance
    pub fn destroy_all(&mut self, doc: &mut Document) -> usize {
        self.teardown_where(doc, |_, _| true)
    }

    /// Drain queued mutation records: instances whose element left the
    /// document are torn down, inserted subtrees are initialised.
    pub fn process_mutations(&mut self, doc: &mut Document) -> Result<MutationSummary, ComponentError> {
        let records = doc.take_mutation_records();
        if records.is_empty() {
            return Ok(MutationSummary::default());
        }

        let destroyed = self.teardown_where(doc, |doc, root| !doc.is_connected(root));

        let mut initialized = 0;
        for node in records.iter().flat_map(|r| r.added_nodes.iter().copied()) {
            let is_element = doc.tree().get(node).is_some_and(|n| n.is_element());
            if is_element && doc.is_connected(node) {
                initialized += self.init_within(doc, node)?;
            }
        }

        Ok(MutationSummary {
            initialized,
            destroyed,
        })
    }

    /// Instance of `C` bound to `element`
    pub fn instance<C: Component>(&self, element: NodeId) -> Option<C> {
        self.instances
            .iter()
            .filter(|i| i.behavior.root() == element)
            .find_map(|i| i.behavior.as_any().downcast_ref::<C>())
            .cloned()
    }

    /// All instances of `C`, in creation order
    pub fn instances<C: Component>(&self) -> Vec<C> {
        self.instances
            .iter()
            .filter_map(|i| i.behavior.as_any().downcast_ref::<C>())
            .cloned()
            .collect()
    }

    /// All instances of `C`, in document order of their elements
    pub fn instances_in_document_order<C: Component>(&self, doc: &Document) -> Vec<C> {
        let order: HashMap<NodeId, usize> = doc
            .tree()
            .descendants(doc.root())
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();

        let mut found = self.instances::<C>();
        found.sort_by_key(|c| order.get(&c.element()).copied().unwrap_or(usize::MAX));
        found
    }

    /// Whether a component named `name` is bound to `element`
    pub fn is_bound(&self, element: NodeId, name: &str) -> bool {
        self.instances
            .iter()
            .any(|i| i.behavior.root() == element && i.behavior.kind() == name)
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn teardown_where<F>(&mut self, doc: &mut Document, predicate: F) -> usize
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.instances)
            .into_iter()
            .partition(|i| predicate(doc, i.behavior.root()));
        self.instances = kept;

        for instance in &gone {
            release(doc, instance.behavior.as_ref());
            debug!(component = instance.behavior.kind(), element = ?instance.behavior.root(), "destroyed");
        }
        gone.len()
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("instances", &self.instances.len())
            .finish()
    }
}

/// Disconnect an instance and unbind its element methods
fn release(doc: &mut Document, behavior: &dyn Behavior) {
    behavior.detach(doc);
    for name in behavior.bound_methods() {
        doc.unbind_method(behavior.root(), name);
    }
}
