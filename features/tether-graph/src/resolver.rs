use std::collections::HashMap;

use crate::{
    binding::Binding,
    config::{ErrorMode, ResolverConfig},
    errors::{GraphError, GraphErrors, RequestSource},
    key::{Key, RequestForm},
    registry::BindingRegistry,
};

/// Bindings needed by a set of entry points, in construction order
///
/// Every binding appears after all bindings producing its required keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'r> {
    order: Vec<&'r Binding>,
    keys: Vec<Key>,
    unresolved: Vec<Key>,
}
impl<'r> Resolution<'r> {
    /// Bindings in construction order, producers before consumers
    pub fn order(&self) -> &[&'r Binding] {
        &self.order
    }

    pub fn into_order(self) -> Vec<&'r Binding> {
        self.order
    }

    /// Every key reached from the entry points, in the order they were first visited
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Keys left without a binding, only filled when partial graphs are allowed
    pub fn unresolved(&self) -> &[Key] {
        &self.unresolved
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Index of the binding producing `key` within [`Resolution::order`]
    pub fn position(&self, key: &Key) -> Option<usize> {
        self.order
            .iter()
            .position(|binding| binding.provided_key() == key)
    }
}

/// Computes which bindings entry points need and in which order to build them
#[derive(Debug, Clone, Default)]
pub struct GraphResolver {
    config: ResolverConfig,
}
impl GraphResolver {
    pub fn new(config: ResolverConfig) -> Self {
        GraphResolver { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the transitive closure of `entry_keys` against `registry`
    ///
    /// Entry keys are walked in the given order and each binding's requests in
    /// declaration order, so the same input always produces the same order.
    pub fn resolve<'r>(
        &self,
        entry_keys: &[Key],
        registry: &'r BindingRegistry,
    ) -> Result<Resolution<'r>, GraphErrors> {
        tracing::debug!(
            "Resolving {} entry points against {} bindings",
            entry_keys.len(),
            registry.len()
        );

        let mut walk = Walk {
            registry,
            config: &self.config,
            visited: HashMap::new(),
            in_progress: Vec::new(),
            on_path: HashMap::new(),
            order: Vec::new(),
            keys: Vec::new(),
            unresolved: Vec::new(),
            errors: Vec::new(),
        };

        for key in entry_keys {
            if walk.walk_from(key).is_err() {
                break;
            }
        }

        let Walk {
            order,
            keys,
            unresolved,
            errors,
            ..
        } = walk;

        if !errors.is_empty() {
            tracing::debug!("Resolution failed with {} errors", errors.len());
            return Err(GraphErrors { errors });
        }

        tracing::debug!(
            "Resolved {} bindings ({} keys left unresolved)",
            order.len(),
            unresolved.len()
        );

        Ok(Resolution {
            order,
            keys,
            unresolved,
        })
    }
}

/// Resolves with the default configuration: collect every error, no partial graphs
pub fn resolve<'r>(
    entry_keys: &[Key],
    registry: &'r BindingRegistry,
) -> Result<Resolution<'r>, GraphErrors> {
    GraphResolver::default().resolve(entry_keys, registry)
}

/// Final state of a visited key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Binding and all its dependencies are in the order
    Bound,
    /// No binding exists for the key
    Missing,
    /// The key or one of its dependencies has an error
    Failed,
}

/// Raised to unwind the walk in fail-fast mode
struct Halt;

/// Outcome of stepping onto a key
enum Step {
    /// A frame was pushed, its requests still have to be walked
    Entered,
    /// Nothing to walk, the key's state is already known
    Done(Visit),
}

/// A binding whose requests are being walked
struct Frame<'r> {
    key: Key,
    binding: &'r Binding,
    /// Index of the next request to walk
    next: usize,
    failed: bool,
}

/// Iterative post-order walk
///
/// The current path is kept in `in_progress`, not on the call stack. `on_path`
/// maps each key on the path to its frame index for the cycle check.
struct Walk<'r, 'c> {
    registry: &'r BindingRegistry,
    config: &'c ResolverConfig,
    visited: HashMap<Key, Visit>,
    in_progress: Vec<Frame<'r>>,
    on_path: HashMap<Key, usize>,
    order: Vec<&'r Binding>,
    keys: Vec<Key>,
    unresolved: Vec<Key>,
    errors: Vec<GraphError>,
}
impl<'r> Walk<'r, '_> {
    fn walk_from(&mut self, entry: &Key) -> Result<(), Halt> {
        if let Step::Done(_) = self.enter(entry, RequestSource::Entry)? {
            return Ok(());
        }

        while let Some(frame) = self.in_progress.last_mut() {
            let binding: &'r Binding = frame.binding;
            let Some(request) = binding.requests().get(frame.next) else {
                let visit = self.leave();
                self.absorb(visit);
                continue;
            };
            frame.next += 1;

            if request.form == RequestForm::Lazy {
                frame.failed = true;
                let requested_by = frame.key.clone();
                self.report(GraphError::UnsupportedRequestForm {
                    form: request.form,
                    key: request.key.clone(),
                    requested_by,
                })?;
                continue;
            }

            let requested_by = RequestSource::Binding(frame.key.clone());
            if let Step::Done(visit) = self.enter(&request.key, requested_by)? {
                self.absorb(visit);
            }
        }

        Ok(())
    }

    /// Steps onto `key`, pushing a frame when its binding still has to be walked
    fn enter(&mut self, key: &Key, requested_by: RequestSource) -> Result<Step, Halt> {
        // Circular dependency check
        if let Some(&start) = self.on_path.get(key) {
            let mut path: Vec<Key> = self.in_progress[start..]
                .iter()
                .map(|frame| frame.key.clone())
                .collect();
            path.push(key.clone()); // Close the cycle
            self.report(GraphError::CyclicDependency { path })?;
            return Ok(Step::Done(Visit::Failed));
        }

        if let Some(visit) = self.visited.get(key) {
            return Ok(Step::Done(*visit));
        }

        tracing::trace!("Visiting {key}");
        self.keys.push(key.clone());

        let registry = self.registry;
        let Some(binding) = registry.get(key) else {
            self.visited.insert(key.clone(), Visit::Missing);

            if self.config.allow_partial {
                tracing::warn!("No binding for {key}, leaving it unresolved");
                self.unresolved.push(key.clone());
                return Ok(Step::Done(Visit::Missing));
            }

            let chain = self
                .in_progress
                .iter()
                .map(|frame| frame.key.clone())
                .collect();
            self.report(GraphError::UnresolvedKey {
                key: key.clone(),
                requested_by,
                chain,
            })?;
            return Ok(Step::Done(Visit::Missing));
        };

        self.on_path.insert(key.clone(), self.in_progress.len());
        self.in_progress.push(Frame {
            key: key.clone(),
            binding,
            next: 0,
            failed: false,
        });
        Ok(Step::Entered)
    }

    /// Pops the finished top frame and records its state
    fn leave(&mut self) -> Visit {
        let Some(frame) = self.in_progress.pop() else {
            return Visit::Failed;
        };
        self.on_path.remove(&frame.key);

        // Post-order: dependencies are already in the order
        let visit = if frame.failed {
            Visit::Failed
        } else {
            self.order.push(frame.binding);
            Visit::Bound
        };
        self.visited.insert(frame.key, visit);
        visit
    }

    /// Folds a dependency's state into the frame that requested it
    fn absorb(&mut self, visit: Visit) {
        let allow_partial = self.config.allow_partial;
        if let Some(frame) = self.in_progress.last_mut() {
            match visit {
                Visit::Bound => {}
                Visit::Missing => frame.failed |= !allow_partial,
                Visit::Failed => frame.failed = true,
            }
        }
    }

    fn report(&mut self, error: GraphError) -> Result<(), Halt> {
        tracing::debug!("Graph error: {error}");
        self.errors.push(error);

        match self.config.error_mode {
            ErrorMode::CollectAll => Ok(()),
            ErrorMode::FailFast => Err(Halt),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        binding::BindingOrigin,
        key::KeyRequest,
        types::{DeclPath, TypeDesc},
    };

    fn key(name: &str) -> Key {
        Key::for_decl(&format!("coffee.{name}"))
    }

    fn binding(name: &str, deps: &[&str]) -> Binding {
        Binding::new(
            key(name),
            deps.iter().map(|dep| KeyRequest::instance(key(dep))),
            None,
            BindingOrigin::InjectConstructor {
                owner: DeclPath::parse(&format!("coffee.{name}")),
            },
        )
    }

    fn registry(bindings: Vec<Binding>) -> BindingRegistry {
        let mut registry = BindingRegistry::new();
        for binding in bindings {
            registry.register(binding).unwrap();
        }
        registry
    }

    fn produced(resolution: &Resolution<'_>) -> Vec<Key> {
        resolution
            .order()
            .iter()
            .map(|binding| binding.provided_key().clone())
            .collect()
    }

    #[test]
    fn coffee_maker_comes_after_its_parts() {
        let registry = registry(vec![
            binding("CoffeeMaker", &["Heater", "Pump"]),
            binding("Heater", &[]),
            binding("Pump", &[]),
        ]);

        let resolution = resolve(&[key("CoffeeMaker")], &registry).unwrap();

        assert_eq!(
            produced(&resolution),
            vec![key("Heater"), key("Pump"), key("CoffeeMaker")]
        );
        assert!(resolution.is_complete());
    }

    #[test]
    fn diamond_is_built_once_in_topological_order() {
        let registry = registry(vec![
            binding("App", &["Left", "Right"]),
            binding("Left", &["Shared"]),
            binding("Right", &["Shared"]),
            binding("Shared", &[]),
        ]);

        let resolution = resolve(&[key("App")], &registry).unwrap();

        assert_eq!(
            produced(&resolution),
            vec![key("Shared"), key("Left"), key("Right"), key("App")]
        );
    }

    #[test]
    fn unreachable_bindings_are_left_out() {
        let registry = registry(vec![binding("Heater", &[]), binding("Grinder", &[])]);

        let resolution = resolve(&[key("Heater")], &registry).unwrap();

        assert_eq!(produced(&resolution), vec![key("Heater")]);
        assert_eq!(resolution.keys(), &[key("Heater")]);
    }

    #[test]
    fn cycle_reports_the_full_path() {
        let registry = registry(vec![
            binding("A", &["B"]),
            binding("B", &["C"]),
            binding("C", &["A"]),
        ]);

        let errors = resolve(&[key("A")], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::CyclicDependency {
                path: vec![key("A"), key("B"), key("C"), key("A")],
            }]
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let registry = registry(vec![binding("Loop", &["Loop"])]);

        let errors = resolve(&[key("Loop")], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::CyclicDependency {
                path: vec![key("Loop"), key("Loop")],
            }]
        );
    }

    #[test]
    fn cycle_reached_from_two_entries_is_reported_once() {
        let registry = registry(vec![
            binding("A", &["B"]),
            binding("B", &["A"]),
            binding("Other", &["B"]),
        ]);

        let errors = resolve(&[key("A"), key("Other")], &registry).unwrap_err();

        assert_eq!(errors.errors.len(), 1);
    }

    #[test]
    fn missing_entry_key() {
        let registry = BindingRegistry::new();

        let errors = resolve(&[key("X")], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::UnresolvedKey {
                key: key("X"),
                requested_by: RequestSource::Entry,
                chain: vec![],
            }]
        );
    }

    #[test]
    fn missing_dependency_names_requesting_chain() {
        let registry = registry(vec![
            binding("CoffeeMaker", &["Heater"]),
            binding("Heater", &["Thermostat"]),
        ]);

        let errors = resolve(&[key("CoffeeMaker")], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::UnresolvedKey {
                key: key("Thermostat"),
                requested_by: RequestSource::Binding(key("Heater")),
                chain: vec![key("CoffeeMaker"), key("Heater")],
            }]
        );
    }

    #[test]
    fn missing_key_shared_by_two_bindings_is_reported_once() {
        let registry = registry(vec![
            binding("Left", &["Missing"]),
            binding("Right", &["Missing"]),
        ]);

        let errors = resolve(&[key("Left"), key("Right")], &registry).unwrap_err();

        assert_eq!(errors.errors.len(), 1);
    }

    #[test]
    fn collect_all_reports_independent_errors() {
        let registry = registry(vec![
            binding("A", &["B"]),
            binding("B", &["A"]),
            binding("C", &["Missing"]),
        ]);

        let errors = resolve(&[key("A"), key("C"), key("Nowhere")], &registry).unwrap_err();

        assert_eq!(errors.errors.len(), 3);
        assert!(matches!(
            errors.errors[0],
            GraphError::CyclicDependency { .. }
        ));
        assert!(matches!(
            &errors.errors[1],
            GraphError::UnresolvedKey { key: missing, .. } if *missing == key("Missing")
        ));
        assert!(matches!(
            &errors.errors[2],
            GraphError::UnresolvedKey { requested_by: RequestSource::Entry, .. }
        ));
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let registry = registry(vec![binding("C", &["Missing"])]);
        let resolver = GraphResolver::new(ResolverConfig::new().fail_fast());

        let errors = resolver
            .resolve(&[key("C"), key("Nowhere")], &registry)
            .unwrap_err();

        assert_eq!(errors.errors.len(), 1);
    }

    #[test]
    fn partial_mode_lists_missing_keys() {
        let registry = registry(vec![binding("CoffeeMaker", &["Heater", "Pump"]), binding("Pump", &[])]);
        let resolver = GraphResolver::new(ResolverConfig::new().allow_partial(true));

        let resolution = resolver.resolve(&[key("CoffeeMaker")], &registry).unwrap();

        assert_eq!(produced(&resolution), vec![key("Pump"), key("CoffeeMaker")]);
        assert_eq!(resolution.unresolved(), &[key("Heater")]);
        assert!(!resolution.is_complete());
    }

    #[test]
    fn lazy_requests_are_rejected() {
        let registry = registry(vec![
            Binding::new(
                key("CoffeeMaker"),
                [KeyRequest {
                    key: key("Heater"),
                    form: RequestForm::Lazy,
                }],
                None,
                BindingOrigin::InjectConstructor {
                    owner: DeclPath::parse("coffee.CoffeeMaker"),
                },
            ),
            binding("Heater", &[]),
        ]);

        let errors = resolve(&[key("CoffeeMaker")], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::UnsupportedRequestForm {
                form: RequestForm::Lazy,
                key: key("Heater"),
                requested_by: key("CoffeeMaker"),
            }]
        );
    }

    #[test]
    fn provider_requests_resolve_like_instances() {
        let registry = registry(vec![
            Binding::new(
                key("CoffeeMaker"),
                [KeyRequest::provider(key("Heater"))],
                None,
                BindingOrigin::InjectConstructor {
                    owner: DeclPath::parse("coffee.CoffeeMaker"),
                },
            ),
            binding("Heater", &[]),
        ]);

        let resolution = resolve(&[key("CoffeeMaker")], &registry).unwrap();

        assert_eq!(produced(&resolution), vec![key("Heater"), key("CoffeeMaker")]);
    }

    #[test]
    fn repeated_runs_give_identical_order() {
        let registry = registry(vec![
            binding("App", &["Left", "Right", "Logger"]),
            binding("Left", &["Shared", "Logger"]),
            binding("Right", &["Shared"]),
            binding("Shared", &["Logger"]),
            binding("Logger", &[]),
        ]);
        let entries = [key("App"), key("Right")];

        let first = resolve(&entries, &registry).unwrap();
        let second = resolve(&entries, &registry).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.position(&key("Logger")), Some(0));
    }

    /// Links `0 -> 1 -> .. -> length - 1`, the last one optionally pointing back
    fn chain(length: usize, back_to: Option<usize>) -> BindingRegistry {
        let mut registry = BindingRegistry::new();
        for i in 0..length {
            let next = if i + 1 < length { Some(i + 1) } else { back_to };
            registry
                .register(Binding::new(
                    link(i),
                    next.map(|next| KeyRequest::instance(link(next))),
                    None,
                    BindingOrigin::InjectConstructor {
                        owner: DeclPath::new("chain", format!("Link{i}")),
                    },
                ))
                .unwrap();
        }
        registry
    }

    fn link(i: usize) -> Key {
        Key::of(TypeDesc::declared(DeclPath::new("chain", format!("Link{i}"))))
    }

    #[test]
    fn long_chain_resolves_without_deep_recursion() {
        const LENGTH: usize = 100_000;
        let registry = chain(LENGTH, None);

        let resolution = resolve(&[link(0)], &registry).unwrap();

        assert_eq!(resolution.order().len(), LENGTH);
        assert_eq!(resolution.order()[0].provided_key(), &link(LENGTH - 1));
        assert_eq!(resolution.order()[LENGTH - 1].provided_key(), &link(0));
    }

    #[test]
    fn cycle_at_the_end_of_a_long_chain() {
        const LENGTH: usize = 10_000;
        let registry = chain(LENGTH, Some(LENGTH - 3));

        let errors = resolve(&[link(0)], &registry).unwrap_err();

        assert_eq!(
            errors.errors,
            vec![GraphError::CyclicDependency {
                path: vec![
                    link(LENGTH - 3),
                    link(LENGTH - 2),
                    link(LENGTH - 1),
                    link(LENGTH - 3),
                ],
            }]
        );
    }
}
