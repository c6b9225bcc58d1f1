//! What the code emitter needs to write a component implementation.
//!
//! A [`WiringPlan`] lists one step per resolved binding, in construction order.
//! Every step names the field holding the binding's provider, the factory that
//! builds it and the fields passed to that factory. No source text is produced
//! here.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
};

use crate::{
    binding::{Binding, BindingOrigin},
    component::{AssembledComponent, EntryPoint},
    key::{Key, Scope},
    resolver::Resolution,
    types::{upper_camel, DeclPath},
};

/// How the field of a step holds its provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construction {
    /// Factory is called for every request
    Direct,
    /// Factory result is memoized in a `ScopedCell`
    Scoped(Scope),
}

/// The factory a step constructs its provider from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryRef {
    /// Generated factory of an injectable constructor, `Owner$$Factory`
    Constructor(DeclPath),
    /// Generated factory of a provides method, `Module$$Factories.MethodName`
    ProvidesMethod(DeclPath),
    /// Accessor called on the field holding a dependency component
    ComponentMethod { field: String, method: String },
}
impl FactoryRef {
    fn for_binding(binding: &Binding, fields: &ComponentFields) -> FactoryRef {
        match binding.origin() {
            BindingOrigin::InjectConstructor { owner } => {
                FactoryRef::Constructor(factory_for_type(owner))
            }
            BindingOrigin::ProvidesMethod { module, method } => FactoryRef::ProvidesMethod(
                factories_for_module(module).member_named(upper_camel(method)),
            ),
            BindingOrigin::ComponentMethod { component, method } => FactoryRef::ComponentMethod {
                field: fields.dependency_field(component),
                method: method.clone(),
            },
        }
    }
}
impl Display for FactoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryRef::Constructor(name) | FactoryRef::ProvidesMethod(name) => {
                write!(f, "{name}")
            }
            FactoryRef::ComponentMethod { field, method } => write!(f, "{field}.{method}()"),
        }
    }
}

/// Construction of one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub field: String,
    pub key: Key,
    pub construction: Construction,
    pub factory: FactoryRef,
    /// Fields handed to the factory: the module first for provides methods,
    /// then one per required key
    pub arguments: Vec<String>,
}

/// A module or dependency component the generated component keeps a field for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentField {
    pub decl: DeclPath,
    pub field: String,
}

/// A component method returning the value held by `field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub method: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringPlan {
    component_name: DeclPath,
    modules: Vec<ComponentField>,
    dependencies: Vec<ComponentField>,
    steps: Vec<PlanStep>,
    accessors: Vec<Accessor>,
}
impl WiringPlan {
    /// Lays out the fields and steps for `resolution`
    ///
    /// Only modules and dependency components used by a resolved binding get a
    /// field. Keys left unresolved in a partial resolution get a field name but
    /// no step.
    pub fn from_resolution(
        component: &DeclPath,
        resolution: &Resolution<'_>,
        entry_points: &[EntryPoint],
    ) -> WiringPlan {
        WiringPlan::lay_out(component, &[], &[], resolution, entry_points)
    }

    /// Lays out `resolution` for an assembled component
    ///
    /// Every gathered module and every declared dependency component gets a
    /// field, in declaration order, whether a resolved binding uses it or not.
    pub fn for_component(
        assembled: &AssembledComponent,
        resolution: &Resolution<'_>,
    ) -> WiringPlan {
        WiringPlan::lay_out(
            assembled.name(),
            assembled.modules(),
            assembled.dependencies(),
            resolution,
            assembled.entry_points(),
        )
    }

    fn lay_out(
        component: &DeclPath,
        modules: &[DeclPath],
        dependencies: &[DeclPath],
        resolution: &Resolution<'_>,
        entry_points: &[EntryPoint],
    ) -> WiringPlan {
        let mut fields = ComponentFields::default();
        for module in modules {
            fields.add_module(module);
        }
        for dependency in dependencies {
            fields.add_dependency(dependency);
        }
        for binding in resolution.order() {
            match binding.origin() {
                BindingOrigin::ProvidesMethod { module, .. } => fields.add_module(module),
                BindingOrigin::ComponentMethod { component, .. } => {
                    fields.add_dependency(component)
                }
                BindingOrigin::InjectConstructor { .. } => {}
            }
        }
        for key in resolution.keys() {
            fields.add_key(key);
        }

        let steps: Vec<PlanStep> = resolution
            .order()
            .iter()
            .map(|binding| {
                let mut arguments = Vec::new();
                if let BindingOrigin::ProvidesMethod { module, .. } = binding.origin() {
                    arguments.push(fields.module_field(module));
                }
                arguments.extend(
                    binding
                        .required_keys()
                        .into_iter()
                        .map(|key| fields.key_field(key)),
                );

                PlanStep {
                    field: fields.key_field(binding.provided_key()),
                    key: binding.provided_key().clone(),
                    construction: match binding.scope() {
                        Some(scope) => Construction::Scoped(scope.clone()),
                        None => Construction::Direct,
                    },
                    factory: FactoryRef::for_binding(binding, &fields),
                    arguments,
                }
            })
            .collect();

        let accessors = entry_points
            .iter()
            .map(|entry| Accessor {
                method: entry.method.clone(),
                field: fields.key_field(&entry.key),
            })
            .collect();

        tracing::debug!("Planned {} steps for {}", steps.len(), component);

        WiringPlan {
            component_name: component.peer_named(format!("TetherComponent_{}", component.simple)),
            modules: fields.modules,
            dependencies: fields.dependencies,
            steps,
            accessors,
        }
    }

    /// Name of the generated implementation, next to the component
    pub fn component_name(&self) -> &DeclPath {
        &self.component_name
    }

    /// Modules the generated component holds an instance of
    pub fn modules(&self) -> &[ComponentField] {
        &self.modules
    }

    /// Dependency components the generated component is constructed with
    pub fn dependencies(&self) -> &[ComponentField] {
        &self.dependencies
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    pub fn step_for(&self, key: &Key) -> Option<&PlanStep> {
        self.steps.iter().find(|step| step.key == *key)
    }
}

fn factory_for_type(owner: &DeclPath) -> DeclPath {
    owner
        .top_level()
        .peer_named(format!("{}$$Factory", owner.class_file_name()))
}

fn factories_for_module(module: &DeclPath) -> DeclPath {
    module
        .top_level()
        .peer_named(format!("{}$$Factories", module.class_file_name()))
}

/// Field names of the generated component, kept unique
#[derive(Default)]
struct ComponentFields {
    modules: Vec<ComponentField>,
    dependencies: Vec<ComponentField>,
    keys: HashMap<Key, String>,
    taken: HashSet<String>,
}
impl ComponentFields {
    fn add_module(&mut self, module: &DeclPath) {
        if self.modules.iter().any(|field| field.decl == *module) {
            return;
        }
        let field = self.claim(module.lower_camel_name());
        self.modules.push(ComponentField {
            decl: module.clone(),
            field,
        });
    }

    fn add_dependency(&mut self, component: &DeclPath) {
        if self.dependencies.iter().any(|field| field.decl == *component) {
            return;
        }
        let field = self.claim(component.lower_camel_name());
        self.dependencies.push(ComponentField {
            decl: component.clone(),
            field,
        });
    }

    fn add_key(&mut self, key: &Key) {
        if self.keys.contains_key(key) {
            return;
        }
        let field = self.claim(key.suggested_identifier());
        self.keys.insert(key.clone(), field);
    }

    /// Reserves `name`, appending the first free counter when it is already in use
    fn claim(&mut self, name: String) -> String {
        let mut candidate = name.clone();
        let mut counter = 1;
        while self.taken.contains(&candidate) {
            counter += 1;
            candidate = format!("{name}{counter}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn module_field(&self, module: &DeclPath) -> String {
        lookup(&self.modules, module).unwrap_or_else(|| module.lower_camel_name())
    }

    fn dependency_field(&self, component: &DeclPath) -> String {
        lookup(&self.dependencies, component).unwrap_or_else(|| component.lower_camel_name())
    }

    fn key_field(&self, key: &Key) -> String {
        self.keys
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.suggested_identifier())
    }
}

fn lookup(fields: &[ComponentField], decl: &DeclPath) -> Option<String> {
    fields
        .iter()
        .find(|field| field.decl == *decl)
        .map(|field| field.field.clone())
}
