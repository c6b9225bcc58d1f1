use std::collections::HashSet;

use crate::{
    declare::{ComponentDecl, DeclarationSet, ModuleDecl},
    errors::{AssembleError, DeclarationError, DeclarationErrors, GraphErrors},
    factories::BindingFactory,
    key::Key,
    plan::WiringPlan,
    registry::BindingRegistry,
    resolver::{GraphResolver, Resolution},
    types::DeclPath,
};

/// An accessor of the component whose key must be obtainable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub method: String,
    pub key: Key,
}

/// Result of registering everything a component can see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledComponent {
    name: DeclPath,
    modules: Vec<DeclPath>,
    dependencies: Vec<DeclPath>,
    entry_points: Vec<EntryPoint>,
}
impl AssembledComponent {
    pub fn name(&self) -> &DeclPath {
        &self.name
    }

    /// Every module reachable from the component, declared ones before their includes
    pub fn modules(&self) -> &[DeclPath] {
        &self.modules
    }

    pub fn dependencies(&self) -> &[DeclPath] {
        &self.dependencies
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    pub fn entry_keys(&self) -> Vec<Key> {
        self.entry_points
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    pub fn resolve<'r>(
        &self,
        resolver: &GraphResolver,
        registry: &'r BindingRegistry,
    ) -> Result<Resolution<'r>, GraphErrors> {
        resolver.resolve(&self.entry_keys(), registry)
    }
}

/// Turns a component declaration into registered bindings and entry points
#[derive(Debug, Clone, Default)]
pub struct ComponentAssembler {
    bindings: BindingFactory,
}
impl ComponentAssembler {
    pub fn new(bindings: BindingFactory) -> Self {
        ComponentAssembler { bindings }
    }

    /// Registers every binding visible to `component` into `registry`
    ///
    /// All declaration errors are collected before returning. Bindings that were
    /// valid stay registered even when others failed.
    pub fn assemble(
        &self,
        component: &ComponentDecl,
        declarations: &DeclarationSet,
        registry: &mut BindingRegistry,
    ) -> Result<AssembledComponent, DeclarationErrors> {
        let mut errors = Vec::new();

        let modules = gather_modules(component, declarations, &mut errors);
        tracing::debug!(
            "Component {} uses {} modules",
            component.name,
            modules.len()
        );

        for module in &modules {
            for method in &module.provides {
                let registered = self
                    .bindings
                    .for_provides_method(&module.name, method)
                    .and_then(|binding| registry.register(binding));
                if let Err(error) = registered {
                    errors.push(error);
                }
            }
        }

        for dependency in &component.dependencies {
            for method in &dependency.methods {
                let registered = self
                    .bindings
                    .for_component_method(&dependency.name, method)
                    .and_then(|binding| registry.register(binding));
                if let Err(error) = registered {
                    errors.push(error);
                }
            }
        }

        let (constructed, rejected) = self
            .bindings
            .for_inject_constructors(declarations.inject_constructors());
        errors.extend(rejected);
        if let Err(duplicates) = registry.register_all(constructed) {
            errors.extend(duplicates);
        }

        let entry_points = self.entry_points(component, &mut errors);

        if !errors.is_empty() {
            return Err(DeclarationErrors { errors });
        }

        Ok(AssembledComponent {
            name: component.name.clone(),
            modules: modules.into_iter().map(|module| module.name.clone()).collect(),
            dependencies: component
                .dependencies
                .iter()
                .map(|dependency| dependency.name.clone())
                .collect(),
            entry_points,
        })
    }

    fn entry_points(
        &self,
        component: &ComponentDecl,
        errors: &mut Vec<DeclarationError>,
    ) -> Vec<EntryPoint> {
        let mut entry_points = Vec::new();
        for method in &component.methods {
            match method.parameters.len() {
                0 => match self.bindings.keys().for_component_method(&component.name, method) {
                    Ok(key) => entry_points.push(EntryPoint {
                        method: method.name.clone(),
                        key,
                    }),
                    Err(error) => errors.push(error),
                },
                1 => tracing::warn!(
                    "Skipping {}.{}(), members injection is not supported",
                    component.name,
                    method.name
                ),
                _ => errors.push(DeclarationError::InvalidEntryPoint {
                    component: component.name.clone(),
                    method: method.name.clone(),
                }),
            }
        }
        entry_points
    }
}

/// Declared modules plus everything they include, deduplicated
///
/// Gathered level by level: all modules of a list come first, then the includes
/// of each of them in turn, each expanded the same way. The first module to
/// register a key wins, so this order decides which duplicate is rejected.
fn gather_modules<'d>(
    component: &ComponentDecl,
    declarations: &'d DeclarationSet,
    errors: &mut Vec<DeclarationError>,
) -> Vec<&'d ModuleDecl> {
    let mut gathered = Vec::new();
    let mut seen: HashSet<&DeclPath> = HashSet::new();
    let mut pending: Vec<Vec<DeclPath>> = vec![component.modules.clone()];

    while let Some(names) = pending.pop() {
        let mut level: Vec<&'d ModuleDecl> = Vec::new();
        for name in names {
            let Some(module) = declarations.module(&name) else {
                let error = DeclarationError::UnknownModule { module: name };
                if !errors.contains(&error) {
                    errors.push(error);
                }
                continue;
            };
            // Include cycles stop here
            if seen.insert(&module.name) {
                tracing::trace!("Gathered module {}", module.name);
                if declarations.is_duplicate_module(&module.name) {
                    errors.push(DeclarationError::DuplicateModule {
                        module: module.name.clone(),
                    });
                }
                gathered.push(module);
                level.push(module);
            }
        }

        // Reversed so the first module's includes are expanded first
        for module in level.into_iter().rev() {
            if !module.includes.is_empty() {
                pending.push(module.includes.clone());
            }
        }
    }

    gathered
}

/// Assembles `component` and resolves it into a wiring plan
pub fn plan_component(
    component: &ComponentDecl,
    declarations: &DeclarationSet,
    assembler: &ComponentAssembler,
    resolver: &GraphResolver,
) -> Result<WiringPlan, AssembleError> {
    let mut registry = BindingRegistry::new();
    let assembled = assembler.assemble(component, declarations, &mut registry)?;
    let resolution = assembled.resolve(resolver, &registry)?;

    Ok(WiringPlan::for_component(&assembled, &resolution))
}
