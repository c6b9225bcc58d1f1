//! Declarations as handed over by the extractor.
//!
//! These mirror what the extractor found in source: constructors, module methods
//! and component interfaces, with annotations already classified. They carry no
//! graph semantics of their own, the [`crate::factories`] turn them into keys and
//! bindings.

use std::collections::{hash_map::Entry, HashMap};

use crate::types::{DeclPath, TypeDesc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Annotation type is itself annotated as a qualifier
    Qualifier,
    /// Annotation type is itself annotated as a scope
    Scope,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationDecl {
    pub annotation: DeclPath,
    pub kind: AnnotationKind,
    pub value: Option<String>,
}
impl AnnotationDecl {
    pub fn qualifier(annotation: &str, value: Option<&str>) -> Self {
        AnnotationDecl {
            annotation: DeclPath::parse(annotation),
            kind: AnnotationKind::Qualifier,
            value: value.map(str::to_string),
        }
    }

    pub fn scope(annotation: &str) -> Self {
        AnnotationDecl {
            annotation: DeclPath::parse(annotation),
            kind: AnnotationKind::Scope,
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    pub name: String,
    pub ty: TypeDesc,
    pub annotations: Vec<AnnotationDecl>,
}
impl ParameterDecl {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        ParameterDecl {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: AnnotationDecl) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A provides method of a module or an abstract method of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeDesc,
    pub parameters: Vec<ParameterDecl>,
    pub annotations: Vec<AnnotationDecl>,
}
impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeDesc) -> Self {
        MethodDecl {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn param(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotated(mut self, annotation: AnnotationDecl) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// An injectable constructor of `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectConstructorDecl {
    pub owner: DeclPath,
    pub is_abstract: bool,
    pub parameters: Vec<ParameterDecl>,
}
impl InjectConstructorDecl {
    pub fn new(owner: DeclPath) -> Self {
        InjectConstructorDecl {
            owner,
            is_abstract: false,
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: DeclPath,
    /// Modules whose bindings this module brings along
    pub includes: Vec<DeclPath>,
    pub provides: Vec<MethodDecl>,
}
impl ModuleDecl {
    pub fn new(name: DeclPath) -> Self {
        ModuleDecl {
            name,
            includes: Vec::new(),
            provides: Vec::new(),
        }
    }

    pub fn include(mut self, module: DeclPath) -> Self {
        self.includes.push(module);
        self
    }

    pub fn provides(mut self, method: MethodDecl) -> Self {
        self.provides.push(method);
        self
    }
}

/// Another component whose accessors this component may use as bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    pub name: DeclPath,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDecl {
    pub name: DeclPath,
    pub modules: Vec<DeclPath>,
    pub dependencies: Vec<DependencyDecl>,
    /// Abstract accessor methods, in declaration order
    pub methods: Vec<MethodDecl>,
}
impl ComponentDecl {
    pub fn new(name: DeclPath) -> Self {
        ComponentDecl {
            name,
            modules: Vec::new(),
            dependencies: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn module(mut self, module: DeclPath) -> Self {
        self.modules.push(module);
        self
    }

    pub fn dependency(mut self, dependency: DependencyDecl) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// Everything the extractor collected, shared by all components
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    modules: HashMap<DeclPath, ModuleDecl>,
    /// Names declared more than once, only the first declaration is kept
    duplicate_modules: Vec<DeclPath>,
    inject_constructors: Vec<InjectConstructorDecl>,
}
impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, a second module with the same name is set aside
    pub fn add_module(mut self, module: ModuleDecl) -> Self {
        match self.modules.entry(module.name.clone()) {
            Entry::Occupied(existing) => {
                tracing::warn!("Module {} is declared more than once", existing.key());
                if !self.duplicate_modules.contains(existing.key()) {
                    self.duplicate_modules.push(existing.key().clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(module);
            }
        }
        self
    }

    pub fn add_inject_constructor(mut self, constructor: InjectConstructorDecl) -> Self {
        self.inject_constructors.push(constructor);
        self
    }

    pub fn module(&self, name: &DeclPath) -> Option<&ModuleDecl> {
        self.modules.get(name)
    }

    pub fn is_duplicate_module(&self, name: &DeclPath) -> bool {
        self.duplicate_modules.contains(name)
    }

    pub fn inject_constructors(&self) -> &[InjectConstructorDecl] {
        &self.inject_constructors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_module_declaration_is_kept() {
        let name = DeclPath::parse("coffee.PumpModule");
        let declarations = DeclarationSet::new()
            .add_module(ModuleDecl::new(name.clone()).include(DeclPath::parse("coffee.HeaterModule")))
            .add_module(ModuleDecl::new(name.clone()));

        let kept = declarations.module(&name).unwrap();
        assert_eq!(kept.includes, vec![DeclPath::parse("coffee.HeaterModule")]);
        assert!(declarations.is_duplicate_module(&name));
        assert!(!declarations.is_duplicate_module(&DeclPath::parse("coffee.HeaterModule")));
    }
}
