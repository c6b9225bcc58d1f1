use std::fmt::{self, Display};

use crate::{
    key::{Key, KeyRequest, Scope},
    types::DeclPath,
};

/// The declaration a binding was created from
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum BindingOrigin {
    /// Injectable constructor of `owner`
    InjectConstructor { owner: DeclPath },
    /// Provides method declared on a module
    ProvidesMethod { module: DeclPath, method: String },
    /// Accessor method of a component this component depends on
    ComponentMethod { component: DeclPath, method: String },
}
impl Display for BindingOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingOrigin::InjectConstructor { owner } => write!(f, "{owner}.<init>"),
            BindingOrigin::ProvidesMethod { module, method } => write!(f, "{module}.{method}()"),
            BindingOrigin::ComponentMethod { component, method } => {
                write!(f, "{component}.{method}()")
            }
        }
    }
}

/// A node of the dependency graph: how to produce one key from others
///
/// Immutable once built. Requests keep their declaration order and duplicates
/// are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    provided_key: Key,
    requests: Vec<KeyRequest>,
    scope: Option<Scope>,
    origin: BindingOrigin,
}
impl Binding {
    pub fn new(
        provided_key: Key,
        requests: impl IntoIterator<Item = KeyRequest>,
        scope: Option<Scope>,
        origin: BindingOrigin,
    ) -> Self {
        let mut unique: Vec<KeyRequest> = Vec::new();
        for request in requests {
            if !unique.contains(&request) {
                unique.push(request);
            }
        }

        Binding {
            provided_key,
            requests: unique,
            scope,
            origin,
        }
    }

    pub fn provided_key(&self) -> &Key {
        &self.provided_key
    }

    pub fn requests(&self) -> &[KeyRequest] {
        &self.requests
    }

    /// Keys this binding depends on, in declaration order, without request forms
    pub fn required_keys(&self) -> Vec<&Key> {
        let mut keys: Vec<&Key> = Vec::with_capacity(self.requests.len());
        for request in &self.requests {
            if !keys.contains(&&request.key) {
                keys.push(&request.key);
            }
        }
        keys
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    pub fn origin(&self) -> &BindingOrigin {
        &self.origin
    }
}
