use std::fmt::{self, Display};

use thiserror::Error;

use crate::{
    binding::BindingOrigin,
    key::{Key, RequestForm},
    types::DeclPath,
};

/// Who asked for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    /// An entry point of the component
    Entry,
    /// The binding producing the given key
    Binding(Key),
}
impl Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSource::Entry => f.write_str("an entry point"),
            RequestSource::Binding(key) => write!(f, "'{key}'"),
        }
    }
}

/// Errors found while turning declarations into bindings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("'{key}' is bound twice: by {existing} and by {rejected}")]
    DuplicateBindingKey {
        key: Key,
        existing: BindingOrigin,
        rejected: BindingOrigin,
    },
    #[error("'{key}' is requested as {form}, which cannot be resolved")]
    UnsupportedRequestForm { form: RequestForm, key: Key },
    #[error("{method} has more than one scope annotation")]
    MultipleScopes { method: String },
    #[error("'{key}' is requested more than once by the same declaration")]
    DuplicateParameter { key: Key },
    #[error("'{key}' has more than one injectable constructor")]
    MultipleInjectConstructors { key: Key },
    #[error("'{owner}' is abstract and cannot have an injectable constructor")]
    AbstractInjectConstructor { owner: DeclPath },
    #[error("Module '{module}' is referenced but was never declared")]
    UnknownModule { module: DeclPath },
    #[error("Module '{module}' is declared more than once")]
    DuplicateModule { module: DeclPath },
    #[error("{component}.{method}() takes more than one parameter and is not a valid entry point")]
    InvalidEntryPoint { component: DeclPath, method: String },
    #[error("{component}.{method}() takes parameters and cannot provide a binding")]
    ComponentMethodHasParameters { component: DeclPath, method: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct DeclarationErrors {
    pub errors: Vec<DeclarationError>,
}
impl Display for DeclarationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, "The declarations had one or more errors:", &self.errors)
    }
}
impl From<DeclarationError> for DeclarationErrors {
    fn from(error: DeclarationError) -> Self {
        DeclarationErrors {
            errors: vec![error],
        }
    }
}

/// Errors found while resolving the graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{requested_by} needs '{key}' but nothing provides it (via {})", DisplayChain(.chain))]
    UnresolvedKey {
        key: Key,
        requested_by: RequestSource,
        /// Keys on the path from the entry point to the requester
        chain: Vec<Key>,
    },
    #[error("A cyclic dependency exists: {}", DisplayChain(.path))]
    CyclicDependency {
        /// The cycle, starting and ending with the same key
        path: Vec<Key>,
    },
    #[error("'{requested_by}' requests '{key}' as {form}, which cannot be resolved")]
    UnsupportedRequestForm {
        form: RequestForm,
        key: Key,
        requested_by: Key,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct GraphErrors {
    pub errors: Vec<GraphError>,
}
impl Display for GraphErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, "The dependency graph had one or more errors:", &self.errors)
    }
}

/// Either kind of failure when going from declarations to a resolved graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error(transparent)]
    Declaration(#[from] DeclarationErrors),
    #[error(transparent)]
    Graph(#[from] GraphErrors),
}

fn write_list<E: Display>(f: &mut fmt::Formatter<'_>, title: &str, errors: &[E]) -> fmt::Result {
    let mut display = Vec::with_capacity(errors.len() + 1);
    display.push(title.to_string());
    for error in errors {
        display.push(format!("- {error}"));
    }
    f.write_str(&display.join("\n"))
}

struct DisplayChain<'a>(&'a [Key]);
impl Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("entry point");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
