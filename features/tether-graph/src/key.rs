use std::fmt::{self, Display};

use crate::types::{lower_camel, DeclPath, TypeDesc};

/// Qualifier annotation distinguishing two bindings of the same type
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Qualifier {
    pub annotation: DeclPath,
    /// The annotation's value, e.g. the name of a `@Named`
    pub value: Option<String>,
}
impl Qualifier {
    pub fn new(annotation: DeclPath) -> Self {
        Qualifier {
            annotation,
            value: None,
        }
    }

    pub fn with_value(annotation: DeclPath, value: impl Into<String>) -> Self {
        Qualifier {
            annotation,
            value: Some(value.into()),
        }
    }
}
impl Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation)?;
        if let Some(value) = &self.value {
            write!(f, "({value:?})")?;
        }
        Ok(())
    }
}

/// Scope annotation marking a binding as memoized per component
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Scope(pub DeclPath);
impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Identity of a binding: a type plus an optional qualifier
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub qualifier: Option<Qualifier>,
    pub ty: TypeDesc,
}
impl Key {
    pub fn of(ty: TypeDesc) -> Self {
        Key {
            qualifier: None,
            ty,
        }
    }

    pub fn qualified(qualifier: Qualifier, ty: TypeDesc) -> Self {
        Key {
            qualifier: Some(qualifier),
            ty,
        }
    }

    /// Key for an unqualified, non-generic declared type
    pub fn for_decl(qualified_name: &str) -> Self {
        Key::of(TypeDesc::declared(DeclPath::parse(qualified_name)))
    }

    /// Identifier for fields and parameters holding this key's provider
    ///
    /// `@Named Pump` becomes `namedPump`, `Map<String, Heater>` becomes
    /// `mapOfStringAndHeater`.
    pub fn suggested_identifier(&self) -> String {
        let mut builder = String::new();
        if let Some(qualifier) = &self.qualifier {
            builder.push_str(qualifier.annotation.simple_name());
        }
        self.ty.identifier_fragment(&mut builder);
        lower_camel(&builder)
    }
}
impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// How a dependency is requested
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestForm {
    /// The instance itself
    Instance,
    /// A provider which produces the instance on demand
    Provider,
    /// Deferred lookup, has no resolution strategy and is always rejected
    Lazy,
}
impl Display for RequestForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestForm::Instance => "instance",
            RequestForm::Provider => "provider",
            RequestForm::Lazy => "lazy",
        })
    }
}

/// A dependency of a binding
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyRequest {
    pub key: Key,
    pub form: RequestForm,
}
impl KeyRequest {
    pub fn instance(key: Key) -> Self {
        KeyRequest {
            key,
            form: RequestForm::Instance,
        }
    }

    pub fn provider(key: Key) -> Self {
        KeyRequest {
            key,
            form: RequestForm::Provider,
        }
    }
}
