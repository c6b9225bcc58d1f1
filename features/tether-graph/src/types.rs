use std::fmt::{self, Display};

/// Reference to a declared element (a class, interface or annotation type)
///
/// Identity is the package plus the chain of simple names, so two paths obtained
/// independently for the same declaration compare equal.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeclPath {
    pub package: String,
    /// Enclosing declarations from outermost to innermost
    pub enclosing: Vec<String>,
    pub simple: String,
}
impl DeclPath {
    pub fn new(package: impl Into<String>, simple: impl Into<String>) -> Self {
        DeclPath {
            package: package.into(),
            enclosing: Vec::new(),
            simple: simple.into(),
        }
    }

    /// Parses a dotted name, treating lowercase segments as the package
    /// and everything after the first capitalized segment as nested names.
    pub fn parse(qualified: &str) -> Self {
        let segments: Vec<&str> = qualified.split('.').collect();
        let split = segments
            .iter()
            .position(|segment| segment.starts_with(char::is_uppercase))
            .unwrap_or(segments.len().saturating_sub(1));

        let package = segments[..split].join(".");
        let names = &segments[split..];
        let (simple, enclosing) = match names.split_last() {
            Some((simple, enclosing)) => (
                (*simple).to_string(),
                enclosing.iter().map(|name| (*name).to_string()).collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        DeclPath {
            package,
            enclosing,
            simple,
        }
    }

    pub fn simple_name(&self) -> &str {
        &self.simple
    }

    pub fn fully_qualified_name(&self) -> String {
        let mut name = String::new();
        if !self.package.is_empty() {
            name.push_str(&self.package);
            name.push('.');
        }
        for enclosing in &self.enclosing {
            name.push_str(enclosing);
            name.push('.');
        }
        name.push_str(&self.simple);
        name
    }

    /// Binary-style name of the declaration inside its package, e.g. `Outer$Inner`
    pub fn class_file_name(&self) -> String {
        let mut name = self.enclosing.join("$");
        if !self.enclosing.is_empty() {
            name.push('$');
        }
        name.push_str(&self.simple);
        name
    }

    /// The outermost declaration containing this one (itself when top level)
    pub fn top_level(&self) -> DeclPath {
        match self.enclosing.first() {
            Some(outer) => DeclPath::new(self.package.clone(), outer.clone()),
            None => self.clone(),
        }
    }

    /// A declaration next to this one, in the same package and enclosing declaration
    pub fn peer_named(&self, simple: impl Into<String>) -> DeclPath {
        DeclPath {
            package: self.package.clone(),
            enclosing: self.enclosing.clone(),
            simple: simple.into(),
        }
    }

    /// A declaration nested directly inside this one
    pub fn member_named(&self, simple: impl Into<String>) -> DeclPath {
        let mut enclosing = self.enclosing.clone();
        enclosing.push(self.simple.clone());
        DeclPath {
            package: self.package.clone(),
            enclosing,
            simple: simple.into(),
        }
    }

    /// Simple name in lowerCamel form with `$` removed, usable as a field name
    pub fn lower_camel_name(&self) -> String {
        lower_camel(&self.simple.replace('$', ""))
    }
}
impl Display for DeclPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified_name())
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    Void,
}
impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }
}

/// Structural description of a type
///
/// Equality and hashing are derived, so two descriptions of the same type are
/// interchangeable no matter where they were obtained. Type arguments compare
/// element-wise and in order.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeDesc {
    Primitive(PrimitiveKind),
    Array(Box<TypeDesc>),
    Declared {
        decl: DeclPath,
        /// Type enclosing a non-static member type, if any
        enclosing: Option<Box<TypeDesc>>,
        args: Vec<TypeDesc>,
    },
    TypeVariable {
        upper: Option<Box<TypeDesc>>,
        lower: Option<Box<TypeDesc>>,
    },
    Wildcard {
        extends: Option<Box<TypeDesc>>,
        super_bound: Option<Box<TypeDesc>>,
    },
}
impl TypeDesc {
    /// A declared type without type arguments
    pub fn declared(decl: DeclPath) -> TypeDesc {
        TypeDesc::Declared {
            decl,
            enclosing: None,
            args: Vec::new(),
        }
    }

    /// A declared type with the given type arguments
    pub fn generic(decl: DeclPath, args: Vec<TypeDesc>) -> TypeDesc {
        TypeDesc::Declared {
            decl,
            enclosing: None,
            args,
        }
    }

    pub fn array_of(component: TypeDesc) -> TypeDesc {
        TypeDesc::Array(Box::new(component))
    }

    /// The referenced declaration for declared types
    pub fn decl(&self) -> Option<&DeclPath> {
        match self {
            TypeDesc::Declared { decl, .. } => Some(decl),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeDesc] {
        match self {
            TypeDesc::Declared { args, .. } => args,
            _ => &[],
        }
    }

    /// If this type is `wrapper<T>` with exactly one argument, returns `T`
    pub fn unwrap_single(&self, wrapper: &DeclPath) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Declared { decl, args, .. } if decl == wrapper => match args.as_slice() {
                [only] => Some(only),
                _ => None,
            },
            _ => None,
        }
    }

    /// UpperCamel fragment used when deriving identifiers from a type
    pub(crate) fn identifier_fragment(&self, out: &mut String) {
        match self {
            TypeDesc::Declared { decl, args, .. } => {
                out.push_str(decl.simple_name());
                let mut args = args.iter();
                if let Some(first) = args.next() {
                    out.push_str("Of");
                    first.identifier_fragment(out);
                    for next in args {
                        out.push_str("And");
                        next.identifier_fragment(out);
                    }
                }
            }
            TypeDesc::Primitive(kind) => out.push_str(&upper_camel(kind.name())),
            TypeDesc::Array(component) => {
                component.identifier_fragment(out);
                out.push_str("Array");
            }
            // Variables and wildcards do not contribute a name
            TypeDesc::TypeVariable { .. } | TypeDesc::Wildcard { .. } => {}
        }
    }
}
impl Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Primitive(kind) => f.write_str(kind.name()),
            TypeDesc::Array(component) => write!(f, "{component}[]"),
            TypeDesc::Declared { decl, args, .. } => {
                write!(f, "{decl}")?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i != 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeDesc::TypeVariable { upper, lower } => {
                f.write_str("var")?;
                if let Some(upper) = upper {
                    write!(f, " extends {upper}")?;
                }
                if let Some(lower) = lower {
                    write!(f, " super {lower}")?;
                }
                Ok(())
            }
            TypeDesc::Wildcard {
                extends,
                super_bound,
            } => {
                f.write_str("?")?;
                if let Some(extends) = extends {
                    write!(f, " extends {extends}")?;
                }
                if let Some(super_bound) = super_bound {
                    write!(f, " super {super_bound}")?;
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn upper_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
