//! Build-time dependency graph resolution.
//!
//! Declarations found in source are turned into [`Binding`]s keyed by [`Key`],
//! registered in a [`BindingRegistry`] and resolved from a component's entry
//! points into a construction order. The order is then laid out as a
//! [`WiringPlan`] for a code emitter to write out.
//!
//! ```
//! use tether_graph::{resolve, Binding, BindingOrigin, BindingRegistry, DeclPath, Key, KeyRequest};
//!
//! let pump = Key::for_decl("coffee.Pump");
//! let maker = Key::for_decl("coffee.CoffeeMaker");
//!
//! let mut registry = BindingRegistry::new();
//! registry
//!     .register_all([
//!         Binding::new(
//!             maker.clone(),
//!             [KeyRequest::instance(pump.clone())],
//!             None,
//!             BindingOrigin::InjectConstructor { owner: DeclPath::parse("coffee.CoffeeMaker") },
//!         ),
//!         Binding::new(
//!             pump.clone(),
//!             [],
//!             None,
//!             BindingOrigin::InjectConstructor { owner: DeclPath::parse("coffee.Pump") },
//!         ),
//!     ])
//!     .unwrap();
//!
//! let resolution = resolve(&[maker.clone()], &registry).unwrap();
//! assert!(resolution.position(&pump) < resolution.position(&maker));
//! ```

pub mod binding;
pub mod component;
pub mod config;
pub mod declare;
pub mod errors;
pub mod factories;
pub mod key;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod types;

pub use binding::{Binding, BindingOrigin};
pub use component::{plan_component, AssembledComponent, ComponentAssembler, EntryPoint};
pub use config::{ErrorMode, ResolverConfig, WrapperDecls};
pub use declare::{
    AnnotationDecl, AnnotationKind, ComponentDecl, DeclarationSet, DependencyDecl,
    InjectConstructorDecl, MethodDecl, ModuleDecl, ParameterDecl,
};
pub use errors::{
    AssembleError, DeclarationError, DeclarationErrors, GraphError, GraphErrors, RequestSource,
};
pub use factories::{BindingFactory, KeyFactory};
pub use key::{Key, KeyRequest, Qualifier, RequestForm, Scope};
pub use plan::{Accessor, ComponentField, Construction, FactoryRef, PlanStep, WiringPlan};
pub use registry::BindingRegistry;
pub use resolver::{resolve, GraphResolver, Resolution};
pub use types::{DeclPath, PrimitiveKind, TypeDesc};
