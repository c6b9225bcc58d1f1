use std::error::Error;

use tether_graph::{
    plan_component, AnnotationDecl, ComponentAssembler, ComponentDecl, Construction,
    DeclarationSet, DeclPath, GraphResolver, InjectConstructorDecl, MethodDecl, ModuleDecl,
    ParameterDecl, ResolverConfig, TypeDesc,
};
use tether_scope::ScopedCell;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let declarations = DeclarationSet::new()
        .add_module(
            ModuleDecl::new(path("coffee.DripCoffeeModule"))
                .include(path("coffee.PumpModule"))
                .provides(
                    MethodDecl::new("provideHeater", ty("coffee.Heater"))
                        .annotated(AnnotationDecl::scope("javax.inject.Singleton"))
                        .param(ParameterDecl::new("heater", ty("coffee.ElectricHeater"))),
                ),
        )
        .add_module(
            ModuleDecl::new(path("coffee.PumpModule")).provides(
                MethodDecl::new("providePump", ty("coffee.Pump"))
                    .param(ParameterDecl::new("pump", ty("coffee.Thermosiphon"))),
            ),
        )
        .add_inject_constructor(InjectConstructorDecl::new(path("coffee.ElectricHeater")))
        .add_inject_constructor(
            InjectConstructorDecl::new(path("coffee.Thermosiphon"))
                .param(ParameterDecl::new("heater", ty("coffee.Heater"))),
        )
        .add_inject_constructor(
            InjectConstructorDecl::new(path("coffee.CoffeeMaker"))
                .param(ParameterDecl::new(
                    "heater",
                    TypeDesc::generic(path("javax.inject.Provider"), vec![ty("coffee.Heater")]),
                ))
                .param(ParameterDecl::new("pump", ty("coffee.Pump"))),
        );

    let component = ComponentDecl::new(path("coffee.CoffeeApp.Coffee"))
        .module(path("coffee.DripCoffeeModule"))
        .method(MethodDecl::new("maker", ty("coffee.CoffeeMaker")));

    let plan = plan_component(
        &component,
        &declarations,
        &ComponentAssembler::default(),
        &GraphResolver::new(ResolverConfig::new()),
    )?;

    println!("{}", plan.component_name());
    for module in plan.modules() {
        println!("  {} {} = new {}()", module.decl, module.field, module.decl);
    }
    for step in plan.steps() {
        let construction = match &step.construction {
            Construction::Direct => String::new(),
            Construction::Scoped(scope) => format!(" {scope}"),
        };
        println!(
            "  {}{} = {}({})",
            step.field,
            construction,
            step.factory,
            step.arguments.join(", ")
        );
    }
    for accessor in plan.accessors() {
        println!("  {}() -> {}", accessor.method, accessor.field);
    }

    // The scoped heater is built once no matter how often the maker asks for it
    let heater = ScopedCell::boxed(|| Some(String::from("electric heater")));
    for _ in 0..3 {
        println!("heating with {}", heater.get()?);
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(EnvFilter::from_default_env())
        .init();
}

fn path(name: &str) -> DeclPath {
    DeclPath::parse(name)
}

fn ty(name: &str) -> TypeDesc {
    TypeDesc::declared(path(name))
}
