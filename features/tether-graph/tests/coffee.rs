use pretty_assertions::assert_eq;
use tether_graph::{
    plan_component, AnnotationDecl, AssembleError, BindingRegistry, ComponentAssembler,
    ComponentDecl, Construction, DeclarationError, DeclarationSet, DeclPath, DependencyDecl,
    GraphError,
    GraphResolver, InjectConstructorDecl, Key, MethodDecl, ModuleDecl, ParameterDecl,
    RequestSource, ResolverConfig, TypeDesc,
};

fn path(name: &str) -> DeclPath {
    DeclPath::parse(name)
}

fn ty(name: &str) -> TypeDesc {
    TypeDesc::declared(path(name))
}

fn provider(name: &str) -> TypeDesc {
    TypeDesc::generic(path("javax.inject.Provider"), vec![ty(name)])
}

fn coffee_declarations() -> DeclarationSet {
    DeclarationSet::new()
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
                .param(ParameterDecl::new("heater", provider("coffee.Heater")))
                .param(ParameterDecl::new("pump", ty("coffee.Pump"))),
        )
}

fn coffee_component() -> ComponentDecl {
    ComponentDecl::new(path("coffee.CoffeeApp.Coffee"))
        .module(path("coffee.DripCoffeeModule"))
        .method(MethodDecl::new("maker", ty("coffee.CoffeeMaker")))
}

#[test]
fn heater_and_pump_are_built_before_the_maker() {
    let mut registry = BindingRegistry::new();
    let assembled = ComponentAssembler::default()
        .assemble(&coffee_component(), &coffee_declarations(), &mut registry)
        .unwrap();

    let resolution = assembled
        .resolve(&GraphResolver::default(), &registry)
        .unwrap();

    let position = |name: &str| resolution.position(&Key::for_decl(name)).unwrap();
    assert!(position("coffee.Heater") < position("coffee.CoffeeMaker"));
    assert!(position("coffee.Pump") < position("coffee.CoffeeMaker"));
    assert!(position("coffee.ElectricHeater") < position("coffee.Heater"));
    assert!(position("coffee.Heater") < position("coffee.Thermosiphon"));
    assert_eq!(resolution.order().len(), 5);
}

#[test]
fn plan_wraps_only_the_scoped_heater() {
    let plan = plan_component(
        &coffee_component(),
        &coffee_declarations(),
        &ComponentAssembler::default(),
        &GraphResolver::default(),
    )
    .unwrap();

    let scoped: Vec<&str> = plan
        .steps()
        .iter()
        .filter(|step| matches!(step.construction, Construction::Scoped(_)))
        .map(|step| step.field.as_str())
        .collect();
    assert_eq!(scoped, vec!["heater"]);

    let maker = plan.step_for(&Key::for_decl("coffee.CoffeeMaker")).unwrap();
    assert_eq!(maker.factory.to_string(), "coffee.CoffeeMaker$$Factory");
    assert_eq!(maker.arguments, vec!["heater".to_string(), "pump".to_string()]);

    let pump = plan.step_for(&Key::for_decl("coffee.Pump")).unwrap();
    assert_eq!(
        pump.factory.to_string(),
        "coffee.PumpModule$$Factories.ProvidePump"
    );
    assert_eq!(pump.arguments, vec!["pumpModule".to_string(), "thermosiphon".to_string()]);

    assert_eq!(
        plan.component_name().fully_qualified_name(),
        "coffee.CoffeeApp.TetherComponent_Coffee"
    );
}

#[test]
fn missing_constructor_is_reported_with_its_requester() {
    let declarations = DeclarationSet::new().add_inject_constructor(
        InjectConstructorDecl::new(path("coffee.CoffeeMaker"))
            .param(ParameterDecl::new("pump", ty("coffee.Pump"))),
    );
    let component = ComponentDecl::new(path("coffee.Coffee"))
        .method(MethodDecl::new("maker", ty("coffee.CoffeeMaker")));

    let error = plan_component(
        &component,
        &declarations,
        &ComponentAssembler::default(),
        &GraphResolver::default(),
    )
    .unwrap_err();

    let errors = match error {
        AssembleError::Graph(errors) => errors,
        other => panic!("expected a graph error, got {other}"),
    };
    assert_eq!(
        errors.errors,
        vec![GraphError::UnresolvedKey {
            key: Key::for_decl("coffee.Pump"),
            requested_by: RequestSource::Binding(Key::for_decl("coffee.CoffeeMaker")),
            chain: vec![Key::for_decl("coffee.CoffeeMaker")],
        }]
    );
}

#[test]
fn partial_mode_leaves_missing_keys_out_of_the_plan() {
    let declarations = DeclarationSet::new().add_inject_constructor(
        InjectConstructorDecl::new(path("coffee.CoffeeMaker"))
            .param(ParameterDecl::new("pump", ty("coffee.Pump"))),
    );
    let component = ComponentDecl::new(path("coffee.Coffee"))
        .method(MethodDecl::new("maker", ty("coffee.CoffeeMaker")));

    let plan = plan_component(
        &component,
        &declarations,
        &ComponentAssembler::default(),
        &GraphResolver::new(ResolverConfig::new().allow_partial(true)),
    )
    .unwrap();

    assert_eq!(plan.steps().len(), 1);
    assert_eq!(plan.steps()[0].arguments, vec!["pump".to_string()]);
}

#[test]
fn declaration_errors_stop_before_resolution() {
    let declarations = coffee_declarations().add_inject_constructor(
        InjectConstructorDecl::new(path("coffee.Pump")),
    );

    let error = plan_component(
        &coffee_component(),
        &declarations,
        &ComponentAssembler::default(),
        &GraphResolver::default(),
    )
    .unwrap_err();

    let errors = match error {
        AssembleError::Declaration(errors) => errors,
        other => panic!("expected a declaration error, got {other}"),
    };
    assert!(matches!(
        errors.errors.as_slice(),
        [DeclarationError::DuplicateBindingKey { .. }]
    ));
    assert!(errors.to_string().starts_with("The declarations had one or more errors:\n- "));
}

#[test]
fn every_module_and_dependency_gets_a_field() {
    let declarations = coffee_declarations().add_module(ModuleDecl::new(path("coffee.GrinderModule")));
    let component = coffee_component()
        .module(path("coffee.GrinderModule"))
        .dependency(DependencyDecl {
            name: path("coffee.ClockComponent"),
            methods: vec![MethodDecl::new("clock", ty("coffee.Clock"))],
        })
        .dependency(DependencyDecl {
            name: path("coffee.RadioComponent"),
            methods: vec![MethodDecl::new("radio", ty("coffee.Radio"))],
        })
        .method(MethodDecl::new("clock", ty("coffee.Clock")));

    let plan = plan_component(
        &component,
        &declarations,
        &ComponentAssembler::default(),
        &GraphResolver::default(),
    )
    .unwrap();

    let fields = |fields: &[tether_graph::ComponentField]| -> Vec<String> {
        fields.iter().map(|field| field.field.clone()).collect()
    };
    assert_eq!(
        fields(plan.dependencies()),
        vec!["clockComponent".to_string(), "radioComponent".to_string()]
    );
    assert_eq!(
        fields(plan.modules()),
        vec![
            "dripCoffeeModule".to_string(),
            "grinderModule".to_string(),
            "pumpModule".to_string(),
        ]
    );
}
