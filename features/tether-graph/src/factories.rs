use crate::{
    binding::{Binding, BindingOrigin},
    config::WrapperDecls,
    declare::{AnnotationDecl, AnnotationKind, InjectConstructorDecl, MethodDecl, ParameterDecl},
    errors::DeclarationError,
    key::{Key, KeyRequest, Qualifier, RequestForm, Scope},
    types::{DeclPath, TypeDesc},
};

/// Derives keys and requests from declarations
#[derive(Debug, Clone, Default)]
pub struct KeyFactory {
    wrappers: WrapperDecls,
}
impl KeyFactory {
    pub fn new(wrappers: WrapperDecls) -> Self {
        KeyFactory { wrappers }
    }

    pub fn for_inject_constructor(&self, constructor: &InjectConstructorDecl) -> Key {
        Key::of(TypeDesc::declared(constructor.owner.clone()))
    }

    pub fn for_provides_method(&self, method: &MethodDecl) -> Key {
        Key {
            qualifier: qualifier_of(&method.annotations),
            ty: self.key_type(&method.return_type).clone(),
        }
    }

    /// Key of a component accessor, which must not take parameters
    pub fn for_component_method(
        &self,
        component: &DeclPath,
        method: &MethodDecl,
    ) -> Result<Key, DeclarationError> {
        if !method.parameters.is_empty() {
            return Err(DeclarationError::ComponentMethodHasParameters {
                component: component.clone(),
                method: method.name.clone(),
            });
        }

        Ok(Key {
            qualifier: qualifier_of(&method.annotations),
            ty: self.key_type(&method.return_type).clone(),
        })
    }

    /// Request made by a single parameter
    ///
    /// `Provider<T>` requests `T` in provider form. Only one level is unwrapped,
    /// `Provider<Provider<T>>` requests `Provider<T>`. `Lazy<T>` is rejected.
    pub fn for_parameter(&self, parameter: &ParameterDecl) -> Result<KeyRequest, DeclarationError> {
        let qualifier = qualifier_of(&parameter.annotations);

        if let Some(inner) = parameter.ty.unwrap_single(&self.wrappers.lazy) {
            return Err(DeclarationError::UnsupportedRequestForm {
                form: RequestForm::Lazy,
                key: Key {
                    qualifier,
                    ty: inner.clone(),
                },
            });
        }

        let (form, ty) = match parameter.ty.unwrap_single(&self.wrappers.provider) {
            Some(inner) => (RequestForm::Provider, inner.clone()),
            None => (RequestForm::Instance, parameter.ty.clone()),
        };

        Ok(KeyRequest {
            key: Key { qualifier, ty },
            form,
        })
    }

    /// Requests of every parameter, in order
    ///
    /// Two parameters making the exact same request are rejected.
    pub fn for_parameters(
        &self,
        parameters: &[ParameterDecl],
    ) -> Result<Vec<KeyRequest>, DeclarationError> {
        let mut requests: Vec<KeyRequest> = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let request = self.for_parameter(parameter)?;
            if requests.contains(&request) {
                return Err(DeclarationError::DuplicateParameter { key: request.key });
            }
            requests.push(request);
        }
        Ok(requests)
    }

    /// Type a declared type is bound under, with one provider level removed
    fn key_type<'t>(&self, ty: &'t TypeDesc) -> &'t TypeDesc {
        ty.unwrap_single(&self.wrappers.provider).unwrap_or(ty)
    }
}

/// Builds bindings from declarations
#[derive(Debug, Clone, Default)]
pub struct BindingFactory {
    keys: KeyFactory,
}
impl BindingFactory {
    pub fn new(keys: KeyFactory) -> Self {
        BindingFactory { keys }
    }

    pub fn keys(&self) -> &KeyFactory {
        &self.keys
    }

    /// Binding for an injectable constructor, never scoped
    pub fn for_inject_constructor(
        &self,
        constructor: &InjectConstructorDecl,
    ) -> Result<Binding, DeclarationError> {
        if constructor.is_abstract {
            return Err(DeclarationError::AbstractInjectConstructor {
                owner: constructor.owner.clone(),
            });
        }

        Ok(Binding::new(
            self.keys.for_inject_constructor(constructor),
            self.keys.for_parameters(&constructor.parameters)?,
            None,
            BindingOrigin::InjectConstructor {
                owner: constructor.owner.clone(),
            },
        ))
    }

    /// Bindings for every injectable constructor
    ///
    /// A type with more than one injectable constructor gets no binding at all.
    pub fn for_inject_constructors(
        &self,
        constructors: &[InjectConstructorDecl],
    ) -> (Vec<Binding>, Vec<DeclarationError>) {
        let mut grouped: Vec<(Key, Vec<&InjectConstructorDecl>)> = Vec::new();
        for constructor in constructors {
            let key = self.keys.for_inject_constructor(constructor);
            match grouped.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, group)) => group.push(constructor),
                None => grouped.push((key, vec![constructor])),
            }
        }

        let mut bindings = Vec::new();
        let mut errors = Vec::new();
        for (key, group) in grouped {
            match group.as_slice() {
                [constructor] => match self.for_inject_constructor(constructor) {
                    Ok(binding) => bindings.push(binding),
                    Err(error) => errors.push(error),
                },
                _ => errors.push(DeclarationError::MultipleInjectConstructors { key }),
            }
        }

        (bindings, errors)
    }

    /// Binding for a provides method declared on `module`
    pub fn for_provides_method(
        &self,
        module: &DeclPath,
        method: &MethodDecl,
    ) -> Result<Binding, DeclarationError> {
        let scope = scope_of(&method.annotations).map_err(|()| DeclarationError::MultipleScopes {
            method: format!("{module}.{}()", method.name),
        })?;

        Ok(Binding::new(
            self.keys.for_provides_method(method),
            self.keys.for_parameters(&method.parameters)?,
            scope,
            BindingOrigin::ProvidesMethod {
                module: module.clone(),
                method: method.name.clone(),
            },
        ))
    }

    /// Binding for an accessor of a component this component depends on
    pub fn for_component_method(
        &self,
        component: &DeclPath,
        method: &MethodDecl,
    ) -> Result<Binding, DeclarationError> {
        Ok(Binding::new(
            self.keys.for_component_method(component, method)?,
            [],
            None,
            BindingOrigin::ComponentMethod {
                component: component.clone(),
                method: method.name.clone(),
            },
        ))
    }
}

/// First qualifier annotation, if any
fn qualifier_of(annotations: &[AnnotationDecl]) -> Option<Qualifier> {
    annotations
        .iter()
        .find(|annotation| annotation.kind == AnnotationKind::Qualifier)
        .map(|annotation| Qualifier {
            annotation: annotation.annotation.clone(),
            value: annotation.value.clone(),
        })
}

/// The single scope annotation, errors if there is more than one
fn scope_of(annotations: &[AnnotationDecl]) -> Result<Option<Scope>, ()> {
    let mut scopes = annotations
        .iter()
        .filter(|annotation| annotation.kind == AnnotationKind::Scope);

    match (scopes.next(), scopes.next()) {
        (None, _) => Ok(None),
        (Some(scope), None) => Ok(Some(Scope(scope.annotation.clone()))),
        (Some(_), Some(_)) => Err(()),
    }
}
