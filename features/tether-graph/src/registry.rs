use std::collections::{hash_map::Entry, HashMap};

use crate::{binding::Binding, errors::DeclarationError, key::Key};

/// Every known binding, indexed by the key it produces
///
/// Filled while declarations are collected, read-only during resolution.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<Key, Binding>,
}
impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding under its provided key
    ///
    /// A key can only be bound once. A second registration is rejected and the
    /// first one stays in place.
    pub fn register(&mut self, binding: Binding) -> Result<(), DeclarationError> {
        match self.bindings.entry(binding.provided_key().clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!("Rejected duplicate binding for {}", existing.key());
                Err(DeclarationError::DuplicateBindingKey {
                    key: existing.key().clone(),
                    existing: existing.get().origin().clone(),
                    rejected: binding.origin().clone(),
                })
            }
            Entry::Vacant(slot) => {
                tracing::debug!("Registered {} from {}", slot.key(), binding.origin());
                slot.insert(binding);
                Ok(())
            }
        }
    }

    /// Registers every binding, collecting the rejected ones
    pub fn register_all(
        &mut self,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> Result<(), Vec<DeclarationError>> {
        let errors: Vec<_> = bindings
            .into_iter()
            .filter_map(|binding| self.register(binding).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }
}
