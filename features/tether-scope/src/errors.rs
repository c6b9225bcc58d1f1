/// Errors when reading a [`crate::ScopedCell`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The producer ran but did not return a value
    #[error("Producer for '{type_name}' returned no value")]
    InvariantViolation { type_name: &'static str },
    /// The producer panicked, the cell will never hold a value
    #[error("Producer for '{type_name}' panicked during initialization")]
    ProducerPanicked { type_name: &'static str },
}
