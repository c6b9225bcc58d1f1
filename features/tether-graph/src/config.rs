use crate::types::DeclPath;

/// What the resolver does once it finds a graph error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Keep going and report every reachable error
    #[default]
    CollectAll,
    /// Stop at the first error
    FailFast,
}

/// Options for [`crate::resolver::GraphResolver`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub error_mode: ErrorMode,
    /// Tolerate keys without a binding, listing them in the resolution instead of failing
    pub allow_partial: bool,
}
impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_fast(mut self) -> Self {
        self.error_mode = ErrorMode::FailFast;
        self
    }

    pub fn collect_all(mut self) -> Self {
        self.error_mode = ErrorMode::CollectAll;
        self
    }

    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }
}

/// Wrapper declarations recognized when turning parameters into requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperDecls {
    /// `Provider<T>` parameters request `T` in provider form
    pub provider: DeclPath,
    /// `Lazy<T>` parameters are rejected
    pub lazy: DeclPath,
}
impl Default for WrapperDecls {
    fn default() -> Self {
        WrapperDecls {
            provider: DeclPath::parse("javax.inject.Provider"),
            lazy: DeclPath::parse("dagger.Lazy"),
        }
    }
}
impl WrapperDecls {
    pub fn with_provider(mut self, provider: DeclPath) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_lazy(mut self, lazy: DeclPath) -> Self {
        self.lazy = lazy;
        self
    }
}
