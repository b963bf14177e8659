//! Version identifier → handler table.
//!
//! Populated once at startup from explicit registrations, read-only after.
//! Lookup is exact: no nearest match, no "latest" fallback. Cross-version
//! behaviour differs in ways clients depend on, so an unknown identifier is
//! always a hard failure.

mod handler;

pub use handler::{
    Handler, HandlerContext, HandlerOutcome, ResultStatus, UriFragments, build_base_uri,
};

use crate::error::ResolveError;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;

#[derive(Clone, Default)]
pub struct VersionedClientResolver {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl VersionedClientResolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Build from `(version, handler)` pairs.
    ///
    /// # Errors
    ///
    /// [`ResolveError::DuplicateVersion`] or [`ResolveError::EmptyVersion`].
    pub fn new<I, V>(bindings: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = (V, Arc<dyn Handler>)>,
        V: Into<String>,
    {
        bindings
            .into_iter()
            .try_fold(Self::builder(), |builder, (version, handler)| {
                builder.register(version, handler)
            })
            .map(ResolverBuilder::build)
    }

    /// Exact-match lookup. Repeated calls hand back the same `Arc`.
    #[track_caller]
    pub fn resolve(&self, version: &str) -> Result<Arc<dyn Handler>, ResolveError> {
        match self.handlers.get(version) {
            Some(handler) => Ok(Arc::clone(handler)),
            None => Err(ResolveError::unsupported(version, self.supported_versions())),
        }
    }

    /// Registered identifiers in sorted order.
    pub fn supported_versions(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn contains(&self, version: &str) -> bool {
        self.handlers.contains_key(version)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for VersionedClientResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedClientResolver")
            .field("versions", &self.supported_versions())
            .finish()
    }
}

#[derive(Default)]
pub struct ResolverBuilder {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl ResolverBuilder {
    #[track_caller]
    pub fn register(
        mut self,
        version: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, ResolveError> {
        let version = version.into();

        if version.trim().is_empty() {
            return Err(ResolveError::empty());
        }
        if self.handlers.contains_key(&version) {
            return Err(ResolveError::duplicate(version));
        }

        info!("Registered handler for API version {version}");
        self.handlers.insert(version, handler);
        Ok(self)
    }

    pub fn build(self) -> VersionedClientResolver {
        VersionedClientResolver {
            handlers: self.handlers,
        }
    }
}
