//! Kind-keyed adapter registry.

use super::{AdapterError, DocumentAdapter};
use crate::model::location::DocumentKind;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Builds adapters of one document kind.
pub trait AdapterFactory {
    fn kind(&self) -> DocumentKind;
    /// Opens a viewer binding for `target` (a path, URL or node name).
    fn attach(&self, target: &str) -> Result<Box<dyn DocumentAdapter>, AdapterError>;
}

/// Registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterRegistryError {
    DuplicateKind(DocumentKind),
    UnsupportedKind(DocumentKind),
    Attach(AdapterError),
}

impl Display for AdapterRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKind(kind) => write!(f, "adapter already registered for {kind}"),
            Self::UnsupportedKind(kind) => write!(f, "no adapter registered for {kind}"),
            Self::Attach(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdapterRegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Attach(err) => Some(err),
            _ => None,
        }
    }
}

/// One adapter factory per document kind.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<DocumentKind, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Arc<dyn AdapterFactory>) -> Result<(), AdapterRegistryError> {
        let kind = factory.kind();
        if self.factories.contains_key(&kind) {
            return Err(AdapterRegistryError::DuplicateKind(kind));
        }
        self.factories.insert(kind, factory);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns registered kinds in stable order.
    pub fn kinds(&self) -> Vec<DocumentKind> {
        self.factories.keys().copied().collect()
    }

    pub fn get(&self, kind: DocumentKind) -> Option<Arc<dyn AdapterFactory>> {
        self.factories.get(&kind).cloned()
    }

    /// Opens `target` with the factory registered for `kind`.
    pub fn attach(
        &self,
        kind: DocumentKind,
        target: &str,
    ) -> Result<Box<dyn DocumentAdapter>, AdapterRegistryError> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or(AdapterRegistryError::UnsupportedKind(kind))?;
        factory.attach(target).map_err(AdapterRegistryError::Attach)
    }
}
