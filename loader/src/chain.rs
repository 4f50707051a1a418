//! Fallback chains over multiple loaders.

use tracing::debug;
use url::Url;

use conforma_core::{LoadError, SchemaLoader};

/// Ordered fallback over multiple loaders; the first success wins.
///
/// Loaders are tried in the order they were added. A loader that fails (or
/// declines a scheme) simply passes the request along; only when every
/// loader has failed does the chain report an error.
///
/// # Examples
///
/// ```
/// use conforma_loader::{FileLoader, LoaderChain};
///
/// let chain = LoaderChain::new()
///     .with(FileLoader::new());
/// ```
#[derive(Default)]
pub struct LoaderChain {
    loaders: Vec<Box<dyn SchemaLoader>>,
}

impl LoaderChain {
    /// Creates an empty chain. A chain with no loaders fails every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a loader to the end of the chain.
    pub fn with(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Returns the number of loaders in the chain.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Returns `true` if the chain has no loaders.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl SchemaLoader for LoaderChain {
    fn load(&self, uri: &Url) -> std::result::Result<Vec<u8>, LoadError> {
        for loader in &self.loaders {
            match loader.load(uri) {
                Ok(bytes) => return Ok(bytes),
                Err(error) => {
                    debug!(uri = %uri, %error, "loader declined; trying next in chain");
                }
            }
        }
        Err(LoadError::new(
            uri.as_str(),
            crate::error::LoaderError::NoLoaderMatched,
        ))
    }
}
