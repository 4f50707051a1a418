//! Filesystem schema loading.

use std::io::Read;

use tracing::debug;
use url::Url;

use conforma_core::{LoadError, SchemaLoader};

use crate::error::{LoaderError, Result};

/// Loader serving `file://` URIs from the local filesystem.
///
/// This is the workhorse behind schema references that name local files:
/// anonymous schemas get digest-based `file://` URIs, and relative schema
/// paths handed to the engine resolve against the working directory into
/// `file://` URIs that land here.
///
/// # Examples
///
/// ```no_run
/// use conforma_core::{ValidateOptions, Validator};
/// use conforma_loader::FileLoader;
/// use serde_json::json;
///
/// let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
/// let valid = validator
///     .validate("schemas/item.json", json!({"a": 1}), &ValidateOptions::default())
///     .unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl FileLoader {
    /// Creates a filesystem loader.
    pub fn new() -> Self {
        Self
    }

    fn read(&self, uri: &Url) -> Result<Vec<u8>> {
        if uri.scheme() != "file" {
            return Err(LoaderError::UnsupportedScheme(uri.scheme().to_string()));
        }
        let path = uri
            .to_file_path()
            .map_err(|()| LoaderError::NotAFilePath(uri.to_string()))?;

        let file = std::fs::File::open(&path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "read schema file");
        Ok(bytes)
    }
}

impl SchemaLoader for FileLoader {
    fn load(&self, uri: &Url) -> std::result::Result<Vec<u8>, LoadError> {
        self.read(uri)
            .map_err(|error| LoadError::new(uri.as_str(), error))
    }
}
