//! Schema document loaders for the `conforma` validation engine.
//!
//! The core engine fetches external `$ref` targets through the
//! [`SchemaLoader`](conforma_core::SchemaLoader) seam and ships only a
//! refusing default. This crate supplies the concrete implementations:
//!
//! - [`FileLoader`] — serves `file://` URIs from the local filesystem.
//! - [`LoaderChain`] — ordered fallback over multiple loaders, first
//!   success wins.
//!
//! # Example
//!
//! ```no_run
//! use conforma_core::{ValidateOptions, Validator};
//! use conforma_loader::FileLoader;
//! use serde_json::json;
//!
//! let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
//! let conforms = validator
//!     .validate("schemas/config.json", json!({"port": 8080}), &ValidateOptions::default())
//!     .unwrap();
//! ```

mod chain;
mod error;
mod fs;

pub use chain::LoaderChain;
pub use error::{LoaderError, Result};
pub use fs::FileLoader;
