//! Error taxonomy for the compiler pipeline.
//!
//! Fatal conditions are typed errors. Soft fallbacks (unknown property types,
//! unrecognised enum values, missing JSON content, untagged operations) are not
//! errors at all: they resolve to a default arm and the run continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Missing or invalid generation settings. Raised before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No call-expression template was configured.
    #[error(
        "a call-expression template is required: set `template` under [generate] to describe how a request call is written"
    )]
    MissingTemplate,
    /// No output directory was configured.
    #[error("an output directory is required: pass --dir or set `dir` under [generate]")]
    MissingDir,
    /// A template failed to compile.
    #[error("invalid `{name}` template: {message}")]
    InvalidTemplate {
        /// Config key of the template.
        name: String,
        /// Compiler message.
        message: String,
    },
    /// A config value has the wrong shape.
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue {
        /// Config key.
        key: String,
        /// What was expected.
        message: String,
    },
}

/// Document-level conditions that stop one compilation step.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be parsed.
    #[error("failed to parse OpenAPI document: {0}")]
    Parse(String),
    /// No usable path remains after excluding the root path.
    #[error("the document declares no usable paths")]
    NoPaths,
    /// The document declares no schema components.
    #[error("the document declares no schema components")]
    NoSchemas,
}

/// A schema node that cannot be resolved to a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// `type: array` without an `items` schema.
    #[error("array schema has no `items`")]
    MissingItems,
}

/// Top-level error of a generation run.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`DocumentError`].
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// A schema failed to resolve at a known location.
    #[error("{location}: {source}")]
    Schema {
        /// Where the schema sits, e.g. `components.schemas.Pet`.
        location: String,
        /// Underlying resolution failure.
        #[source]
        source: SchemaError,
    },
    /// A caller-supplied template or hook failed while rendering.
    #[error("failed to render {what}: {message}")]
    Render {
        /// Which hook failed (`template`, `output`, `rewrite`).
        what: &'static str,
        /// Hook message.
        message: String,
    },
    /// The file writer failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Attach a location to a schema failure.
    pub fn schema(location: impl Into<String>, source: SchemaError) -> Self {
        Self::Schema {
            location: location.into(),
            source,
        }
    }
}
