//! OpenAPI to TypeScript client compiler.
//!
//! The pipeline turns a parsed [`Document`] into a shared model module and
//! one endpoint module per tag:
//!
//! - [`resolve`] maps schema nodes to type descriptors
//! - [`decl`] and [`emit`] hold the declaration model and its printer
//! - [`model`] compiles schema components
//! - [`endpoint`] extracts and groups operations
//! - [`function`] builds one request function per operation
//! - [`assemble`] writes tag modules through a [`FileWriter`]
//!
//! Run settings live in an explicit [`GenerateContext`].

#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod assemble;
pub mod context;
pub mod decl;
pub mod document;
pub mod emit;
pub mod endpoint;
pub mod error;
pub mod function;
pub mod generator;
pub mod model;
pub mod naming;
pub mod resolve;

pub use assemble::{FileWriter, MemoryWriter, TagOutput};
pub use context::{Filter, GenerateContext, GenerateContextBuilder, ImportStyle, OutputLayout, TextHook};
pub use document::Document;
pub use emit::Emit;
pub use endpoint::{extract, FirstMethodTag, OperationTag, TagModule, TagPolicy};
pub use error::{ConfigError, DocumentError, Error, SchemaError};
pub use function::{CallInfo, CallTemplate};
pub use generator::{generate, generate_model, GenerateReport};
pub use resolve::{resolve, Resolution, TypeDescriptor};
