//! Tag module assembly and the file-writer seam.
//!
//! Each tag produces an endpoint module (`<dir>/<tag>/index.ts`) and, when it
//! has query parameters anywhere, a tag-local query module
//! (`<dir>/<tag>/model.ts`) next to it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, warn};

use crate::context::{GenerateContext, OutputLayout};
use crate::decl::{ImportDecl, Module, Statement};
use crate::emit::Emit;
use crate::endpoint::TagModule;
use crate::error::Error;
use crate::function::{emit_function, Names};
use crate::naming::tag_dir_name;

/// Endpoint module file name inside a tag directory.
pub const ENDPOINT_FILE: &str = "index.ts";
/// Query module file name inside a tag directory.
pub const QUERY_FILE: &str = "model.ts";

/// Destination for generated text. The core never touches the filesystem
/// itself.
pub trait FileWriter {
    /// Create the file (and its parent directories) if it does not exist.
    fn ensure_file(&self, path: &Path) -> io::Result<()>;
    fn write_file(&self, path: &Path, text: &str) -> io::Result<()>;
    /// Remove everything inside `path`, creating it if needed.
    fn empty_dir(&self, path: &Path) -> io::Result<()>;
}

/// In-memory [`FileWriter`] keyed by path.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// All written paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.files.borrow().clone()
    }
}

impl FileWriter for MemoryWriter {
    fn ensure_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default();
        Ok(())
    }

    fn write_file(&self, path: &Path, text: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn empty_dir(&self, path: &Path) -> io::Result<()> {
        self.files.borrow_mut().retain(|file, _| !file.starts_with(path));
        Ok(())
    }
}

/// Files written for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutput {
    pub tag: String,
    pub endpoint: PathBuf,
    /// Set when the query module was written.
    pub query: Option<PathBuf>,
    pub functions: usize,
}

/// Emit and write the modules of one tag.
///
/// `model_types` are the identifiers the model module declares; query types
/// are named around them. An operation whose schemas fail to resolve is
/// skipped with a warning, and a tag left without functions writes nothing
/// and yields `None`. A failure writing the query module is logged and the
/// endpoint module is still written.
pub fn assemble_tag(
    module: &TagModule<'_>,
    ctx: &GenerateContext,
    layout: &OutputLayout,
    model_types: &HashSet<String>,
    writer: &dyn FileWriter,
) -> Result<Option<TagOutput>, Error> {
    let dir = layout.dir.join(tag_dir_name(module.name));
    let endpoint_path = dir.join(ENDPOINT_FILE);
    let query_path = dir.join(QUERY_FILE);

    let mut names = Names::with_model_types(model_types.iter().cloned());
    let mut functions = Vec::new();
    let mut query_module = Module::default();
    let mut query_names: Vec<String> = Vec::new();
    let mut model_names: Vec<String> = Vec::new();

    for op in &module.operations {
        let emitted = match emit_function(op, ctx, &mut names) {
            Ok(emitted) => emitted,
            Err(err @ Error::Schema { .. }) => {
                warn!(tag = module.name, error = %err, "Skipping operation.");
                continue;
            }
            Err(err) => return Err(err),
        };
        for name in emitted.model_imports(&ctx.builtin_types) {
            if !model_names.iter().any(|n| n == name) {
                model_names.push(name.to_string());
            }
        }
        if let (Some(decl), Some(name)) = (emitted.query, emitted.query_type) {
            query_module.push(decl);
            query_names.push(name);
        }
        functions.push(emitted.declaration);
    }
    if functions.is_empty() {
        warn!(tag = module.name, "No operations left, skipping tag.");
        return Ok(None);
    }

    let style = ctx.import_style;
    let model_source = style.source(&relative_import(&dir, &layout.model));

    let mut query_written = None;
    if !query_module.is_empty() {
        let referenced: Vec<String> = query_module
            .statements
            .iter()
            .flat_map(Statement::references)
            .filter(|name| !ctx.is_builtin(name))
            .fold(Vec::new(), |mut acc, name| {
                if !acc.iter().any(|n: &String| n == name) {
                    acc.push(name.to_string());
                }
                acc
            });
        if !referenced.is_empty() {
            query_module.statements.insert(
                0,
                Statement::Import(ImportDecl {
                    names: referenced,
                    source: model_source.clone(),
                    type_only: style.verbatim_module_syntax,
                }),
            );
        }
        match write(writer, &query_path, &query_module.emit()) {
            Ok(()) => {
                debug!(path = %query_path.display(), "Wrote query module.");
                query_written = Some(query_path.clone());
            }
            Err(err) => error!(path = %query_path.display(), error = %err, "Failed to write query module."),
        }
    }

    let mut endpoint = Module::default();
    if !query_names.is_empty() {
        endpoint.push(ImportDecl {
            names: query_names,
            source: style.source(&format!("./{QUERY_FILE}")),
            type_only: style.verbatim_module_syntax,
        });
    }
    if !model_names.is_empty() {
        endpoint.push(ImportDecl {
            names: model_names,
            source: model_source,
            type_only: style.verbatim_module_syntax,
        });
    }
    let count = functions.len();
    for function in functions {
        endpoint.push(Statement::Function(function));
    }

    let mut text = endpoint.emit();
    if let Some(hook) = &ctx.output {
        text = hook.apply(&text).map_err(|message| Error::Render {
            what: "output",
            message,
        })?;
    }
    write(writer, &endpoint_path, &text)?;
    debug!(path = %endpoint_path.display(), functions = count, "Wrote endpoint module.");

    Ok(Some(TagOutput {
        tag: module.name.to_string(),
        endpoint: endpoint_path,
        query: query_written,
        functions: count,
    }))
}

/// `ensure_file` then `write_file`, tagging failures with the path.
pub(crate) fn write(writer: &dyn FileWriter, path: &Path, text: &str) -> Result<(), Error> {
    writer
        .ensure_file(path)
        .and_then(|()| writer.write_file(path, text))
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Relative module specifier from a directory to a file, always starting
/// with `./` or `../` and using `/` separators.
fn relative_import(from_dir: &Path, target: &Path) -> String {
    fn parts(path: &Path) -> Vec<Component<'_>> {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }
    let from = parts(from_dir);
    let to = parts(target);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut segments: Vec<String> = vec!["..".to_string(); from.len() - common];
    segments.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
