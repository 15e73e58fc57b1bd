//! Full generation runs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::assemble::{assemble_tag, write, FileWriter, TagOutput};
use crate::context::{GenerateContext, OutputLayout};
use crate::document::Document;
use crate::endpoint::extract;
use crate::error::{DocumentError, Error};
use crate::model;

/// What a run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Model module path; `None` when the document has no components.
    pub model: Option<PathBuf>,
    pub tags: Vec<TagOutput>,
}

impl GenerateReport {
    pub fn function_count(&self) -> usize {
        self.tags.iter().map(|t| t.functions).sum()
    }

    pub fn file_count(&self) -> usize {
        usize::from(self.model.is_some())
            + self
                .tags
                .iter()
                .map(|t| 1 + usize::from(t.query.is_some()))
                .sum::<usize>()
    }
}

/// Write only the model module to `path`.
pub fn generate_model(doc: &Document, path: &Path, writer: &dyn FileWriter) -> Result<(), Error> {
    let text = model::compile(doc).ok_or(DocumentError::NoSchemas)?;
    write(writer, path, &text)?;
    info!(path = %path.display(), "Wrote model module.");
    Ok(())
}

/// Empty the output directory, write the model module, then one endpoint
/// module (plus query module) per tag.
///
/// A document without schema components still yields endpoint modules. A
/// document without usable paths fails with [`DocumentError::NoPaths`] after
/// the model module is written.
pub fn generate(
    doc: &Document,
    ctx: &GenerateContext,
    layout: &OutputLayout,
    writer: &dyn FileWriter,
) -> Result<GenerateReport, Error> {
    let start = Instant::now();
    writer.empty_dir(&layout.dir).map_err(|source| Error::Write {
        path: layout.dir.clone(),
        source,
    })?;

    let mut report = GenerateReport::default();
    match generate_model(doc, &layout.model, writer) {
        Ok(()) => report.model = Some(layout.model.clone()),
        Err(Error::Document(DocumentError::NoSchemas)) => {
            warn!("Document declares no schema components, skipping model module.");
        }
        Err(err) => return Err(err),
    }

    let model_types = model::type_names(doc);
    for module in extract(doc, ctx)? {
        if let Some(output) = assemble_tag(&module, ctx, layout, &model_types, writer)? {
            report.tags.push(output);
        }
    }

    info!(
        tags = report.tags.len(),
        functions = report.function_count(),
        elapsed_ms = start.elapsed().as_millis(),
        "Generation finished."
    );
    Ok(report)
}
