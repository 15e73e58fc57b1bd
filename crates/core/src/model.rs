//! Model compilation: every named schema component becomes one exported
//! declaration of the shared model module.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::decl::{declare, Module};
use crate::document::Document;
use crate::emit::Emit;
use crate::naming::normalize_id;

/// Build the model module from the document's schema components, in
/// document order.
///
/// Returns `None` when the document declares no components. A component that
/// fails to resolve is skipped with a warning.
pub fn compile_models(doc: &Document) -> Option<Module> {
    let schemas = doc.schemas()?;
    let mut module = Module::default();
    for (name, node) in schemas {
        match declare(name, node) {
            Ok(statement) => {
                debug!(schema = %name, "Declared model.");
                module.push(statement);
            }
            Err(err) => warn!(schema = %name, error = %err, "Skipping schema component."),
        }
    }
    Some(module)
}

/// Identifiers the model module declares.
pub fn type_names(doc: &Document) -> HashSet<String> {
    doc.schemas()
        .into_iter()
        .flat_map(|schemas| schemas.keys())
        .map(String::as_str)
        .map(normalize_id)
        .collect()
}

/// Printed model module, or `None` when there is nothing to declare.
pub fn compile(doc: &Document) -> Option<String> {
    compile_models(doc).map(|module| module.emit())
}
