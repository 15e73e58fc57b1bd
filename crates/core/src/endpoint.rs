//! Endpoint extraction: walk the path graph, split parameters, apply filters
//! and group operations into tag modules.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::context::GenerateContext;
use crate::document::{
    self, json_schema, Document, HttpMethod, Parameter, ParameterLocation, ParameterOrRef,
    PathItem, RequestBody, Response, SchemaNode,
};
use crate::error::DocumentError;
use crate::naming::path_placeholders;

/// Response status whose JSON content types the function result.
pub const SUCCESS_STATUS: &str = "200";

/// Decides which tag owns an operation.
pub trait TagPolicy: Send + Sync {
    fn tag<'a>(&self, item: &'a PathItem, operation: &'a document::Operation) -> Option<&'a str>;
}

/// The first declared method's first tag owns every operation of the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMethodTag;

impl TagPolicy for FirstMethodTag {
    fn tag<'a>(&self, item: &'a PathItem, _operation: &'a document::Operation) -> Option<&'a str> {
        item.operations
            .first()
            .and_then(|(_, op)| op.tags.first())
            .map(String::as_str)
    }
}

/// Each operation is owned by its own first tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationTag;

impl TagPolicy for OperationTag {
    fn tag<'a>(&self, _item: &'a PathItem, operation: &'a document::Operation) -> Option<&'a str> {
        operation.tags.first().map(String::as_str)
    }
}

/// A `{name}` placeholder bound to a parameter.
#[derive(Debug, Clone)]
pub struct RouteParam<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    /// `None` when the placeholder has no declared parameter or no schema;
    /// typed as `string`.
    pub schema: Option<&'a SchemaNode>,
}

/// One `in=query` parameter.
#[derive(Debug, Clone)]
pub struct QueryParam<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub required: bool,
    pub schema: Option<&'a SchemaNode>,
}

/// Borrowed view of one (path, method) pair.
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub summary: Option<&'a str>,
    pub route_params: Vec<RouteParam<'a>>,
    pub query_params: Vec<QueryParam<'a>>,
    pub request_body: Option<&'a RequestBody>,
    responses: &'a IndexMap<String, Response>,
}

impl<'a> Operation<'a> {
    /// View of `op` at `path`. Parameter references resolve against `doc`;
    /// entries that do not resolve are skipped with a warning.
    pub fn new(
        doc: &'a Document,
        path: &'a str,
        method: HttpMethod,
        item: &'a PathItem,
        op: &'a document::Operation,
    ) -> Self {
        let entries = item.parameters.iter().chain(&op.parameters);
        let params = merge_parameters(entries.filter_map(|entry| {
            let resolved = doc.parameter(entry);
            if resolved.is_none() {
                warn!(
                    path,
                    method = %method,
                    parameter = %describe_entry(entry),
                    "Skipping unresolvable parameter."
                );
            }
            resolved
        }));

        let mut route_params: Vec<RouteParam<'a>> = params
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
            .map(|p| RouteParam {
                name: &p.name,
                description: p.description.as_deref(),
                schema: p.schema.as_ref(),
            })
            .collect();
        for placeholder in path_placeholders(path) {
            if !route_params.iter().any(|r| r.name == placeholder) {
                route_params.push(RouteParam {
                    name: placeholder,
                    description: None,
                    schema: None,
                });
            }
        }

        let query_params = params
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
            .map(|p| QueryParam {
                name: &p.name,
                description: p.description.as_deref(),
                required: p.required,
                schema: p.schema.as_ref(),
            })
            .collect();

        Self {
            path,
            method,
            summary: op.summary.as_deref(),
            route_params,
            query_params,
            request_body: op.request_body.as_ref(),
            responses: &op.responses,
        }
    }

    /// JSON schema of the success response, if any.
    pub fn success_schema(&self) -> Option<&'a SchemaNode> {
        self.responses
            .get(SUCCESS_STATUS)
            .and_then(|response| json_schema(&response.content))
    }
}

/// Path-level parameters followed by operation-level ones. A parameter with
/// the same name and location replaces the earlier one in place.
fn merge_parameters<'a>(params: impl Iterator<Item = &'a Parameter>) -> Vec<&'a Parameter> {
    let mut merged: Vec<&Parameter> = Vec::new();
    for param in params {
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(slot) => *slot = param,
            None => merged.push(param),
        }
    }
    merged
}

fn describe_entry(entry: &ParameterOrRef) -> String {
    match entry {
        ParameterOrRef::Ref { reference } => reference.clone(),
        ParameterOrRef::Inline(param) => param.name.clone(),
        ParameterOrRef::Malformed(value) => value.to_string(),
    }
}

/// Operations owned by one tag, in document order.
#[derive(Debug, Clone)]
pub struct TagModule<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub operations: Vec<Operation<'a>>,
}

/// Group the document's operations into tag modules.
///
/// The root path is skipped, then the endpoint filter applies, then each
/// operation goes to the tag chosen by the context's [`TagPolicy`]. Operations
/// without a tag, or whose tag is not registered, are dropped. The tag filter
/// applies last; tags left without operations are omitted.
pub fn extract<'a>(doc: &'a Document, ctx: &GenerateContext) -> Result<Vec<TagModule<'a>>, DocumentError> {
    let paths: Vec<(&'a str, &'a PathItem)> = doc
        .paths
        .iter()
        .filter(|(path, _)| !matches!(path.as_str(), "" | "/"))
        .map(|(path, item)| (path.as_str(), item))
        .collect();
    if paths.is_empty() {
        return Err(DocumentError::NoPaths);
    }

    let selected: Vec<_> = paths
        .into_iter()
        .filter(|(path, _)| ctx.filter_endpoint.as_ref().is_none_or(|f| f.allows(path)))
        .collect();

    let mut modules: IndexMap<&'a str, TagModule<'a>> = IndexMap::new();
    let registered = doc.tags.is_some();
    for tag in doc.tags.iter().flatten() {
        modules.entry(tag.name.as_str()).or_insert_with(|| TagModule {
            name: &tag.name,
            description: &tag.description,
            operations: Vec::new(),
        });
    }

    for (path, item) in selected {
        for (method, op) in &item.operations {
            let Some(tag) = ctx.tag_policy.tag(item, op) else {
                warn!(path, method = %method, "Dropping operation without a tag.");
                continue;
            };
            if !registered && !modules.contains_key(tag) {
                modules.insert(
                    tag,
                    TagModule {
                        name: tag,
                        description: "",
                        operations: Vec::new(),
                    },
                );
            }
            match modules.get_mut(tag) {
                Some(module) => module
                    .operations
                    .push(Operation::new(doc, path, *method, item, op)),
                None => warn!(path, method = %method, tag, "Dropping operation with unregistered tag."),
            }
        }
    }

    let modules: Vec<TagModule<'a>> = modules
        .into_values()
        .filter(|module| ctx.filter_tag.as_ref().is_none_or(|f| f.allows(module.name)))
        .filter(|module| {
            if module.operations.is_empty() {
                debug!(tag = module.name, "Skipping tag without operations.");
                false
            } else {
                true
            }
        })
        .collect();
    Ok(modules)
}
