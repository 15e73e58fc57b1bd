//! Function emission: one exported request function per operation.
//!
//! The function body is whatever the caller's [`CallTemplate`] writes for the
//! call; this module only derives names, parameter types and the template
//! inputs.

use std::collections::HashSet;

use heck::ToPascalCase;
use indexmap::IndexMap;
use tracing::debug;

use crate::context::GenerateContext;
use crate::decl::{declare, type_of, FunctionDecl, Param, Statement};
use crate::document::{json_schema, SchemaNode};
use crate::emit::Emit;
use crate::endpoint::{Operation, RouteParam};
use crate::error::Error;
use crate::naming::{
    escape_js_string, function_name, query_type_name, sanitize_identifier, url_template,
    UNKNOWN_TYPE,
};
use crate::resolve::{describe, Primitive, TypeDescriptor};

/// Name of the query parameter of generated functions.
pub const QUERY_PARAMETER: &str = "query";
/// Name of the request body parameter of generated functions.
pub const DATA_PARAMETER: &str = "data";

/// Inputs handed to the call-expression template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    /// URL expression: a quoted string literal, or a backtick template when
    /// the operation has route parameters.
    pub url: String,
    /// Lowercase HTTP method.
    pub method: &'static str,
    /// Query parameter name, when the operation has query parameters.
    pub query: Option<&'static str>,
    /// Body parameter name, when the operation has a request body.
    pub body: Option<&'static str>,
    /// Printed response type.
    pub response: String,
}

/// Writes the call expression a generated function returns.
///
/// This is the main extension point: it decides what a request looks like
/// for the target HTTP client.
pub trait CallTemplate: Send + Sync {
    fn render(&self, call: &CallInfo) -> Result<String, String>;
}

impl<F> CallTemplate for F
where
    F: Fn(&CallInfo) -> String + Send + Sync,
{
    fn render(&self, call: &CallInfo) -> Result<String, String> {
        Ok(self(call))
    }
}

/// Result of emitting one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFunction {
    pub declaration: FunctionDecl,
    /// Query type declaration for the tag-local query module.
    pub query: Option<Statement>,
    pub query_type: Option<String>,
    pub body_type: Option<TypeDescriptor>,
    pub response_type: TypeDescriptor,
    route_types: Vec<TypeDescriptor>,
}

impl EmittedFunction {
    /// Model identifiers this function refers to (route parameter, body and
    /// response types), skipping builtins.
    pub fn model_imports<'s>(&'s self, builtins: &'s HashSet<String>) -> Vec<&'s str> {
        let mut names = Vec::new();
        let types = self
            .route_types
            .iter()
            .chain(self.body_type.iter())
            .chain(std::iter::once(&self.response_type));
        for ty in types {
            for name in ty.references() {
                if name != UNKNOWN_TYPE && !builtins.contains(name) && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Identifiers already taken inside one module.
#[derive(Debug, Default)]
pub struct Names {
    taken: HashSet<String>,
    types: HashSet<String>,
}

impl Names {
    /// Names for a module that imports from a model module declaring
    /// `model_types`; query types never shadow those.
    pub fn with_model_types<I, S>(model_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: HashSet::new(),
            types: model_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Reserve `base`, or a disambiguated variant of it: first `base` +
    /// `By` + route parameter names, then a numeric suffix.
    pub fn claim(&mut self, base: String, route_params: &[RouteParam<'_>]) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut candidate = base.clone();
        if !route_params.is_empty() {
            let by = route_params
                .iter()
                .map(|p| p.name.to_pascal_case())
                .collect::<Vec<_>>()
                .join("And");
            candidate = format!("{base}By{by}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
        numbered(&mut self.taken, &candidate)
    }

    /// Reserve a type name, numbering it when a model type or an earlier
    /// query type already uses it.
    pub fn claim_type(&mut self, base: String) -> String {
        if self.types.insert(base.clone()) {
            return base;
        }
        numbered(&mut self.types, &base)
    }
}

fn numbered(taken: &mut HashSet<String>, stem: &str) -> String {
    let mut n = 2usize;
    loop {
        let candidate = format!("{stem}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Positional identifier for each route parameter. Identifiers stay distinct
/// from each other and from the `query` / `data` parameters the function
/// also takes.
fn route_identifiers(op: &Operation<'_>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    if !op.query_params.is_empty() {
        used.insert(QUERY_PARAMETER.to_string());
    }
    if op.request_body.is_some() {
        used.insert(DATA_PARAMETER.to_string());
    }
    op.route_params
        .iter()
        .map(|route| {
            let mut ident = sanitize_identifier(route.name);
            while used.contains(&ident) {
                ident.push('_');
            }
            used.insert(ident.clone());
            ident
        })
        .collect()
}

/// Build the exported function for one operation.
///
/// Steps, in order: rewrite the path, derive the function name, turn route
/// parameters into positional parameters and the URL into a template, merge
/// query parameters into one query type, type the body and the response, then
/// let the call template write the returned expression.
pub fn emit_function(
    op: &Operation<'_>,
    ctx: &GenerateContext,
    names: &mut Names,
) -> Result<EmittedFunction, Error> {
    let path = match &ctx.rewrite {
        Some(hook) => hook.apply(op.path).map_err(|message| Error::Render {
            what: "rewrite",
            message,
        })?,
        None => op.path.to_string(),
    };
    let location = format!("{} {}", op.method.as_str().to_uppercase(), op.path);

    let name = names.claim(function_name(op.method, &path), &op.route_params);
    debug!(path = %path, method = %op.method, function = %name, "Emitting endpoint function.");

    let idents = route_identifiers(op);
    let mut params = Vec::new();
    let mut route_types = Vec::new();
    for (route, ident) in op.route_params.iter().zip(&idents) {
        let ty = route
            .schema
            .map_or(Ok(TypeDescriptor::Primitive(Primitive::String)), describe)
            .map_err(|e| Error::schema(format!("{location} path parameter `{}`", route.name), e))?;
        params.push(Param {
            name: ident.clone(),
            ty: ty.clone(),
        });
        route_types.push(ty);
    }

    let url = if op.route_params.is_empty() {
        format!("\"{}\"", escape_js_string(&path))
    } else {
        url_template(&path, |placeholder| {
            op.route_params
                .iter()
                .position(|route| route.name == placeholder)
                .map_or_else(|| sanitize_identifier(placeholder), |i| idents[i].clone())
        })
    };

    let (query, query_type) = if op.query_params.is_empty() {
        (None, None)
    } else {
        let query_name = names.claim_type(query_type_name(&name));
        let schema = query_schema(op);
        let decl = declare(&query_name, &schema)
            .map_err(|e| Error::schema(format!("{location} query parameters"), e))?;
        params.push(Param {
            name: QUERY_PARAMETER.to_string(),
            ty: TypeDescriptor::Reference(query_name.clone()),
        });
        (Some(decl), Some(query_name))
    };

    let body_type = match op.request_body {
        Some(body) => {
            let ty = type_of(json_schema(&body.content))
                .map_err(|e| Error::schema(format!("{location} request body"), e))?;
            params.push(Param {
                name: DATA_PARAMETER.to_string(),
                ty: ty.clone(),
            });
            Some(ty)
        }
        None => None,
    };

    let response_type = type_of(op.success_schema())
        .map_err(|e| Error::schema(format!("{location} response"), e))?;

    let call = CallInfo {
        url,
        method: op.method.as_str(),
        query: query_type.as_ref().map(|_| QUERY_PARAMETER),
        body: body_type.as_ref().map(|_| DATA_PARAMETER),
        response: response_type.emit(),
    };
    let body = ctx.template.render(&call).map_err(|message| Error::Render {
        what: "template",
        message,
    })?;

    let declaration = FunctionDecl {
        name,
        doc: function_doc(op, &idents),
        params,
        body,
    };

    Ok(EmittedFunction {
        declaration,
        query,
        query_type,
        body_type,
        response_type,
        route_types,
    })
}

/// Synthetic object schema holding every query parameter. A member is
/// nullable (and so optional) unless the parameter is required; a `nullable`
/// or `description` on the parameter's own schema wins.
fn query_schema(op: &Operation<'_>) -> SchemaNode {
    let mut properties = IndexMap::new();
    for param in &op.query_params {
        let mut node = param.schema.cloned().unwrap_or_default();
        if node.description.is_none() {
            node.description = param.description.map(str::to_string);
        }
        if node.nullable.is_none() {
            node.nullable = Some(!param.required);
        }
        properties.insert(param.name.to_string(), node);
    }
    let description = match op.summary {
        Some(summary) if !summary.trim().is_empty() => format!("{} query params", summary.trim()),
        _ => "query params".to_string(),
    };
    SchemaNode {
        description: Some(description),
        properties: Some(properties),
        ..SchemaNode::default()
    }
}

/// Summary line followed by one `@param` line per route parameter.
fn function_doc(op: &Operation<'_>, idents: &[String]) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(summary) = op.summary.map(str::trim).filter(|s| !s.is_empty()) {
        lines.push(summary.to_string());
    }
    for (route, name) in op.route_params.iter().zip(idents) {
        match route.description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(desc) => lines.push(format!("@param {name} {desc}")),
            None => lines.push(format!("@param {name}")),
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::endpoint::extract;

    fn ctx() -> GenerateContext {
        GenerateContext::new(|call: &CallInfo| {
            let mut args = vec![call.url.clone()];
            args.extend(call.query.map(str::to_string));
            args.extend(call.body.map(str::to_string));
            format!("http.{}<{}>({})", call.method, call.response, args.join(", "))
        })
    }

    fn emit_all(json: &str, ctx: &GenerateContext) -> Vec<EmittedFunction> {
        let doc = Document::from_json(json).unwrap();
        let modules = extract(&doc, ctx).unwrap();
        let mut names = Names::default();
        modules[0]
            .operations
            .iter()
            .map(|op| emit_function(op, ctx, &mut names).unwrap())
            .collect()
    }

    #[test]
    fn test_route_params_and_url_template() {
        let out = emit_all(
            r#"{ "paths": { "/api/users/{id}/orders": { "get": {
  "tags": ["Users"],
  "summary": "List orders",
  "parameters": [{ "name": "id", "in": "path", "description": "user id", "schema": { "type": "integer" } }]
} } } }"#,
            &ctx(),
        );
        let f = &out[0];
        assert_eq!(f.declaration.name, "getApiUsersOrders");
        assert!(f.query.is_none());
        let expected = "/**
 * List orders
 * @param id user id
 */
export function getApiUsersOrders(id: number) {
  return http.get<unknown>(`/api/users/${id}/orders`);
}
";
        assert_eq!(f.declaration.emit(), expected);
    }

    #[test]
    fn test_query_type_gating() {
        let out = emit_all(
            r#"{ "paths": {
  "/api/users": { "get": { "tags": ["Users"], "summary": "Search users", "parameters": [
    { "name": "q", "in": "query", "required": true, "description": "search text", "schema": { "type": "string" } },
    { "name": "page", "in": "query", "schema": { "type": "integer" } }
  ] } },
  "/api/ping": { "get": { "tags": ["Users"] } }
} }"#,
            &ctx(),
        );
        let with_query = &out[0];
        assert_eq!(with_query.query_type.as_deref(), Some("GetApiUsersQuery"));
        let params: Vec<_> = with_query.declaration.params.iter().map(Emit::emit).collect();
        assert_eq!(params, vec!["query: GetApiUsersQuery"]);
        let decl = with_query.query.as_ref().unwrap().emit();
        let expected = "/** Search users query params */
export interface GetApiUsersQuery {
  /** search text */
  q: string;
  page?: number;
}
";
        assert_eq!(decl, expected);
        assert!(with_query.declaration.body.contains(", query)"));

        let without = &out[1];
        assert!(without.query.is_none());
        assert!(without.query_type.is_none());
        assert!(without.declaration.params.is_empty());
    }

    #[test]
    fn test_body_and_response_types() {
        let out = emit_all(
            r##"{ "paths": { "/pets": { "post": {
  "tags": ["Pets"],
  "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } } },
  "responses": {
    "200": { "content": { "application/json; charset=utf-8": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
  }
} } } }"##,
            &ctx(),
        );
        let f = &out[0];
        assert_eq!(f.declaration.body, "http.post<Pet>(\"/pets\", data)");
        let builtins = HashSet::from([UNKNOWN_TYPE.to_string()]);
        assert_eq!(f.model_imports(&builtins), vec!["NewPet", "Pet"]);
    }

    #[test]
    fn test_missing_json_content_is_unknown() {
        let out = emit_all(
            r#"{ "paths": { "/upload": { "put": {
  "tags": ["Files"],
  "requestBody": { "content": { "multipart/form-data": { "schema": { "type": "object" } } } },
  "responses": { "200": { "description": "ok" } }
} } } }"#,
            &ctx(),
        );
        let f = &out[0];
        assert_eq!(f.response_type, TypeDescriptor::Unknown);
        assert_eq!(f.body_type, Some(TypeDescriptor::Unknown));
        let builtins = HashSet::from([UNKNOWN_TYPE.to_string()]);
        assert!(f.model_imports(&builtins).is_empty());
    }

    #[test]
    fn test_builtin_types_are_not_imported() {
        let out = emit_all(
            r##"{ "paths": { "/blob": { "get": {
  "tags": ["Files"],
  "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Blob" } } } } }
} } } }"##,
            &ctx(),
        );
        let builtins = HashSet::from([UNKNOWN_TYPE.to_string(), "Blob".to_string()]);
        assert!(out[0].model_imports(&builtins).is_empty());
    }

    #[test]
    fn test_route_param_reference_is_imported() {
        let out = emit_all(
            r##"{ "paths": { "/jobs/{state}": { "get": {
  "tags": ["Jobs"],
  "parameters": [{ "name": "state", "in": "path", "schema": { "$ref": "#/components/schemas/JobState" } }]
} } } }"##,
            &ctx(),
        );
        let builtins = HashSet::from([UNKNOWN_TYPE.to_string()]);
        assert_eq!(out[0].model_imports(&builtins), vec!["JobState"]);
    }

    #[test]
    fn test_name_collisions_are_disambiguated() {
        let out = emit_all(
            r#"{ "paths": {
  "/items": { "get": { "tags": ["Items"] } },
  "/items/{id}": { "get": { "tags": ["Items"], "parameters": [{ "name": "id", "in": "path" }] } },
  "/items/{key}": { "get": { "tags": ["Items"] } },
  "/items/": { "get": { "tags": ["Items"] } }
} }"#,
            &ctx(),
        );
        let names: Vec<_> = out.iter().map(|f| f.declaration.name.as_str()).collect();
        assert_eq!(names, vec!["getItems", "getItemsById", "getItemsByKey", "getItems2"]);
    }

    #[test]
    fn test_rewrite_drives_names_and_url() {
        let mut ctx = ctx();
        ctx.rewrite = Some(Box::new(|path: &str| path.replacen("/api", "", 1)));
        let out = emit_all(
            r#"{ "paths": { "/api/media": { "get": { "tags": ["Media"], "parameters": [
  { "name": "kind", "in": "query" }
] } } } }"#,
            &ctx,
        );
        assert_eq!(out[0].declaration.name, "getMedia");
        assert_eq!(out[0].query_type.as_deref(), Some("GetMediaQuery"));
        assert!(out[0].declaration.body.contains("(\"/media\", query)"));
    }

    #[test]
    fn test_sanitized_route_identifier() {
        let out = emit_all(
            r#"{ "paths": { "/files/{file-id}": { "delete": { "tags": ["Files"],
  "parameters": [{ "name": "file-id", "in": "path", "schema": { "type": "string" } }]
} } } }"#,
            &ctx(),
        );
        let f = &out[0].declaration;
        assert_eq!(f.params[0].name, "fileId");
        assert_eq!(f.body, "http.delete<unknown>(`/files/${fileId}`)");
    }

    #[test]
    fn test_route_identifiers_avoid_query_and_data() {
        let out = emit_all(
            r#"{ "paths": {
  "/search/{query}": { "post": { "tags": ["Search"],
    "parameters": [
      { "name": "query", "in": "path", "description": "search text" },
      { "name": "page", "in": "query" }
    ],
    "requestBody": { "content": { "application/json": { "schema": { "type": "string" } } } }
  } },
  "/x/{data}": { "post": { "tags": ["Search"],
    "requestBody": { "content": { "application/json": { "schema": { "type": "string" } } } }
  } },
  "/y/{data}": { "get": { "tags": ["Search"] } }
} }"#,
            &ctx(),
        );
        let search = &out[0].declaration;
        let params: Vec<_> = search.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["query_", "query", "data"]);
        assert_eq!(search.body, "http.post<unknown>(`/search/${query_}`, query, data)");
        assert_eq!(search.doc.as_deref(), Some("@param query_ search text"));

        let x: Vec<_> = out[1].declaration.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(x, vec!["data_", "data"]);

        // Without a body the name is free.
        assert_eq!(out[2].declaration.params[0].name, "data");
    }

    #[test]
    fn test_query_type_avoids_model_names() {
        let doc = Document::from_json(
            r#"{ "paths": { "/api/pets": { "get": { "tags": ["Pets"],
  "parameters": [{ "name": "limit", "in": "query" }]
} } } }"#,
        )
        .unwrap();
        let ctx = ctx();
        let modules = extract(&doc, &ctx).unwrap();
        let mut names = Names::with_model_types(["GetApiPetsQuery"]);
        let f = emit_function(&modules[0].operations[0], &ctx, &mut names).unwrap();
        assert_eq!(f.query_type.as_deref(), Some("GetApiPetsQuery2"));
        assert!(f.declaration.params[0].emit().ends_with("GetApiPetsQuery2"));
    }
}
