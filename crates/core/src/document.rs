//! OpenAPI document structs for serde deserialization.
//!
//! Only the subset the compiler reads is modelled. Every map whose order shows
//! up in generated code is an [`IndexMap`], so output follows document order.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::DocumentError;

/// Root OpenAPI document.
#[derive(Debug, Default, Deserialize)]
pub struct Document {
    /// OpenAPI version string.
    pub openapi: Option<String>,
    /// Document metadata.
    pub info: Option<Info>,
    /// Path templates mapped to their operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    pub components: Option<Components>,
    /// Tag registry. Synthesized from operations when absent.
    pub tags: Option<Vec<Tag>>,
}

/// `info` block.
#[derive(Debug, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default)]
    pub title: String,
    /// API version.
    #[serde(default)]
    pub version: String,
}

/// Components section containing reusable schemas and parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Named schema components, in document order.
    pub schemas: Option<IndexMap<String, SchemaNode>>,
    /// Named parameters, the targets of `#/components/parameters/*`.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterOrRef>,
}

/// Entry of the tag registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tag {
    /// Tag name as referenced by operations.
    pub name: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
}

/// HTTP methods an operation can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parse a path item key. Returns `None` for non-method keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Lowercase method name as written in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path item: operations in declared order plus shared parameters.
#[derive(Debug, Default)]
pub struct PathItem {
    /// Operations keyed by method, in the order the document declares them.
    pub operations: Vec<(HttpMethod, Operation)>,
    /// Path-level parameters shared by all operations.
    pub parameters: Vec<ParameterOrRef>,
}

impl PathItem {
    /// Operation for one method, if declared.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, op)| op)
    }
}

// Method order is observable (the first declared method owns the path's tag),
// so the map is read as ordered JSON and split by key.
impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut item = PathItem::default();
        for (key, value) in raw {
            if key == "parameters" {
                item.parameters = serde_json::from_value(value)
                    .map_err(|e| <D::Error as de::Error>::custom(format!("parameters: {e}")))?;
            } else if let Some(method) = HttpMethod::from_key(&key) {
                let op: Operation = serde_json::from_value(value).map_err(|e| {
                    <D::Error as de::Error>::custom(format!("{method} operation: {e}"))
                })?;
                item.operations.push((method, op));
            }
        }
        Ok(item)
    }
}

/// An API operation (endpoint).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags; only the first is used for grouping.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Short summary, used for doc comments.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    /// Request body.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    #[serde(other)]
    Other,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter is carried.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Free text description.
    pub description: Option<String>,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<SchemaNode>,
}

/// Prefix of a reusable parameter reference.
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// A parameter list entry: inline, a `$ref`, or something unreadable.
///
/// Entries are read leniently so one bad parameter cannot fail the whole
/// document; the extractor skips what it cannot resolve.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(Box<Parameter>),
    Malformed(Value),
}

/// A request body definition.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    /// Free text description.
    pub description: Option<String>,
    /// Content keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
    /// Free text description.
    pub description: Option<String>,
    /// Content keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g. `application/json`).
#[derive(Debug, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<SchemaNode>,
}

/// Schema of the first JSON media type in a content map.
///
/// Accepts `application/json`, parameterised variants such as
/// `application/json; charset=utf-8`, and structured `+json` suffixes.
pub fn json_schema(content: &IndexMap<String, MediaType>) -> Option<&SchemaNode> {
    content
        .iter()
        .find(|(media, _)| is_json_media_type(media))
        .and_then(|(_, m)| m.schema.as_ref())
}

fn is_json_media_type(media: &str) -> bool {
    let essence = media.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

/// A schema fragment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Primitive type name.
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to a named component.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Item schema for arrays.
    pub items: Option<Box<SchemaNode>>,

    /// Object members, in declared order.
    pub properties: Option<IndexMap<String, SchemaNode>>,

    /// Value schema of string-keyed maps.
    pub additional_properties: Option<AdditionalProperties>,

    /// Enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// OpenAPI 3.0 nullable flag. Drives member optionality.
    pub nullable: Option<bool>,

    /// Free text description.
    pub description: Option<String>,

    /// Format hint (int32, date-time, ...).
    pub format: Option<String>,
}

impl SchemaNode {
    /// Effective primitive type name, skipping `"null"` in type arrays.
    pub fn type_name(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
        }
    }

    /// Whether the node is explicitly nullable, either through the 3.0 flag or
    /// a `"null"` entry in a 3.1 type array.
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(
            &self.schema_type,
            Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null")
        )
    }

    /// A node with a non-empty `enum` and no `properties` is an enum node.
    pub fn is_enum(&self) -> bool {
        self.properties.is_none() && self.enum_values.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// `type` can be a single name or, in OpenAPI 3.1, an array of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaNode>),
}

/// Enum value. Anything that is not a string, number or boolean is kept as
/// [`EnumValue::Other`] and printed as a `null` literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Other(Value),
}

impl Document {
    /// Follow a parameter entry to its definition. `None` for unreadable
    /// entries, references outside `#/components/parameters/`, missing
    /// targets and reference cycles.
    pub fn parameter<'a>(&'a self, entry: &'a ParameterOrRef) -> Option<&'a Parameter> {
        let mut current = entry;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                ParameterOrRef::Inline(param) => return Some(param.as_ref()),
                ParameterOrRef::Malformed(_) => return None,
                ParameterOrRef::Ref { reference } => {
                    if seen.contains(&reference.as_str()) {
                        return None;
                    }
                    seen.push(reference);
                    let name = reference.strip_prefix(PARAMETER_REF_PREFIX)?;
                    current = self.components.as_ref()?.parameters.get(name)?;
                }
            }
        }
    }

    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::Parse(e.to_string()))
    }

    /// Parse a document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DocumentError> {
        serde_yaml::from_str(yaml).map_err(|e| DocumentError::Parse(e.to_string()))
    }

    /// Named schema components; `None` when there are none.
    pub fn schemas(&self) -> Option<&IndexMap<String, SchemaNode>> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .filter(|schemas| !schemas.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_item_keeps_method_order() {
        let doc = Document::from_json(
            r#"{
  "paths": {
    "/pets": {
      "summary": "ignored",
      "post": { "tags": ["Pets"] },
      "parameters": [{ "name": "tenant", "in": "query", "schema": { "type": "string" } }],
      "get": { "tags": ["Other"] }
    }
  }
}"#,
        )
        .unwrap();
        let item = &doc.paths["/pets"];
        let methods: Vec<_> = item.operations.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Get]);
        assert_eq!(item.parameters.len(), 1);
        let tenant = doc.parameter(&item.parameters[0]).unwrap();
        assert_eq!(tenant.location, ParameterLocation::Query);
        assert!(item.operation(HttpMethod::Delete).is_none());
    }

    #[test]
    fn test_properties_keep_declared_order() {
        let doc = Document::from_json(
            r#"{
  "paths": {},
  "components": { "schemas": { "Z": { "type": "object", "properties": {
    "zeta": { "type": "string" }, "alpha": { "type": "string" }, "mid": { "type": "string" }
  } } } }
}"#,
        )
        .unwrap();
        let props = doc.schemas().unwrap()["Z"].properties.as_ref().unwrap();
        let names: Vec<_> = props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_yaml_document() {
        let doc = Document::from_yaml(
            "openapi: 3.0.1\ninfo:\n  title: Pets\n  version: '1'\npaths:\n  /pets:\n    get:\n      tags: [Pets]\n",
        )
        .unwrap();
        assert_eq!(doc.info.unwrap().title, "Pets");
        assert_eq!(doc.paths["/pets"].operations.len(), 1);
    }

    #[test]
    fn test_enum_values_of_mixed_kinds() {
        let node: SchemaNode =
            serde_json::from_str(r#"{ "enum": ["a", 1, 2.5, true, null] }"#).unwrap();
        let values = node.enum_values.unwrap();
        assert_eq!(values[0], EnumValue::String("a".into()));
        assert_eq!(values[1], EnumValue::Integer(1));
        assert_eq!(values[2], EnumValue::Float(2.5));
        assert_eq!(values[3], EnumValue::Bool(true));
        assert_eq!(values[4], EnumValue::Other(Value::Null));
    }

    #[test]
    fn test_enum_node_detection() {
        let node: SchemaNode = serde_json::from_str(r#"{ "enum": ["a"] }"#).unwrap();
        assert!(node.is_enum());
        let with_props: SchemaNode =
            serde_json::from_str(r#"{ "enum": ["a"], "properties": {} }"#).unwrap();
        assert!(!with_props.is_enum());
        let empty: SchemaNode = serde_json::from_str(r#"{ "enum": [] }"#).unwrap();
        assert!(!empty.is_enum());
    }

    #[test]
    fn test_type_array_nullable() {
        let node: SchemaNode = serde_json::from_str(r#"{ "type": ["null", "string"] }"#).unwrap();
        assert_eq!(node.type_name(), Some("string"));
        assert!(node.is_nullable());
    }

    #[test]
    fn test_json_media_type_variants() {
        let content: IndexMap<String, MediaType> = serde_json::from_str(
            r#"{
  "text/plain": { "schema": { "type": "string" } },
  "application/problem+json": { "schema": { "type": "integer" } }
}"#,
        )
        .unwrap();
        assert_eq!(json_schema(&content).unwrap().type_name(), Some("integer"));

        let plain: IndexMap<String, MediaType> =
            serde_json::from_str(r#"{ "text/plain": { "schema": { "type": "string" } } }"#)
                .unwrap();
        assert!(json_schema(&plain).is_none());
    }

    #[test]
    fn test_parse_error_is_document_error() {
        let err = Document::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_parameter_references_resolve() {
        let doc = Document::from_json(
            r##"{
  "paths": {
    "/a": { "get": { "parameters": [
      { "$ref": "#/components/parameters/Limit" },
      { "$ref": "#/components/parameters/Alias" },
      { "$ref": "#/components/parameters/Missing" },
      { "$ref": "#/components/parameters/Loop" },
      { "in": "query" }
    ] } },
    "/b": { "get": {} }
  },
  "components": { "parameters": {
    "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } },
    "Alias": { "$ref": "#/components/parameters/Limit" },
    "Loop": { "$ref": "#/components/parameters/Loop" }
  } }
}"##,
        )
        .unwrap();
        assert!(doc.paths.contains_key("/b"));
        let (_, op) = &doc.paths["/a"].operations[0];
        let resolved: Vec<_> = op
            .parameters
            .iter()
            .map(|entry| doc.parameter(entry).map(|p| p.name.as_str()))
            .collect();
        assert_eq!(resolved, vec![Some("limit"), Some("limit"), None, None, None]);
    }
}
