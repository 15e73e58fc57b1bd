//! Schema node to type descriptor resolution.
//!
//! Resolution is a pure function of the node: the same node always yields the
//! same descriptor and the source schema is never touched.

use crate::document::{AdditionalProperties, EnumValue, SchemaNode};
use crate::error::SchemaError;
use crate::naming::ref_to_type_name;

/// Primitive TypeScript types a schema can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

/// The resolved semantic type of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Array(Box<TypeDescriptor>),
    /// Inline object with members in declaration order.
    Object(Vec<Member>),
    /// String-keyed map.
    IndexedObject(Box<TypeDescriptor>),
    /// Named component.
    Reference(String),
    /// `type: object` with neither `properties` nor `additionalProperties`.
    /// Rendered as the open `any` type.
    OpenObject,
    /// Missing or unrecognised `type`. Rendered as `unknown`.
    Unknown,
}

/// One member of an inline object.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Set when the schema marks the member nullable.
    pub optional: bool,
    /// From the member's `description`.
    pub comment: Option<String>,
}

/// Outcome of resolving a node in declaration position.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Type(TypeDescriptor),
    /// The node is an enum node: it must become a standalone named enum
    /// declaration with these values, never an inline type.
    Enum(Vec<EnumValue>),
}

/// Resolve a node in declaration position: enum nodes yield an enum
/// declaration request, everything else a type descriptor.
pub fn resolve(node: &SchemaNode) -> Result<Resolution, SchemaError> {
    if node.ref_path.is_none() && node.is_enum() {
        let values = node.enum_values.clone().unwrap_or_default();
        return Ok(Resolution::Enum(values));
    }
    describe(node).map(Resolution::Type)
}

/// Resolve a node in type position (member, item, parameter, payload).
///
/// `enum` is ignored here: an enum-valued member is typed by its primitive
/// `type`, since enums only exist as standalone declarations.
pub fn describe(node: &SchemaNode) -> Result<TypeDescriptor, SchemaError> {
    if let Some(ref_path) = &node.ref_path {
        return Ok(TypeDescriptor::Reference(ref_to_type_name(ref_path)));
    }

    let ty = match node.type_name() {
        Some("string") => TypeDescriptor::Primitive(Primitive::String),
        Some("number" | "int" | "int32" | "int64" | "integer") => {
            TypeDescriptor::Primitive(Primitive::Number)
        }
        Some("boolean" | "bool") => TypeDescriptor::Primitive(Primitive::Boolean),
        Some("array") => {
            let items = node.items.as_deref().ok_or(SchemaError::MissingItems)?;
            TypeDescriptor::Array(Box::new(describe(items)?))
        }
        Some("object") => describe_object(node)?,
        _ => TypeDescriptor::Unknown,
    };
    Ok(ty)
}

/// Resolve the structure of an object node, ignoring its `type`.
pub fn describe_object(node: &SchemaNode) -> Result<TypeDescriptor, SchemaError> {
    if let Some(properties) = &node.properties {
        let members = properties
            .iter()
            .map(|(name, prop)| {
                Ok(Member {
                    name: name.clone(),
                    ty: describe(prop)?,
                    optional: prop.is_nullable(),
                    comment: prop.description.clone(),
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        return Ok(TypeDescriptor::Object(members));
    }

    match &node.additional_properties {
        Some(AdditionalProperties::Schema(value)) => {
            Ok(TypeDescriptor::IndexedObject(Box::new(describe(value)?)))
        }
        Some(AdditionalProperties::Bool(true)) => {
            Ok(TypeDescriptor::IndexedObject(Box::new(TypeDescriptor::Unknown)))
        }
        Some(AdditionalProperties::Bool(false)) | None => Ok(TypeDescriptor::OpenObject),
    }
}

impl TypeDescriptor {
    /// Named components this type refers to, in first-seen order, without
    /// duplicates.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::Reference(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            TypeDescriptor::Array(inner) | TypeDescriptor::IndexedObject(inner) => {
                inner.collect_references(out);
            }
            TypeDescriptor::Object(members) => {
                for member in members {
                    member.ty.collect_references(out);
                }
            }
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::OpenObject
            | TypeDescriptor::Unknown => {}
        }
    }
}
