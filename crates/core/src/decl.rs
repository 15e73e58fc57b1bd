//! Declaration model: the small statement tree the printer turns into
//! TypeScript.
//!
//! Statements are tagged variants (interface, enum, type alias, function,
//! import). Nothing here knows about OpenAPI beyond [`declare`], which maps a
//! named schema node to one exported declaration.

use crate::document::{EnumValue, SchemaNode};
use crate::error::SchemaError;
use crate::naming::normalize_id;
use crate::resolve::{describe, describe_object, resolve, Member, Resolution, TypeDescriptor};

/// One top-level statement of a module.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    Function(FunctionDecl),
    Import(ImportDecl),
}

/// `export interface Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub doc: Option<String>,
    pub members: Vec<Member>,
    /// `[prop: string]: T` signature for map-like schemas.
    pub index: Option<TypeDescriptor>,
}

/// `export enum Name { Enum_0 = ..., ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub doc: Option<String>,
    pub members: Vec<EnumMember>,
}

/// A positional enum member.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Literal,
}

/// Literal initializer of an enum member.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Fallback for values whose kind is not a string, number or boolean.
    Null,
}

impl From<&EnumValue> for Literal {
    fn from(value: &EnumValue) -> Self {
        match value {
            EnumValue::String(s) => Literal::String(s.clone()),
            EnumValue::Integer(n) => Literal::Integer(*n),
            EnumValue::Float(f) => Literal::Float(*f),
            EnumValue::Bool(b) => Literal::Bool(*b),
            EnumValue::Other(_) => Literal::Null,
        }
    }
}

/// `export type Name = T;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub doc: Option<String>,
    pub ty: TypeDescriptor,
}

/// `export function name(params) { return <body>; }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<Param>,
    /// Expression returned by the function body, verbatim.
    pub body: String,
}

/// A typed function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeDescriptor,
}

/// `import { a, b } from "source";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub names: Vec<String>,
    pub source: String,
    /// Emit `import type` (for `verbatimModuleSyntax`).
    pub type_only: bool,
}

/// A printable module: statements in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub statements: Vec<Statement>,
}

impl Module {
    pub fn push(&mut self, statement: impl Into<Statement>) {
        self.statements.push(statement.into());
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Statement {
    /// Named types the statement refers to, in first-seen order.
    pub fn references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let types: Vec<&TypeDescriptor> = match self {
            Statement::Interface(decl) => decl
                .members
                .iter()
                .map(|m| &m.ty)
                .chain(decl.index.iter())
                .collect(),
            Statement::TypeAlias(decl) => vec![&decl.ty],
            Statement::Function(decl) => decl.params.iter().map(|p| &p.ty).collect(),
            Statement::Enum(_) | Statement::Import(_) => Vec::new(),
        };
        for ty in types {
            for name in ty.references() {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }
}

impl From<FunctionDecl> for Statement {
    fn from(decl: FunctionDecl) -> Self {
        Statement::Function(decl)
    }
}

impl From<ImportDecl> for Statement {
    fn from(decl: ImportDecl) -> Self {
        Statement::Import(decl)
    }
}

/// Positional enum member names: `Enum_0`, `Enum_1`, ...
pub fn enum_members(values: &[EnumValue]) -> Vec<EnumMember> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| EnumMember {
            name: format!("Enum_{i}"),
            value: Literal::from(value),
        })
        .collect()
}

/// Build the exported declaration for a named schema node.
///
/// - enum nodes become enums
/// - nodes with `properties` (typed or not) become interfaces
/// - map-like objects become interfaces with an index signature
/// - anything else becomes a type alias, so references to it still resolve
pub fn declare(name: &str, node: &SchemaNode) -> Result<Statement, SchemaError> {
    let name = normalize_id(name);
    let doc = node.description.clone();

    let ty = if node.ref_path.is_none() && node.properties.is_some() {
        describe_object(node)?
    } else {
        match resolve(node)? {
            Resolution::Enum(values) => {
                return Ok(Statement::Enum(EnumDecl {
                    name,
                    doc,
                    members: enum_members(&values),
                }));
            }
            Resolution::Type(ty) => ty,
        }
    };

    let statement = match ty {
        TypeDescriptor::Object(members) => Statement::Interface(InterfaceDecl {
            name,
            doc,
            members,
            index: None,
        }),
        TypeDescriptor::IndexedObject(value) => Statement::Interface(InterfaceDecl {
            name,
            doc,
            members: Vec::new(),
            index: Some(*value),
        }),
        ty => Statement::TypeAlias(TypeAliasDecl { name, doc, ty }),
    };
    Ok(statement)
}

/// Type of a schema in type position, or `unknown` when there is no schema.
pub fn type_of(node: Option<&SchemaNode>) -> Result<TypeDescriptor, SchemaError> {
    node.map_or(Ok(TypeDescriptor::Unknown), describe)
}
