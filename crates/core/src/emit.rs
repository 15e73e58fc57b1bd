//! TypeScript printing via the `Emit` trait.
//!
//! Every declaration node implements [`Emit`]. Printing is purely mechanical
//! and cannot fail; all decisions were made while building the nodes.

use crate::decl::{
    EnumDecl, FunctionDecl, ImportDecl, InterfaceDecl, Literal, Module, Param, Statement,
    TypeAliasDecl,
};
use crate::naming::{escape_js_string, quote_if_needed};
use crate::resolve::{Member, Primitive, TypeDescriptor};

const INDENT: &str = "  ";

/// Trait for emitting TypeScript code from declaration nodes.
pub trait Emit {
    /// Convert the node to its TypeScript source text.
    fn emit(&self) -> String;
}

// =============================================================================
// Types
// =============================================================================

impl Emit for Primitive {
    fn emit(&self) -> String {
        match self {
            Primitive::String => "string".to_string(),
            Primitive::Number => "number".to_string(),
            Primitive::Boolean => "boolean".to_string(),
        }
    }
}

impl Emit for TypeDescriptor {
    fn emit(&self) -> String {
        emit_type(self, 0)
    }
}

/// Print a type whose closing brace (for inline objects) sits at `depth`.
fn emit_type(ty: &TypeDescriptor, depth: usize) -> String {
    match ty {
        TypeDescriptor::Primitive(p) => p.emit(),
        TypeDescriptor::Array(inner) => format!("{}[]", emit_type(inner, depth)),
        TypeDescriptor::Object(members) => {
            if members.is_empty() {
                return "{}".to_string();
            }
            let mut out = String::from("{\n");
            emit_members(&mut out, members, depth + 1);
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            out
        }
        TypeDescriptor::IndexedObject(value) => {
            let mut out = String::from("{\n");
            emit_index_signature(&mut out, value, depth + 1);
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            out
        }
        TypeDescriptor::Reference(name) => name.clone(),
        TypeDescriptor::OpenObject => "any".to_string(),
        TypeDescriptor::Unknown => "unknown".to_string(),
    }
}

fn emit_members(out: &mut String, members: &[Member], depth: usize) {
    let prefix = INDENT.repeat(depth);
    for member in members {
        if let Some(comment) = &member.comment {
            out.push_str(&doc_comment(comment, &prefix));
        }
        let opt = if member.optional { "?" } else { "" };
        out.push_str(&format!(
            "{prefix}{}{opt}: {};\n",
            quote_if_needed(&member.name),
            emit_type(&member.ty, depth)
        ));
    }
}

fn emit_index_signature(out: &mut String, value: &TypeDescriptor, depth: usize) {
    let prefix = INDENT.repeat(depth);
    out.push_str(&format!(
        "{prefix}[prop: string]: {};\n",
        emit_type(value, depth)
    ));
}

/// Leading `/** */` comment. One line of text stays on one line; anything
/// longer becomes a starred block. `prefix` is the indentation of the
/// commented node.
pub fn doc_comment(text: &str, prefix: &str) -> String {
    let text = text.trim().replace("*/", "*\\/");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    match lines.as_slice() {
        [] => String::new(),
        [line] => format!("{prefix}/** {line} */\n"),
        _ => {
            let mut out = format!("{prefix}/**\n");
            for line in lines {
                if line.is_empty() {
                    out.push_str(&format!("{prefix} *\n"));
                } else {
                    out.push_str(&format!("{prefix} * {line}\n"));
                }
            }
            out.push_str(&format!("{prefix} */\n"));
            out
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for Literal {
    fn emit(&self) -> String {
        match self {
            Literal::String(s) => format!("\"{}\"", escape_js_string(s)),
            Literal::Integer(n) => n.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

impl Emit for InterfaceDecl {
    fn emit(&self) -> String {
        let mut out = self.doc.as_deref().map(|d| doc_comment(d, "")).unwrap_or_default();
        out.push_str(&format!("export interface {} {{\n", self.name));
        emit_members(&mut out, &self.members, 1);
        if let Some(value) = &self.index {
            emit_index_signature(&mut out, value, 1);
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for EnumDecl {
    fn emit(&self) -> String {
        let mut out = self.doc.as_deref().map(|d| doc_comment(d, "")).unwrap_or_default();
        out.push_str(&format!("export enum {} {{\n", self.name));
        for member in &self.members {
            out.push_str(&format!(
                "{INDENT}{} = {},\n",
                member.name,
                member.value.emit()
            ));
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for TypeAliasDecl {
    fn emit(&self) -> String {
        let mut out = self.doc.as_deref().map(|d| doc_comment(d, "")).unwrap_or_default();
        out.push_str(&format!("export type {} = {};\n", self.name, self.ty.emit()));
        out
    }
}

impl Emit for Param {
    fn emit(&self) -> String {
        format!("{}: {}", self.name, self.ty.emit())
    }
}

impl Emit for FunctionDecl {
    fn emit(&self) -> String {
        let mut out = self.doc.as_deref().map(|d| doc_comment(d, "")).unwrap_or_default();
        let params = self.params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
        out.push_str(&format!("export function {}({params}) {{\n", self.name));
        out.push_str(&format!("{INDENT}return {};\n", self.body.trim().trim_end_matches(';')));
        out.push_str("}\n");
        out
    }
}

impl Emit for ImportDecl {
    fn emit(&self) -> String {
        let kind = if self.type_only { "import type" } else { "import" };
        format!(
            "{kind} {{ {} }} from \"{}\";\n",
            self.names.join(", "),
            escape_js_string(&self.source)
        )
    }
}

impl Emit for Statement {
    fn emit(&self) -> String {
        match self {
            Statement::Interface(d) => d.emit(),
            Statement::Enum(d) => d.emit(),
            Statement::TypeAlias(d) => d.emit(),
            Statement::Function(d) => d.emit(),
            Statement::Import(d) => d.emit(),
        }
    }
}

impl Emit for Module {
    /// Statements separated by one blank line; consecutive imports stay
    /// together.
    fn emit(&self) -> String {
        let mut out = String::new();
        let mut prev_import = false;
        for (i, statement) in self.statements.iter().enumerate() {
            let is_import = matches!(statement, Statement::Import(_));
            if i > 0 && !(is_import && prev_import) {
                out.push('\n');
            }
            out.push_str(&statement.emit());
            prev_import = is_import;
        }
        out
    }
}
