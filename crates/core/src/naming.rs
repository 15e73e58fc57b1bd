//! Identifier rules shared by the resolver and the emitters.

use std::collections::HashSet;
use std::sync::LazyLock;

use heck::{ToLowerCamelCase, ToPascalCase};

use crate::document::HttpMethod;

/// TypeScript reserved words that cannot be used as identifiers.
static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Name of the top type. Always builtin, never imported.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Check whether a name is usable as a bare identifier or property key.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in a double-quoted TypeScript literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Quote a property key unless it is a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_js_string(name))
    }
}

/// Strip quote characters from an identifier.
///
/// Component keys such as `'Widget'` or `"Widget"` show up in generated
/// documents; the quotes are never part of the symbol.
pub fn normalize_id(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`'))
        .collect()
}

/// Symbol name a `$ref` pointer resolves to: its final path segment,
/// normalized.
pub fn ref_to_type_name(ref_path: &str) -> String {
    normalize_id(ref_path.rsplit('/').next().unwrap_or(ref_path))
}

/// Turn an arbitrary parameter name into a variable name.
/// - Non-identifier names are camel-cased (`item-id` becomes `itemId`)
/// - A leading digit gets a `_` prefix
/// - Reserved words get a `_` prefix
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = if is_identifier(name) {
        name.to_string()
    } else {
        name.to_lower_camel_case()
    };
    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }
    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }
    result
}

/// Path segments that contribute to generated names: every literal segment,
/// skipping `{param}` placeholders and empty segments.
fn name_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter(|s| !s.is_empty() && !s.contains('{'))
}

/// Base function name: camel case of the method followed by the literal path
/// segments. `GET /api/users/{id}/orders` becomes `getApiUsersOrders`.
pub fn function_name(method: HttpMethod, path: &str) -> String {
    let joined = std::iter::once(method.as_str())
        .chain(name_segments(path))
        .collect::<Vec<_>>()
        .join("-");
    sanitize_identifier(&joined.to_lower_camel_case())
}

/// Query type identifier for a function name: `getApiUsers` becomes
/// `GetApiUsersQuery`.
pub fn query_type_name(function_name: &str) -> String {
    format!("{}Query", function_name.to_pascal_case())
}

/// Module directory name for a tag.
pub fn tag_dir_name(tag: &str) -> String {
    let name = tag.to_lower_camel_case();
    if name.is_empty() {
        "default".to_string()
    } else {
        name
    }
}

/// Placeholder names of a path template, in order: `/a/{x}/b/{y}` yields
/// `x`, `y`.
pub fn path_placeholders(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    names
}

/// Backtick URL template with `${ident}` in place of every `{name}`
/// placeholder; `ident` maps a placeholder name to its variable.
pub fn url_template(path: &str, ident: impl Fn(&str) -> String) -> String {
    let mut out = String::from("`");
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&escape_template(&rest[..start]));
        out.push_str("${");
        out.push_str(&ident(&after[..end]));
        out.push('}');
        rest = &after[end + 1..];
    }
    out.push_str(&escape_template(rest));
    out.push('`');
    out
}

fn escape_template(s: &str) -> String {
    s.replace('\\', "\\\\").replace('`', "\\`")
}
