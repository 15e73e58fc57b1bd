//! `socg.toml` loading.
//!
//! ```toml
//! filter-endpoint = ["/api/pets"]
//!
//! [generate]
//! template = "http.{{ METHOD }}<{{ RESPONSE }}>({{ URL }}{% if QUERY %}, { params: {{ QUERY }} }{% endif %}{% if BODY %}, {{ BODY }}{% endif %})"
//! output = "// generated by socg\n{{ code }}"
//! dir = "src/api"
//! model = "model.ts"
//! ```

use std::error::Error as _;
use std::path::{Path, PathBuf};

use socg_core::{
    CallInfo, CallTemplate, ConfigError, Filter, FirstMethodTag, GenerateContext, ImportStyle,
    OperationTag, OutputLayout, TagPolicy, TextHook,
};
use tera::{Context, Tera};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "socg.toml";

/// Which tag owns an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPolicyKind {
    #[default]
    FirstMethod,
    Operation,
}

impl TagPolicyKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "first-method" => Ok(Self::FirstMethod),
            "operation" => Ok(Self::Operation),
            other => Err(ConfigError::InvalidValue {
                key: "generate.tag-policy".to_string(),
                message: format!("expected \"first-method\" or \"operation\", got \"{other}\""),
            }),
        }
    }

    fn into_policy(self) -> Box<dyn TagPolicy> {
        match self {
            Self::FirstMethod => Box::new(FirstMethodTag),
            Self::Operation => Box::new(OperationTag),
        }
    }
}

/// Settings read from the config file, before command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateConfig {
    pub template: Option<String>,
    pub output: Option<String>,
    pub rewrite: Option<String>,
    pub dir: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub allow_importing_ts_extensions: bool,
    pub verbatim_module_syntax: bool,
    pub filter_tag: Option<Vec<String>>,
    pub filter_endpoint: Option<Vec<String>>,
    pub builtin_types: Vec<String>,
    pub tag_policy: TagPolicyKind,
}

/// Read the config file. An explicit path must exist; the default
/// `socg.toml` may be absent.
pub fn load(path: Option<&Path>) -> Result<GenerateConfig, String> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !explicit && !path.exists() {
        debug!("No {DEFAULT_CONFIG_FILE} found, using defaults.");
        return Ok(GenerateConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    let value: toml::Value = contents
        .parse()
        .map_err(|err| format!("Failed to parse {}: {err}", path.display()))?;
    GenerateConfig::from_value(&value).map_err(|err| format!("{}: {err}", path.display()))
}

impl GenerateConfig {
    pub fn from_value(value: &toml::Value) -> Result<Self, ConfigError> {
        let filter_endpoint = string_list(value, "filter-endpoint", "filter-endpoint")?;
        let Some(section) = value.get("generate") else {
            return Ok(Self {
                filter_endpoint,
                ..Self::default()
            });
        };
        if !section.is_table() {
            return Err(invalid("generate", "expected a table"));
        }

        let tag_policy = match string(section, "tag-policy", "generate.tag-policy")? {
            Some(value) => TagPolicyKind::parse(&value)?,
            None => TagPolicyKind::default(),
        };

        Ok(Self {
            template: string(section, "template", "generate.template")?,
            output: string(section, "output", "generate.output")?,
            rewrite: string(section, "rewrite", "generate.rewrite")?,
            dir: string(section, "dir", "generate.dir")?.map(PathBuf::from),
            model: string(section, "model", "generate.model")?.map(PathBuf::from),
            allow_importing_ts_extensions: boolean(
                section,
                "allow-importing-ts-extensions",
                "generate.allow-importing-ts-extensions",
            )?,
            verbatim_module_syntax: boolean(
                section,
                "verbatim-module-syntax",
                "generate.verbatim-module-syntax",
            )?,
            filter_tag: string_list(section, "filter-tag", "generate.filter-tag")?,
            filter_endpoint,
            builtin_types: string_list(section, "builtin-types", "generate.builtin-types")?
                .unwrap_or_default(),
            tag_policy,
        })
    }

    /// Compile templates and build the run context and output layout.
    ///
    /// Fails on a missing template or directory, or a template that does not
    /// compile. Nothing is written before this succeeds.
    pub fn into_context(self) -> Result<(GenerateContext, OutputLayout), ConfigError> {
        let source = self.template.ok_or(ConfigError::MissingTemplate)?;
        let template = TeraCallTemplate::new(&source)?;
        let output = self
            .output
            .map(|src| TeraHook::new("output", "code", &src))
            .transpose()?
            .map(|hook| -> Box<dyn TextHook> { Box::new(hook) });
        let rewrite = self
            .rewrite
            .map(|src| TeraHook::new("rewrite", "path", &src))
            .transpose()?
            .map(|hook| -> Box<dyn TextHook> { Box::new(hook) });
        let layout = OutputLayout::new(self.dir, self.model)?;

        let mut builder = GenerateContext::builder()
            .template(template)
            .boxed_output(output)
            .boxed_rewrite(rewrite)
            .boxed_tag_policy(self.tag_policy.into_policy())
            .import_style(ImportStyle {
                allow_importing_ts_extensions: self.allow_importing_ts_extensions,
                verbatim_module_syntax: self.verbatim_module_syntax,
            })
            .builtin_types(self.builtin_types);
        if let Some(tags) = self.filter_tag {
            builder = builder.filter_tag(Filter::AllowList(tags));
        }
        if let Some(paths) = self.filter_endpoint {
            builder = builder.filter_endpoint(Filter::AllowList(paths));
        }
        Ok((builder.build()?, layout))
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn string(table: &toml::Value, key: &str, full_key: &str) -> Result<Option<String>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(full_key, "expected a string")),
    }
}

fn boolean(table: &toml::Value, key: &str, full_key: &str) -> Result<bool, ConfigError> {
    match table.get(key) {
        None => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(full_key, "expected a boolean")),
    }
}

fn string_list(
    table: &toml::Value,
    key: &str,
    full_key: &str,
) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(value) = table.get(key) else {
        return Ok(None);
    };
    let items = value
        .as_array()
        .ok_or_else(|| invalid(full_key, "expected an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(full_key, "expected an array of strings"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Full tera error message including its causes.
fn tera_message(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn compile(name: &'static str, source: &str) -> Result<Tera, ConfigError> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, source)
        .map_err(|err| ConfigError::InvalidTemplate {
            name: name.to_string(),
            message: tera_message(&err),
        })?;
    Ok(tera)
}

fn render(tera: &Tera, name: &str, context: &Context) -> Result<String, String> {
    tera.render(name, context).map_err(|err| tera_message(&err))
}

/// Call-expression template. Sees `URL`, `METHOD`, `RESPONSE`, and `QUERY` /
/// `BODY` when the operation has them.
#[derive(Debug)]
pub struct TeraCallTemplate {
    tera: Tera,
}

impl TeraCallTemplate {
    const NAME: &'static str = "template";

    pub fn new(source: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            tera: compile(Self::NAME, source)?,
        })
    }
}

impl CallTemplate for TeraCallTemplate {
    fn render(&self, call: &CallInfo) -> Result<String, String> {
        let mut context = Context::new();
        context.insert("URL", &call.url);
        context.insert("METHOD", call.method);
        if let Some(query) = call.query {
            context.insert("QUERY", query);
        }
        if let Some(body) = call.body {
            context.insert("BODY", body);
        }
        context.insert("RESPONSE", &call.response);
        render(&self.tera, Self::NAME, &context)
    }
}

/// Text hook template exposing its input as one variable.
#[derive(Debug)]
pub struct TeraHook {
    tera: Tera,
    name: &'static str,
    variable: &'static str,
}

impl TeraHook {
    pub fn new(name: &'static str, variable: &'static str, source: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            tera: compile(name, source)?,
            name,
            variable,
        })
    }
}

impl TextHook for TeraHook {
    fn apply(&self, text: &str) -> Result<String, String> {
        let mut context = Context::new();
        context.insert(self.variable, text);
        render(&self.tera, self.name, &context)
    }
}
