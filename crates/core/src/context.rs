//! Explicit generation context.
//!
//! Everything a run needs (call template, hooks, filters, import style,
//! builtin names, tag policy) is fixed here before the first operation is
//! processed and passed down by reference. There is no global state.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::endpoint::{FirstMethodTag, TagPolicy};
use crate::error::ConfigError;
use crate::function::CallTemplate;
use crate::naming::UNKNOWN_TYPE;

/// A text-to-text transform: the path rewrite hook or the output hook.
pub trait TextHook: Send + Sync {
    fn apply(&self, text: &str) -> Result<String, String>;
}

impl<F> TextHook for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, text: &str) -> Result<String, String> {
        Ok(self(text))
    }
}

/// Endpoint or tag filter: an allow-list of exact names or a predicate.
pub enum Filter {
    AllowList(Vec<String>),
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Filter {
    pub fn allow_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowList(names.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::AllowList(names) => names.iter().any(|n| n == name),
            Self::Predicate(f) => f(name),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowList(names) => f.debug_tuple("AllowList").field(names).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// TypeScript module-resolution options that change how imports print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStyle {
    /// Keep the `.ts` extension on import sources.
    pub allow_importing_ts_extensions: bool,
    /// Print `import type { ... }`.
    pub verbatim_module_syntax: bool,
}

impl ImportStyle {
    /// Import source for a module file path, relative and extension-adjusted.
    pub fn source(&self, relative: &str) -> String {
        if self.allow_importing_ts_extensions {
            relative.to_string()
        } else {
            relative
                .strip_suffix(".ts")
                .unwrap_or(relative)
                .to_string()
        }
    }
}

/// Immutable settings of one generation run.
pub struct GenerateContext {
    pub template: Box<dyn CallTemplate>,
    pub output: Option<Box<dyn TextHook>>,
    pub rewrite: Option<Box<dyn TextHook>>,
    pub filter_tag: Option<Filter>,
    pub filter_endpoint: Option<Filter>,
    pub tag_policy: Box<dyn TagPolicy>,
    pub import_style: ImportStyle,
    /// Type names that never need an import. Always contains `unknown`.
    pub builtin_types: HashSet<String>,
}

impl fmt::Debug for GenerateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateContext")
            .field("output", &self.output.is_some())
            .field("rewrite", &self.rewrite.is_some())
            .field("filter_tag", &self.filter_tag)
            .field("filter_endpoint", &self.filter_endpoint)
            .field("import_style", &self.import_style)
            .field("builtin_types", &self.builtin_types)
            .finish_non_exhaustive()
    }
}

impl GenerateContext {
    pub fn builder() -> GenerateContextBuilder {
        GenerateContextBuilder::default()
    }

    /// Context with only a call template set.
    pub fn new(template: impl CallTemplate + 'static) -> Self {
        Self {
            template: Box::new(template),
            output: None,
            rewrite: None,
            filter_tag: None,
            filter_endpoint: None,
            tag_policy: Box::new(FirstMethodTag),
            import_style: ImportStyle::default(),
            builtin_types: HashSet::from([UNKNOWN_TYPE.to_string()]),
        }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_types.contains(name)
    }
}

/// Builder for [`GenerateContext`]. `build` fails when no template was set.
#[derive(Default)]
pub struct GenerateContextBuilder {
    template: Option<Box<dyn CallTemplate>>,
    output: Option<Box<dyn TextHook>>,
    rewrite: Option<Box<dyn TextHook>>,
    filter_tag: Option<Filter>,
    filter_endpoint: Option<Filter>,
    tag_policy: Option<Box<dyn TagPolicy>>,
    import_style: ImportStyle,
    builtin_types: Vec<String>,
}

impl fmt::Debug for GenerateContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateContextBuilder")
            .field("template", &self.template.is_some())
            .field("import_style", &self.import_style)
            .field("builtin_types", &self.builtin_types)
            .finish_non_exhaustive()
    }
}

impl GenerateContextBuilder {
    #[must_use]
    pub fn template(mut self, template: impl CallTemplate + 'static) -> Self {
        self.template = Some(Box::new(template));
        self
    }

    #[must_use]
    pub fn boxed_template(mut self, template: Box<dyn CallTemplate>) -> Self {
        self.template = Some(template);
        self
    }

    #[must_use]
    pub fn output(mut self, hook: impl TextHook + 'static) -> Self {
        self.output = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn boxed_output(mut self, hook: Option<Box<dyn TextHook>>) -> Self {
        self.output = hook;
        self
    }

    #[must_use]
    pub fn rewrite(mut self, hook: impl TextHook + 'static) -> Self {
        self.rewrite = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn boxed_rewrite(mut self, hook: Option<Box<dyn TextHook>>) -> Self {
        self.rewrite = hook;
        self
    }

    #[must_use]
    pub fn filter_tag(mut self, filter: Filter) -> Self {
        self.filter_tag = Some(filter);
        self
    }

    #[must_use]
    pub fn filter_endpoint(mut self, filter: Filter) -> Self {
        self.filter_endpoint = Some(filter);
        self
    }

    #[must_use]
    pub fn tag_policy(mut self, policy: impl TagPolicy + 'static) -> Self {
        self.tag_policy = Some(Box::new(policy));
        self
    }

    #[must_use]
    pub fn boxed_tag_policy(mut self, policy: Box<dyn TagPolicy>) -> Self {
        self.tag_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn import_style(mut self, style: ImportStyle) -> Self {
        self.import_style = style;
        self
    }

    #[must_use]
    pub fn builtin_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_types.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<GenerateContext, ConfigError> {
        let template = self.template.ok_or(ConfigError::MissingTemplate)?;
        let mut builtin_types: HashSet<String> = self.builtin_types.into_iter().collect();
        builtin_types.insert(UNKNOWN_TYPE.to_string());
        Ok(GenerateContext {
            template,
            output: self.output,
            rewrite: self.rewrite,
            filter_tag: self.filter_tag,
            filter_endpoint: self.filter_endpoint,
            tag_policy: self.tag_policy.unwrap_or_else(|| Box::new(FirstMethodTag)),
            import_style: self.import_style,
            builtin_types,
        })
    }
}

/// Where a run writes: the output directory and the model module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub dir: PathBuf,
    /// Model module file. Already joined onto `dir`.
    pub model: PathBuf,
}

/// Default model module file name.
pub const DEFAULT_MODEL_FILE: &str = "model.ts";

impl OutputLayout {
    /// Layout for `dir`, with the model module at `<dir>/<model>` or
    /// `<dir>/model.ts`. An absolute `model` is kept as is.
    pub fn new(dir: Option<PathBuf>, model: Option<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.ok_or(ConfigError::MissingDir)?;
        let model = dir.join(model.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE)));
        Ok(Self { dir, model })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::function::CallInfo;

    #[test]
    fn test_builder_requires_template() {
        let err = GenerateContext::builder().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingTemplate));
    }

    #[test]
    fn test_builtins_always_include_unknown() {
        let ctx = GenerateContext::builder()
            .template(|call: &CallInfo| call.url.clone())
            .builtin_types(["Blob"])
            .build()
            .unwrap();
        assert!(ctx.is_builtin("unknown"));
        assert!(ctx.is_builtin("Blob"));
        assert!(!ctx.is_builtin("Pet"));
    }

    #[test]
    fn test_filters() {
        let list = Filter::allow_list(["/api/a"]);
        assert!(list.allows("/api/a"));
        assert!(!list.allows("/api/b"));

        let pred = Filter::predicate(|t| t == "Admin");
        assert!(pred.allows("Admin"));
        assert!(!pred.allows("admin"));
    }

    #[test]
    fn test_import_source_extension() {
        let plain = ImportStyle::default();
        assert_eq!(plain.source("../model.ts"), "../model");
        let keep = ImportStyle {
            allow_importing_ts_extensions: true,
            ..ImportStyle::default()
        };
        assert_eq!(keep.source("../model.ts"), "../model.ts");
    }

    #[test]
    fn test_layout_requires_dir() {
        assert!(matches!(
            OutputLayout::new(None, None).unwrap_err(),
            ConfigError::MissingDir
        ));
        let layout = OutputLayout::new(Some("src/api".into()), None).unwrap();
        assert_eq!(layout.model, PathBuf::from("src/api/model.ts"));
    }

    #[test]
    fn test_layout_model_is_relative_to_dir() {
        let layout = OutputLayout::new(Some("src/api".into()), Some("types/shared.ts".into())).unwrap();
        assert_eq!(layout.model, PathBuf::from("src/api/types/shared.ts"));

        let layout = OutputLayout::new(Some("src/api".into()), Some("/abs/model.ts".into())).unwrap();
        assert_eq!(layout.model, PathBuf::from("/abs/model.ts"));
    }
}
