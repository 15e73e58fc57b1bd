use clap::Args;
use console::style;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use crate::cli::run_cli_async;
use crate::common::format_elapsed_ms;
use crate::config;
use crate::source::load_document;
use crate::writer::FsWriter;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "URL", help = "Document URL or local .json/.yaml path")]
    pub url: String,
    #[arg(
        short = 'd',
        long = "dir",
        help = "Output directory for tag modules (overrides `dir` in the config file)"
    )]
    pub dir: Option<PathBuf>,
    #[arg(
        short = 'm',
        long = "model",
        help = "Model module file, relative to the output directory (overrides `model` in the config file). Defaults to model.ts"
    )]
    pub model: Option<PathBuf>,
    #[arg(
        short = 'c',
        long = "config",
        help = "Config file. Defaults to socg.toml in the working directory"
    )]
    pub config: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let start = Instant::now();

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(dir) = args.dir {
        settings.dir = Some(dir);
    }
    if let Some(model) = args.model {
        settings.model = Some(model);
    }
    // Config problems surface before the document is fetched or any file is
    // touched.
    let (ctx, layout) = settings.into_context().map_err(|err| err.to_string())?;
    debug!(?ctx, ?layout, "Resolved generation settings.");

    let doc = load_document(&args.url).await?;
    let report = socg_core::generate(&doc, &ctx, &layout, &FsWriter)
        .map_err(|err| format!("Generation failed: {err}"))?;

    if let Some(model) = &report.model {
        println!("  {} {}", style("model").dim(), model.display());
    }
    for tag in &report.tags {
        println!(
            "  {} {} ({} {})",
            style(&tag.tag).cyan(),
            tag.endpoint.display(),
            tag.functions,
            if tag.functions == 1 { "function" } else { "functions" }
        );
    }
    println!(
        "{} Generated {} functions in {} modules ({})",
        style("✓").green(),
        report.function_count(),
        report.tags.len(),
        format_elapsed_ms(start)
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_template_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("socg.toml");
        std::fs::write(&config, "[generate]\ndir = \"out\"\n").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("keep.ts"), "keep").unwrap();

        let code = run(GenerateArgs {
            url: "/not/fetched.json".to_string(),
            dir: Some(out.clone()),
            model: None,
            config: Some(config),
        })
        .await;
        assert_eq!(code, 1);
        assert!(out.join("keep.ts").exists());
    }

    #[tokio::test]
    async fn test_missing_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("socg.toml");
        std::fs::write(&config, "[generate]\ntemplate = \"{{ URL }}\"\n").unwrap();

        let code = run(GenerateArgs {
            url: "/not/fetched.json".to_string(),
            dir: None,
            model: None,
            config: Some(config),
        })
        .await;
        assert_eq!(code, 1);
    }
}
