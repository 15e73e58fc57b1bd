use clap::Args;
use std::path::PathBuf;

use crate::cli::run_cli_async;
use crate::common::run_with_spinner_async;
use crate::source::{load_text, pretty_json};
use crate::writer::FsWriter;
use socg_core::FileWriter;

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(value_name = "URL", help = "Document URL or local .json/.yaml path")]
    pub url: String,
    #[arg(
        short = 'o',
        long = "output",
        help = "Save the document to this file instead of printing it"
    )]
    pub output: Option<PathBuf>,
}

pub async fn run(args: FetchArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: FetchArgs) -> Result<(), String> {
    let url = args.url.as_str();
    let text = match &args.output {
        Some(_) => {
            run_with_spinner_async(&format!("Fetching {url}"), &format!("Fetched {url}"), || {
                load_text(url)
            })
            .await?
        }
        None => load_text(url).await?,
    };
    let pretty = pretty_json(url, &text)?;

    match args.output {
        Some(path) => {
            FsWriter
                .ensure_file(&path)
                .and_then(|()| FsWriter.write_file(&path, &pretty))
                .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
            println!(
                "{} Saved document to {}",
                console::style("✓").green(),
                console::style(path.display()).bold()
            );
        }
        None => println!("{pretty}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_local_yaml_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("openapi.yaml");
        std::fs::write(&source, "openapi: 3.0.0\npaths: {}\n").unwrap();
        let output = dir.path().join("out/openapi.json");

        let code = run(FetchArgs {
            url: source.to_string_lossy().into_owned(),
            output: Some(output.clone()),
        })
        .await;
        assert_eq!(code, 0);
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(saved["openapi"], "3.0.0");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_fails() {
        let code = run(FetchArgs {
            url: "/definitely/not/here.json".to_string(),
            output: None,
        })
        .await;
        assert_eq!(code, 1);
    }
}
