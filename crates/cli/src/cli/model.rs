use clap::Args;
use std::path::PathBuf;

use crate::cli::run_cli_async;
use crate::source::load_document;
use crate::writer::FsWriter;

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(value_name = "URL", help = "Document URL or local .json/.yaml path")]
    pub url: String,
    #[arg(short = 'o', long = "output", help = "Model module file to write")]
    pub output: PathBuf,
}

pub async fn run(args: ModelArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: ModelArgs) -> Result<(), String> {
    let doc = load_document(&args.url).await?;
    socg_core::generate_model(&doc, &args.output, &FsWriter)
        .map_err(|err| format!("Failed to compile model module: {err}"))?;
    println!(
        "{} Wrote model module {}",
        console::style("✓").green(),
        console::style(args.output.display()).bold()
    );
    Ok(())
}
