//! A CLI tool for turning presentations into slide previews

use anyhow::{bail, Context};
use clap::Parser;
use ppt_preview_core::Converter;
use tracing::{error, info};

mod args;

use args::Args;

/// Convert every requested presentation
async fn run(args: &Args) -> anyhow::Result<()> {
    // build our config and figure out what we are converting
    let config = args.converter_config()?;
    let mut requests = args.requests()?;
    let converter = Converter::new(config).context("failed to set up the converter")?;
    // a single presentation reports its own error directly
    if requests.len() == 1 {
        let request = requests.remove(0);
        let input = request.input_path.clone();
        let result = converter
            .convert(request)
            .await
            .with_context(|| format!("failed to convert {}", input.display()))?;
        info!(
            slides = result.page_count,
            elapsed_ms = result.duration.as_millis() as u64,
            "Wrote {} slides to {}",
            result.page_count,
            args.output.display()
        );
        return Ok(());
    }
    // convert each presentation in turn and report on the whole batch
    let batch = converter.convert_batch(requests).await;
    info!(
        converted = batch.successful.len(),
        failed = batch.failed.len(),
        slides = batch.total_pages,
        elapsed_ms = batch.total_duration.as_millis() as u64,
        "Finished converting presentations into {}",
        args.output.display()
    );
    for failed in &batch.failed {
        error!(input = %failed.input_path.display(), "{}", failed.error);
    }
    if !batch.failed.is_empty() {
        bail!(
            "{} of {} presentations failed to convert",
            batch.failed.len(),
            batch.failed.len() + batch.successful.len()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // get the command line args that were passed in
    let args = Args::parse();
    ppt_preview_core::init_logging();
    // error if the conversion failed
    if let Err(error) = run(&args).await {
        // print our error to stderr
        eprintln!("Error: {error:#}");
        // exit this program with an exit code of 1
        std::process::exit(1);
    }
}
