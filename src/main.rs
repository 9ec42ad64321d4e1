use clap::Parser;
use kumalak_archive::archive::log;
use kumalak_archive::{
    ArchiveMerger, BatchOptions, BatchReport, CompressionMode, ErrorPolicy, MergerConfig,
    expand_inputs, process_batch,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Merge recorded game logs into per-opening archive tables.
#[derive(Parser, Debug)]
#[command(name = "kumalak-archive", version)]
struct Cli {
    /// Input files or glob patterns.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory holding `output/` or `<player>_output/`.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Only keep games involving this player (case-insensitive).
    #[arg(long)]
    player: Option<String>,

    /// Force input decompression ('plain' or 'zstd'); detected per file otherwise.
    #[arg(long)]
    compression: Option<CompressionMode>,

    /// Cell delimiter for archive tables.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Leave input files in place after merging.
    #[arg(long)]
    keep_inputs: bool,

    /// Skip failing inputs instead of aborting the batch.
    #[arg(long)]
    continue_on_error: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn render(report: &BatchReport, json: bool) -> String {
    if json {
        serde_json::json!({
            "files": report.files,
            "failed": report.failed,
            "found": report.found,
            "added": report.added,
            "errors": report.errors,
            "summary": report.summary(),
        })
        .to_string()
    } else {
        match &report.errors {
            Some(errors) => format!(
                "{} ({} inputs failed: {})",
                report.summary(),
                report.failed,
                errors
            ),
            None => report.summary(),
        }
    }
}

fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    if !cli.delimiter.is_ascii() {
        return Err(format!(
            "Invalid delimiter '{}'. The delimiter must be a single ASCII character.",
            cli.delimiter
        )
        .into());
    }

    let paths = expand_inputs(cli.inputs.as_slice())?;
    let merger =
        ArchiveMerger::new(MergerConfig::new(cli.base_dir).with_delimiter(cli.delimiter as u8));
    let options = BatchOptions {
        name_filter: cli.player,
        compression: cli.compression,
        remove_inputs: !cli.keep_inputs,
        on_error: if cli.continue_on_error {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        },
    };

    let report = process_batch(&merger, &paths, &options)?;
    Ok(render(&report, cli.json))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error(e.to_string());
            if json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                println!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
