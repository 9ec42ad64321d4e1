use super::error::ErrorAccumulator;
use super::input::CompressionMode;
use super::log;
use super::merger::ArchiveMerger;
use super::parser;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    /// Stop at the first failing input. Inputs merged before it stay merged.
    #[default]
    Abort,
    /// Record the failure and move on to the next input.
    Continue,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub name_filter: Option<String>,
    /// `None` picks the mode per file from its extension.
    pub compression: Option<CompressionMode>,
    /// Delete each input once its games are merged.
    pub remove_inputs: bool,
    pub on_error: ErrorPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            name_filter: None,
            compression: None,
            remove_inputs: true,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl BatchOptions {
    fn name_filter(&self) -> &str {
        self.name_filter.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Inputs processed to completion.
    pub files: usize,
    /// Inputs skipped after a failure under [`ErrorPolicy::Continue`].
    pub failed: usize,
    /// Games parsed, counted before merging.
    pub found: usize,
    /// Games actually written, including those merged before a later failure.
    pub added: usize,
    pub errors: Option<String>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        if self.found == 0 {
            "Nothing found.".to_string()
        } else if self.added == 0 {
            "All duplicates.".to_string()
        } else {
            format!("Success! {} new games.", self.added)
        }
    }
}

fn process_file(
    merger: &ArchiveMerger,
    path: &Path,
    options: &BatchOptions,
    report: &mut BatchReport,
) -> Result<(), Box<dyn Error>> {
    let compression = options
        .compression
        .unwrap_or_else(|| CompressionMode::detect(path));
    let name_filter = options.name_filter();

    let games = parser::parse_path(path, name_filter, compression)
        .map_err(|e| format!("Failed to read input '{}': {}", path.display(), e))?;
    report.found += games.len();

    let dir = merger.prepare_output_dir(name_filter)?;
    for game in &games {
        if merger.append_to(&dir, game)? {
            report.added += 1;
        }
    }

    if options.remove_inputs {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(
                    format!("Failed to remove input '{}': {}", path.display(), e).into(),
                );
            }
        }
    }

    report.files += 1;
    log::info(format!(
        "Processed '{}': {} games found",
        path.display(),
        games.len()
    ));
    Ok(())
}

/// Parses and merges each input in order, one at a time.
pub fn process_batch(
    merger: &ArchiveMerger,
    paths: &[PathBuf],
    options: &BatchOptions,
) -> Result<BatchReport, Box<dyn Error>> {
    let mut report = BatchReport::default();
    let mut failures = ErrorAccumulator::default();

    for path in paths {
        if let Err(e) = process_file(merger, path, options, &mut report) {
            match options.on_error {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Continue => {
                    log::warn(format!("Skipping '{}': {}", path.display(), e));
                    failures.push_for(path, e.as_ref());
                }
            }
        }
    }

    if !failures.is_empty() {
        report.failed = failures.len();
        report.errors = failures.take();
    }
    Ok(report)
}
