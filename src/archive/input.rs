use super::log;
use std::collections::HashSet;
use std::error::Error;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type GameLogInput = Box<dyn Read>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    #[default]
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, Box<dyn Error>> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(
                "Invalid compression value ''. Supported values: 'plain' or 'zstd'."
                    .to_string()
                    .into(),
            );
        }

        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("plain") {
            Ok(Self::Plain)
        } else {
            Err(format!(
                "Invalid compression value '{}'. Supported values: 'plain' or 'zstd'.",
                normalized
            )
            .into())
        }
    }

    /// Picks the mode from the file extension.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zst") || ext.eq_ignore_ascii_case("zstd") => {
                Self::Zstd
            }
            _ => Self::Plain,
        }
    }
}

impl FromStr for CompressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(|e| e.to_string())
    }
}

pub fn open_input(path: &Path, compression: CompressionMode) -> io::Result<GameLogInput> {
    let file = File::open(path)?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as GameLogInput)
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to initialize zstd decoder for '{}': {}",
                        path.display(),
                        e
                    ),
                )
            }),
    }
}

/// Reads a whole game log into memory. Invalid UTF-8 is replaced rather than rejected.
pub fn read_input(path: &Path, compression: CompressionMode) -> io::Result<String> {
    let mut input = open_input(path, compression)?;
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Expands glob patterns into concrete paths; plain paths pass through untouched
/// so that a missing file can still be reported as "nothing found".
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if is_glob_pattern(pattern) {
            let mut matched = 0usize;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(path) => {
                        matched += 1;
                        if seen.insert(path.clone()) {
                            paths.push(path);
                        }
                    }
                    Err(e) => log::warn(format!("Skipping unreadable glob entry: {}", e)),
                }
            }
            if matched == 0 {
                log::warn(format!("Pattern '{}' matched no files", pattern));
            }
        } else {
            let path = PathBuf::from(pattern);
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}
