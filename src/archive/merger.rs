use super::log;
use super::table::Table;
use super::types::GameRecord;
use regex::Regex;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Row holding `(white, black, "")` per stored game.
pub const HEADER_ROW: usize = 0;
/// Row holding `(date, time, "")` per stored game.
pub const META_ROW: usize = 1;
/// First row of move pairs.
pub const DATA_ROW_OFFSET: usize = 2;

const DEFAULT_OUTPUT_DIR: &str = "output";
const FILTERED_OUTPUT_SUFFIX: &str = "_output";
const UNKNOWN_BUCKET: &str = "unknown";

static UNSAFE_FILE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid file name regex"));

#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// Directory under which `output/` or `<player>_output/` is created.
    pub base_dir: PathBuf,
    /// Single-byte cell delimiter.
    pub delimiter: u8,
    pub extension: String,
}

impl MergerConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            delimiter: b',',
            extension: "csv".to_string(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Replaces characters that are not allowed in file names with `_`.
pub fn sanitize_file_component(raw: &str) -> String {
    UNSAFE_FILE_CHARS_RE.replace_all(raw, "_").into_owned()
}

/// A game is already stored if some triplet carries the same date and time in
/// its meta row.
pub fn is_duplicate(table: &Table, game: &GameRecord) -> bool {
    if table.height() <= META_ROW {
        return false;
    }

    table.triplet_starts().any(|col| {
        table.cell(META_ROW, col) == game.date && table.cell(META_ROW, col + 1) == game.time
    })
}

/// Appends `game` as a new triplet on the right of `table`.
pub fn merge_record(table: &mut Table, game: &GameRecord) {
    let start = table.push_triplet_columns();

    table.set_cell(HEADER_ROW, start, game.white.as_str());
    table.set_cell(HEADER_ROW, start + 1, game.black.as_str());
    table.set_cell(META_ROW, start, game.date.as_str());
    table.set_cell(META_ROW, start + 1, game.time.as_str());
    table.ensure_rows(DATA_ROW_OFFSET + game.move_rows());

    for (idx, half_move) in game.moves_a.iter().enumerate() {
        table.set_cell(DATA_ROW_OFFSET + idx, start, half_move.as_str());
    }
    for (idx, half_move) in game.moves_b.iter().enumerate() {
        table.set_cell(DATA_ROW_OFFSET + idx, start + 1, half_move.as_str());
    }
}

/// Merges games into per-opening bucket tables on disk.
///
/// Games are grouped by the first half-move of player A, not by player. Each
/// game is handled as its own load, check, mutate and overwrite cycle; nothing
/// is cached between games or calls.
#[derive(Debug, Clone)]
pub struct ArchiveMerger {
    config: MergerConfig,
}

impl ArchiveMerger {
    pub fn new(config: MergerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// `output` for an empty filter, `<name_filter>_output` otherwise. The
    /// filter is used exactly as given.
    pub fn output_dir(&self, name_filter: &str) -> PathBuf {
        if name_filter.is_empty() {
            self.config.base_dir.join(DEFAULT_OUTPUT_DIR)
        } else {
            self.config
                .base_dir
                .join(format!("{}{}", name_filter, FILTERED_OUTPUT_SUFFIX))
        }
    }

    pub fn bucket_file_name(&self, game: &GameRecord) -> String {
        let key = game.opening_move().unwrap_or(UNKNOWN_BUCKET);
        format!("{}.{}", sanitize_file_component(key), self.config.extension)
    }

    /// Creates the output directory for `name_filter` and returns it.
    pub fn prepare_output_dir(&self, name_filter: &str) -> Result<PathBuf, Box<dyn Error>> {
        let dir = self.output_dir(name_filter);
        fs::create_dir_all(&dir).map_err(|e| {
            format!(
                "Failed to create output directory '{}': {}",
                dir.display(),
                e
            )
        })?;
        Ok(dir)
    }

    /// Returns how many of `games` were new. Duplicates are skipped silently.
    ///
    /// On error, games merged before the failing one stay on disk; callers that
    /// need that partial count should drive [`Self::append_to`] themselves.
    pub fn append(&self, games: &[GameRecord], name_filter: &str) -> Result<usize, Box<dyn Error>> {
        let dir = self.prepare_output_dir(name_filter)?;

        let mut added = 0usize;
        for game in games {
            if self.append_to(&dir, game)? {
                added += 1;
            }
        }

        log::info(format!(
            "Merged {} of {} games into '{}'",
            added,
            games.len(),
            dir.display()
        ));
        Ok(added)
    }

    /// Merges one game into its bucket under `dir`. `Ok(false)` means it was
    /// already stored and the file was left untouched.
    pub fn append_to(&self, dir: &Path, game: &GameRecord) -> Result<bool, Box<dyn Error>> {
        let path = dir.join(self.bucket_file_name(game));
        let mut table = self.load_table(&path)?;
        if is_duplicate(&table, game) {
            log::info(format!(
                "Skipping duplicate {} vs {} ({} {}) in '{}'",
                game.white,
                game.black,
                game.date,
                game.time,
                path.display()
            ));
            return Ok(false);
        }

        merge_record(&mut table, game);
        self.write_table(&path, &table)?;
        Ok(true)
    }

    pub fn load_table(&self, path: &Path) -> Result<Table, Box<dyn Error>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Table::new()),
            Err(e) => {
                return Err(format!("Failed to read table '{}': {}", path.display(), e).into());
            }
        };

        Table::parse(&bytes, self.config.delimiter)
            .map_err(|e| format!("Failed to parse table '{}': {}", path.display(), e).into())
    }

    fn write_table(&self, path: &Path, table: &Table) -> Result<(), Box<dyn Error>> {
        let bytes = table
            .serialize(self.config.delimiter)
            .map_err(|e| format!("Failed to encode table '{}': {}", path.display(), e))?;
        fs::write(path, bytes)
            .map_err(|e| format!("Failed to write table '{}': {}", path.display(), e).into())
    }
}
