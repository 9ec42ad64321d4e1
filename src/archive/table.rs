use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::iter::StepBy;
use std::ops::Range;

/// Columns per stored game: player A, player B and an empty spacer.
pub const TRIPLET_WIDTH: usize = 3;

/// Dense, growable grid of string cells backing one bucket file.
///
/// Every row always holds exactly `width` cells and `width` is kept a
/// multiple of [`TRIPLET_WIDTH`]. Out-of-range writes grow the grid instead
/// of panicking; out-of-range reads return `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
    width: usize,
}

fn round_up_to_triplet(n: usize) -> usize {
    n.div_ceil(TRIPLET_WIDTH) * TRIPLET_WIDTH
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads delimited rows. Quotes carry no meaning and rows may be ragged;
    /// short rows are padded out to a whole number of triplets.
    pub fn parse(data: impl AsRef<[u8]>, delimiter: u8) -> csv::Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .delimiter(delimiter)
            .from_reader(data.as_ref());

        let mut table = Self::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            table.width = table.width.max(row.len());
            table.rows.push(row);
        }

        if !table.rows.is_empty() {
            let width = round_up_to_triplet(table.width);
            table.width = 0;
            table.ensure_columns(width);
        }
        Ok(table)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn triplet_count(&self) -> usize {
        self.width / TRIPLET_WIDTH
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Widens every row to at least `columns` cells (rounded up to a whole triplet).
    pub fn ensure_columns(&mut self, columns: usize) {
        let columns = round_up_to_triplet(columns);
        if columns > self.width {
            self.width = columns;
        }
        for row in &mut self.rows {
            if row.len() < self.width {
                row.resize(self.width, String::new());
            }
        }
    }

    /// Appends empty rows until the table is at least `rows` high.
    pub fn ensure_rows(&mut self, rows: usize) {
        while self.rows.len() < rows {
            self.rows.push(vec![String::new(); self.width]);
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.ensure_rows(row + 1);
        self.ensure_columns(col + 1);
        self.rows[row][col] = value.into();
    }

    /// Adds one empty triplet on the right and returns its first column.
    pub fn push_triplet_columns(&mut self) -> usize {
        let start = self.width;
        self.ensure_columns(start + TRIPLET_WIDTH);
        start
    }

    /// Column indices of every stored triplet's first column.
    pub fn triplet_starts(&self) -> StepBy<Range<usize>> {
        (0..self.width).step_by(TRIPLET_WIDTH)
    }

    /// One line per row, cells joined by `delimiter` and never quoted, each
    /// line terminated by `\n`.
    pub fn serialize(&self, delimiter: u8) -> csv::Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}
