pub mod batch;
pub mod error;
pub mod input;
pub mod log;
pub mod merger;
pub mod parser;
pub mod table;
pub mod types;

pub use batch::{BatchOptions, BatchReport, ErrorPolicy, process_batch};
pub use error::ErrorAccumulator;
pub use input::{CompressionMode, expand_inputs};
pub use merger::{ArchiveMerger, MergerConfig};
pub use parser::{parse_games, parse_path};
pub use table::Table;
pub use types::{GameRecord, MoveList};
