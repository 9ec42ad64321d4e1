//! Parses recorded two-player game logs and merges the games into per-opening
//! delimited archive tables.

pub mod archive;

pub use archive::{
    ArchiveMerger, BatchOptions, BatchReport, CompressionMode, ErrorPolicy, GameRecord,
    MergerConfig, MoveList, Table, expand_inputs, parse_games, parse_path, process_batch,
};
