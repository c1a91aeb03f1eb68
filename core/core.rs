pub mod chunking;
pub mod config;
pub mod error;
pub mod gather;
pub mod pattern;
pub mod pipeline;
pub mod reader;
pub mod rules;

pub use chunking::split_into_segments;
pub use config::{
    Config, CondenseOptions, DEFAULT_MAX_LINES_PER_CHUNK, IGNORE_FILE_NAME, RuleSet,
};
pub use error::{AppError, Result};
pub use gather::{CollectedTree, Entry, collect_tree, render_structure_summary};
pub use pattern::IgnorePattern;
pub use pipeline::{CondenseReport, run_condense};
pub use reader::{FILE_MARKER, FileRecord, read_record};
pub use rules::{ExclusionEngine, load_ignore_file};
