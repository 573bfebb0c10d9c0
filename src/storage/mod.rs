//! Storage layer - flat-file persistence.
//!
//! - `json_file`: whole-document stores for sign-ups and solutions, written
//!   atomically and exposed through `RecordStore`
//! - `jsonl`: append-only line logs for the notification queue and outbound file

pub mod json_file;
pub mod jsonl;
mod traits;

pub use json_file::{
    LoadedDocument, SignupFileStore, SolutionFileStore, load_json_document, read_json_or_default, write_json_atomic,
};
pub use jsonl::{LineBatch, append_line, count_lines, read_lines_from};
pub use traits::{Record, RecordStore};
