//
// lib.rs
// decomment
//
// Library entry that re-exports modules so the binary and any external users can access CLI parsing, comment filtering, scanning, and utilities.
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod cli;
pub mod comment;
pub mod filter;
pub mod scanner;
pub mod utils;

pub use cli::{build_options, Args, Options};
pub use comment::Markers;
pub use filter::{filter_text, run_decomment, Counters, FilterState, Filtered};
pub use scanner::{scan_dir, ScanResult};
