//! # Command-Line Interface
//!
//! The `dimspace` binary inspects a dimension configuration file.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `dimensions` | Dimensions by priority with their value trees |
//! | `combinations` | Allowed combinations and their weights |
//! | `fallback <point>` | Ordered generalizations, primary first |
//! | `specializations <point>` | Specializations grouped by distance |
//! | `check <point>` | Validate a point against the allowed subspace |
//! | `graph [--dot]` | Graph summary or Graphviz rendering |
//!
//! Points are written as `language=de,region=CA`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! `--verbose` (or `-v`) prints progress lines and enables debug logging;
//! `RUST_LOG` overrides the log filter.

mod app;
mod output;
mod inspect;
mod resolve;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
