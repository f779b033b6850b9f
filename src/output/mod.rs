//! Report formatters for scan results.
//!
//! - [`text`]: the human-readable report
//! - [`json`]: machine-readable output for scripting
//!
//! # Example
//!
//! ```no_run
//! use treedupe::duplicates::DuplicateFinder;
//! use treedupe::output::TextReport;
//! use std::path::Path;
//!
//! let (groups, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! TextReport::new(&groups, &summary)
//!     .write_to(&mut std::io::stdout().lock())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonReport};
pub use text::TextReport;
