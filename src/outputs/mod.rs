//! Output formatting for query results.
//!
//! # Submodules
//!
//! - [`text`]: Renders records as terminal lines (ordinal dates, category
//!   templates, grouped lists)

pub mod text;
