//! Opened-document model: parsing, the line store and row layout.

pub mod layout;
pub mod line;
pub mod parse;
pub mod store;

pub use layout::{EstimatedMeasurer, HeightMeasurer, LineLayout};
pub use line::{Line, LineStatus};
pub use parse::{parse_document, parse_lines};
pub use store::{LineStore, LineView};
