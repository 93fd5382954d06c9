//! Field extraction, one module per feed shape.
//!
//! Every lookup is optional; extractors assemble their lines from the
//! lookups that succeed and fall back to an `EmptyReport` sentinel.

pub mod realtime;
pub mod seven_day;
pub mod today;

pub use realtime::extract_realtime;
pub use seven_day::{extract_seven_day, parse_day_blocks, strip_markup, DayBlock, DayScan};
pub use today::extract_today;

