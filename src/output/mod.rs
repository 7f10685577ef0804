pub mod report;

pub use report::{header_lines, OriginReport, Verdict};
