//! Report parsing and summary output.

pub mod generator;
pub mod parser;

pub use generator::{generate_json_summary, generate_markdown_summary, IssueSummary};
pub use parser::{parse_issue_page, parse_report, IssuePage};
