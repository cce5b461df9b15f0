//! Walkthroughs of the stale-key problem and its fixes.

pub mod problem;
pub mod solution;

use std::fmt;

use crate::storage::Registry;

pub use solution::Solution;

const RULE_WIDTH: usize = 60;

/// Text produced by a walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    lines: Vec<String>,
    steps: usize,
}

impl Report {
    pub fn new(title: &str) -> Self {
        let mut report = Self::default();
        report.section(title);
        report
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push("=".repeat(RULE_WIDTH));
        self.lines.push(title.to_string());
        self.lines.push("=".repeat(RULE_WIDTH));
    }

    /// Numbered step heading.
    pub fn step(&mut self, text: &str) {
        self.steps += 1;
        self.lines.push(String::new());
        self.lines.push(format!("{}. {}", self.steps, text));
    }

    /// Indented detail line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("   {}", text.as_ref()));
    }

    pub fn raw(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn describe_registry(report: &mut Report, registry: &Registry) {
    report.line(format!("default schema: {:?}", registry.default_schema()));
    report.line(format!("keys: {:?}", registry.list_tables()));
}
