// File: src/report.rs
use crate::coverage::{AlignmentTotals, AssignmentTotals};
use crossterm::style::Stylize;
use serde::Serialize;

/// `part / whole` as a percentage, or `None` when there is nothing to divide by.
pub fn percent(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

fn share(part: u64, whole: u64) -> String {
    format!("{} / {:.2}%", part, percent(part, whole).unwrap_or(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Totals {
    Alignment(AlignmentTotals),
    Assignment(AssignmentTotals),
}

/// One coverage run, ready to print or serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub totals: Totals,
}

impl CoverageReport {
    pub fn alignment(policy: &str, totals: AlignmentTotals) -> Self {
        Self { policy: policy.to_string(), mode: None, totals: Totals::Alignment(totals) }
    }

    pub fn assignment(policy: &str, mode: &str, totals: AssignmentTotals) -> Self {
        Self {
            policy: policy.to_string(),
            mode: Some(mode.to_string()),
            totals: Totals::Assignment(totals),
        }
    }

    pub fn heading(&self) -> String {
        match &self.mode {
            None => format!("ALIGNMENT TEST: {}", self.policy),
            Some(mode) => format!("ASSIGNMENT TEST: {} assignment with {} alignment", mode, self.policy),
        }
    }

    /// Body lines without styling.
    pub fn lines(&self) -> Vec<String> {
        match &self.totals {
            Totals::Alignment(t) => vec![
                format!(
                    "Characters covered: {}   Characters missed: {}",
                    share(t.chars_matched, t.total_chars()),
                    share(t.chars_missed, t.total_chars())
                ),
                format!(
                    "Lines covered: {}   Lines missed: {}",
                    share(t.lines_matched, t.total_lines()),
                    share(t.lines_missed, t.total_lines())
                ),
            ],
            Totals::Assignment(t) => {
                let ungendered = t.total_chars() - t.chars_gendered;
                vec![
                    format!(
                        "File assignment successes: {}   File assignment failures: {}",
                        share(t.files_succeeded, t.total_files()),
                        share(t.files_failed, t.total_files())
                    ),
                    format!(
                        "Characters matched: {}   Characters missed: {}",
                        share(t.chars_matched, t.total_chars()),
                        share(t.chars_missed, t.total_chars())
                    ),
                    format!(
                        "Lines matched: {}   Lines missed: {}",
                        share(t.lines_matched, t.total_lines()),
                        share(t.lines_missed, t.total_lines())
                    ),
                    format!(
                        "Characters gendered: {}   Characters not gendered: {}",
                        share(t.chars_gendered, t.total_chars()),
                        share(ungendered, t.total_chars())
                    ),
                ]
            }
        }
    }

    /// Terminal rendering with a bold heading and a separator rule.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.heading().bold());
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&"-".repeat(28).dim().to_string());
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_guards_empty_denominator() {
        assert_eq!(percent(3, 0), None);
        assert_eq!(percent(1, 4), Some(25.0));
    }

    #[test]
    fn alignment_lines_show_counts_and_shares() {
        let report = CoverageReport::alignment(
            "substring",
            AlignmentTotals { chars_matched: 1, chars_missed: 3, lines_matched: 12, lines_missed: 0 },
        );
        let lines = report.lines();
        assert_eq!(lines[0], "Characters covered: 1 / 25.00%   Characters missed: 3 / 75.00%");
        assert_eq!(lines[1], "Lines covered: 12 / 100.00%   Lines missed: 0 / 0.00%");
        assert_eq!(report.heading(), "ALIGNMENT TEST: substring");
    }

    #[test]
    fn empty_corpus_report_has_no_nan() {
        let report = CoverageReport::assignment("blended", "hard", AssignmentTotals::default());
        assert!(report.lines().iter().all(|line| !line.contains("NaN")));
        assert!(report.render().contains("File assignment successes: 0 / 0.00%"));
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let report = CoverageReport::assignment("threshold", "soft", AssignmentTotals {
            files_succeeded: 1,
            ..AssignmentTotals::default()
        });
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["totals"]["kind"], "assignment");
        assert_eq!(value["totals"]["files_succeeded"], 1);
        assert_eq!(value["mode"], "soft");
    }
}
