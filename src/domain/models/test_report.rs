//! Dynamic test report model and text rendering.
//!
//! A [`TestReport`] holds structured case results; [`TestReport::render`]
//! reproduces the two text artifacts the pipeline persists: a raw audit
//! report with every case, and a cleaned report that hides environment
//! noise (Qt-skip entries) and the patch total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Pass,
    Fail,
    Skip,
}

/// One executed (or skipped) test case with its log detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub outcome: TestOutcome,
    pub detail: String,
}

impl TestCase {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Pass,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Fail,
            detail: detail.into(),
        }
    }

    pub fn skip(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Skip,
            detail: detail.into(),
        }
    }
}

/// Structured result of one test-suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub cases: Vec<TestCase>,
}

/// Which rendering variant to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// Full audit output, every case and the patch total
    Raw,
    /// UI-facing output: Qt-skip noise and the patch total are hidden
    Clean,
}

impl TestReport {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    pub fn passed(&self) -> usize {
        self.count(TestOutcome::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(TestOutcome::Fail)
    }

    pub fn skipped(&self) -> usize {
        self.count(TestOutcome::Skip)
    }

    fn count(&self, outcome: TestOutcome) -> usize {
        self.cases.iter().filter(|c| c.outcome == outcome).count()
    }

    /// A run passes when no case failed.
    pub fn all_passing(&self) -> bool {
        self.failed() == 0
    }

    /// Whether a skipped case is environment noise the clean report hides.
    fn is_hidden_in_clean(case: &TestCase) -> bool {
        if case.outcome != TestOutcome::Skip {
            return false;
        }
        let name = case.name.to_lowercase();
        let detail = case.detail.to_lowercase();
        (name.contains("c++ compile") || name.contains("c++ runtime")) && detail.contains("qt")
    }

    /// Render the report text with its summary block.
    pub fn render(
        &self,
        variant: ReportVariant,
        date: DateTime<Utc>,
        patches_applied: usize,
        patches_total: usize,
    ) -> String {
        let mut lines = Vec::new();
        lines.push("# Dynamic Analysis Report".to_string());
        lines.push(format!("Date: {}", date.format("%Y-%m-%d")));
        lines.push(String::new());
        lines.push("== TEST EXECUTION ==".to_string());

        for case in &self.cases {
            if variant == ReportVariant::Clean && Self::is_hidden_in_clean(case) {
                continue;
            }
            let line = match case.outcome {
                TestOutcome::Pass => format!("[+] {} ... PASS", case.name),
                TestOutcome::Skip => format!("[!] {} ... SKIPPED", case.name),
                TestOutcome::Fail => format!("[-] {} ... FAIL", case.name),
            };
            lines.push(line);
            for detail_line in case.detail.lines() {
                lines.push(format!(" {detail_line}"));
            }
        }

        let remaining = self.cases.len() - self.passed();
        lines.push(String::new());
        lines.push("== SUMMARY ==".to_string());
        match variant {
            ReportVariant::Raw => {
                lines.push(format!("Patches applied: {patches_applied}/{patches_total}"));
            }
            ReportVariant::Clean => {
                lines.push(format!("Patches applied: {patches_applied}"));
            }
        }
        lines.push(format!("Bugs fixed: {}", self.passed()));
        lines.push(format!("Remaining issues: {remaining}"));
        lines.push(format!("New issues: {}", self.failed()));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TestReport {
        TestReport::new(vec![
            TestCase::pass("pytest_suite", "All tests passed"),
            TestCase::fail("import_app", "Traceback: NameError"),
            TestCase::skip(
                "C++ compile",
                "Skipped: Qt headers required (missing Qt development packages in runner).",
            ),
        ])
    }

    #[test]
    fn counts_and_passing() {
        let report = sample();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.all_passing());

        let clean = TestReport::new(vec![TestCase::pass("a", "")]);
        assert!(clean.all_passing());
    }

    #[test]
    fn raw_render_keeps_qt_skip_and_total() {
        let text = sample().render(ReportVariant::Raw, Utc::now(), 2, 3);
        assert!(text.contains("[!] C++ compile ... SKIPPED"));
        assert!(text.contains("Patches applied: 2/3"));
        assert!(text.contains("== TEST EXECUTION =="));
    }

    #[test]
    fn clean_render_hides_qt_skip_and_total() {
        let text = sample().render(ReportVariant::Clean, Utc::now(), 2, 3);
        assert!(!text.contains("C++ compile"));
        assert!(text.contains("Patches applied: 2\n"));
        assert!(!text.contains("2/3"));
        // Non-Qt skips stay visible
        let other = TestReport::new(vec![TestCase::skip("python_smoke_imports", "no modules")]);
        let text = other.render(ReportVariant::Clean, Utc::now(), 0, 0);
        assert!(text.contains("python_smoke_imports ... SKIPPED"));
    }

    #[test]
    fn detail_lines_are_indented() {
        let report = TestReport::new(vec![TestCase::fail("t", "line one\nline two")]);
        let text = report.render(ReportVariant::Raw, Utc::now(), 0, 0);
        assert!(text.contains("\n line one\n line two"));
    }
}
