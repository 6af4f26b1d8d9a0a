//! CLI output helpers: tables and error rendering.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::domain::models::Job;
use crate::services::CaseResult;

pub fn format_jobs_table(jobs: &[Job]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Workspace", "Language", "Status", "Budget", "Created"]);

    for job in jobs {
        table.add_row(vec![
            Cell::new(&job.workspace_id),
            Cell::new(job.language.as_str()),
            Cell::new(job.status.as_str()),
            Cell::new(job.max_iters),
            Cell::new(job.created_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

pub fn format_eval_table(results: &[CaseResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Case", "Language", "Detected", "Tests", "Repaired", "Seconds",
        ]);

    for result in results {
        table.add_row(vec![
            Cell::new(&result.id),
            Cell::new(result.language.as_str()),
            Cell::new(yes_no(result.detected)),
            Cell::new(yes_no(result.tests_passed)),
            Cell::new(yes_no(result.repair_success)),
            Cell::new(format!("{:.1}", result.duration_secs)),
        ]);
    }
    table
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print an error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let payload = serde_json::json!({"error": format!("{err:#}")});
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Language;

    #[test]
    fn jobs_table_renders_rows() {
        let jobs = vec![Job::new("ws_x", "/tmp/ws_x", Language::Python)];
        let rendered = format_jobs_table(&jobs).to_string();
        assert!(rendered.contains("ws_x"));
        assert!(rendered.contains("queued"));
    }

    #[test]
    fn eval_table_renders_flags() {
        let results = vec![CaseResult {
            id: "case-1".into(),
            language: Language::Cpp,
            detected: true,
            tests_passed: false,
            repair_success: true,
            duration_secs: 2.5,
            error: None,
        }];
        let rendered = format_eval_table(&results).to_string();
        assert!(rendered.contains("case-1"));
        assert!(rendered.contains("yes"));
        assert!(rendered.contains("2.5"));
    }
}
