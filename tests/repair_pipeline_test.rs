//! End-to-end repair runs against a real workspace on disk: archive
//! intake, git-backed patch application, and filesystem persistence.

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use zip::write::SimpleFileOptions;

use fixpoint::adapters::git::GitPatcher;
use fixpoint::adapters::model::MockModelClient;
use fixpoint::adapters::storage::FsJobRepository;
use fixpoint::domain::models::{
    AnalysisReport, Finding, Job, JobStatus, Language, TestCase, TestReport,
};
use fixpoint::domain::ports::{Analyzer, JobPoll, JobRepository, TestRunner};
use fixpoint::domain::DomainResult;
use fixpoint::infrastructure::CommandRunner;
use fixpoint::services::{RepairLoop, WorkspaceService};

/// Reports one finding in `app.py`.
struct FixedAnalyzer;

#[async_trait]
impl Analyzer for FixedAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn analyze(&self, _project: &Path) -> DomainResult<AnalysisReport> {
        let mut report =
            AnalysisReport::new(Language::Python, "app.py:1: F821 undefined name 'x'");
        report.findings.push(Finding {
            file: "app.py".into(),
            line: 1,
        });
        Ok(report)
    }
}

/// Passes only once the patch has landed in the tree.
struct ContentRunner;

#[async_trait]
impl TestRunner for ContentRunner {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn run(&self, project: &Path) -> DomainResult<TestReport> {
        let body = std::fs::read_to_string(project.join("app.py"))?;
        let case = if body.contains("x = 0") {
            TestCase::pass("app smoke", "name defined")
        } else {
            TestCase::fail("app smoke", "NameError: name 'x' is not defined")
        };
        Ok(TestReport::new(vec![case]))
    }
}

fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        for (name, body) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf.into_inner()
}

const FIXING_REPLY: &str = "\
The name is never bound; define it first.

```diff
--- a/app.py
+++ b/app.py
@@ -1 +1,2 @@
+x = 0
 print(x)
```
";

const USELESS_REPLY: &str = "\
```diff
--- a/missing.py
+++ b/missing.py
@@ -1 +1 @@
-a
+b
```
";

fn build_repair(
    root: &Path,
    replies: Vec<String>,
) -> (Arc<RepairLoop>, Arc<FsJobRepository>) {
    let jobs = Arc::new(FsJobRepository::new(root));
    let mut repair = RepairLoop::new(
        Arc::new(MockModelClient::with_replies(replies)),
        Arc::new(GitPatcher::new(CommandRunner::new(30))),
        jobs.clone(),
    );
    repair.register_analyzer(Arc::new(FixedAnalyzer));
    repair.register_runner(Arc::new(ContentRunner));
    (Arc::new(repair), jobs)
}

#[tokio::test]
async fn archive_to_green_suite() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    let workspaces = WorkspaceService::new(root);
    let bytes = zip_archive(&[("app.py", "print(x)\n")]);
    let info = workspaces.intake_bytes("demo.zip", &bytes, None).unwrap();
    assert_eq!(info.language, Language::Python);

    let (repair, jobs) = build_repair(root, vec![FIXING_REPLY.to_string()]);
    let job = Job::new(&info.id, &info.root, info.language);
    jobs.create(&job).await.unwrap();

    let result = repair.run(job).await.unwrap();
    assert!(result.repair.success);
    assert_eq!(result.repair.patches_applied, 1);

    // The patched tree is kept on success
    let patched = std::fs::read_to_string(info.project_dir.join("app.py")).unwrap();
    assert!(patched.starts_with("x = 0"));

    // Externally visible state
    match jobs.poll(&info.id).await.unwrap() {
        JobPoll::Done(result) => {
            assert!(result.repair.success);
            assert!(result.dynamic.contains("[+] app smoke ... PASS"));
        }
        other => panic!("expected Done, got {other:?}"),
    }
    let status = std::fs::read_to_string(root.join(&info.id).join("status")).unwrap();
    assert_eq!(status, "succeeded");
}

#[tokio::test]
async fn failed_repair_restores_baseline_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    let workspaces = WorkspaceService::new(root);
    let bytes = zip_archive(&[("app.py", "print(x)\n")]);
    let info = workspaces.intake_bytes("demo.zip", &bytes, None).unwrap();

    // Only a non-applying candidate, then an empty round
    let (repair, jobs) = build_repair(root, vec![USELESS_REPLY.to_string()]);
    let job = Job::new(&info.id, &info.root, info.language).with_max_iters(2);
    jobs.create(&job).await.unwrap();

    let result = repair.run(job).await.unwrap();
    assert!(!result.repair.success);

    // Baseline content restored, no .rej leftovers
    let body = std::fs::read_to_string(info.project_dir.join("app.py")).unwrap();
    assert_eq!(body, "print(x)\n");
    assert!(!info.project_dir.join("missing.py.rej").exists());

    let job = jobs.load(&info.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}
