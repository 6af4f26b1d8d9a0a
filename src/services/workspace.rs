//! Upload intake: archive extraction, language detection, workspace layout.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use zip::ZipArchive;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{workspace_id_for, Language};

/// Outcome of a successful intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub id: String,
    /// Workspace root: `<workspaces_root>/<id>`
    pub root: PathBuf,
    /// Extracted project tree: `<root>/project`
    pub project_dir: PathBuf,
    pub language: Language,
}

/// Creates isolated per-job workspaces from uploaded archives.
///
/// Each upload gets its own directory so repair runs never mutate a shared
/// checkout. Extraction happens in a scratch directory that is removed on
/// every error path.
#[derive(Debug, Clone)]
pub struct WorkspaceService {
    root: PathBuf,
}

impl WorkspaceService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Intake an archive already loaded into memory (HTTP upload path).
    pub fn intake_bytes(
        &self,
        archive_name: &str,
        bytes: &[u8],
        requested: Option<Language>,
    ) -> DomainResult<WorkspaceInfo> {
        std::fs::create_dir_all(&self.root)?;

        let scratch = self.root.join(format!(".extract-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&scratch)?;

        let result = self.extract_and_place(archive_name, bytes, requested, &scratch);
        if result.is_err() {
            let _ = std::fs::remove_dir_all(&scratch);
        }
        result
    }

    /// Intake an archive from disk (CLI submit path).
    pub fn intake_file(
        &self,
        archive: &Path,
        requested: Option<Language>,
    ) -> DomainResult<WorkspaceInfo> {
        let bytes = std::fs::read(archive).map_err(|e| {
            DomainError::InvalidUpload(format!("cannot read {}: {e}", archive.display()))
        })?;
        let name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.zip");
        self.intake_bytes(name, &bytes, requested)
    }

    fn extract_and_place(
        &self,
        archive_name: &str,
        bytes: &[u8],
        requested: Option<Language>,
        scratch: &Path,
    ) -> DomainResult<WorkspaceInfo> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| DomainError::InvalidUpload("not a valid ZIP archive".to_string()))?;
        archive
            .extract(scratch)
            .map_err(|e| DomainError::InvalidUpload(format!("archive extraction failed: {e}")))?;

        let language = detect_language(scratch, requested)?;

        let id = workspace_id_for(&self.root, archive_name, Utc::now());
        let ws_root = self.root.join(&id);
        std::fs::create_dir_all(&ws_root)?;
        let project_dir = ws_root.join("project");
        std::fs::rename(scratch, &project_dir).map_err(|e| {
            DomainError::WorkspaceError(format!("failed to place project tree: {e}"))
        })?;

        info!(workspace = %id, language = language.as_str(), "Workspace created");

        Ok(WorkspaceInfo {
            id,
            root: ws_root,
            project_dir,
            language,
        })
    }
}

/// Decide the project language from the extracted tree.
///
/// Only one language present: that language. Both present: an explicit tag
/// is required. Neither: the upload is rejected.
pub fn detect_language(tree: &Path, requested: Option<Language>) -> DomainResult<Language> {
    let has_python = has_files_with_extension(tree, "py");
    let has_cpp = has_files_with_extension(tree, "cpp");

    match (has_python, has_cpp) {
        (false, false) => Err(DomainError::InvalidUpload(
            "no Python or C++ files found in the uploaded archive".to_string(),
        )),
        (true, false) => Ok(Language::Python),
        (false, true) => Ok(Language::Cpp),
        (true, true) => requested.ok_or_else(|| {
            DomainError::InvalidUpload(
                "archive contains both Python and C++ files; specify a language ('py' or 'cpp')"
                    .to_string(),
            )
        }),
    }
}

fn has_files_with_extension(dir: &Path, ext: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if has_files_with_extension(&path, ext) {
                return true;
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(files: &[(&str, &str)]) -> Vec<u8> {
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

    #[test]
    fn python_archive_is_detected_and_placed() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());
        let bytes = zip_with(&[("app/main.py", "print('hi')\n"), ("README.md", "docs")]);

        let info = service.intake_bytes("demo.zip", &bytes, None).unwrap();
        assert_eq!(info.language, Language::Python);
        assert!(info.id.starts_with("demo_"));
        assert!(info.project_dir.join("app/main.py").is_file());
        assert!(info.project_dir.starts_with(tmp.path()));
    }

    #[test]
    fn cpp_archive_is_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());
        let bytes = zip_with(&[("src/main.cpp", "int main() { return 0; }\n")]);

        let info = service.intake_bytes("puzzle.zip", &bytes, None).unwrap();
        assert_eq!(info.language, Language::Cpp);
    }

    #[test]
    fn mixed_archive_requires_explicit_language() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());
        let bytes = zip_with(&[("a.py", "x = 1\n"), ("b.cpp", "int x;\n")]);

        let err = service.intake_bytes("mixed.zip", &bytes, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidUpload(_)));

        let info = service
            .intake_bytes("mixed.zip", &bytes, Some(Language::Cpp))
            .unwrap();
        assert_eq!(info.language, Language::Cpp);
    }

    #[test]
    fn archive_without_sources_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());
        let bytes = zip_with(&[("notes.txt", "nothing here")]);

        let err = service.intake_bytes("empty.zip", &bytes, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidUpload(_)));
    }

    #[test]
    fn non_zip_payload_is_rejected_and_cleaned_up() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());

        let err = service
            .intake_bytes("junk.zip", b"definitely not a zip", None)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidUpload(_)));

        // No scratch directories left behind
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".extract-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn uploads_with_same_name_get_distinct_workspaces() {
        let tmp = tempfile::tempdir().unwrap();
        let service = WorkspaceService::new(tmp.path());
        let bytes = zip_with(&[("m.py", "pass\n")]);

        let first = service.intake_bytes("demo.zip", &bytes, None).unwrap();
        let second = service.intake_bytes("demo.zip", &bytes, None).unwrap();
        assert_ne!(first.id, second.id);
    }
}
