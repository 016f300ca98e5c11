use crate::cancel::CancelFlag;
use crate::feedback::{Feedback, ProgressSink};
use crate::license::{current_year, resolve_license};
use crate::spec::ProjectSpec;
use crate::store::{ContentStore, Identity, RepoHandle};
use crate::sync::{SyncOptions, SyncReport, synchronize};
use crate::walk::{DirectoryWalker, WalkError};

/// Run-level failures. Everything here aborts the run; per-file problems
/// never reach this type, they live in the sync report instead.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("repository creation failed: {0}")]
    RepoCreation(String),

    #[error("failed to write README.md: {0}")]
    ReadmeWrite(String),

    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// What one provisioning run produced. A partially-provisioned repository
/// is a valid, inspectable end state; nothing is rolled back.
#[derive(Debug)]
pub struct ProvisionReport {
    pub repository: RepoHandle,
    pub license_written: bool,
    pub readme_written: bool,
    pub patents_written: bool,
    pub sync: SyncReport,
}

/// Provision a new remote repository from `spec` and upload its tree.
///
/// Linear flow, no branching back: create the repository, write LICENSE
/// (best-effort), write README.md (fatal on failure), write PATENTS when a
/// notice is present (best-effort), then synchronize the local tree. The
/// caller establishes `identity` beforehand via [`ContentStore::identity`];
/// authentication failure means this is never called.
pub async fn provision(
    store: &dyn ContentStore,
    identity: &Identity,
    spec: &ProjectSpec,
    options: &SyncOptions,
    sink: &dyn ProgressSink,
    cancel: &CancelFlag,
) -> Result<ProvisionReport, ProvisionError> {
    // Local precondition first, so a bad project directory never leaves a
    // half-provisioned repository behind.
    let _ = DirectoryWalker::new(&spec.local_root)?;

    sink.emit(Feedback::info(format!(
        "Creating repository '{}'...",
        spec.repository_name
    )));
    let repository = store
        .create_repository(
            &identity.login,
            &spec.repository_name,
            &spec.description,
            spec.private,
        )
        .await
        .map_err(|e| ProvisionError::RepoCreation(e.to_string()))?;
    sink.emit(Feedback::info(format!(
        "Repository '{}' created successfully.",
        repository.full_name()
    )));

    let year = current_year();

    // LICENSE is best-effort: the user can add one later, so a missing
    // template or failed write downgrades to a warning.
    let license_written =
        match resolve_license(store, spec.license, &spec.author_name, year).await {
            Ok(template) => {
                match store
                    .create_file(&repository, "LICENSE", template.text.as_bytes(), "Add license")
                    .await
                {
                    Ok(()) => {
                        sink.emit(Feedback::info("License added."));
                        true
                    }
                    Err(e) => {
                        sink.emit(Feedback::warning(format!("skipping LICENSE: {e}")));
                        false
                    }
                }
            }
            Err(e) => {
                sink.emit(Feedback::warning(format!(
                    "failed to resolve license template: {e}"
                )));
                false
            }
        };

    // A repository nobody can see described is a broken output, so README
    // failure is fatal (and retryable by rerunning).
    let readme = readme_content(&spec.repository_name, &spec.description, year, &spec.author_name);
    store
        .create_file(&repository, "README.md", readme.as_bytes(), "Add README")
        .await
        .map_err(|e| ProvisionError::ReadmeWrite(e.to_string()))?;
    sink.emit(Feedback::info("README added."));

    let patents_written = match &spec.patent_notice {
        Some(notice) => {
            match store
                .create_file(
                    &repository,
                    "PATENTS",
                    notice.as_bytes(),
                    "Add PATENTS notice",
                )
                .await
            {
                Ok(()) => {
                    sink.emit(Feedback::info("PATENTS notice added."));
                    true
                }
                Err(e) => {
                    sink.emit(Feedback::warning(format!("skipping PATENTS: {e}")));
                    false
                }
            }
        }
        None => false,
    };

    sink.emit(Feedback::info("Uploading project files..."));
    let sync = synchronize(store, &repository, &spec.local_root, options, sink, cancel).await?;

    Ok(ProvisionReport {
        repository,
        license_written,
        readme_written: true,
        patents_written,
        sync,
    })
}

/// README body: repository name as heading, description, copyright line.
pub fn readme_content(name: &str, description: &str, year: i32, author: &str) -> String {
    format!("# {name}\n\n{description}\n\n© {year} {author}")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::license::LicenseKey;
    use crate::store::StoreError;
    use crate::sync::SyncStatus;
    use crate::test_support::{CollectSink, MemoryStore};

    use super::*;

    const MIT_TEMPLATE: &str = "MIT License\n\nCopyright (c) [year] [fullname]\n";

    fn setup_tree(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("repo-seed-provision-{label}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("b")).unwrap();
        std::fs::write(dir.join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.join("b").join("c.txt"), "gamma").unwrap();
        dir
    }

    fn store_with_license() -> MemoryStore {
        let store = MemoryStore::new("ada");
        store.add_license("mit", MIT_TEMPLATE);
        store
    }

    fn demo_spec(root: &PathBuf) -> ProjectSpec {
        ProjectSpec::new("demo", "d", LicenseKey::Mit, "A", root).unwrap()
    }

    async fn run(
        store: &MemoryStore,
        spec: &ProjectSpec,
        sink: &CollectSink,
    ) -> Result<ProvisionReport, ProvisionError> {
        let identity = store.identity().await.unwrap();
        provision(
            store,
            &identity,
            spec,
            &SyncOptions::default(),
            sink,
            &CancelFlag::new(),
        )
        .await
    }

    #[tokio::test]
    async fn end_to_end_demo_scenario() {
        let root = setup_tree("demo");
        let store = store_with_license();
        let sink = CollectSink::default();
        let spec = demo_spec(&root).with_patent_notice("");

        let report = run(&store, &spec, &sink).await.unwrap();

        assert_eq!(report.repository.full_name(), "ada/demo");
        assert!(report.license_written);
        assert!(report.readme_written);
        assert!(!report.patents_written);

        // Ancillary files landed with the expected content.
        let license = store.file_content("ada/demo", "LICENSE").unwrap();
        let license = String::from_utf8(license).unwrap();
        assert!(license.contains(&format!("Copyright (c) {} A", current_year())));
        assert!(!store.has_file("ada/demo", "PATENTS"));

        let readme = String::from_utf8(store.file_content("ada/demo", "README.md").unwrap()).unwrap();
        assert_eq!(
            readme,
            format!("# demo\n\nd\n\n© {} A", current_year())
        );

        // Both project files were created.
        assert_eq!(report.sync.outcomes.len(), 2);
        assert!(report
            .sync
            .outcomes
            .iter()
            .all(|o| o.status == SyncStatus::Created));
        let mut paths: Vec<&str> = report.sync.outcomes.iter().map(|o| o.path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["a.txt", "b/c.txt"]);

        // Progress events arrive in provisioning order.
        let infos: Vec<String> = sink
            .events()
            .iter()
            .filter(|e| e.is_info())
            .map(|e| e.message().to_owned())
            .collect();
        let creating = infos.iter().position(|m| m.starts_with("Creating")).unwrap();
        let license = infos.iter().position(|m| m == "License added.").unwrap();
        let readme = infos.iter().position(|m| m == "README added.").unwrap();
        let uploading = infos.iter().position(|m| m == "Uploading project files...").unwrap();
        assert!(creating < license && license < readme && readme < uploading);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn duplicate_repository_name_is_fatal() {
        let root = setup_tree("duplicate");
        let store = store_with_license();
        let sink = CollectSink::default();
        let spec = demo_spec(&root);

        run(&store, &spec, &sink).await.unwrap();
        let second = run(&store, &spec, &sink).await;

        assert!(matches!(second, Err(ProvisionError::RepoCreation(_))));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn missing_license_template_skips_license_and_continues() {
        let root = setup_tree("no-license");
        let store = MemoryStore::new("ada");
        let sink = CollectSink::default();
        let spec = demo_spec(&root);

        let report = run(&store, &spec, &sink).await.unwrap();

        assert!(!report.license_written);
        assert!(!store.has_file("ada/demo", "LICENSE"));
        // The rest of the run still happened.
        assert!(store.has_file("ada/demo", "README.md"));
        assert_eq!(report.sync.created(), 2);
        assert!(sink.events().iter().any(|e| e.is_warning()));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn readme_write_failure_is_fatal() {
        let root = setup_tree("readme-fail");
        let store = store_with_license();
        store.fail_writes_on("README.md");
        let sink = CollectSink::default();
        let spec = demo_spec(&root);

        let result = run(&store, &spec, &sink).await;
        assert!(matches!(result, Err(ProvisionError::ReadmeWrite(_))));

        // Earlier steps are not rolled back.
        assert!(store.repo_exists("ada/demo"));
        assert!(store.has_file("ada/demo", "LICENSE"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn patent_notice_written_verbatim() {
        let root = setup_tree("patents");
        let store = store_with_license();
        let sink = CollectSink::default();
        let spec = demo_spec(&root).with_patent_notice("Grant of patent rights.\n");

        let report = run(&store, &spec, &sink).await.unwrap();

        assert!(report.patents_written);
        assert_eq!(
            store.file_content("ada/demo", "PATENTS").as_deref(),
            Some(b"Grant of patent rights.\n".as_slice())
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn whitespace_patent_notice_never_writes_patents() {
        let root = setup_tree("patents-blank");
        let store = store_with_license();
        let sink = CollectSink::default();
        let spec = demo_spec(&root).with_patent_notice("   \n ");

        let report = run(&store, &spec, &sink).await.unwrap();

        assert!(!report.patents_written);
        assert!(!store.has_file("ada/demo", "PATENTS"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn bad_local_root_aborts_before_repo_creation() {
        let store = store_with_license();
        let sink = CollectSink::default();

        // Bypass ProjectSpec validation to exercise the engine's own check.
        let root = setup_tree("vanishing");
        let mut spec = demo_spec(&root);
        let _ = std::fs::remove_dir_all(&root);
        spec.local_root = PathBuf::from("/definitely/not/a/real/dir");

        let result = run(&store, &spec, &sink).await;
        assert!(matches!(result, Err(ProvisionError::Walk(_))));
        assert!(!store.repo_exists("ada/demo"));
    }

    #[tokio::test]
    async fn license_write_failure_downgrades_to_warning() {
        let root = setup_tree("license-fail");
        let store = store_with_license();
        store.fail_writes_on("LICENSE");
        let sink = CollectSink::default();
        let spec = demo_spec(&root);

        let report = run(&store, &spec, &sink).await.unwrap();

        assert!(!report.license_written);
        assert!(report.readme_written);
        assert_eq!(report.sync.created(), 2);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn store_errors_carry_remote_message_text() {
        let store = MemoryStore::new("ada");
        let err = store
            .update_file(
                &RepoHandle::new("ada", "ghost"),
                "a.txt",
                b"x",
                "Update a.txt",
                &crate::store::VersionToken::new("v0"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Api(_)));
        assert!(!err.to_string().is_empty());
    }
}
