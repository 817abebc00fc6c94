//! Installation orchestration: install, update, and uninstall.
//!
//! The orchestrator coordinates source adapters, the hash service, the diff
//! engine, and the manifest to move skills from their remote sources into
//! every configured install target. Two fan-out levels compose: skills
//! within a batch run concurrently (bounded by `max_parallel`), and each
//! skill's copy step fans out across install targets. Both levels use
//! "first error cancels remaining dispatch, already-started work is not
//! rolled back" semantics.
//!
//! Workers never mutate the shared manifest. Each returns a [`SkillPatch`]
//! through its own result slot, and all patches are merged by the single
//! orchestrating task after the join barrier, followed by one manifest
//! save. Results are collected into slots indexed by input order, so output
//! ordering is deterministic even though execution interleaving is not.

use crate::core::SkmError;
use crate::diff::{FileDiff, compute_file_diffs};
use crate::hash::calculate_hash;
use crate::manifest::{Manifest, Skill};
use crate::source::{AdapterRegistry, DownloadResult, Source, SourceKind};
use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Outcome of updating (or previewing an update of) one skill.
#[derive(Debug)]
pub struct UpdateResult {
    /// The skill that was updated
    pub skill_name: String,
    /// Version recorded in the manifest before the update
    pub old_version: String,
    /// Version that was fetched
    pub new_version: String,
    /// File-level preview against the first install target's current copy.
    /// Empty when no install target is configured.
    pub file_diffs: Vec<FileDiff>,
}

/// How a downloaded skill's integrity is tracked.
///
/// Kept as a closed enum so "we verified it" and "an external lock
/// mechanism owns it" can never be conflated.
enum ResolvedIntegrity {
    /// Version and hash are stored in the manifest by this tool
    SelfVerified { version: String, hash: String },
    /// An external lock mechanism pins version and integrity; the manifest
    /// stores nothing
    ExternallyVerified,
}

/// A worker's pending manifest mutation, merged after the join barrier.
struct SkillPatch {
    name: String,
    integrity: ResolvedIntegrity,
}

/// A downloaded skill staged on disk, ready to copy.
struct ResolvedSkill {
    /// Owns the staging directory; dropped after the copy completes
    #[allow(dead_code)]
    download: DownloadResult,
    /// Skill root within the download (after `sub-dir` re-rooting)
    work_path: PathBuf,
    patch: SkillPatch,
}

/// Coordinates adapters, hashing, diffing, and the manifest.
pub struct Installer {
    manifest_path: PathBuf,
    registry: Arc<AdapterRegistry>,
    max_parallel: usize,
    progress: Option<ProgressBar>,
}

impl Installer {
    /// Creates an installer with the built-in adapters.
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self::with_registry(manifest_path, AdapterRegistry::with_default_adapters())
    }

    /// Creates an installer with a custom adapter registry.
    pub fn with_registry(manifest_path: impl Into<PathBuf>, registry: AdapterRegistry) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            registry: Arc::new(registry),
            max_parallel: default_parallelism(),
            progress: None,
        }
    }

    /// Bounds the number of concurrently processed skills.
    pub fn max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }

    /// Attaches a progress bar ticked once per completed skill.
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Installs one skill by name, or every manifest skill when `name` is
    /// `None`.
    ///
    /// Batch installs run skills concurrently and persist the manifest once
    /// after *all* of them succeed; the first failure cancels pending work
    /// and leaves the manifest unsaved (files already copied to targets
    /// remain on disk). A single named install persists immediately after
    /// download so a crash before the copy still leaves a consistent,
    /// resumable manifest entry.
    pub async fn install(&self, name: Option<&str>) -> Result<()> {
        let mut manifest = Manifest::load(&self.manifest_path)?;
        let targets = expanded_targets(&manifest)?;

        match name {
            Some(requested) => {
                let skill = manifest.find_skill(requested).cloned().ok_or_else(|| {
                    SkmError::SkillNotFound {
                        names: vec![requested.to_string()],
                    }
                })?;
                self.install_single_skill(&mut manifest, &skill, &targets, true).await
            }
            None => {
                let skills = manifest.skills.clone();
                let patches = self.install_batch(&skills, &targets).await?;
                for patch in &patches {
                    apply_patch(&mut manifest, patch);
                }
                manifest.save(&self.manifest_path)
            }
        }
    }

    /// Installs a single skill end to end.
    ///
    /// Sequencing is strict: download → (hash) → (persist) → copy-to-targets
    /// → re-verify. With `persist_now` the manifest is saved between hashing
    /// and copying.
    pub async fn install_single_skill(
        &self,
        manifest: &mut Manifest,
        skill: &Skill,
        targets: &[PathBuf],
        persist_now: bool,
    ) -> Result<()> {
        if targets.is_empty() {
            return Err(SkmError::NoInstallTargets.into());
        }

        let resolved = self.resolve_skill(skill).await?;
        apply_patch(manifest, &resolved.patch);
        if persist_now {
            manifest.save(&self.manifest_path)?;
        }

        self.copy_skill_to_targets(&skill.name, &resolved.work_path, targets).await?;
        if let ResolvedIntegrity::SelfVerified { hash, .. } = &resolved.patch.integrity {
            self.verify_installed(&skill.name, hash, targets).await;
        }
        Ok(())
    }

    /// Updates the named skills, or all skills when `names` is empty.
    ///
    /// Explicitly named skills are resolved up front; if any are missing the
    /// whole call fails with an aggregate not-found error listing every
    /// missing name. In dry-run mode nothing is mutated: results carry the
    /// resolved versions and file diffs only. In apply mode, skills whose
    /// current version is empty (external-lock skills) are previewed but
    /// left to their lock mechanism; all others get the new version, a
    /// recomputed hash, and a copy to every install target, with one
    /// manifest save after all skills finish.
    pub async fn update(&self, names: &[String], dry_run: bool) -> Result<Vec<UpdateResult>> {
        let mut manifest = Manifest::load(&self.manifest_path)?;

        let selected: Vec<Skill> = if names.is_empty() {
            manifest.skills.clone()
        } else {
            let mut missing = Vec::new();
            let mut selected = Vec::new();
            for name in names {
                match manifest.find_skill(name) {
                    Some(skill) => selected.push(skill.clone()),
                    None => missing.push(name.clone()),
                }
            }
            if !missing.is_empty() {
                return Err(SkmError::SkillNotFound {
                    names: missing,
                }
                .into());
            }
            selected
        };

        let targets = expanded_targets(&manifest)?;
        let first_target = targets.first().cloned();
        let total = selected.len();

        let targets_ref = &targets;
        let first_ref = &first_target;
        let mut in_flight = stream::iter(selected.into_iter().enumerate().map(|(idx, skill)| {
            async move {
                self.update_worker(skill, first_ref.as_deref(), targets_ref, dry_run)
                    .await
                    .map(|outcome| (idx, outcome))
            }
        }))
        .buffer_unordered(self.max_parallel);

        // Result slots are indexed by input order; the first worker error
        // drops the stream, cancelling work not yet dispatched.
        let mut slots: Vec<Option<(UpdateResult, Option<SkillPatch>)>> =
            std::iter::repeat_with(|| None).take(total).collect();
        while let Some(item) = in_flight.next().await {
            let (idx, outcome) = item?;
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
            slots[idx] = Some(outcome);
        }
        drop(in_flight);

        let mut results = Vec::with_capacity(total);
        let mut patches = Vec::new();
        for slot in slots {
            let (result, patch) = slot.expect("worker completed without filling its slot");
            results.push(result);
            patches.extend(patch);
        }

        if !dry_run {
            for patch in &patches {
                apply_patch(&mut manifest, patch);
            }
            manifest.save(&self.manifest_path)?;
        }

        Ok(results)
    }

    /// Removes a skill from every install target and from the manifest.
    ///
    /// The first filesystem error is surfaced immediately; remaining targets
    /// are not attempted. The manifest record is removed and persisted only
    /// after every target is clean.
    pub async fn uninstall(&self, name: &str) -> Result<()> {
        let mut manifest = Manifest::load(&self.manifest_path)?;
        if manifest.find_skill(name).is_none() {
            return Err(SkmError::SkillNotFound {
                names: vec![name.to_string()],
            }
            .into());
        }

        for target in expanded_targets(&manifest)? {
            let dir = target.join(name);
            crate::utils::remove_dir_all(&dir).map_err(|e| SkmError::FileSystemError {
                operation: "remove".to_string(),
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        manifest.remove_skill(name)?;
        manifest.save(&self.manifest_path)
    }

    /// Runs the concurrent skill-level fan-out for a batch install.
    async fn install_batch(&self, skills: &[Skill], targets: &[PathBuf]) -> Result<Vec<SkillPatch>> {
        if skills.is_empty() {
            return Ok(Vec::new());
        }
        if targets.is_empty() {
            return Err(SkmError::NoInstallTargets.into());
        }

        let total = skills.len();
        let mut in_flight = stream::iter(skills.iter().cloned().enumerate().map(|(idx, skill)| {
            async move { self.install_one(skill, targets).await.map(|patch| (idx, patch)) }
        }))
        .buffer_unordered(self.max_parallel);

        let mut slots: Vec<Option<SkillPatch>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Some(item) = in_flight.next().await {
            let (idx, patch) = item?;
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
            slots[idx] = Some(patch);
        }
        drop(in_flight);

        Ok(slots.into_iter().map(|s| s.expect("worker completed without filling its slot")).collect())
    }

    /// One batch worker: download, hash, copy, re-verify. No persistence.
    async fn install_one(&self, skill: Skill, targets: &[PathBuf]) -> Result<SkillPatch> {
        let resolved = self.resolve_skill(&skill).await?;
        self.copy_skill_to_targets(&skill.name, &resolved.work_path, targets).await?;
        if let ResolvedIntegrity::SelfVerified { hash, .. } = &resolved.patch.integrity {
            self.verify_installed(&skill.name, hash, targets).await;
        }
        Ok(resolved.patch)
    }

    /// Downloads a skill and computes its pending manifest mutation.
    async fn resolve_skill(&self, skill: &Skill) -> Result<ResolvedSkill> {
        let adapter = self.registry.get(&skill.source_kind)?;
        let source = build_source(skill)?;

        let download = adapter
            .download(&source, &skill.version)
            .await
            .with_context(|| format!("failed to download skill '{}'", skill.name))?;
        let work_path = resolve_work_path(skill, &download)?;

        let integrity = if download.from_external_lock {
            ResolvedIntegrity::ExternallyVerified
        } else {
            let hash_path = work_path.clone();
            let hash = tokio::task::spawn_blocking(move || calculate_hash(&hash_path))
                .await
                .context("hash task panicked")?
                .with_context(|| format!("failed to hash downloaded skill '{}'", skill.name))?;
            ResolvedIntegrity::SelfVerified {
                version: download.version.clone(),
                hash: hash.value,
            }
        };

        Ok(ResolvedSkill {
            patch: SkillPatch {
                name: skill.name.clone(),
                integrity,
            },
            work_path,
            download,
        })
    }

    /// Copies the staged skill into every install target concurrently.
    ///
    /// Each target's existing copy is removed first, then recreated from
    /// the staged tree (permission bits preserved). The first error cancels
    /// copies not yet dispatched; completed targets are not rolled back.
    async fn copy_skill_to_targets(
        &self,
        name: &str,
        work_path: &Path,
        targets: &[PathBuf],
    ) -> Result<()> {
        let copies = targets.iter().map(|target| {
            let src = work_path.to_path_buf();
            let dest = target.join(name);
            async move {
                tokio::task::spawn_blocking(move || -> Result<()> {
                    crate::utils::remove_dir_all(&dest)?;
                    crate::utils::ensure_parent_dir(&dest)?;
                    crate::utils::copy_dir(&src, &dest)?;
                    Ok(())
                })
                .await
                .context("copy task panicked")?
            }
        });

        futures::future::try_join_all(copies)
            .await
            .with_context(|| format!("failed to copy skill '{name}' to install targets"))?;
        Ok(())
    }

    /// Re-verifies installed copies against the stored hash.
    ///
    /// A mismatch at this stage points at the copy step rather than the
    /// network transfer, so it is reported as a warning and installation is
    /// still considered successful.
    async fn verify_installed(&self, name: &str, expected: &str, targets: &[PathBuf]) {
        for target in targets {
            let dir = target.join(name);
            let hash_dir = dir.clone();
            match tokio::task::spawn_blocking(move || calculate_hash(&hash_dir)).await {
                Ok(Ok(actual)) if actual.value == expected => {}
                Ok(Ok(_)) => {
                    tracing::warn!(
                        "{}",
                        SkmError::ChecksumMismatch {
                            name: name.to_string(),
                            path: dir.display().to_string(),
                        }
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        "could not re-verify skill '{name}' at {}: {e:#}",
                        dir.display()
                    );
                }
                Err(e) => tracing::warn!("verification task for '{name}' panicked: {e}"),
            }
        }
    }

    /// One update worker: resolve latest, download, diff, optionally apply.
    async fn update_worker(
        &self,
        skill: Skill,
        first_target: Option<&Path>,
        targets: &[PathBuf],
        dry_run: bool,
    ) -> Result<(UpdateResult, Option<SkillPatch>)> {
        let adapter = self.registry.get(&skill.source_kind)?;
        let source = build_source(&skill)?;

        let latest = adapter
            .get_latest_version(&source)
            .await
            .with_context(|| format!("failed to resolve latest version of skill '{}'", skill.name))?;
        let download = adapter
            .download(&source, &latest)
            .await
            .with_context(|| format!("failed to download skill '{}'", skill.name))?;
        let work_path = resolve_work_path(&skill, &download)?;

        // Preview against the first target's current copy; a prior copy may
        // or may not exist there, and a missing one diffs as all-added.
        let file_diffs = match first_target {
            Some(first) => {
                let old_dir = first.join(&skill.name);
                let new_dir = work_path.clone();
                tokio::task::spawn_blocking(move || compute_file_diffs(&old_dir, &new_dir))
                    .await
                    .context("diff task panicked")?
                    .with_context(|| format!("failed to diff skill '{}'", skill.name))?
            }
            None => Vec::new(),
        };

        let result = UpdateResult {
            skill_name: skill.name.clone(),
            old_version: skill.version.clone(),
            new_version: download.version.clone(),
            file_diffs,
        };

        if dry_run {
            return Ok((result, None));
        }

        // External-lock skills (empty stored version) are left to their
        // lock mechanism.
        if skill.version.is_empty() {
            return Ok((result, None));
        }

        let hash_path = work_path.clone();
        let hash = tokio::task::spawn_blocking(move || calculate_hash(&hash_path))
            .await
            .context("hash task panicked")?
            .with_context(|| format!("failed to hash downloaded skill '{}'", skill.name))?;

        self.copy_skill_to_targets(&skill.name, &work_path, targets).await?;

        let patch = SkillPatch {
            name: skill.name.clone(),
            integrity: ResolvedIntegrity::SelfVerified {
                version: download.version.clone(),
                hash: hash.value,
            },
        };
        Ok((result, Some(patch)))
    }
}

/// Merges one worker's result into the manifest.
fn apply_patch(manifest: &mut Manifest, patch: &SkillPatch) {
    if let Some(skill) = manifest.find_skill_mut(&patch.name) {
        match &patch.integrity {
            ResolvedIntegrity::SelfVerified { version, hash } => {
                skill.version = version.clone();
                skill.hash_value = hash.clone();
            }
            ResolvedIntegrity::ExternallyVerified => {
                skill.version.clear();
                skill.hash_value.clear();
            }
        }
    }
}

/// Builds the ephemeral source descriptor for one adapter call.
fn build_source(skill: &Skill) -> Result<Source> {
    let kind = SourceKind::from_str(&skill.source_kind)?;
    let mut source = Source::new(kind, &skill.url);
    if skill.external_lock {
        source.options.insert("external-lock".to_string(), "true".to_string());
    }
    Ok(source)
}

/// Re-roots the working path to the skill's `sub-dir` when one is set.
fn resolve_work_path(skill: &Skill, download: &DownloadResult) -> Result<PathBuf> {
    match &skill.sub_dir {
        Some(sub_dir) => {
            let path = download.path.join(sub_dir);
            if !path.is_dir() {
                return Err(SkmError::InvalidSkill {
                    name: skill.name.clone(),
                    reason: format!("sub-dir '{sub_dir}' does not exist in the downloaded tree"),
                }
                .into());
            }
            Ok(path)
        }
        None => Ok(download.path.clone()),
    }
}

/// Expands the manifest's install-target strings into absolute paths.
fn expanded_targets(manifest: &Manifest) -> Result<Vec<PathBuf>> {
    manifest.install_targets.iter().map(|t| crate::utils::expand_target_path(t)).collect()
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get).max(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceAdapter;
    use crate::verify::verify_all;
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use std::fs;
    use tempfile::TempDir;

    /// Test adapter serving a local fixture tree under the `vcs` kind.
    struct FixtureAdapter {
        fixture: PathBuf,
        latest: String,
    }

    impl SourceAdapter for FixtureAdapter {
        fn source_kind(&self) -> SourceKind {
            SourceKind::Vcs
        }

        fn download<'a>(
            &'a self,
            source: &'a Source,
            version: &'a str,
        ) -> BoxFuture<'a, Result<DownloadResult>> {
            async move {
                let staging = crate::source::staging_dir()?;
                let checkout = staging.path().join("checkout");
                crate::utils::copy_dir(&self.fixture, &checkout)?;
                let version = if version.is_empty() {
                    self.latest.clone()
                } else {
                    version.to_string()
                };
                Ok(DownloadResult {
                    path: checkout,
                    version,
                    from_external_lock: source.is_externally_locked(),
                    staging: Some(staging),
                })
            }
            .boxed()
        }

        fn get_latest_version<'a>(&'a self, _source: &'a Source) -> BoxFuture<'a, Result<String>> {
            async move { Ok(self.latest.clone()) }.boxed()
        }
    }

    struct Sandbox {
        root: TempDir,
        manifest_path: PathBuf,
        fixture: PathBuf,
    }

    fn sandbox(latest: &str, targets: usize) -> (Sandbox, Installer) {
        let root = TempDir::new().unwrap();
        let fixture = root.path().join("fixture");
        fs::create_dir_all(fixture.join("lib")).unwrap();
        fs::write(fixture.join("SKILL.md"), "# fixture skill\n").unwrap();
        fs::write(fixture.join("lib/run.sh"), "echo run\n").unwrap();

        let manifest_path = root.path().join("skm.toml");
        let mut manifest = Manifest::new();
        for i in 0..targets {
            manifest.add_target(&root.path().join(format!("target{i}")).display().to_string()).unwrap();
        }
        manifest
            .add_skill(Skill {
                name: "demo".to_string(),
                source_kind: "vcs".to_string(),
                url: "https://example.com/demo.git".to_string(),
                version: String::new(),
                hash_value: String::new(),
                sub_dir: None,
                external_lock: false,
            })
            .unwrap();
        manifest.save(&manifest_path).unwrap();

        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(FixtureAdapter {
            fixture: fixture.clone(),
            latest: latest.to_string(),
        }));
        let installer = Installer::with_registry(&manifest_path, registry);

        (
            Sandbox {
                root,
                manifest_path,
                fixture,
            },
            installer,
        )
    }

    #[tokio::test]
    async fn install_copies_to_every_target_and_persists() {
        let (sandbox, installer) = sandbox("v1.0.0", 2);
        installer.install(None).await.unwrap();

        for i in 0..2 {
            let installed = sandbox.root.path().join(format!("target{i}/demo"));
            assert_eq!(
                fs::read_to_string(installed.join("SKILL.md")).unwrap(),
                "# fixture skill\n"
            );
            assert_eq!(fs::read_to_string(installed.join("lib/run.sh")).unwrap(), "echo run\n");
        }

        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        let skill = manifest.find_skill("demo").unwrap();
        assert_eq!(skill.version, "v1.0.0");
        assert!(!skill.hash_value.is_empty());

        // One success per skill × target pair.
        let summary = verify_all(&manifest).unwrap();
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 0);
    }

    #[tokio::test]
    async fn install_without_targets_is_a_config_error() {
        let (_sandbox, installer) = sandbox("v1.0.0", 0);
        let err = installer.install(None).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<SkmError>(), Some(SkmError::NoInstallTargets)));
    }

    #[tokio::test]
    async fn install_unknown_skill_reports_not_found() {
        let (_sandbox, installer) = sandbox("v1.0.0", 1);
        let err = installer.install(Some("ghost")).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn named_install_persists_resolved_version() {
        let (sandbox, installer) = sandbox("v2.1.0", 1);
        installer.install(Some("demo")).await.unwrap();

        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        assert_eq!(manifest.find_skill("demo").unwrap().version, "v2.1.0");
    }

    #[tokio::test]
    async fn dry_run_update_mutates_nothing() {
        let (sandbox, installer) = sandbox("v1.0.0", 1);
        installer.install(None).await.unwrap();
        let manifest_before = fs::read_to_string(&sandbox.manifest_path).unwrap();

        // Fixture moves on; dry run must see the change without applying it.
        fs::write(sandbox.fixture.join("SKILL.md"), "# fixture skill v2\n").unwrap();
        let results = installer.update(&[], true).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].skill_name, "demo");
        assert_eq!(results[0].old_version, "v1.0.0");
        let modified: Vec<_> = results[0]
            .file_diffs
            .iter()
            .filter(|d| d.status == crate::diff::DiffStatus::Modified)
            .collect();
        assert_eq!(modified.len(), 1);
        assert_eq!(modified[0].path, "SKILL.md");

        assert_eq!(fs::read_to_string(&sandbox.manifest_path).unwrap(), manifest_before);
        assert_eq!(
            fs::read_to_string(sandbox.root.path().join("target0/demo/SKILL.md")).unwrap(),
            "# fixture skill\n"
        );
    }

    #[tokio::test]
    async fn apply_update_rewrites_targets_and_manifest() {
        let (sandbox, installer) = sandbox("v1.0.0", 2);
        installer.install(None).await.unwrap();
        let old_hash =
            Manifest::load(&sandbox.manifest_path).unwrap().find_skill("demo").unwrap().hash_value.clone();

        fs::write(sandbox.fixture.join("SKILL.md"), "# fixture skill v2\n").unwrap();
        let results = installer.update(&["demo".to_string()], false).await.unwrap();
        assert_eq!(results.len(), 1);

        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        let skill = manifest.find_skill("demo").unwrap();
        assert_ne!(skill.hash_value, old_hash);

        for i in 0..2 {
            assert_eq!(
                fs::read_to_string(sandbox.root.path().join(format!("target{i}/demo/SKILL.md")))
                    .unwrap(),
                "# fixture skill v2\n"
            );
        }
    }

    #[tokio::test]
    async fn update_aggregates_all_missing_names() {
        let (_sandbox, installer) = sandbox("v1.0.0", 1);
        let err = installer
            .update(&["ghost".to_string(), "phantom".to_string()], false)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ghost"));
        assert!(msg.contains("phantom"));
    }

    #[tokio::test]
    async fn externally_locked_skill_stores_nothing() {
        let (sandbox, installer) = sandbox("v1.0.0", 1);

        let mut manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        let skill = manifest.find_skill_mut("demo").unwrap();
        skill.external_lock = true;
        manifest.save(&sandbox.manifest_path).unwrap();

        installer.install(None).await.unwrap();

        // Files are materialized, but version/hash stay with the external lock.
        assert!(sandbox.root.path().join("target0/demo/SKILL.md").exists());
        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        let skill = manifest.find_skill("demo").unwrap();
        assert!(skill.version.is_empty());
        assert!(skill.hash_value.is_empty());

        // Apply-mode update previews but leaves the lock mechanism in charge.
        fs::write(sandbox.fixture.join("SKILL.md"), "# new\n").unwrap();
        let results = installer.update(&[], false).await.unwrap();
        assert_eq!(results.len(), 1);
        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        assert!(manifest.find_skill("demo").unwrap().version.is_empty());
        assert_eq!(
            fs::read_to_string(sandbox.root.path().join("target0/demo/SKILL.md")).unwrap(),
            "# fixture skill\n"
        );
    }

    #[tokio::test]
    async fn uninstall_removes_targets_and_record() {
        let (sandbox, installer) = sandbox("v1.0.0", 2);
        installer.install(None).await.unwrap();

        installer.uninstall("demo").await.unwrap();

        for i in 0..2 {
            assert!(!sandbox.root.path().join(format!("target{i}/demo")).exists());
        }
        let manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        assert!(manifest.find_skill("demo").is_none());
    }

    #[tokio::test]
    async fn uninstall_unknown_skill_reports_not_found() {
        let (_sandbox, installer) = sandbox("v1.0.0", 1);
        let err = installer.uninstall("ghost").await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn missing_sub_dir_fails_with_description() {
        let (sandbox, installer) = sandbox("v1.0.0", 1);

        let mut manifest = Manifest::load(&sandbox.manifest_path).unwrap();
        manifest.find_skill_mut("demo").unwrap().sub_dir = Some("no-such-dir".to_string());
        manifest.save(&sandbox.manifest_path).unwrap();

        let err = installer.install(None).await.unwrap_err();
        assert!(err.to_string().contains("no-such-dir"));
    }
}
