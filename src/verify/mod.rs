//! Integrity verification of installed skills.
//!
//! Compares the content hash stored in the manifest against what is
//! actually on disk, per skill and per install target. Mismatches are
//! *data*, not errors: a failed pair becomes a summary entry, and sweeps
//! never abort halfway because one directory is unreadable.

use crate::core::SkmError;
use crate::hash::calculate_hash;
use crate::manifest::Manifest;
use crate::utils::expand_target_path;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Outcome of verifying one skill in one install directory.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    /// The skill that was verified
    pub skill_name: String,
    /// The directory that was hashed
    pub install_dir: PathBuf,
    /// Hash stored in the manifest
    pub expected: String,
    /// Hash computed from disk; empty when hashing itself failed during a sweep
    pub actual: String,
    /// True when expected and actual agree
    pub matched: bool,
}

/// Accumulated outcome of a whole-manifest verification sweep.
#[derive(Debug, Clone, Default)]
pub struct VerifySummary {
    /// Number of skills in the manifest (not pairs)
    pub total_skills: usize,
    /// Pairs that verified clean
    pub success_count: usize,
    /// Pairs that mismatched or failed to hash
    pub failure_count: usize,
    /// One entry per skill × install target pair
    pub results: Vec<VerifyResult>,
}

/// Verifies a single skill against one install directory.
///
/// Returns an error only when the skill is absent from the manifest or
/// hashing itself fails (e.g. an unreadable directory); a hash disagreement
/// is a successful result with `matched = false`.
pub fn verify(manifest: &Manifest, skill_name: &str, install_dir: &Path) -> Result<VerifyResult> {
    let skill = manifest.find_skill(skill_name).ok_or_else(|| SkmError::SkillNotFound {
        names: vec![skill_name.to_string()],
    })?;

    let actual = calculate_hash(install_dir)?.value;
    let expected = skill.hash_value.clone();
    let matched = expected == actual;

    Ok(VerifyResult {
        skill_name: skill_name.to_string(),
        install_dir: install_dir.to_path_buf(),
        expected,
        actual,
        matched,
    })
}

/// Verifies every skill against every install target.
///
/// A per-pair hashing error (missing or unreadable directory) is recorded
/// as a mismatch with an empty `actual` rather than aborting the sweep.
/// Skills whose integrity is delegated to an external lock mechanism are
/// counted in `total_skills` but contribute no pairs; so do manifests with
/// no install targets.
pub fn verify_all(manifest: &Manifest) -> Result<VerifySummary> {
    let mut summary = VerifySummary {
        total_skills: manifest.skills.len(),
        ..Default::default()
    };

    let targets: Vec<PathBuf> = manifest
        .install_targets
        .iter()
        .map(|t| expand_target_path(t))
        .collect::<Result<_>>()?;

    for skill in &manifest.skills {
        if skill.external_lock {
            continue;
        }
        for target in &targets {
            let install_dir = target.join(&skill.name);
            let result = match verify(manifest, &skill.name, &install_dir) {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(
                        "treating hash failure for '{}' at {} as mismatch: {e:#}",
                        skill.name,
                        install_dir.display()
                    );
                    VerifyResult {
                        skill_name: skill.name.clone(),
                        install_dir: install_dir.clone(),
                        expected: skill.hash_value.clone(),
                        actual: String::new(),
                        matched: false,
                    }
                }
            };

            if result.matched {
                summary.success_count += 1;
            } else {
                summary.failure_count += 1;
            }
            summary.results.push(result);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Skill;
    use std::fs;
    use tempfile::TempDir;

    fn installed_manifest(tmp: &TempDir) -> Manifest {
        let target = tmp.path().join("target");
        let install_dir = target.join("demo");
        fs::create_dir_all(&install_dir).unwrap();
        fs::write(install_dir.join("SKILL.md"), "# demo").unwrap();
        let hash = calculate_hash(&install_dir).unwrap().value;

        Manifest {
            install_targets: vec![target.display().to_string()],
            skills: vec![Skill {
                name: "demo".to_string(),
                source_kind: "vcs".to_string(),
                url: "https://example.com/demo.git".to_string(),
                version: "v1.0.0".to_string(),
                hash_value: hash,
                sub_dir: None,
                external_lock: false,
            }],
        }
    }

    #[test]
    fn verify_matches_untouched_install() {
        let tmp = TempDir::new().unwrap();
        let manifest = installed_manifest(&tmp);
        let dir = tmp.path().join("target/demo");

        let result = verify(&manifest, "demo", &dir).unwrap();
        assert!(result.matched);
        assert_eq!(result.expected, result.actual);
    }

    #[test]
    fn verify_detects_single_byte_mutation() {
        let tmp = TempDir::new().unwrap();
        let manifest = installed_manifest(&tmp);
        let dir = tmp.path().join("target/demo");
        fs::write(dir.join("SKILL.md"), "# demX").unwrap();

        let result = verify(&manifest, "demo", &dir).unwrap();
        assert!(!result.matched);
        assert_ne!(result.actual, result.expected);
    }

    #[test]
    fn verify_unknown_skill_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let manifest = installed_manifest(&tmp);
        assert!(verify(&manifest, "ghost", tmp.path()).is_err());
    }

    #[test]
    fn verify_all_empty_manifest() {
        let summary = verify_all(&Manifest::new()).unwrap();
        assert_eq!(summary.total_skills, 0);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, 0);
        assert!(summary.results.is_empty());
    }

    #[test]
    fn verify_all_counts_per_pair() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = installed_manifest(&tmp);

        // Second target with no installed copy: hashing fails, counted as mismatch.
        manifest.install_targets.push(tmp.path().join("empty-target").display().to_string());

        let summary = verify_all(&manifest).unwrap();
        assert_eq!(summary.total_skills, 1);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.results.len(), 2);
        let failed = summary.results.iter().find(|r| !r.matched).unwrap();
        assert!(failed.actual.is_empty());
    }

    #[test]
    fn verify_all_skips_externally_locked_skills() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = installed_manifest(&tmp);
        manifest.skills[0].external_lock = true;
        manifest.skills[0].version.clear();
        manifest.skills[0].hash_value.clear();

        let summary = verify_all(&manifest).unwrap();
        assert_eq!(summary.total_skills, 1);
        assert!(summary.results.is_empty());
    }
}
