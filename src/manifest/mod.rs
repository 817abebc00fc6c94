//! Manifest parsing, validation, and mutation (skm.toml).
//!
//! The manifest is the declarative record of what should be installed: an
//! ordered list of [`Skill`] entries plus an ordered list of install-target
//! directories. Every mutating CLI operation loads it, applies a change, and
//! persists it back; the file is always written in full and atomically.
//!
//! # Manifest Format
//!
//! ```toml
//! install-targets = [".claude/skills", "~/.config/opencode/skills"]
//!
//! [[skill]]
//! name = "code-review"
//! source-kind = "vcs"
//! url = "https://github.com/example/code-review-skill.git"
//! version = "v1.2.0"
//! hash = "3f2a…"
//!
//! [[skill]]
//! name = "release-notes"
//! source-kind = "module-proxy"
//! url = "example.com/skills/release-notes"
//! sub-dir = "skill"
//! ```
//!
//! A skill with empty `version` and `hash` delegates version pinning to an
//! external lock mechanism; the manifest deliberately stores nothing for it.

mod io;

use crate::core::SkmError;
use crate::source::SourceKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// A single skill record in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    /// Unique name within the manifest; doubles as the install directory name
    pub name: String,

    /// Adapter family used to fetch this skill (`vcs` or `module-proxy`)
    #[serde(rename = "source-kind")]
    pub source_kind: String,

    /// Remote location: repository URL for `vcs`, module path for `module-proxy`
    pub url: String,

    /// Pinned version (tag, commit, or module version). Empty when version
    /// pinning is delegated to an external lockfile.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Content hash of the installed tree. Empty when delegated externally.
    #[serde(default, rename = "hash", skip_serializing_if = "String::is_empty")]
    pub hash_value: String,

    /// Optional subdirectory within the fetched tree to treat as the skill root
    #[serde(default, rename = "sub-dir", skip_serializing_if = "Option::is_none")]
    pub sub_dir: Option<String>,

    /// True when version and integrity are owned by an external lock
    /// mechanism. Such skills keep `version` and `hash` empty; storing a
    /// point-in-time snapshot would go stale under the external lock.
    #[serde(default, rename = "external-lock", skip_serializing_if = "std::ops::Not::not")]
    pub external_lock: bool,
}

/// The full manifest: skills plus install targets.
///
/// Field order matters for serialization: scalar values must precede the
/// `[[skill]]` array of tables in the emitted TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Directories that should contain a live copy of every configured skill
    #[serde(default, rename = "install-targets", skip_serializing_if = "Vec::is_empty")]
    pub install_targets: Vec<String>,

    /// Ordered skill records
    #[serde(default, rename = "skill", skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Skill>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a skill by name.
    pub fn find_skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Looks up a skill by name, mutably.
    pub fn find_skill_mut(&mut self, name: &str) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.name == name)
    }

    /// Adds a skill, rejecting duplicates by name.
    pub fn add_skill(&mut self, skill: Skill) -> Result<()> {
        validate_skill(&skill)?;
        if self.find_skill(&skill.name).is_some() {
            return Err(SkmError::SkillAlreadyExists {
                name: skill.name,
            }
            .into());
        }
        self.skills.push(skill);
        Ok(())
    }

    /// Removes a skill record by name.
    ///
    /// Returns [`SkmError::SkillNotFound`] when no such skill exists.
    pub fn remove_skill(&mut self, name: &str) -> Result<Skill> {
        let idx = self.skills.iter().position(|s| s.name == name).ok_or_else(|| {
            SkmError::SkillNotFound {
                names: vec![name.to_string()],
            }
        })?;
        Ok(self.skills.remove(idx))
    }

    /// Adds an install target, rejecting duplicates.
    pub fn add_target(&mut self, path: &str) -> Result<()> {
        if self.install_targets.iter().any(|t| t == path) {
            return Err(SkmError::TargetAlreadyExists {
                path: path.to_string(),
            }
            .into());
        }
        self.install_targets.push(path.to_string());
        Ok(())
    }

    /// Validates manifest structure.
    ///
    /// Rejects duplicate skill names, duplicate install targets, unknown
    /// source kinds, and missing required fields. Runs before every save so
    /// a structurally invalid manifest is never written to disk.
    pub fn validate(&self) -> Result<()> {
        let mut seen_names = HashSet::new();
        for skill in &self.skills {
            validate_skill(skill)?;
            if !seen_names.insert(skill.name.as_str()) {
                return Err(SkmError::ManifestValidationError {
                    reason: format!("duplicate skill name '{}'", skill.name),
                }
                .into());
            }
        }

        let mut seen_targets = HashSet::new();
        for target in &self.install_targets {
            if !seen_targets.insert(target.as_str()) {
                return Err(SkmError::ManifestValidationError {
                    reason: format!("duplicate install target '{target}'"),
                }
                .into());
            }
        }

        Ok(())
    }
}

fn validate_skill(skill: &Skill) -> Result<()> {
    if skill.name.is_empty() {
        return Err(SkmError::InvalidSkill {
            name: String::new(),
            reason: "missing required field 'name'".to_string(),
        }
        .into());
    }
    if skill.url.is_empty() {
        return Err(SkmError::InvalidSkill {
            name: skill.name.clone(),
            reason: "missing required field 'url'".to_string(),
        }
        .into());
    }
    if SourceKind::from_str(&skill.source_kind).is_err() {
        return Err(SkmError::UnsupportedSourceKind {
            kind: skill.source_kind.clone(),
            supported: SourceKind::supported_kinds(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            source_kind: "vcs".to_string(),
            url: "https://github.com/example/skill.git".to_string(),
            version: "v1.0.0".to_string(),
            hash_value: "abc123".to_string(),
            sub_dir: None,
            external_lock: false,
        }
    }

    #[test]
    fn add_skill_rejects_duplicates() {
        let mut manifest = Manifest::new();
        manifest.add_skill(sample_skill("demo")).unwrap();
        let err = manifest.add_skill(sample_skill("demo")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn add_target_rejects_duplicates() {
        let mut manifest = Manifest::new();
        manifest.add_target(".claude/skills").unwrap();
        assert!(manifest.add_target(".claude/skills").is_err());
    }

    #[test]
    fn validate_rejects_unknown_kind() {
        let mut skill = sample_skill("demo");
        skill.source_kind = "carrier-pigeon".to_string();
        let manifest = Manifest {
            install_targets: vec![],
            skills: vec![skill],
        };
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("supported kinds"));
    }

    #[test]
    fn validate_rejects_missing_url() {
        let mut skill = sample_skill("demo");
        skill.url = String::new();
        let manifest = Manifest {
            install_targets: vec![],
            skills: vec![skill],
        };
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn remove_skill_reports_not_found() {
        let mut manifest = Manifest::new();
        let err = manifest.remove_skill("ghost").unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn external_lock_flag_survives_round_trip() {
        let mut skill = sample_skill("demo");
        skill.external_lock = true;
        skill.version.clear();
        skill.hash_value.clear();
        let manifest = Manifest {
            install_targets: vec![],
            skills: vec![skill],
        };
        let text = toml::to_string_pretty(&manifest).unwrap();
        assert!(text.contains("external-lock = true"));
        let parsed: Manifest = toml::from_str(&text).unwrap();
        assert!(parsed.skills[0].external_lock);
    }

    #[test]
    fn toml_round_trip() {
        let manifest = Manifest {
            install_targets: vec![".claude/skills".to_string()],
            skills: vec![sample_skill("demo")],
        };
        let text = toml::to_string_pretty(&manifest).unwrap();
        let parsed: Manifest = toml::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);
    }
}
