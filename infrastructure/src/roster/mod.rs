//! Roster file loading (`--experts <yaml>`)
//!
//! ```yaml
//! experts:
//!   - name: Photonics Physicist
//!     focus: Single-photon sources
//!     stance: Skeptical of room-temperature claims
//!     system_prompt: Ground every claim in measured fidelities.
//! ```

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use storm_domain::{DomainError, ExpertProfile, RosterManager};
use thiserror::Error;
use tracing::info;

/// Errors from reading a roster file
#[derive(Debug, Error)]
pub enum RosterFileError {
    #[error("cannot read roster file {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid roster file: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileRoster {
    experts: Vec<FileExpert>,
}

#[derive(Debug, Deserialize)]
struct FileExpert {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default, alias = "expertise")]
    focus: String,
    #[serde(default)]
    stance: String,
    #[serde(default)]
    system_prompt: String,
}

impl FileExpert {
    fn into_profile(self) -> ExpertProfile {
        let mut profile = ExpertProfile::new(self.name, self.focus)
            .with_stance(self.stance)
            .with_system_prompt(self.system_prompt);
        if let Some(id) = self.id.filter(|id| !id.trim().is_empty()) {
            profile = profile.with_id(id.trim());
        }
        profile
    }
}

/// Load a roster file.
///
/// Returns `None` for an empty file or one without experts, so the caller
/// falls back to the default panel.
pub fn load_roster(path: &Path) -> Result<Option<RosterManager>, RosterFileError> {
    let content = fs::read_to_string(path).map_err(|e| RosterFileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let roster = parse_roster(&content)?;
    if let Some(roster) = &roster {
        info!("Loaded {} experts from {}", roster.len(), path.display());
    }
    Ok(roster)
}

/// Parse roster YAML.
pub fn parse_roster(content: &str) -> Result<Option<RosterManager>, RosterFileError> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    let file: FileRoster = Figment::from(Yaml::string(content))
        .extract()
        .map_err(Box::new)?;
    if file.experts.is_empty() {
        return Ok(None);
    }
    let profiles = file.experts.into_iter().map(FileExpert::into_profile).collect();
    Ok(Some(RosterManager::from_profiles(profiles)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster() {
        let roster = parse_roster(
            r#"
experts:
  - name: Photonics Physicist
    focus: Single-photon sources
    system_prompt: Ground every claim in measured fidelities.
  - name: Network Theorist
    id: theorist
    expertise: Routing over repeater chains
    stance: Prefers analytic bounds
"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(roster.len(), 2);
        let physicist = roster.get("photonics-physicist").unwrap();
        assert_eq!(physicist.expertise, "Single-photon sources");
        let theorist = roster.get("theorist").unwrap();
        assert_eq!(theorist.stance, "Prefers analytic bounds");
    }

    #[test]
    fn test_empty_file_falls_back() {
        assert!(parse_roster("").unwrap().is_none());
        assert!(parse_roster("experts: []\n").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = parse_roster(
            "experts:\n  - name: Chemist\n    focus: a\n  - name: Chemist\n    focus: b\n",
        );
        assert!(matches!(
            result,
            Err(RosterFileError::Domain(DomainError::DuplicateExpert(_)))
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(matches!(
            parse_roster("experts:\n  - focus: nameless\n"),
            Err(RosterFileError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_roster(&dir.path().join("absent.yaml")),
            Err(RosterFileError::Io { .. })
        ));
    }
}
