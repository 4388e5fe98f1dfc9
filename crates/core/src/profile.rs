//! AWS profile discovery
//!
//! Reads the section headers of the shared credentials and config files.
//! Only names are collected; credential values are never parsed here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;

const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

/// Locations of the shared AWS files
#[derive(Debug, Clone)]
pub struct ProfileSources {
    pub credentials: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ProfileSources {
    /// Resolve file locations from the AWS environment variables or `~/.aws`
    pub fn from_env() -> Self {
        let aws_dir = dirs::home_dir().map(|home| home.join(".aws"));
        let resolve = |var: &str, file: &str| {
            std::env::var_os(var)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(|| aws_dir.as_ref().map(|dir| dir.join(file)))
        };
        Self {
            credentials: resolve(CREDENTIALS_FILE_ENV, "credentials"),
            config: resolve(CONFIG_FILE_ENV, "config"),
        }
    }

    pub fn new(credentials: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            credentials: Some(credentials.into()),
            config: Some(config.into()),
        }
    }
}

/// Sorted, deduplicated profile names from both shared files
///
/// Missing files contribute nothing.
pub fn discover_profiles(sources: &ProfileSources) -> Result<Vec<String>> {
    let mut profiles = BTreeSet::new();

    if let Some(content) = read_optional(sources.credentials.as_deref())? {
        profiles.extend(section_names(&content).map(str::to_string));
    }

    if let Some(content) = read_optional(sources.config.as_deref())? {
        for section in section_names(&content) {
            if let Some(name) = section.strip_prefix("profile ") {
                let name = name.trim();
                if !name.is_empty() {
                    profiles.insert(name.to_string());
                }
            } else if section == "default" {
                profiles.insert(section.to_string());
            }
        }
    }

    tracing::debug!(count = profiles.len(), "Discovered AWS profiles");
    Ok(profiles.into_iter().collect())
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn section_names(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
        (!name.is_empty()).then_some(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sources(credentials: &str, config: &str) -> (ProfileSources, TempDir) {
        let dir = TempDir::new().unwrap();
        let creds_path = dir.path().join("credentials");
        let config_path = dir.path().join("config");
        std::fs::write(&creds_path, credentials).unwrap();
        std::fs::write(&config_path, config).unwrap();
        (ProfileSources::new(creds_path, config_path), dir)
    }

    #[test]
    fn test_union_of_both_files() {
        let (sources, _dir) = write_sources(
            "[default]\naws_access_key_id = x\n\n[work]\naws_access_key_id = y\n",
            "[default]\nregion = us-east-1\n[profile staging]\nregion = eu-west-1\n[profile work]\n",
        );
        let profiles = discover_profiles(&sources).unwrap();
        assert_eq!(profiles, vec!["default", "staging", "work"]);
    }

    #[test]
    fn test_config_sections_without_prefix_are_ignored() {
        let (sources, _dir) = write_sources("", "[sso-session corp]\n[profile dev]\n");
        let profiles = discover_profiles(&sources).unwrap();
        assert_eq!(profiles, vec!["dev"]);
    }

    #[test]
    fn test_missing_files_yield_empty_list() {
        let dir = TempDir::new().unwrap();
        let sources = ProfileSources::new(dir.path().join("nope"), dir.path().join("nada"));
        assert!(discover_profiles(&sources).unwrap().is_empty());
    }

    #[test]
    fn test_section_parsing_tolerates_whitespace() {
        let names: Vec<_> = section_names("  [ alpha ]  \nkey = [not a section\n[]\n").collect();
        assert_eq!(names, vec!["alpha"]);
    }
}
