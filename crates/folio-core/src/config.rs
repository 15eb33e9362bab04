//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/folio/config.toml)
//! 3. Environment variables (FOLIO_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::adapter::mapping::{self, EntityDocument, SingletonDocument};
use crate::models::{
    AboutData, Certification, ContactInfo, ContactSubmission, Education, Experience, HomeData,
    Project, Skill, SkillSection,
};

/// Environment variable prefix
const ENV_PREFIX: &str = "FOLIO";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the backing store project/database. Not read by this
    /// crate itself: the concrete store implementation consumes it when
    /// connecting, the same way deployments select a database.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Prefix applied to every collection name, for sharing one store
    /// between deployments (e.g. "staging_")
    #[serde(default)]
    pub collection_prefix: Option<String>,
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (FOLIO_PROJECT_ID, FOLIO_COLLECTION_PREFIX)
    /// 2. Config file (~/.config/folio/config.toml or FOLIO_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // FOLIO_PROJECT_ID
        if let Ok(val) = std::env::var(format!("{}_PROJECT_ID", ENV_PREFIX)) {
            self.project_id = if val.is_empty() { None } else { Some(val) };
        }

        // FOLIO_COLLECTION_PREFIX
        if let Ok(val) = std::env::var(format!("{}_COLLECTION_PREFIX", ENV_PREFIX)) {
            self.collection_prefix = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with FOLIO_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
            .join("config.toml")
    }

    /// The concrete collection names for this configuration
    pub fn collections(&self) -> Collections {
        Collections::with_prefix(self.collection_prefix.as_deref().unwrap_or(""))
    }
}

/// The collection name of every entity kind, prefix applied. This is what
/// the service builder consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub home: String,
    pub about: String,
    pub contact_info: String,
    pub experiences: String,
    pub education: String,
    pub projects: String,
    pub skills: String,
    pub skill_sections: String,
    pub certifications: String,
    pub contact_submissions: String,
    pub users: String,
}

impl Collections {
    pub fn with_prefix(prefix: &str) -> Self {
        let name = |base: &str| format!("{prefix}{base}");
        Self {
            home: name(<HomeData as SingletonDocument>::COLLECTION),
            about: name(<AboutData as SingletonDocument>::COLLECTION),
            contact_info: name(<ContactInfo as SingletonDocument>::COLLECTION),
            experiences: name(<Experience as EntityDocument>::COLLECTION),
            education: name(<Education as EntityDocument>::COLLECTION),
            projects: name(<Project as EntityDocument>::COLLECTION),
            skills: name(<Skill as EntityDocument>::COLLECTION),
            skill_sections: name(<SkillSection as EntityDocument>::COLLECTION),
            certifications: name(<Certification as EntityDocument>::COLLECTION),
            contact_submissions: name(<ContactSubmission as EntityDocument>::COLLECTION),
            users: name(mapping::USERS_COLLECTION),
        }
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["FOLIO_CONFIG", "FOLIO_PROJECT_ID", "FOLIO_COLLECTION_PREFIX"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.project_id.is_none());
        assert!(config.collection_prefix.is_none());
    }

    #[test]
    fn test_env_override_project_id() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("FOLIO_PROJECT_ID", "folio-prod");
        config.apply_env_overrides();
        assert_eq!(config.project_id, Some("folio-prod".to_string()));

        // Empty string clears it
        env::set_var("FOLIO_PROJECT_ID", "");
        config.apply_env_overrides();
        assert!(config.project_id.is_none());
    }

    #[test]
    fn test_env_override_collection_prefix() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("FOLIO_COLLECTION_PREFIX", "staging_");
        config.apply_env_overrides();
        assert_eq!(config.collection_prefix, Some("staging_".to_string()));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            project_id = "folio-prod"
            collection_prefix = "prod_"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.project_id, Some("folio-prod".to_string()));
        assert_eq!(config.collection_prefix, Some("prod_".to_string()));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.project_id.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_id = \"folio-test\"").unwrap();

        let config = Config::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.project_id, Some("folio-test".to_string()));
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = Config {
            project_id: Some("folio-prod".to_string()),
            collection_prefix: Some("prod_".to_string()),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("project_id"));
        assert!(toml_str.contains("collection_prefix"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.project_id, config.project_id);
        assert_eq!(parsed.collection_prefix, config.collection_prefix);
    }

    #[test]
    fn test_collections_default_names() {
        let collections = Collections::default();
        assert_eq!(collections.projects, "projects");
        assert_eq!(collections.skill_sections, "skill_sections");
        assert_eq!(collections.users, "users");
    }

    #[test]
    fn test_collections_prefix() {
        let collections = Config {
            collection_prefix: Some("staging_".to_string()),
            ..Config::default()
        }
        .collections();
        assert_eq!(collections.projects, "staging_projects");
        assert_eq!(collections.home, "staging_home");
    }
}
