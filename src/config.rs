use crate::classify::MergeDetection;
use crate::error::{Result, TeamweekError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "teamweek.toml";
pub const PASSWORD_ENV: &str = "TEAMWEEK_APP_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bitbucket: BitbucketConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub wages: WageTable,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BitbucketConfig {
    pub workspace: String,
    pub username: String,
    pub app_password: Option<String>,
    pub api_base: String,
    pub clone_host: String,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            workspace: String::new(),
            username: String::new(),
            app_password: None,
            api_base: "https://api.bitbucket.org/2.0".to_string(),
            clone_host: "bitbucket.org".to_string(),
        }
    }
}

impl BitbucketConfig {
    pub fn require_workspace(&self) -> Result<&str> {
        if self.workspace.trim().is_empty() {
            return Err(TeamweekError::Config("bitbucket.workspace is not set".to_string()));
        }
        Ok(&self.workspace)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub repos_dir: PathBuf,
    pub output: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("repos"),
            output: PathBuf::from("user_stats.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub merge_detection: MergeDetection,
}

/// Author email -> cost per minute of work.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WageTable(BTreeMap<String, f64>);

impl WageTable {
    pub fn rate(&self, author: &str) -> Result<f64> {
        self.0
            .get(author)
            .copied()
            .ok_or_else(|| TeamweekError::MissingWage(author.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WageTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Config {
    /// Load `path`, or `teamweek.toml` in the current directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let text = std::fs::read_to_string(path).map_err(|e| {
            TeamweekError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::parse(&text)?;
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                config.bitbucket.app_password = Some(password);
            }
        }
        log::debug!("Loaded config from {} ({} wage entries)", path.display(), config.wages.len());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (author, rate) in &self.wages.0 {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(TeamweekError::Config(format!(
                    "wage for '{author}' must be a non-negative number, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[bitbucket]
workspace = "rudoapps"
username = "jane"
app_password = "s3cret"

[storage]
repos_dir = "/tmp/repos"

[analysis]
merge_detection = "message-or-parents"

[wages]
"jane@example.com" = 0.45
"bob@example.com" = 0.5
"#;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.bitbucket.workspace, "rudoapps");
        assert_eq!(config.bitbucket.app_password.as_deref(), Some("s3cret"));
        assert_eq!(config.bitbucket.api_base, "https://api.bitbucket.org/2.0");
        assert_eq!(config.storage.repos_dir, PathBuf::from("/tmp/repos"));
        assert_eq!(config.storage.output, PathBuf::from("user_stats.csv"));
        assert_eq!(config.analysis.merge_detection, MergeDetection::MessageOrParents);
        assert_eq!(config.wages.rate("jane@example.com").unwrap(), 0.45);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.analysis.merge_detection, MergeDetection::Message);
        assert!(config.wages.is_empty());
        assert!(config.bitbucket.require_workspace().is_err());
    }

    #[test]
    fn missing_wage_names_the_author() {
        let config = Config::parse(SAMPLE).unwrap();
        let err = config.wages.rate("ghost@example.com").unwrap_err();
        assert!(matches!(err, TeamweekError::MissingWage(ref a) if a == "ghost@example.com"));
        assert!(err.to_string().contains("ghost@example.com"));
    }

    #[test]
    fn rejects_negative_wages_and_unknown_keys() {
        assert!(Config::parse("[wages]\n\"a@b.c\" = -1.0\n").is_err());
        assert!(Config::parse("[bitbucket]\nworkspase = \"typo\"\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(missing.as_path())).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
