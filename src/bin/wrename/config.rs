use std::path::PathBuf;
use std::{fmt, fs};

use anyhow::Context;
use serde::Deserialize;

use work_rename::colorize_bool;
use work_rename::config::{CONFIG_PATH, DEFAULT_SETTINGS_FILE};

use crate::Args;

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Default)]
pub struct Config {
    pub(crate) execute: bool,
    pub(crate) overwrite: bool,
    pub(crate) paths: Vec<PathBuf>,
    pub(crate) recurse: bool,
    pub(crate) settings_path: PathBuf,
    pub(crate) verbose: bool,
}

/// Config from a config file
#[derive(Debug, Default, Deserialize)]
struct WrenameConfig {
    #[serde(default)]
    execute: bool,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    recurse: bool,
    #[serde(default)]
    settings: Option<PathBuf>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    wrename: WrenameConfig,
}

impl WrenameConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.wrename)
            .context("Failed to parse wrename config TOML")
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let user_config = WrenameConfig::get_user_config()?;
        Ok(Self::from_args_and_user_config(args, user_config))
    }

    fn from_args_and_user_config(args: Args, user_config: WrenameConfig) -> Self {
        // Settings path: args > config > default
        let settings_path = args
            .settings
            .or(user_config.settings)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

        Self {
            execute: args.execute || user_config.execute,
            overwrite: args.force || user_config.force,
            paths: args.path,
            recurse: args.recurse || user_config.recurse,
            settings_path,
            verbose: args.verbose || user_config.verbose,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  execute: {}", colorize_bool(self.execute))?;
        writeln!(f, "  overwrite: {}", colorize_bool(self.overwrite))?;
        writeln!(f, "  recurse: {}", colorize_bool(self.recurse))?;
        writeln!(f, "  settings: {}", self.settings_path.display())?;
        writeln!(f, "  verbose: {}", colorize_bool(self.verbose))?;
        write!(f, "  paths: {}", self.paths.len())
    }
}

#[cfg(test)]
mod wrename_config_tests {
    use super::*;

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = WrenameConfig::from_toml_str("").unwrap();
        assert!(!config.execute);
        assert!(!config.force);
        assert!(!config.recurse);
        assert!(!config.verbose);
        assert!(config.settings.is_none());
    }

    #[test]
    fn from_toml_str_parses_wrename_section() {
        let toml = r#"
[wrename]
execute = true
force = true
recurse = true
verbose = true
settings = "/home/user/.config/fanza.json"
"#;
        let config = WrenameConfig::from_toml_str(toml).unwrap();
        assert!(config.execute);
        assert!(config.force);
        assert!(config.recurse);
        assert!(config.verbose);
        assert_eq!(config.settings, Some(PathBuf::from("/home/user/.config/fanza.json")));
    }

    #[test]
    fn from_toml_str_invalid_toml_returns_error() {
        let result = WrenameConfig::from_toml_str("this is not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn from_toml_str_wrong_type_returns_error() {
        let result = WrenameConfig::from_toml_str("[wrename]\nexecute = \"yes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[other_section]
some_value = true

[wrename]
recurse = true
";
        let config = WrenameConfig::from_toml_str(toml).unwrap();
        assert!(config.recurse);
        assert!(!config.execute);
    }
}
