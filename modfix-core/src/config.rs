//! Configuration file loading for modfix.
//!
//! Reads an optional `modfix.toml`. Every key is optional; absent keys keep their defaults and a
//! missing file yields [`EngineSettings::default`].

use crate::settings::EngineSettings;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io;
use thiserror::Error;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "modfix.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config file {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<EngineSettings, toml::de::Error> {
    toml::from_str(contents)
}

/// Load settings from `path`; a file that does not exist yields the defaults.
pub fn load_settings(path: &Utf8Path) -> Result<EngineSettings, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no config file found at {}", path);
            return Ok(EngineSettings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    debug!("found config file at {}", path);
    parse_settings(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `modfix.toml` from `root`, or the defaults when there is none.
pub fn load_or_default(root: &Utf8Path) -> Result<EngineSettings, ConfigError> {
    load_settings(&root.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_other_defaults() {
        let settings = parse_settings(
            r#"
indent_unit = "\t"

[default_returns]
reference = "java.util.Optional.empty()"
"#,
        )
        .unwrap();
        assert_eq!(settings.indent_unit, "\t");
        assert_eq!(settings.line_separator, "\n");
        assert_eq!(settings.default_returns.reference, "java.util.Optional.empty()");
        assert_eq!(settings.default_returns.boolean, "false");
        assert!(settings.include_secondary_suppress_target);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse_settings("").unwrap(), EngineSettings::default());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse_settings("collapse_single_suppress_token = \"yes\"").is_err());
    }
}
