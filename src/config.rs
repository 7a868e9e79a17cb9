use std::fs;

use directories::ProjectDirs;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::pager::DEFAULT_PAGE_SIZE;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    pub verdant: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const VERDANT_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            verdant: Self::VERDANT_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        // Ensure that the specified log level is valid:
        //      trim and lowercase the string
        //      confirm that it's a valid log level. if not:
        //          - inform the user
        //          - use the default

        let str_original = self.verdant.clone();
        self.verdant = self.verdant.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.verdant.as_str()) {
            eprintln!(
                "Config error: verdant log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::VERDANT_LEVEL
            );
            self.verdant = Self::VERDANT_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PagingConfig {
    page_size: usize,
}

impl PagingConfig {
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn default() -> Self {
        PagingConfig {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn ensure_valid(&mut self) {
        if self.page_size == 0 {
            eprintln!(
                "Config error: page_size of 0 is invalid - using default of '{}'",
                DEFAULT_PAGE_SIZE
            );
            self.page_size = DEFAULT_PAGE_SIZE;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    /// Optional path to a prebuilt database file that seeds a first run.
    pub asset: Option<String>,
}

impl DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig { asset: None }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub paging: PagingConfig,
    pub database: DatabaseConfig,
}

impl Config {
    /// Loads the configuration from a TOML file located in the app's data directory.
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");

        let default_config = Config {
            logging: LoggingConfig::default(),
            paging: PagingConfig::default(),
            database: DatabaseConfig::default(),
        };

        // If the config file doesn't exist, write the default configuration to disk.
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!(
                        "Failed to create configuration directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
            if let Ok(toml_string) = toml::to_string_pretty(&default_config) {
                if let Err(e) = fs::write(&config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            } else {
                eprintln!("Failed to serialize default config.");
            }
        }

        // Build a Figment instance that uses the defaults merged with the TOML file (if it exists)
        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(&config_path));

        // Attempt to extract the configuration; on error, log a message and fall back to defaults.
        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.paging.ensure_valid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn invalid_log_level_falls_back_to_default() {
        let mut logging = LoggingConfig {
            verdant: "  VERBOSE ".to_owned(),
        };
        logging.ensure_valid();
        assert_eq!(logging.verdant, "info");

        let mut logging = LoggingConfig {
            verdant: " Debug ".to_owned(),
        };
        logging.ensure_valid();
        assert_eq!(logging.verdant, "debug");
    }

    #[test]
    fn zero_page_size_falls_back_to_default() {
        let mut paging = PagingConfig { page_size: 0 };
        paging.ensure_valid();
        assert_eq!(paging.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    [logging]
                    verdant = "trace"

                    [paging]
                    page_size = 25
                "#,
            )?;

            let figment = Figment::from(Serialized::defaults(Config {
                logging: LoggingConfig::default(),
                paging: PagingConfig::default(),
                database: DatabaseConfig::default(),
            }))
            .merge(Toml::file("config.toml"));

            let config: Config = figment.extract()?;
            assert_eq!(config.logging.verdant, "trace");
            assert_eq!(config.paging.page_size(), 25);
            assert_eq!(config.database.asset, None);
            Ok(())
        });
    }
}
