//! Configuration management for the taskhive application.
//!
//! Settings live in a JSON file in the platform data directory. The
//! configuration is modular: the remote store and the reminder notification
//! handoff each have their own optional section, and an interactive wizard
//! walks the user through the modules they pick.

use super::data_storage::DataStorage;
use crate::api::remote::RemoteConfig;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

/// Configuration file name used for storing application settings.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// A configurable module shown in the interactive setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    /// Unique identifier for the module used in configuration routing
    pub key: String,
    /// Display name shown to users during interactive setup
    pub name: String,
}

/// Reminder notification handoff settings.
///
/// The sync core only hands reconciled reminder times over to a scheduler;
/// this section controls whether that handoff happens at all.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Whether reconciled reminders should be passed to the notification
    /// scheduler.
    pub enabled: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Remote cloud store connection settings.
    ///
    /// When absent the application is local-only; requesting the remote
    /// store then reports it as disabled by the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    /// Reminder notification handoff settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

impl Config {
    /// Loads the configuration, or the default when no file exists yet.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive setup wizard, pre-filled from the existing configuration.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let node_descriptions = vec![
            RemoteConfig::module(),
            ConfigModule {
                key: "notify".to_string(),
                name: "Notifications".to_string(),
            },
        ];

        let selected_nodes = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&node_descriptions.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected_nodes {
            match node_descriptions[selection].key.as_str() {
                "remote" => config.remote = Some(RemoteConfig::init(&config.remote)?),
                "notify" => {
                    let default = config.notify.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleNotify);
                    config.notify = Some(NotifyConfig {
                        enabled: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptNotifyEnabled.to_string())
                            .default(default.enabled)
                            .interact()?,
                    });
                }
                _ => {} // Unknown module keys are safely ignored
            }
        }

        Ok(config)
    }
}
