/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Conveyor framework.
///
/// This struct contains all configurable values for Conveyor, loaded from
/// TOML files in XDG-compliant directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ConveyorConfig {
    /// Limits and capacity configuration
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Default number of concurrent workers for a dispatch executor
    pub default_concurrency_limit: usize,
    /// Default capacity of a bounded dispatch queue
    pub default_queue_capacity: usize,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Default executor shutdown timeout in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_concurrency_limit: 1,
            default_queue_capacity: 16,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 30_000,
        }
    }
}

impl ConveyorConfig {
    /// Convert the shutdown timeout to a Duration
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.shutdown_timeout_ms)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// This function attempts to load configuration from the following locations
    /// in order of preference:
    /// 1. `$XDG_CONFIG_HOME/conveyor/config.toml` (Linux/macOS)
    /// 2. `~/.config/conveyor/config.toml` (Linux fallback)
    /// 3. `~/Library/Application Support/conveyor/config.toml` (macOS fallback)
    /// 4. `%APPDATA%/conveyor/config.toml` (Windows)
    ///
    /// If no configuration file is found, returns the default configuration.
    /// If a configuration file exists but is malformed, logs an error and uses defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        // Get the XDG base directories
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("conveyor") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        // Try to find the configuration file
        let config_path = xdg_dirs.find_config_file("config.toml");

        if let Some(path) = config_path {
            info!("Loading configuration from: {}", path.display());
            match std::fs::read_to_string(&path) {
                Ok(config_str) => match toml::from_str::<Self>(&config_str) {
                    Ok(config) => {
                        info!("Successfully loaded configuration");
                        config
                    }
                    Err(e) => {
                        error!("Failed to parse configuration file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    error!("Failed to read configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: ConveyorConfig = ConveyorConfig::load();
}
