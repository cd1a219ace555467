use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::config::{Credentials, TransferConfig};

/// Loads the static YAML config file (no secrets) and merges optional env
/// vars for secrets. Returns a fully merged TransferConfig or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TransferConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: TransferConfig = match serde_yaml::from_str(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            config
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    // The token never lives in the config file; GITHUB_TOKEN is merged here
    // and stays optional (unauthenticated listing works for public repos).
    if let Some(github) = config.github.as_mut() {
        if github.token.is_none() {
            github.token = std::env::var("GITHUB_TOKEN").ok();
            if github.token.is_some() {
                info!("GITHUB_TOKEN found in env");
            }
        }
    }

    config.trace_loaded();
    Ok(config)
}

/// Resolve mailbox credentials from the environment. A configured mail
/// section with no credentials is a hard failure; the collector itself never
/// reads the environment.
pub fn resolve_mail_credentials() -> Result<Credentials> {
    let address = match std::env::var("EMAIL_USER") {
        Ok(address) => address,
        Err(e) => {
            error!(error = ?e, "EMAIL_USER environment variable not set");
            return Err(anyhow::anyhow!(
                "EMAIL_USER environment variable not set: {e}"
            ));
        }
    };

    let app_password = match std::env::var("EMAIL_PASS") {
        Ok(password) => password,
        Err(e) => {
            error!(error = ?e, "EMAIL_PASS environment variable not set");
            return Err(anyhow::anyhow!(
                "EMAIL_PASS environment variable not set: {e}"
            ));
        }
    };

    Ok(Credentials {
        address,
        app_password,
    })
}
