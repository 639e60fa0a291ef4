//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::OcExportConfig;
use crate::config::secret_string;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OcExportConfig
/// 4. Applies environment variable overrides (OCEXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<OcExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: OcExportConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the OCEXPORT_* prefix
///
/// Environment variables follow the pattern: OCEXPORT_<SECTION>_<KEY>
/// For example: OCEXPORT_ORDERCLOUD_API_URL, OCEXPORT_EXPORT_IMPORT_MODE
fn apply_env_overrides(config: &mut OcExportConfig) {
    if let Ok(val) = std::env::var("OCEXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("OCEXPORT_ORDERCLOUD_API_URL") {
        config.ordercloud.api_url = val;
    }
    if let Ok(val) = std::env::var("OCEXPORT_ORDERCLOUD_AUTH_URL") {
        config.ordercloud.auth_url = val;
    }
    if let Ok(val) = std::env::var("OCEXPORT_ORDERCLOUD_CLIENT_ID") {
        config.ordercloud.client_id = val;
    }
    if let Ok(val) = std::env::var("OCEXPORT_ORDERCLOUD_CLIENT_SECRET") {
        config.ordercloud.client_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("OCEXPORT_ORDERCLOUD_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.ordercloud.timeout_seconds = seconds;
        }
    }

    if let Ok(val) = std::env::var("OCEXPORT_SOURCE_SNAPSHOT_PATH") {
        config.source.snapshot_path = val;
    }

    if let Ok(val) = std::env::var("OCEXPORT_EXPORT_IMPORT_MODE") {
        if let Ok(mode) = serde_json::from_value(serde_json::Value::String(val)) {
            config.export.import_mode = mode;
        }
    }

    if let Ok(val) = std::env::var("OCEXPORT_LOGGING_FORMAT") {
        config.logging.format = val;
    }
}
