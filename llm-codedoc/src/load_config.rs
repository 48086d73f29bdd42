/// `load_config` module: merges the optional YAML config file, the environment and CLI
/// flags into the run [`Settings`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into type-safe structs
/// - Inject the API key from the environment; it is never read from the file
/// - Apply CLI overrides on top
///
/// Precedence is CLI flags, then environment, then file, then provider defaults.
///
/// # Errors
/// Failures use `anyhow::Error` and surface at the CLI boundary. A missing API key is not
/// an error here: the assembler reports it in place of the documentation.
use anyhow::{Context, Result};
use llm_codedoc_core::config::{DocumentationConfig, ProviderKind, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Overrides every provider-specific key variable when set.
pub const API_KEY_ENV: &str = "LLM_CODEDOC_API_KEY";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub token_budget: Option<usize>,
    pub language: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub token_budget: Option<usize>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub documentation: DocumentationConfig,
    pub base_url: String,
    pub timeout: Duration,
}

pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    match serde_yaml::from_str::<Option<FileConfig>>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf.unwrap_or_default())
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// API key for `provider`: the generic override first, then the provider's own variable.
pub fn resolve_api_key(provider: ProviderKind) -> Option<String> {
    if let Some(key) = non_empty_env(API_KEY_ENV) {
        info!(var = API_KEY_ENV, "API key found in env");
        return Some(key);
    }
    match non_empty_env(provider.api_key_env()) {
        Some(key) => {
            info!(var = provider.api_key_env(), "API key found in env");
            Some(key)
        }
        None => {
            warn!(
                var = provider.api_key_env(),
                "No API key in environment for provider {}", provider
            );
            None
        }
    }
}

pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
    let file = match path {
        Some(p) => read_config_file(p)?,
        None => FileConfig::default(),
    };

    let provider = overrides
        .provider
        .or(file.provider)
        .unwrap_or_default();

    // The file's model and base URL belong to the file's provider.
    let file_matches_provider = file.provider.map_or(true, |p| p == provider);
    let (file_model, file_base_url) = if file_matches_provider {
        (file.model, file.base_url)
    } else {
        warn!(
            file_provider = ?file.provider,
            provider = %provider,
            "Provider overridden on the command line, ignoring model and base_url from config file"
        );
        (None, None)
    };

    let mut documentation = DocumentationConfig::for_provider(provider);
    if let Some(model) = overrides.model.clone().or(file_model) {
        documentation.model = model;
    }
    if let Some(budget) = overrides.token_budget.or(file.token_budget) {
        documentation.token_budget = budget;
    }
    if let Some(language) = overrides.language.clone().or(file.language) {
        documentation.language = language;
    }
    if file.temperature.is_some() {
        documentation.temperature = file.temperature;
    }
    documentation.api_key = resolve_api_key(provider);
    documentation
        .validate()
        .context("Invalid documentation settings")?;

    let settings = Settings {
        documentation,
        base_url: file_base_url.unwrap_or_else(|| provider.default_base_url().to_string()),
        timeout: file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT),
    };

    info!(
        provider = %provider,
        model = %settings.documentation.model,
        base_url = %settings.base_url,
        "Config loaded and merged successfully"
    );
    Ok(settings)
}
