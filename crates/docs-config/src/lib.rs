//! Configuration loader for docs-mcp.
//!
//! Settings resolve through a precedence stack:
//! built-in defaults → git root file → working directory file → override
//! file → environment variables. Each layer only replaces the keys it sets,
//! and every applied layer is recorded in [`ConfigSources`].

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".docs-mcp.toml";

pub const ENV_ROOT_FOLDER: &str = "DRIVE_FOLDER_ID";
pub const ENV_SERVICE_ACCOUNT_KEY: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";
pub const ENV_SERVICE_ACCOUNT_KEY_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_KEY_FILE";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_FILE: &str = "GOOGLE_ACCESS_TOKEN_FILE";
pub const ENV_LOG_FILTER: &str = "DOCS_MCP_LOG";

const DEFAULT_DOCS_ENDPOINT: &str = "https://docs.googleapis.com/v1";
const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_MAX_CONTENT_CHARS: usize = 1_000_000;
const DEFAULT_LOG_FILTER: &str = "warn";

/// Complete configuration resolved from every layer.
#[derive(Clone, Debug)]
pub struct Config {
    pub drive: DriveSettings,
    pub auth: AuthSettings,
    pub endpoints: EndpointSettings,
    pub limits: LimitSettings,
    pub log: LogSettings,
    pub sources: ConfigSources,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriveSettings {
    pub root_folder_id: Option<String>,
}

/// Credential settings. These come from a single layer: the highest layer
/// that sets any of them replaces the whole group.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    /// Service-account key JSON content.
    pub service_account_key: Option<String>,
    /// Absolute paths; relative paths resolve against the declaring layer.
    pub service_account_key_file: Option<PathBuf>,
    pub access_token: Option<String>,
    pub access_token_file: Option<PathBuf>,
}

/// Where API credentials come from once every layer is applied.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Service-account key JSON, exchanged for short-lived access tokens.
    ServiceAccountKey(String),
    /// A pre-issued bearer token, used as is.
    AccessToken(String),
    Missing,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthSettings")
            .field("service_account_key", &redacted(&self.service_account_key))
            .field("service_account_key_file", &self.service_account_key_file)
            .field("access_token", &redacted(&self.access_token))
            .field("access_token_file", &self.access_token_file)
            .finish()
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::ServiceAccountKey(_) => f.write_str("ServiceAccountKey(<redacted>)"),
            CredentialSource::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            CredentialSource::Missing => f.write_str("Missing"),
        }
    }
}

impl AuthSettings {
    fn is_empty(&self) -> bool {
        self.service_account_key.is_none()
            && self.service_account_key_file.is_none()
            && self.access_token.is_none()
            && self.access_token_file.is_none()
    }

    /// Picks the credential, in order: key JSON, key file, literal token,
    /// token file. Files are read here.
    pub fn resolve_credentials(&self) -> Result<CredentialSource, ConfigError> {
        if let Some(key) = non_blank(self.service_account_key.as_deref()) {
            return Ok(CredentialSource::ServiceAccountKey(key));
        }
        if let Some(path) = &self.service_account_key_file {
            return read_secret(path, "service account key file")
                .map(CredentialSource::ServiceAccountKey);
        }
        if let Some(token) = non_blank(self.access_token.as_deref()) {
            return Ok(CredentialSource::AccessToken(token));
        }
        if let Some(path) = &self.access_token_file {
            return read_secret(path, "access token file").map(CredentialSource::AccessToken);
        }
        Ok(CredentialSource::Missing)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn read_secret(path: &Path, what: &str) -> Result<String, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    non_blank(Some(&contents)).ok_or_else(|| {
        ConfigError::Validation(format!("{what} {} is empty", path.display()))
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointSettings {
    pub docs: String,
    pub drive: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitSettings {
    pub max_content_chars: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    /// `tracing-subscriber` filter directive.
    pub filter: String,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// One applied layer of configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn without_path(kind: ConfigSourceKind) -> Self {
        ConfigSource { kind, path: None }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    pub fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("{} at {}", self.kind, path.display()),
            None => self.kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
    Environment,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
            ConfigSourceKind::Environment => "environment",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    /// Variables to read instead of the process environment.
    pub env: Option<HashMap<String, String>>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.env {
            Some(vars) => vars.get(key).cloned(),
            None => env::var(key).ok(),
        };
        value.filter(|value| !value.trim().is_empty())
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir.clone())?;
        let override_path = options
            .override_path
            .as_ref()
            .map(|path| make_absolute(path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let mut merged = PartialConfig::defaults();
        let mut layers = vec![ConfigSource::without_path(ConfigSourceKind::Default)];

        let local_path = working_dir.join(CONFIG_FILE_NAME);
        let git_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));

        if let Some(path) = git_path {
            if path.exists() && Some(&path) != override_path.as_ref() && path != local_path {
                merged.merge(load_layer(&path)?);
                layers.push(ConfigSource::for_file(ConfigSourceKind::GitRoot, path));
            }
        }

        if local_path.exists() && Some(&local_path) != override_path.as_ref() {
            merged.merge(load_layer(&local_path)?);
            layers.push(ConfigSource::for_file(ConfigSourceKind::Local, local_path));
        }

        if let Some(path) = override_path {
            merged.merge(load_layer(&path)?);
            layers.push(ConfigSource::for_file(ConfigSourceKind::Override, path));
        }

        let env_layer = env_layer(&options, &working_dir);
        if !env_layer.is_empty() {
            merged.merge(env_layer);
            layers.push(ConfigSource::without_path(ConfigSourceKind::Environment));
        }

        merged.finalize(ConfigSources {
            working_directory: working_dir,
            layers,
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn load_layer(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(raw.into_partial(&base_dir))
}

fn env_layer(options: &LoadOptions, working_dir: &Path) -> PartialConfig {
    PartialConfig {
        root_folder_id: options.var(ENV_ROOT_FOLDER),
        auth: AuthSettings {
            service_account_key: options.var(ENV_SERVICE_ACCOUNT_KEY),
            service_account_key_file: options
                .var(ENV_SERVICE_ACCOUNT_KEY_FILE)
                .map(|path| make_absolute(Path::new(&path), working_dir)),
            access_token: options.var(ENV_ACCESS_TOKEN),
            access_token_file: options
                .var(ENV_ACCESS_TOKEN_FILE)
                .map(|path| make_absolute(Path::new(&path), working_dir)),
        },
        log_filter: options.var(ENV_LOG_FILTER),
        ..PartialConfig::default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    drive: RawDrive,
    #[serde(default)]
    auth: RawAuth,
    #[serde(default)]
    endpoints: RawEndpoints,
    #[serde(default)]
    limits: RawLimits,
    #[serde(default)]
    log: RawLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDrive {
    root_folder_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAuth {
    service_account_key_file: Option<PathBuf>,
    access_token: Option<String>,
    access_token_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpoints {
    docs: Option<String>,
    drive: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLimits {
    max_content_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLog {
    filter: Option<String>,
}

impl RawConfig {
    fn into_partial(self, base_dir: &Path) -> PartialConfig {
        PartialConfig {
            root_folder_id: self.drive.root_folder_id,
            auth: AuthSettings {
                service_account_key: None,
                service_account_key_file: self
                    .auth
                    .service_account_key_file
                    .map(|path| make_absolute(&path, base_dir)),
                access_token: self.auth.access_token,
                access_token_file: self
                    .auth
                    .access_token_file
                    .map(|path| make_absolute(&path, base_dir)),
            },
            docs_endpoint: self.endpoints.docs,
            drive_endpoint: self.endpoints.drive,
            max_content_chars: self.limits.max_content_chars,
            log_filter: self.log.filter,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    root_folder_id: Option<String>,
    auth: AuthSettings,
    docs_endpoint: Option<String>,
    drive_endpoint: Option<String>,
    max_content_chars: Option<usize>,
    log_filter: Option<String>,
}

impl PartialConfig {
    fn defaults() -> Self {
        PartialConfig {
            docs_endpoint: Some(DEFAULT_DOCS_ENDPOINT.to_string()),
            drive_endpoint: Some(DEFAULT_DRIVE_ENDPOINT.to_string()),
            max_content_chars: Some(DEFAULT_MAX_CONTENT_CHARS),
            log_filter: Some(DEFAULT_LOG_FILTER.to_string()),
            ..PartialConfig::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.root_folder_id.is_none()
            && self.auth.is_empty()
            && self.docs_endpoint.is_none()
            && self.drive_endpoint.is_none()
            && self.max_content_chars.is_none()
            && self.log_filter.is_none()
    }

    fn merge(&mut self, other: PartialConfig) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.root_folder_id, other.root_folder_id);
        if !other.auth.is_empty() {
            self.auth = other.auth;
        }
        take(&mut self.docs_endpoint, other.docs_endpoint);
        take(&mut self.drive_endpoint, other.drive_endpoint);
        take(&mut self.max_content_chars, other.max_content_chars);
        take(&mut self.log_filter, other.log_filter);
    }

    fn finalize(self, sources: ConfigSources) -> Result<Config, ConfigError> {
        let max_content_chars = self.max_content_chars.unwrap_or(DEFAULT_MAX_CONTENT_CHARS);
        if max_content_chars == 0 {
            return Err(ConfigError::Validation(
                "limits.max_content_chars must be greater than 0".to_string(),
            ));
        }

        let docs = self
            .docs_endpoint
            .unwrap_or_else(|| DEFAULT_DOCS_ENDPOINT.to_string());
        let drive = self
            .drive_endpoint
            .unwrap_or_else(|| DEFAULT_DRIVE_ENDPOINT.to_string());
        for (name, url) in [("endpoints.docs", &docs), ("endpoints.drive", &drive)] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::Validation(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }

        Ok(Config {
            drive: DriveSettings {
                root_folder_id: self.root_folder_id.filter(|id| !id.trim().is_empty()),
            },
            auth: self.auth,
            endpoints: EndpointSettings { docs, drive },
            limits: LimitSettings { max_content_chars },
            log: LogSettings {
                filter: self
                    .log_filter
                    .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            },
            sources,
        })
    }
}
