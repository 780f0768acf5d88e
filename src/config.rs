use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";
const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";
const DEFAULT_SEARCH_ENDPOINT: &str = "http://127.0.0.1:8080/api/searchDocuments";

/// Full runtime configuration for the HTTP server and operator CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings consumed by the storage-triggered intake pipeline.
    pub intake: IntakeConfig,
    /// Credentials and endpoint overrides shared by the Google Cloud clients.
    pub gcp: GcpConfig,
    /// Settings consumed by the agent-facing tools.
    pub tools: ToolConfig,
    /// Optional override for the public intake server port.
    pub server_port: Option<u16>,
    /// Optional override for the loopback tool server port.
    pub tools_port: Option<u16>,
}

/// Identifiers that route an intake event to the analysis processor and record collection.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Google Cloud project that owns the processor and the database.
    pub project_id: String,
    /// Processor region, e.g. `us` or `eu`.
    pub location: String,
    /// Document AI processor identifier.
    pub processor_id: String,
    /// Firestore collection receiving extracted records.
    pub collection: String,
    /// Firestore database name.
    pub database: String,
    /// How the HTTP trigger reports failed events back to the delivery system.
    pub failure_mode: FailureMode,
}

/// Authentication source and endpoint overrides for Google Cloud REST APIs.
#[derive(Debug, Clone)]
pub struct GcpConfig {
    /// Static bearer token; when absent Application Default Credentials are used.
    pub access_token: Option<String>,
    /// Document AI endpoint override; derived from the location when absent.
    pub documentai_endpoint: Option<String>,
    /// Firestore REST endpoint.
    pub firestore_endpoint: String,
    /// Cloud Storage emulator endpoint. When set, uploads go there without credentials.
    pub storage_emulator: Option<String>,
}

/// Settings for the upload, conversion, and search tools.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Bucket receiving uploads. Checked when a tool runs, not at startup.
    pub bucket: Option<String>,
    /// Private-document search endpoint.
    pub search_endpoint: String,
}

/// Reporting policy applied by the HTTP trigger when intake fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Log and acknowledge every event; the delivery system never redelivers.
    #[default]
    Acknowledge,
    /// Answer retryable failures with a non-success status so the event is redelivered.
    Surface,
}

impl FromStr for FailureMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(Self::Acknowledge),
            "surface" => Ok(Self::Surface),
            _ => Err(()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = match optional(&lookup, "SERVER_PORT") {
            Some(value) => Some(parse_port("SERVER_PORT", &value)?),
            None => optional(&lookup, "PORT")
                .map(|value| parse_port("PORT", &value))
                .transpose()?,
        };
        let tools_port = optional(&lookup, "TOOLS_PORT")
            .map(|value| parse_port("TOOLS_PORT", &value))
            .transpose()?;

        Ok(Self {
            intake: IntakeConfig::from_lookup(&lookup)?,
            gcp: GcpConfig::from_lookup(&lookup),
            tools: ToolConfig::from_lookup(&lookup),
            server_port,
            tools_port,
        })
    }
}

impl IntakeConfig {
    /// Read the intake settings; the four identifiers are mandatory.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let failure_mode = optional(lookup, "INTAKE_FAILURE_MODE")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("INTAKE_FAILURE_MODE".into()))
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            project_id: required(lookup, "GCP_PROJECT_ID")?,
            location: required(lookup, "GCP_LOCATION")?,
            processor_id: required(lookup, "DOCAI_PROCESSOR_ID")?,
            collection: required(lookup, "FIRESTORE_COLLECTION")?,
            database: optional(lookup, "FIRESTORE_DATABASE")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
            failure_mode,
        })
    }
}

impl GcpConfig {
    /// Read credentials and endpoint overrides, applying public Google defaults.
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            access_token: optional(lookup, "GCP_ACCESS_TOKEN"),
            documentai_endpoint: optional(lookup, "DOCAI_ENDPOINT"),
            firestore_endpoint: optional(lookup, "FIRESTORE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_ENDPOINT.to_string()),
            storage_emulator: optional(lookup, "STORAGE_EMULATOR_HOST"),
        }
    }

    /// Load only the Google Cloud settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }
}

impl ToolConfig {
    /// Read tool settings. Nothing here is mandatory at startup.
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bucket: optional(lookup, "STORAGE_BUCKET_NAME"),
            search_endpoint: optional(lookup, "SEARCH_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
        }
    }

    /// Load only the tool settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Load the full configuration from the process environment.
///
/// Binaries read `.env` with `dotenvy` before initializing tracing, so by the time this runs
/// the file's values are already in the environment. The result is passed down explicitly.
pub fn load_config() -> Result<Config, ConfigError> {
    let config = Config::from_env()?;
    tracing::debug!(
        project = %config.intake.project_id,
        location = %config.intake.location,
        processor = %config.intake.processor_id,
        collection = %config.intake.collection,
        failure_mode = ?config.intake.failure_mode,
        bucket = ?config.tools.bucket,
        server_port = ?config.server_port,
        tools_port = ?config.tools_port,
        static_token = config.gcp.access_token.is_some(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const INTAKE_VARS: [(&str, &str); 4] = [
        ("GCP_PROJECT_ID", "proj"),
        ("GCP_LOCATION", "us"),
        ("DOCAI_PROCESSOR_ID", "abc123"),
        ("FIRESTORE_COLLECTION", "documents"),
    ];

    #[test]
    fn loads_required_values_and_defaults() {
        let config = Config::from_lookup(lookup_from(&INTAKE_VARS)).expect("config");
        assert_eq!(config.intake.project_id, "proj");
        assert_eq!(config.intake.database, "(default)");
        assert_eq!(config.intake.failure_mode, FailureMode::Acknowledge);
        assert_eq!(config.gcp.firestore_endpoint, DEFAULT_FIRESTORE_ENDPOINT);
        assert!(config.gcp.storage_emulator.is_none());
        assert!(config.gcp.documentai_endpoint.is_none());
        assert!(config.tools.bucket.is_none());
        assert_eq!(config.tools.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert!(config.server_port.is_none());
        assert!(config.tools_port.is_none());
    }

    #[test]
    fn missing_intake_identifier_is_reported_by_name() {
        let error = Config::from_lookup(lookup_from(&INTAKE_VARS[..3])).unwrap_err();
        assert!(
            matches!(error, ConfigError::MissingVariable(ref key) if key == "FIRESTORE_COLLECTION")
        );
    }

    #[test]
    fn blank_values_count_as_absent() {
        let mut pairs = INTAKE_VARS.to_vec();
        pairs.push(("STORAGE_BUCKET_NAME", "   "));
        pairs[0] = ("GCP_PROJECT_ID", "");
        let error = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::MissingVariable(_)));

        let tools = ToolConfig::from_lookup(&lookup_from(&pairs));
        assert!(tools.bucket.is_none());
    }

    #[test]
    fn port_falls_back_to_platform_variable() {
        let mut pairs = INTAKE_VARS.to_vec();
        pairs.push(("PORT", "8080"));
        let config = Config::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(config.server_port, Some(8080));

        pairs.push(("SERVER_PORT", "not-a-port"));
        let error = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "SERVER_PORT"));
    }

    #[test]
    fn tool_listener_port_and_storage_emulator_are_optional() {
        let mut pairs = INTAKE_VARS.to_vec();
        pairs.push(("TOOLS_PORT", "4210"));
        pairs.push(("STORAGE_EMULATOR_HOST", "http://127.0.0.1:9023"));
        let config = Config::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(config.tools_port, Some(4210));
        assert_eq!(
            config.gcp.storage_emulator.as_deref(),
            Some("http://127.0.0.1:9023")
        );

        pairs.push(("TOOLS_PORT", "70000"));
        let error = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "TOOLS_PORT"));
    }

    #[test]
    fn failure_mode_parses_known_values() {
        assert_eq!("Surface".parse::<FailureMode>(), Ok(FailureMode::Surface));
        assert_eq!(
            "acknowledge".parse::<FailureMode>(),
            Ok(FailureMode::Acknowledge)
        );
        assert!("retry".parse::<FailureMode>().is_err());

        let mut pairs = INTAKE_VARS.to_vec();
        pairs.push(("INTAKE_FAILURE_MODE", "sometimes"));
        let error = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "INTAKE_FAILURE_MODE"));
    }
}
