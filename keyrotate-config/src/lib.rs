//! Configuration management for the key rotation job
//!
//! Configuration is read once at startup from a `.env` file (if present) and
//! the process environment. Missing required variables fail here, before any
//! call to KMS or Secrets Manager is made.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TARGET_USER_VAR: &str = "TARGET_SNOWFLAKE_USER";
pub const KMS_KEY_ARN_VAR: &str = "TARGET_AWS_KMS_ARN";
pub const KEY_SOURCE_VAR: &str = "KEY_SOURCE";
pub const SECRET_NAMESPACE_VAR: &str = "SECRET_NAMESPACE";
pub const AWS_REGION_VAR: &str = "AWS_REGION";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Namespace the secret names are rooted under when none is configured.
pub const DEFAULT_SECRET_NAMESPACE: &str = "snowflake_service_accounts";

const KNOWN_VARS: [&str; 7] = [
    TARGET_USER_VAR,
    KMS_KEY_ARN_VAR,
    KEY_SOURCE_VAR,
    SECRET_NAMESPACE_VAR,
    AWS_REGION_VAR,
    LOG_LEVEL_VAR,
    LOG_FORMAT_VAR,
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?} (expected {expected})")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),
}

/// Where the key pair is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySourceKind {
    /// AWS KMS `GenerateDataKeyPair`
    #[default]
    Kms,
    /// In-process RSA generation
    Local,
}

impl FromStr for KeySourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kms" => Ok(KeySourceKind::Kms),
            "local" => Ok(KeySourceKind::Local),
            _ => Err(ConfigError::Invalid {
                var: KEY_SOURCE_VAR,
                value: s.to_string(),
                expected: "kms or local",
            }),
        }
    }
}

impl fmt::Display for KeySourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySourceKind::Kms => f.write_str("kms"),
            KeySourceKind::Local => f.write_str("local"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable (for development)
    #[default]
    Console,
    /// JSON lines (for production)
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::Invalid {
                var: LOG_FORMAT_VAR,
                value: s.to_string(),
                expected: "console or json",
            }),
        }
    }
}

/// Raw view of the environment; keys are lowercased by `config::Environment`.
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    target_snowflake_user: Option<String>,
    target_aws_kms_arn: Option<String>,
    key_source: Option<String>,
    secret_namespace: Option<String>,
    aws_region: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
}

/// Rotation job configuration
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Warehouse user whose key pair is rotated
    pub target_user: String,
    /// KMS key id or ARN (required for the KMS key source)
    pub kms_key_arn: Option<String>,
    pub key_source: KeySourceKind,
    pub secret_namespace: String,
    pub aws_region: Option<String>,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
}

impl RotationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_map(known_vars(env::vars_os())?)
    }

    /// Load configuration from an explicit variable map
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let raw: RawEnv = config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()?
            .try_deserialize()?;

        let target_user = non_empty(raw.target_snowflake_user)
            .ok_or(ConfigError::Missing(TARGET_USER_VAR))?;

        let key_source = match non_empty(raw.key_source) {
            Some(value) => value.parse()?,
            None => KeySourceKind::default(),
        };

        let kms_key_arn = non_empty(raw.target_aws_kms_arn);
        if key_source == KeySourceKind::Kms && kms_key_arn.is_none() {
            return Err(ConfigError::Missing(KMS_KEY_ARN_VAR));
        }

        let log_format = match non_empty(raw.log_format) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            target_user,
            kms_key_arn,
            key_source,
            secret_namespace: non_empty(raw.secret_namespace)
                .unwrap_or_else(|| DEFAULT_SECRET_NAMESPACE.to_string()),
            aws_region: non_empty(raw.aws_region),
            log_level: non_empty(raw.log_level),
            log_format,
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Keep only the variables this job reads. Unrelated variables may hold
/// anything; a known one must be valid Unicode.
fn known_vars<I>(vars: I) -> Result<HashMap<String, String>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut known = HashMap::new();
    for (key, value) in vars {
        let Some(var) = key
            .to_str()
            .and_then(|k| KNOWN_VARS.iter().copied().find(|v| *v == k))
        else {
            continue;
        };
        let value = value.into_string().map_err(|v| ConfigError::Invalid {
            var,
            value: v.to_string_lossy().into_owned(),
            expected: "valid Unicode",
        })?;
        known.insert(var.to_string(), value);
    }
    Ok(known)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = RotationConfig::from_map(vars(&[
            (TARGET_USER_VAR, "ALICE"),
            (KMS_KEY_ARN_VAR, "arn:aws:kms:us-east-1:111122223333:key/abcd"),
        ]))
        .unwrap();

        assert_eq!(config.target_user, "ALICE");
        assert_eq!(config.key_source, KeySourceKind::Kms);
        assert_eq!(config.secret_namespace, DEFAULT_SECRET_NAMESPACE);
        assert_eq!(config.log_format, LogFormat::Console);
        assert_eq!(config.log_level(), "info");
        assert!(config.aws_region.is_none());
    }

    #[test]
    fn test_missing_user_is_rejected() {
        let err = RotationConfig::from_map(vars(&[(KMS_KEY_ARN_VAR, "key")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TARGET_USER_VAR)));
    }

    #[test]
    fn test_empty_user_counts_as_missing() {
        let err = RotationConfig::from_map(vars(&[
            (TARGET_USER_VAR, "  "),
            (KMS_KEY_ARN_VAR, "key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TARGET_USER_VAR)));
    }

    #[test]
    fn test_kms_source_requires_key_arn() {
        let err = RotationConfig::from_map(vars(&[(TARGET_USER_VAR, "ALICE")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(KMS_KEY_ARN_VAR)));
    }

    #[test]
    fn test_local_source_needs_no_key_arn() {
        let config = RotationConfig::from_map(vars(&[
            (TARGET_USER_VAR, "ALICE"),
            (KEY_SOURCE_VAR, "Local"),
            (SECRET_NAMESPACE_VAR, "svc"),
            (LOG_FORMAT_VAR, "json"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.key_source, KeySourceKind::Local);
        assert!(config.kms_key_arn.is_none());
        assert_eq!(config.secret_namespace, "svc");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_invalid_key_source_is_rejected() {
        let err = RotationConfig::from_map(vars(&[
            (TARGET_USER_VAR, "ALICE"),
            (KEY_SOURCE_VAR, "hsm"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: KEY_SOURCE_VAR,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_log_format_is_rejected() {
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_environment_is_tolerated() {
        use std::os::unix::ffi::OsStringExt;

        let not_unicode = || OsString::from_vec(vec![0x66, 0x6f, 0x80]);
        let env = vec![
            (OsString::from(TARGET_USER_VAR), OsString::from("ALICE")),
            (OsString::from("UNRELATED_BLOB"), not_unicode()),
            (not_unicode(), OsString::from("x")),
        ];
        let known = known_vars(env).unwrap();
        assert_eq!(known, vars(&[(TARGET_USER_VAR, "ALICE")]));

        let env = vec![(OsString::from(TARGET_USER_VAR), not_unicode())];
        let err = known_vars(env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: TARGET_USER_VAR,
                ..
            }
        ));
    }
}
