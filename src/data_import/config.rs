use std::str::FromStr;

use anyhow::{anyhow, Error};

use crate::data_import::data_set::{ID_MERCHANT, URL};
use crate::normalization::glossary_key::DEFAULT_GLOSSARY_KEY_PREFIX;
use crate::util::env::{env_list, env_opt, env_parse};

const GLOSSARY_KEY_PREFIX_ENV: &str = "MERCHANT_GLOSSARY_KEY_PREFIX";
const URL_ATTRIBUTE_ENV: &str = "MERCHANT_URL_ATTRIBUTE";
const REQUIRED_KEYS_ENV: &str = "MERCHANT_REQUIRED_KEYS";
const ERROR_POLICY_ENV: &str = "MERCHANT_IMPORT_ERROR_POLICY";

/// Settings of the merchant profile writer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub glossary_key_prefix: String,
    /// Localized attribute stored as a URL row instead of a glossary translation.
    pub url_attribute: String,
    /// Data set keys that must be present and non-blank.
    pub required_keys: Vec<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            glossary_key_prefix: DEFAULT_GLOSSARY_KEY_PREFIX.to_string(),
            url_attribute: URL.to_string(),
            required_keys: vec![ID_MERCHANT.to_string()],
        }
    }
}

impl WriterConfig {
    /// Defaults overridden by `MERCHANT_GLOSSARY_KEY_PREFIX`, `MERCHANT_URL_ATTRIBUTE`
    /// and `MERCHANT_REQUIRED_KEYS` (comma-separated).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            glossary_key_prefix: env_opt(GLOSSARY_KEY_PREFIX_ENV)
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.glossary_key_prefix),
            url_attribute: env_opt(URL_ATTRIBUTE_ENV)
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.url_attribute),
            required_keys: env_list(REQUIRED_KEYS_ENV).unwrap_or(defaults.required_keys),
        }
    }
}

/// What the importer does when a data set fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure and return it.
    #[default]
    Abort,
    /// Log the failure, count it in the report and continue.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "abort" | "throw" => Ok(ErrorPolicy::Abort),
            "skip" | "continue" => Ok(ErrorPolicy::Skip),
            other => Err(anyhow!("unknown error policy '{other}' (expected abort|skip)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImporterConfig {
    pub writer: WriterConfig,
    pub error_policy: ErrorPolicy,
}

impl ImporterConfig {
    pub fn from_env() -> Self {
        Self {
            writer: WriterConfig::from_env(),
            error_policy: env_parse(ERROR_POLICY_ENV, ErrorPolicy::default()),
        }
    }
}
