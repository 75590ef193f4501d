//! Client configuration.

use crate::logging::LogLevel;
use parley_consent::{HttpLogConfig, PreferencesConfig};
use parley_types::{ParleyError, ParleyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network the client connects to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    #[default]
    Dev,
    Production,
}

impl Environment {
    /// Gateway host for this environment.
    pub fn host(&self) -> &'static str {
        match self {
            Self::Local => "localhost:5556",
            Self::Dev => "gateway.dev.parley.im",
            Self::Production => "gateway.parley.im",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

/// How to reach the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOptions {
    pub env: Environment,

    /// Use TLS. Off only for local development.
    pub is_secure: bool,

    /// Reported to the gateway for diagnostics.
    pub app_version: Option<String>,

    /// Overrides the environment's gateway host.
    pub gateway_host: Option<String>,

    /// Whole-request timeout for gateway calls, in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            is_secure: true,
            app_version: None,
            gateway_host: None,
            timeout_secs: 30,
        }
    }
}

impl ApiOptions {
    pub fn local() -> Self {
        Self {
            env: Environment::Local,
            is_secure: false,
            ..Self::default()
        }
    }

    /// Base URL of the gateway, honouring `gateway_host` and `is_secure`.
    pub fn base_url(&self) -> String {
        let host = self.gateway_host.as_deref().unwrap_or(self.env.host());
        if host.starts_with("http://") || host.starts_with("https://") {
            return host.trim_end_matches('/').to_string();
        }
        format!("{}://{host}", self.scheme())
    }

    fn scheme(&self) -> &'static str {
        if self.is_secure { "https" } else { "http" }
    }

    /// Key under which connections are shared: every field that changes
    /// which backend is reached or how.
    pub fn cache_key(&self) -> String {
        format!(
            "{}://{}|{}|{}|{}",
            self.scheme(),
            self.env.host(),
            self.is_secure,
            self.app_version.as_deref().unwrap_or("nil"),
            self.gateway_host.as_deref().unwrap_or("nil"),
        )
    }

    pub fn http_log_config(&self) -> HttpLogConfig {
        HttpLogConfig {
            base_url: self.base_url(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Everything [`crate::Client::create`] needs besides the native engine and
/// key material.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    pub api: ApiOptions,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// Installs a global log subscriber at this level when set.
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

impl ClientOptions {
    pub fn from_json(json: &str) -> ParleyResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| ParleyError::Config(format!("invalid client options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ParleyResult<()> {
        if self.api.timeout_secs == 0 {
            return Err(ParleyError::Config("api timeout must be at least 1 second".into()));
        }
        if self.preferences.page_size == 0 {
            return Err(ParleyError::Config("preferences page_size must be at least 1".into()));
        }
        if let Some(host) = &self.api.gateway_host {
            if host.trim().is_empty() {
                return Err(ParleyError::Config("gateway_host must not be blank".into()));
            }
        }
        Ok(())
    }
}
