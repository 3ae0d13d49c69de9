use serde::Deserialize;

/// Runtime configuration, loaded from a YAML file.
///
/// Every section has a working default, so a missing config file yields a
/// usable server bound to localhost.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to (e.g. "127.0.0.1:8080")
    pub listen_addr: String,
}

/// Settings for the upstream half of the streaming proxy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream origin. Plain http only; there is no TLS
    /// support on the upstream path.
    pub base_url: String,

    /// Request targets under this prefix are proxied; the prefix is
    /// stripped before the request is forwarded.
    pub route_prefix: String,

    /// Timeout for establishing the upstream TCP connection, in seconds
    pub connect_timeout_secs: u64,

    /// Timeout for sending the request and reading the response head, in
    /// seconds. Body streaming is not subject to this timeout.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            route_prefix: "/httpbin".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads configuration from the file named by the `CONFIG_PATH`
    /// environment variable (default `config.yaml`).
    ///
    /// A missing file is not an error; defaults are used instead. The
    /// `LISTEN` environment variable, when set, overrides the configured
    /// listen address.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut cfg = match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_yaml(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };

        if let Ok(listen) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen;
        }

        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
