//! Configuration for the policy UI service

use clap::Parser;
use policy_client::DEFAULT_BASE_URL;
use std::time::Duration;

/// Configuration for the policy UI
#[derive(Debug, Clone, Parser)]
#[command(name = "policy-ui")]
#[command(about = "Web front-end for managing insurance policies")]
pub struct Config {
    /// Base URL of the policy API (the collection lives at `{base}/policies/`)
    #[arg(long, env = "POLICY_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Address to bind the web server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Timeout for each policy API call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Output logs in JSON format
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 10,
            log_json: false,
        }
    }
}

impl Config {
    /// Parse configuration from command-line args and environment variables
    pub fn parse_config() -> Self {
        Config::parse()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
