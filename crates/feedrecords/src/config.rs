use std::env;

use feedrecords_auth::AuthConfig;

/// Application configuration loaded once from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application environment (default: "development")
    pub environment: String,
    /// DynamoDB table holding the records
    pub table_name: Option<String>,
    /// AWS region (default: "us-east-1")
    pub aws_region: String,
    /// Endpoint override for a local DynamoDB
    pub aws_endpoint_url: Option<String>,
    /// Log output format, `json` or anything else for human-readable
    pub log_format: String,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APP_ENV` / `NODE_ENV` - Application environment (default: "development")
    /// - `TABLE_NAME` - DynamoDB table name (required by the `dynamodb` backend)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - DynamoDB endpoint override
    /// - `LOG_FORMAT` - `json` for JSON logs (default: "pretty")
    /// - Cognito variables, see [`AuthConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            environment: non_empty("APP_ENV")
                .or_else(|| non_empty("NODE_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            table_name: non_empty("TABLE_NAME"),
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            log_format: non_empty("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            auth: AuthConfig::from_lookup(&lookup),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
