use std::time::Duration;

/// Cookie carrying a verified ID token for browser clients.
pub const TOKEN_COOKIE_NAME: &str = "swagger_token";

/// Values shipped in sample env files; treated as "not configured".
const PLACEHOLDER_POOL_ID: &str = "your-user-pool-id";
const PLACEHOLDER_CLIENT_ID: &str = "your-app-client-id";

/// Cognito user pool the ID tokens are issued by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub app_client_id: String,
}

impl CognitoConfig {
    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }
}

/// Whether requests are verified, and against which pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    Cognito(CognitoConfig),
    /// Every request is let through as a development user.
    Disabled { reason: &'static str },
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_max_age: Duration,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `COGNITO_USER_POOL_ID`: Cognito user pool id
    /// - `COGNITO_APP_CLIENT_ID`: Cognito app client id (the token audience)
    /// - `AWS_REGION`: Region of the user pool (default: `us-east-1`)
    /// - `DISABLE_AUTH`: `true` disables verification, honoured in `development` only
    /// - `APP_ENV` / `NODE_ENV`: Application environment (default: `development`)
    /// - `COOKIE_SECURE`: Whether to set the secure flag on cookies (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let disable_auth = lookup("DISABLE_AUTH").is_some_and(|v| v == "true");

        let configured = |name: &str, placeholder: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != placeholder)
        };
        let user_pool_id = configured("COGNITO_USER_POOL_ID", PLACEHOLDER_POOL_ID);
        let app_client_id = configured("COGNITO_APP_CLIENT_ID", PLACEHOLDER_CLIENT_ID);

        let mode = match (user_pool_id, app_client_id) {
            _ if environment == "development" && disable_auth => AuthMode::Disabled {
                reason: "DISABLE_AUTH is set in development",
            },
            (Some(user_pool_id), Some(app_client_id)) => AuthMode::Cognito(CognitoConfig {
                region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                user_pool_id,
                app_client_id,
            }),
            _ => AuthMode::Disabled {
                reason: "Cognito user pool or app client is not configured",
            },
        };

        let cookie_secure = lookup("COOKIE_SECURE").is_some_and(|v| v == "true" || v == "1");

        Self {
            mode,
            cookie_name: TOKEN_COOKIE_NAME.to_string(),
            cookie_secure,
            cookie_max_age: Duration::from_secs(60 * 60),
        }
    }

    /// Configuration with verification turned off.
    pub fn disabled() -> Self {
        Self {
            mode: AuthMode::Disabled {
                reason: "disabled explicitly",
            },
            cookie_name: TOKEN_COOKIE_NAME.to_string(),
            cookie_secure: false,
            cookie_max_age: Duration::from_secs(60 * 60),
        }
    }
}
