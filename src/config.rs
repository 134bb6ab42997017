use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub whatsapp: WhatsAppConfig,
    pub ai: AiConfig,
    pub calendly: CalendlyConfig,
    pub business: BusinessConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub user: String,
    #[serde(skip_serializing)]
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

/// WhatsApp Business (Graph API) credentials and endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppConfig {
    #[serde(skip_serializing)]
    pub access_token: SecretString,
    /// Shared secret for webhook payload signatures (`X-Hub-Signature-256`).
    #[serde(skip_serializing)]
    pub app_secret: SecretString,
    pub phone_number_id: String,
    /// Token echoed back during the webhook verification handshake.
    pub verify_token: String,
    pub api_version: String,
    pub graph_base_url: String,
    /// Network timeout for outbound sends, in seconds.
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    #[serde(skip_serializing)]
    pub api_key: SecretString,
    pub model: String,
}

/// Booking links handed out during scheduling. Empty strings mean
/// "not configured"; the flow falls back to manual coordination.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CalendlyConfig {
    pub booking_link: String,
    pub morning_link: String,
    pub afternoon_link: String,
    pub evening_link: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusinessConfig {
    /// Hours of silence after which a qualified lead counts as abandoned.
    pub abandoned_lead_hours: i64,
    pub max_property_recommendations: usize,
    /// IANA timezone the leasing office operates in. Reminder hours are
    /// interpreted in this zone.
    pub timezone: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            // Override with environment variables using `LEASEBOT__` prefix and `__` separator
            // e.g., LEASEBOT__WHATSAPP__ACCESS_TOKEN="EAAG..."
            .add_source(
                config::Environment::with_prefix("LEASEBOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Rejects a configuration that is missing critical secrets. Called once
    /// at startup; a failure here must prevent the process from serving.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let mut missing = Vec::new();

        if self.whatsapp.access_token.expose_secret().is_empty() {
            missing.push("whatsapp.access_token");
        }
        if self.whatsapp.app_secret.expose_secret().is_empty() {
            missing.push("whatsapp.app_secret");
        }
        if self.whatsapp.phone_number_id.is_empty() {
            missing.push("whatsapp.phone_number_id");
        }
        if self.whatsapp.verify_token.is_empty() {
            missing.push("whatsapp.verify_token");
        }
        if self.ai.api_key.expose_secret().is_empty() {
            missing.push("ai.api_key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(config::ConfigError::Message(format!(
                "missing critical configuration: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.business
            .timezone
            .parse()
            .unwrap_or(chrono_tz::Asia::Jerusalem)
    }
}

impl DatabaseConfig {
    /// Constructs the database connection string.
    pub fn connection_string(&self) -> SecretString {
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database
        ))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: "password".to_string().into(),
            host: "localhost".to_string(),
            port: 5432,
            database: "leasebot".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new().into(),
            app_secret: String::new().into(),
            phone_number_id: String::new(),
            verify_token: String::new(),
            api_version: "v18.0".to_string(),
            graph_base_url: "https://graph.facebook.com".to_string(),
            send_timeout_secs: 10,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new().into(),
            model: "gemini-2.5-flash-lite".to_string(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            abandoned_lead_hours: 4,
            max_property_recommendations: 3,
            timezone: "Asia/Jerusalem".to_string(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use serde to serialize to pretty JSON
        // Secrets are automatically skipped due to #[serde(skip_serializing)]
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
