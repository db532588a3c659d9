use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Cookie carrying the signed session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Product name shown in subjects and message footers
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Upper bound for a single transport call, in seconds
    #[serde(default = "default_channel_timeout")]
    pub channel_timeout_secs: u64,
    /// Maximum length of free-text fields embedded in outbound messages
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

/// Email provider settings. The transport is unconfigured unless both
/// `api_key` and `from_address` are present.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: Option<String>,
}

/// SMS gateway settings. The transport is unconfigured unless both
/// `api_key` and `from_number` are present.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_api_url")]
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// JSON file preloading users, animals and contact preferences
    pub seed_path: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_app_name() -> String {
    "PawTrack".to_string()
}

fn default_channel_timeout() -> u64 {
    8 // seconds
}

fn default_max_text_len() -> usize {
    300
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_sms_api_url() -> String {
    "https://sms.example.invalid/v1/messages".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("session.cookie_name", default_cookie_name())?
            .set_default("notifications.app_name", default_app_name())?
            .set_default("notifications.channel_timeout_secs", default_channel_timeout() as i64)?
            .set_default("notifications.max_text_len", default_max_text_len() as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, JWT__SECRET, EMAIL__API_KEY, SMS__FROM_NUMBER, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            channel_timeout_secs: default_channel_timeout(),
            max_text_len: default_max_text_len(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: default_email_api_url(),
            api_key: None,
            from_address: None,
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_url: default_sms_api_url(),
            api_key: None,
            from_number: None,
        }
    }
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        has_value(&self.api_key) && has_value(&self.from_address)
    }
}

impl SmsConfig {
    pub fn is_configured(&self) -> bool {
        has_value(&self.api_key) && has_value(&self.from_number)
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
