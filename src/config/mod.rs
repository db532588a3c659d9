mod settings;

pub use settings::{
    DataConfig, EmailConfig, JwtConfig, NotificationConfig, ServerConfig, SessionConfig, Settings,
    SmsConfig,
};
