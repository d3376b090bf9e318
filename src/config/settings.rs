use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Storage backend: "file" or "memory"
    #[serde(default = "default_templates_backend")]
    pub backend: String,
    /// Directory holding `catalog.json` and the markup files
    #[serde(default = "default_templates_root")]
    pub root: String,
    /// Keep compiled templates in memory after the first render
    #[serde(default = "default_cache_compiled")]
    pub cache_compiled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Delivery backend: "log" or "memory"
    #[serde(default = "default_mail_transport")]
    pub transport: String,
    /// Sender address used when the current user has no email
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default)]
    pub from_name: Option<String>,
    /// Form field holding the subject line
    #[serde(default = "default_subject_field")]
    pub subject_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Trace sampling ratio (0.0-1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_templates_backend() -> String {
    "file".to_string()
}

fn default_templates_root() -> String {
    "templates".to_string()
}

fn default_cache_compiled() -> bool {
    true
}

fn default_mail_transport() -> String {
    "log".to_string()
}

fn default_from_address() -> String {
    "no-reply@localhost".to_string()
}

fn default_subject_field() -> String {
    "subjectLine".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "mail-composer".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("templates.backend", default_templates_backend())?
            .set_default("templates.root", default_templates_root())?
            .set_default("mail.transport", default_mail_transport())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // MAILER__SERVER__PORT, MAILER__TEMPLATES__ROOT, MAILER__MAIL__TRANSPORT, etc.
            .add_source(
                Environment::with_prefix("MAILER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
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
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            backend: default_templates_backend(),
            root: default_templates_root(),
            cache_compiled: default_cache_compiled(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: default_mail_transport(),
            from_address: default_from_address(),
            from_name: None,
            subject_field: default_subject_field(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
