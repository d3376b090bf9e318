mod settings;

pub use settings::{MailConfig, OtelConfig, ServerConfig, Settings, TemplatesConfig};
