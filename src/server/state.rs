use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::mailer::{create_transport, MailTransport, Mailer};
use crate::render::RenderPipeline;
use crate::template::{create_template_store, TemplateResult, TemplateSource};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<dyn TemplateSource>,
    pub pipeline: Arc<RenderPipeline>,
    pub mailer: Arc<Mailer>,
    pub start_time: Instant,
}

impl AppState {
    /// Build the state from configuration, opening the configured template store
    pub async fn new(settings: Settings) -> TemplateResult<Self> {
        let templates = create_template_store(&settings.templates).await?;
        let transport = create_transport(&settings.mail);
        Ok(Self::from_parts(settings, templates, transport))
    }

    /// Build the state around an existing store and transport
    pub fn from_parts(
        settings: Settings,
        templates: Arc<dyn TemplateSource>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let pipeline = Arc::new(RenderPipeline::new(
            templates.clone(),
            settings.templates.cache_compiled,
        ));
        let mailer = Arc::new(Mailer::new(
            pipeline.clone(),
            transport,
            settings.mail.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            templates,
            pipeline,
            mailer,
            start_time: Instant::now(),
        }
    }
}
