use crate::query::QueryService;
use crate::web::templates::init_templates;
use minijinja::Environment;

/// Shared application state for the web server
pub struct AppState {
    pub query: QueryService,
    pub template_env: Environment<'static>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(query: QueryService) -> Self {
        Self {
            query,
            template_env: init_templates(),
            startup_time: chrono::Utc::now(),
        }
    }
}
