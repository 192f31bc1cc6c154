use minijinja::Environment;
use std::collections::HashMap;
use tracing::error;

pub fn init_templates() -> Environment<'static> {
    let mut env = Environment::new();

    // Register built-in templates
    env.add_template("index.html", include_str!("../../templates/index.html"))
        .expect("Failed to add index template");

    env.add_filter("json", |value: minijinja::value::Value| {
        serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
    });

    env
}

pub fn render_template(
    env: &Environment,
    template_name: &str,
    context: HashMap<&str, minijinja::value::Value>,
) -> Result<String, String> {
    match env.get_template(template_name) {
        Ok(tmpl) => tmpl.render(context).map_err(|e| {
            error!("Template render error: {}", e);
            format!("Template error: {}", e)
        }),
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            Err(format!("Template not found: {}", template_name))
        }
    }
}
