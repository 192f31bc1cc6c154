use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use minijinja::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::web::state::AppState;
use crate::web::templates::render_template;

// Suggested questions shown under the form for each built-in database.
const EXAMPLE_QUESTIONS: &[(&str, &[&str])] = &[
    (
        "HR",
        &[
            "Show me all employees in the Sales department",
            "Find employees with salary greater than 50000",
            "List top 10 highest paid employees",
        ],
    ),
    (
        "BANKING",
        &[
            "Show all transactions for customer ID 123",
            "Find accounts with balance > 10000",
            "List transactions from last 30 days",
        ],
    ),
    (
        "MUSIC",
        &[
            "Show all albums by artist ID 5",
            "List songs longer than 5 minutes",
            "Find the most recent albums",
        ],
    ),
];

pub fn example_questions(database: &str) -> &'static [&'static str] {
    EXAMPLE_QUESTIONS
        .iter()
        .find(|(name, _)| *name == database)
        .map(|(_, questions)| *questions)
        .unwrap_or(&[])
}

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let databases = state.query.registry().list_names();
    let examples: BTreeMap<&str, &[&str]> = databases
        .iter()
        .map(|name| (name.as_str(), example_questions(name)))
        .collect();

    let mut context = HashMap::new();
    context.insert("databases", Value::from_serialize(&databases));
    context.insert("examples", Value::from_serialize(&examples));
    context.insert("model", Value::from(state.query.model()));
    context.insert("version", Value::from(env!("CARGO_PKG_VERSION")));

    match render_template(&state.template_env, "index.html", context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("<h1>Text2SQL</h1><p>{}</p>", e)))
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::Unreachable;
    use crate::web::{app, test_state};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    #[test]
    fn every_builtin_database_has_examples() {
        for name in ["HR", "BANKING", "MUSIC"] {
            assert_eq!(example_questions(name).len(), 3);
        }
        assert!(example_questions("UNKNOWN").is_empty());
    }

    #[tokio::test]
    async fn index_lists_databases() {
        let router = app(test_state(Box::new(Unreachable)));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        for name in ["HR", "BANKING", "MUSIC"] {
            assert!(html.contains(&format!("<option value=\"{}\"", name)));
        }
        assert!(html.contains("Find accounts with balance"));
    }

    #[tokio::test]
    async fn static_assets_are_served() {
        let router = app(test_state(Box::new(Unreachable)));

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));

        let response = router
            .oneshot(Request::builder().uri("/static/missing.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
