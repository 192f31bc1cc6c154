use regex::Regex;
use std::sync::LazyLock;

// First fenced block. The opening fence may carry `sql` (same line or not)
// or any other language tag that ends its line.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:(?i:sql)\b|[A-Za-z]*[ \t]*\n)?(.*?)```").unwrap()
});

pub fn system_prompt(database: &str, schema: &str) -> String {
    format!(
        r#"You are an expert SQL developer. Convert natural language questions to SQL queries.
Database: {}
Schema Information:
{}

Rules:
1. Generate only valid SQL queries
2. Use appropriate JOINs when needed
3. Include WHERE clauses for filters
4. Use proper aliases for tables
5. Optimize for readability
6. Return only the SQL query, no explanations in the query itself"#,
        database, schema
    )
}

pub fn user_message(question: &str, context: Option<&str>) -> String {
    let mut message = format!("Question: {}", question);
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        message.push_str("\n\nAdditional Context: ");
        message.push_str(context);
    }
    message
}

pub fn explanation(question: &str, database: &str) -> String {
    format!("Converted '{}' to SQL query for {} database", question, database)
}

/// Pulls the query out of a model reply, unwrapping a Markdown code fence
/// when the model added one.
pub fn extract_sql(content: &str) -> String {
    if let Some(caps) = FENCED_BLOCK.captures(content) {
        return caps[1].trim().to_string();
    }

    content.trim().to_string()
}
