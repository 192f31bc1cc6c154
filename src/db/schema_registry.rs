use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    NotFound(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NotFound(name) => write!(f, "Database '{}' not supported", name),
        }
    }
}

impl Error for SchemaError {}

/// A named database and the textual schema handed to the LLM.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub name: String,
    pub schema: String,
}

/// Read-only mapping from database name to schema description.
///
/// Entries keep their registration order, which is the order reported
/// by `list_names` and therefore by `/api/databases`.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            registry.register(entry.name, entry.schema);
        }
        registry
    }

    /// The demonstration databases served out of the box.
    pub fn builtin() -> Self {
        Self::new(vec![
            SchemaEntry {
                name: "HR".to_string(),
                schema: r#"
Tables:
- EMPLOYEES (employee_id, first_name, last_name, email, department_id, salary)
- DEPARTMENTS (department_id, department_name, manager_id)
- JOBS (job_id, job_title, min_salary, max_salary)
"#
                .to_string(),
            },
            SchemaEntry {
                name: "BANKING".to_string(),
                schema: r#"
Tables:
- CUSTOMERS (customer_id, name, email, phone, created_date)
- ACCOUNTS (account_id, customer_id, account_type, balance, created_date)
- TRANSACTIONS (transaction_id, account_id, amount, transaction_date, type)
"#
                .to_string(),
            },
            SchemaEntry {
                name: "MUSIC".to_string(),
                schema: r#"
Tables:
- ARTISTS (artist_id, name, genre)
- ALBUMS (album_id, artist_id, title, release_date)
- SONGS (song_id, album_id, title, duration)
"#
                .to_string(),
            },
        ])
    }

    // Later registrations of an existing name replace the schema in place.
    fn register(&mut self, name: String, schema: String) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.schema = schema,
            None => self.entries.push(SchemaEntry { name, schema }),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&str, SchemaError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.schema.as_str())
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    pub fn list_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
