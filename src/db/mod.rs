// Static schema descriptions and the stand-in executor. Nothing in here
// opens a real database connection.
pub mod executor;
pub mod schema_registry;
