/// Tracker API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Where mark-as-viewed requests redirect when there is no `Referer`.
    pub fallback_redirect: String,
    /// Request header carrying the user id, set by the upstream identity
    /// provider. Requests without it are anonymous.
    pub identity_header: String,
    /// Maximum connections in the database pool.
    pub db_pool_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_var("DATABASE_URL"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4010),
            fallback_redirect: std::env::var("FALLBACK_REDIRECT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            identity_header: std::env::var("IDENTITY_HEADER")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_else(|| "x-user-id".to_string()),
            db_pool_size: std::env::var("DB_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

/// Point a database URL at its `_test` sibling database.
///
/// `postgres://host/viewtracker?sslmode=disable` becomes
/// `postgres://host/viewtracker_test?sslmode=disable`. URLs already naming a
/// `_test` database are returned unchanged.
pub fn with_test_db_suffix(database_url: &str) -> String {
    let mut parts = database_url.splitn(2, '?');
    let base = parts.next().unwrap_or(database_url);
    let query = parts.next();

    let mut base_parts = base.rsplitn(2, '/');
    let db_name = base_parts.next().unwrap_or("");
    let prefix = base_parts.next().unwrap_or("");

    if db_name.is_empty() || db_name.ends_with("_test") {
        return database_url.to_string();
    }

    let mut updated = format!("{prefix}/{db_name}_test");
    if let Some(query) = query {
        updated.push('?');
        updated.push_str(query);
    }
    updated
}
