use callshield_core::passcode::PepperSet;

/// Server configuration loaded from environment variables.
///
/// All fields except the pepper set have sensible defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Versioned passcode peppers; misconfiguration is fatal at startup.
    pub peppers: PepperSet,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `PASSCODE_PEPPERS`        | required (`"1:secret,…"`)  |
    /// | `PASSCODE_PEPPER_VERSION` | required                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let pepper_spec =
            std::env::var("PASSCODE_PEPPERS").expect("PASSCODE_PEPPERS must be set");
        let pepper_version: i32 = std::env::var("PASSCODE_PEPPER_VERSION")
            .expect("PASSCODE_PEPPER_VERSION must be set")
            .parse()
            .expect("PASSCODE_PEPPER_VERSION must be a valid i32");
        let peppers = PepperSet::parse(&pepper_spec, pepper_version)
            .expect("PASSCODE_PEPPERS is malformed");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            peppers,
        }
    }
}
