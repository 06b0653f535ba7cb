use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration, read from the environment with defaults
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Holds `names.json` and the `pictures/` directory
    pub data_dir: PathBuf,
    /// Where staged profile pictures are copied to
    pub draft_dir: PathBuf,
    pub email_domain: String,
    pub max_batch_size: u32,
    pub max_email_attempts: u32,
    /// Fixed seed for reproducible batches; random when unset
    pub seed: Option<u64>,
    pub database_url: Option<String>,
    /// Print an admin token to stderr at startup
    pub print_admin_token: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            data_dir: PathBuf::from("data"),
            draft_dir: PathBuf::from("drafts"),
            email_domain: "example.com".to_string(),
            max_batch_size: 1000,
            max_email_attempts: 10_000,
            seed: None,
            database_url: None,
            print_admin_token: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; unparsable
    /// values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("USERGEN_BIND_ADDR").unwrap_or(defaults.bind_addr),
            data_dir: lookup("USERGEN_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            draft_dir: lookup("USERGEN_DRAFT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.draft_dir),
            email_domain: lookup("USERGEN_EMAIL_DOMAIN").unwrap_or(defaults.email_domain),
            max_batch_size: parse_or(&lookup, "USERGEN_MAX_BATCH", defaults.max_batch_size),
            max_email_attempts: parse_or(
                &lookup,
                "USERGEN_MAX_EMAIL_ATTEMPTS",
                defaults.max_email_attempts,
            ),
            seed: lookup("USERGEN_SEED").and_then(|s| s.parse().ok()),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            print_admin_token: lookup("USERGEN_PRINT_ADMIN_TOKEN")
                .is_some_and(|s| matches!(s.trim(), "1" | "true" | "yes")),
        }
    }

    pub fn names_path(&self) -> PathBuf {
        self.data_dir.join("names.json")
    }

    pub fn pictures_dir(&self) -> PathBuf {
        self.data_dir.join("pictures")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}
