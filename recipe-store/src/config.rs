use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variables that override file settings, highest priority last
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("DATABASE_URL", "database.url"),
    ("USERS_CSV", "sources.users"),
    ("REVIEWS_CSV", "sources.reviews"),
    ("RECIPES_CSV", "sources.recipes"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// File path, `sqlite://<path>`, `sqlite::memory:` or `:memory:`
    pub url: String,
}

/// Locations of the three CSV inputs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sources {
    pub users: Option<PathBuf>,
    pub reviews: Option<PathBuf>,
    pub recipes: Option<PathBuf>,
}

impl Sources {
    /// Log a warning for every configured file that does not exist.
    /// The load is still attempted later and fails there.
    pub fn warn_missing(&self) {
        let configured = [
            ("users", &self.users),
            ("reviews", &self.reviews),
            ("recipes", &self.recipes),
        ];
        for (label, path) in configured {
            if let Some(path) = path {
                if !path.exists() {
                    tracing::warn!("{} CSV does not exist: {}", label, path.display());
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub sources: Sources,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Build settings from defaults, optional `import.toml` files and the
    /// given environment lookup.
    pub fn load<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("database.url", "recipes.db")?
            .set_default("sources.users", "data/user.csv")?
            .set_default("sources.reviews", "data/reviews.csv")?
            .set_default("sources.recipes", "data/recipes.csv")?;

        let config_file_name = "import.toml";

        // Check in current directory
        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in recipe-import directory (for development)
        let dev_path = Path::new("recipe-import").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }
}
