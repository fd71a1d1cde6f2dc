use anyhow::{Context, Result};
use clap::Parser;
use recipe_store::{pipeline, Settings};
use recipe_types::UNKNOWN_ERROR;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Recipe CSV Import
///
/// Loads the users, reviews and recipes CSV files into staging tables,
/// rebuilds the normalized tables from them and prints a summary. Flags
/// override `import.toml` and the environment.
#[derive(Parser, Debug)]
#[command(name = "recipe-import")]
#[command(about = "Import recipe CSV files into a normalized database", long_about = None)]
struct Args {
    /// Database URL or path (`recipes.db`, `sqlite://recipes.db`, `:memory:`)
    #[arg(short, long)]
    database: Option<String>,

    /// Users CSV file
    #[arg(long)]
    users: Option<PathBuf>,

    /// Reviews CSV file
    #[arg(long)]
    reviews: Option<PathBuf>,

    /// Recipes CSV file
    #[arg(long)]
    recipes: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.database {
            settings.database.url = url.clone();
        }
        if let Some(path) = &self.users {
            settings.sources.users = Some(path.clone());
        }
        if let Some(path) = &self.reviews {
            settings.sources.reviews = Some(path.clone());
        }
        if let Some(path) = &self.recipes {
            settings.sources.recipes = Some(path.clone());
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_store=info,recipe_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut settings = Settings::new().context("Failed to load settings")?;
    args.apply(&mut settings);

    tracing::info!("Importing into {}", settings.database.url);
    let summary = pipeline::run(&settings);

    if args.json {
        println!(
            "{}",
            summary.to_json().context("Failed to serialize summary")?
        );
    } else {
        println!("{}", summary);
    }

    // A failed import still exits cleanly once its summary is printed
    if !summary.success {
        eprintln!(
            "Error: {}",
            summary.error_message.as_deref().unwrap_or(UNKNOWN_ERROR)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings::load(|_| None).expect("Failed to load defaults")
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "recipe-import",
            "--database",
            "sqlite::memory:",
            "--reviews",
            "/tmp/reviews.csv",
            "--json",
        ]);
        let mut settings = base_settings();
        let users_before = settings.sources.users.clone();
        args.apply(&mut settings);

        assert_eq!(settings.database.url, "sqlite::memory:");
        assert_eq!(
            settings.sources.reviews,
            Some(PathBuf::from("/tmp/reviews.csv"))
        );
        assert_eq!(settings.sources.users, users_before);
        assert!(args.json);
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let args = Args::parse_from(["recipe-import"]);
        let mut settings = base_settings();
        let url_before = settings.database.url.clone();
        args.apply(&mut settings);

        assert_eq!(settings.database.url, url_before);
        assert!(!args.json);
    }

    #[test]
    fn test_memory_run_without_sources_fails_cleanly() {
        let mut settings = base_settings();
        Args::parse_from([
            "recipe-import",
            "--database",
            ":memory:",
            "--users",
            "/nonexistent/user.csv",
        ])
        .apply(&mut settings);

        let summary = pipeline::run(&settings);
        assert!(!summary.success);
        assert!(summary.to_string().starts_with("Import failed: "));
    }
}
