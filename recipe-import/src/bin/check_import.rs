// Diagnostic: print the row counts of an imported database and check the
// split-out tables against the staging rows they came from.
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeSet;

use recipe_store::db::repositories::{
    FollowRepository, RecipeRepository, ReviewRepository, StagingRepository, UserRepository,
};
use recipe_store::db::Database;
use recipe_store::{report, tokens, Settings};
use recipe_types::{Favorite, FinalTable, FollowEdge, Like};

#[derive(Parser, Debug)]
#[command(name = "check-import")]
#[command(about = "Verify an imported recipe database", long_about = None)]
struct Args {
    /// Database URL or path, defaults to the configured one
    #[arg(short, long)]
    database: Option<String>,

    /// Only print the counts of these tables
    #[arg(short, long)]
    table: Vec<String>,
}

impl Args {
    fn tables(&self) -> Result<Vec<FinalTable>> {
        if self.table.is_empty() {
            return Ok(FinalTable::ALL.to_vec());
        }
        self.table
            .iter()
            .map(|name| {
                FinalTable::parse(name).with_context(|| format!("Unknown table '{}'", name))
            })
            .collect()
    }
}

/// Outcome of one verification
#[derive(Debug, PartialEq, Eq)]
struct Check {
    table: FinalTable,
    expected: usize,
    missing: usize,
    unexpected: usize,
}

impl Check {
    fn compare<T: Ord>(table: FinalTable, expected: BTreeSet<T>, actual: BTreeSet<T>) -> Self {
        Self {
            table,
            expected: expected.len(),
            missing: expected.difference(&actual).count(),
            unexpected: actual.difference(&expected).count(),
        }
    }

    fn passed(&self) -> bool {
        self.missing == 0 && self.unexpected == 0
    }
}

/// Every staged author becomes exactly one user
fn check_users(db: &Database) -> Result<Check> {
    let expected: BTreeSet<i64> = StagingRepository::new(db.pool.clone())
        .user_lists()?
        .into_iter()
        .map(|u| u.author_id)
        .collect();
    let actual: BTreeSet<i64> = UserRepository::new(db.pool.clone())
        .list_ids()?
        .into_iter()
        .collect();
    Ok(Check::compare(FinalTable::Users, expected, actual))
}

fn check_follow(db: &Database) -> Result<Check> {
    let staged = StagingRepository::new(db.pool.clone()).user_lists()?;
    let expected = tokens::follow_edges(
        staged
            .iter()
            .map(|u| (u.author_id, u.following.as_deref(), u.followers.as_deref())),
    );
    let actual: BTreeSet<FollowEdge> = FollowRepository::new(db.pool.clone())
        .all_edges()?
        .into_iter()
        .collect();
    Ok(Check::compare(FinalTable::Follow, expected, actual))
}

fn check_likes(db: &Database) -> Result<Check> {
    let staged = StagingRepository::new(db.pool.clone()).review_likes()?;
    let expected: BTreeSet<Like> = staged
        .iter()
        .flat_map(|(review_id, likes)| {
            tokens::parse_id_list(likes.as_deref().unwrap_or(""))
                .into_iter()
                .map(move |author_id| Like {
                    review_id: *review_id,
                    author_id,
                })
        })
        .collect();
    let actual: BTreeSet<Like> = ReviewRepository::new(db.pool.clone())
        .all_likes()?
        .into_iter()
        .collect();
    Ok(Check::compare(FinalTable::Likes, expected, actual))
}

fn check_favorites(db: &Database) -> Result<Check> {
    let staged = StagingRepository::new(db.pool.clone()).recipe_favorites()?;
    let expected: BTreeSet<Favorite> = staged
        .iter()
        .flat_map(|(recipe_id, users)| {
            tokens::parse_id_list(users.as_deref().unwrap_or(""))
                .into_iter()
                .map(move |author_id| Favorite {
                    recipe_id: *recipe_id,
                    author_id,
                })
        })
        .collect();
    let actual: BTreeSet<Favorite> = RecipeRepository::new(db.pool.clone())
        .all_favorites()?
        .into_iter()
        .collect();
    Ok(Check::compare(FinalTable::Favorites, expected, actual))
}

/// Steps are compared as (recipe, step, text) triples
fn check_instructions(db: &Database) -> Result<Check> {
    let staged = StagingRepository::new(db.pool.clone()).recipe_instructions()?;
    let recipes = RecipeRepository::new(db.pool.clone());

    let mut expected = BTreeSet::new();
    let mut actual = BTreeSet::new();
    for (recipe_id, raw) in &staged {
        for step in tokens::split_instructions(*recipe_id, raw.as_deref().unwrap_or("")) {
            expected.insert((step.recipe_id, step.step_number, step.text));
        }
        for step in recipes.get_instructions(*recipe_id)? {
            actual.insert((step.recipe_id, step.step_number, step.text));
        }
    }
    Ok(Check::compare(FinalTable::Instruction, expected, actual))
}

fn run_checks(db: &Database) -> Result<Vec<Check>> {
    Ok(vec![
        check_users(db).context("Failed to check Users_rf")?,
        check_follow(db).context("Failed to check Follow")?,
        check_likes(db).context("Failed to check Likes")?,
        check_favorites(db).context("Failed to check Favorites")?,
        check_instructions(db).context("Failed to check Instruction")?,
    ])
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let tables = args.tables()?;

    let url = match args.database {
        Some(url) => url,
        None => Settings::new().context("Failed to load settings")?.database.url,
    };
    let db = Database::open(&url).with_context(|| format!("Failed to open {}", url))?;

    println!("=== Row counts ===\n");
    let counts = {
        let conn = db.connection()?;
        report::count_tables(&conn)
    };
    for table in tables {
        println!("  {:<12} {}", table.as_str(), counts.get(table));
    }

    println!("\n=== Checks against staging ===\n");
    let checks = run_checks(&db)?;
    for check in &checks {
        if check.passed() {
            println!("  {:<12} OK ({} rows)", check.table.as_str(), check.expected);
        } else {
            println!(
                "  {:<12} MISMATCH ({} missing, {} unexpected)",
                check.table.as_str(),
                check.missing,
                check.unexpected
            );
        }
    }

    let failed = checks.iter().filter(|c| !c.passed()).count();
    if failed > 0 {
        bail!("{} check(s) failed", failed);
    }
    Ok(())
}
