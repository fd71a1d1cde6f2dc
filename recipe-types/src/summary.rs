use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::FinalTable;

/// Placeholder reported when a run failed without capturing an error message
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Row counts of every final table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub users: i64,
    pub reviews: i64,
    pub recipes: i64,
    pub likes: i64,
    pub favorites: i64,
    pub follow: i64,
    pub nutrient: i64,
    pub ingredient: i64,
    pub keyword: i64,
    pub instruction: i64,
}

impl TableCounts {
    pub fn get(&self, table: FinalTable) -> i64 {
        match table {
            FinalTable::Users => self.users,
            FinalTable::Reviews => self.reviews,
            FinalTable::Recipes => self.recipes,
            FinalTable::Likes => self.likes,
            FinalTable::Favorites => self.favorites,
            FinalTable::Follow => self.follow,
            FinalTable::Nutrient => self.nutrient,
            FinalTable::Ingredient => self.ingredient,
            FinalTable::KeyWord => self.keyword,
            FinalTable::Instruction => self.instruction,
        }
    }

    pub fn set(&mut self, table: FinalTable, count: i64) {
        let slot = match table {
            FinalTable::Users => &mut self.users,
            FinalTable::Reviews => &mut self.reviews,
            FinalTable::Recipes => &mut self.recipes,
            FinalTable::Likes => &mut self.likes,
            FinalTable::Favorites => &mut self.favorites,
            FinalTable::Follow => &mut self.follow,
            FinalTable::Nutrient => &mut self.nutrient,
            FinalTable::Ingredient => &mut self.ingredient,
            FinalTable::KeyWord => &mut self.keyword,
            FinalTable::Instruction => &mut self.instruction,
        };
        *slot = count;
    }

    /// Sum of the users, reviews and recipes counts
    pub fn imported_rows(&self) -> i64 {
        FinalTable::ALL
            .into_iter()
            .filter(FinalTable::is_primary_entity)
            .map(|table| self.get(table))
            .sum()
    }
}

/// Outcome of one import run
///
/// Built up while the run progresses and printed once at the end, whether
/// the run succeeded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Duration measured by the database clock
    pub duration_ms: Option<i64>,
    /// Duration measured by the process, used when the database did not report one
    pub client_duration_ms: Option<i64>,
    pub counts: TableCounts,
    pub error_message: Option<String>,
}

impl ImportSummary {
    pub fn begin(start_time: DateTime<Utc>) -> Self {
        Self {
            success: false,
            start_time,
            end_time: None,
            duration_ms: None,
            client_duration_ms: None,
            counts: TableCounts::default(),
            error_message: None,
        }
    }

    /// Replace the client timestamps with the ones measured by the database
    pub fn record_database_timing(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_ms: i64,
    ) {
        self.start_time = start_time;
        self.end_time = Some(end_time);
        self.duration_ms = Some(duration_ms);
    }

    pub fn mark_succeeded(&mut self) {
        self.success = true;
        self.error_message = None;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.success = false;
        self.error_message = Some(message.into());
    }

    /// Close the summary: fill in the end time if the database did not
    /// report one and keep the client-side elapsed time as a fallback.
    pub fn finish(&mut self, now: DateTime<Utc>, client_elapsed: Duration) {
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
        self.client_duration_ms = Some(client_elapsed.as_millis() as i64);
    }

    /// Elapsed milliseconds, preferring the database measurement
    pub fn elapsed_ms(&self) -> i64 {
        match self.duration_ms {
            Some(ms) if ms > 0 => ms,
            _ => self.client_duration_ms.unwrap_or(0),
        }
    }

    pub fn imported_rows(&self) -> i64 {
        self.counts.imported_rows()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            let message = self.error_message.as_deref().unwrap_or(UNKNOWN_ERROR);
            return write!(f, "Import failed: {}", message);
        }

        let c = &self.counts;
        writeln!(f, "Import succeeded in {} ms", self.elapsed_ms())?;
        writeln!(
            f,
            "Users_rf: {}, Reviews_rf: {}, Recipes_rf: {}",
            c.users, c.reviews, c.recipes
        )?;
        writeln!(
            f,
            "Likes: {}, Favorites: {}, Follow: {}",
            c.likes, c.favorites, c.follow
        )?;
        writeln!(
            f,
            "Nutrient: {}, Ingredient: {}, KeyWord: {}, Instruction: {}",
            c.nutrient, c.ingredient, c.keyword, c.instruction
        )?;
        write!(
            f,
            "Total imported (Users + Reviews + Recipes): {}",
            self.imported_rows()
        )
    }
}
