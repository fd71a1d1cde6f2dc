use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use recipe_types::{Favorite, Ingredient, InstructionStep, KeyWord, Nutrient, Recipe};

use super::timestamp_column;
use crate::db::DbPool;

/// Read access to a recipe and the tables split out of it
pub struct RecipeRepository {
    pool: DbPool,
}

impl RecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_by_id(&self, recipe_id: i64) -> Result<Option<Recipe>> {
        let conn = self.pool.get()?;
        let recipe = conn
            .query_row(
                r#"SELECT "RecipeID", RecipeName, "Date Published", Category, Description,
                          "Prep Time", "Cook Time", "Total Time", "Recipe Yield",
                          "Recipe Ingredient Parts", "Recipe Servings", "Recipe Instructions"
                   FROM Recipes_rf
                   WHERE "RecipeID" = ?"#,
                [recipe_id],
                |row| {
                    Ok(Recipe {
                        recipe_id: row.get(0)?,
                        name: row.get(1)?,
                        date_published: timestamp_column(row, 2)?,
                        category: row.get(3)?,
                        description: row.get(4)?,
                        prep_time_secs: row.get(5)?,
                        cook_time_secs: row.get(6)?,
                        total_time_secs: row.get(7)?,
                        yield_text: row.get(8)?,
                        ingredient_parts_raw: row.get(9)?,
                        servings: row.get(10)?,
                        instructions_raw: row.get(11)?,
                    })
                },
            )
            .optional()
            .context("Failed to load recipe")?;

        Ok(recipe)
    }

    pub fn get_nutrient(&self, recipe_id: i64) -> Result<Option<Nutrient>> {
        let conn = self.pool.get()?;
        let nutrient = conn
            .query_row(
                "SELECT RecipeID, Calories, FatContent, SaturatedFatContent, CholesterolContent,
                        SodiumContent, CarbohydrateContent, FiberContent, SugarContent,
                        ProteinContent
                 FROM Nutrient
                 WHERE RecipeID = ?",
                [recipe_id],
                |row| {
                    Ok(Nutrient {
                        recipe_id: row.get(0)?,
                        calories: row.get(1)?,
                        fat_content: row.get(2)?,
                        saturated_fat_content: row.get(3)?,
                        cholesterol_content: row.get(4)?,
                        sodium_content: row.get(5)?,
                        carbohydrate_content: row.get(6)?,
                        fiber_content: row.get(7)?,
                        sugar_content: row.get(8)?,
                        protein_content: row.get(9)?,
                    })
                },
            )
            .optional()
            .context("Failed to load nutrient")?;

        Ok(nutrient)
    }

    pub fn get_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT RecipeID, Ingredient FROM Ingredient WHERE RecipeID = ? ORDER BY Ingredient",
        )?;
        let ingredients = stmt
            .query_map([recipe_id], |row| {
                Ok(Ingredient {
                    recipe_id: row.get(0)?,
                    text: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn get_keyword(&self, recipe_id: i64) -> Result<Option<KeyWord>> {
        let conn = self.pool.get()?;
        let keyword = conn
            .query_row(
                "SELECT RecipeID, KeyWord FROM KeyWord WHERE RecipeID = ?",
                [recipe_id],
                |row| {
                    Ok(KeyWord {
                        recipe_id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()
            .context("Failed to load keyword")?;

        Ok(keyword)
    }

    /// Steps of one recipe in step order
    pub fn get_instructions(&self, recipe_id: i64) -> Result<Vec<InstructionStep>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT RecipeID, Step_Number, Instruction
             FROM Instruction
             WHERE RecipeID = ?
             ORDER BY Step_Number",
        )?;
        let steps = stmt
            .query_map([recipe_id], |row| {
                Ok(InstructionStep {
                    recipe_id: row.get(0)?,
                    step_number: row.get(1)?,
                    text: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(steps)
    }

    /// Every favorite, ordered by recipe then author
    pub fn all_favorites(&self) -> Result<Vec<Favorite>> {
        let conn = self.pool.get()?;
        let mut stmt = conn
            .prepare("SELECT RecipeId, AuthorId FROM Favorites ORDER BY RecipeId, AuthorId")?;
        let favorites = stmt
            .query_map([], |row| {
                Ok(Favorite {
                    recipe_id: row.get(0)?,
                    author_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favorites)
    }
}
