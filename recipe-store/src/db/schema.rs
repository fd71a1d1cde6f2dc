//! Table definitions for the import: raw staging tables mirroring the CSV
//! files, and the normalized final tables built from them.

use recipe_types::{ColumnType, FinalTable};

/// One column of a staging table
#[derive(Debug, Clone, Copy)]
pub struct StagingColumn {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl StagingColumn {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// A staging table and its columns, in CSV order
#[derive(Debug)]
pub struct StagingTable {
    pub name: &'static str,
    pub columns: &'static [StagingColumn],
}

impl StagingTable {
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.column_type.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", self.name, columns)
    }

    pub fn insert_sql(&self) -> String {
        let names = self
            .columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name, names, placeholders
        )
    }
}

const fn decimal(precision: u8, scale: u8) -> ColumnType {
    ColumnType::Decimal { precision, scale }
}

const NUTRIENT: ColumnType = decimal(8, 1);

pub static STAGING_USERS: StagingTable = StagingTable {
    name: "staging_users",
    columns: &[
        StagingColumn::new("AuthorId", ColumnType::Integer),
        StagingColumn::new("AuthorName", ColumnType::Varchar(255)),
        StagingColumn::new("Gender", ColumnType::Varchar(10)),
        StagingColumn::new("Age", ColumnType::Integer),
        StagingColumn::new("Followers", ColumnType::Integer),
        StagingColumn::new("Following", ColumnType::Integer),
        StagingColumn::new("FollowerUsers", ColumnType::Text),
        StagingColumn::new("FollowingUsers", ColumnType::Text),
    ],
};

pub static STAGING_REVIEWS: StagingTable = StagingTable {
    name: "staging_reviews",
    columns: &[
        StagingColumn::new("ReviewId", ColumnType::Integer),
        StagingColumn::new("RecipeId", decimal(10, 1)),
        StagingColumn::new("AuthorId", ColumnType::Integer),
        StagingColumn::new("AuthorName", ColumnType::Text),
        StagingColumn::new("Rating", ColumnType::Integer),
        StagingColumn::new("Review", ColumnType::Text),
        StagingColumn::new("DateSubmitted", ColumnType::Timestamp),
        StagingColumn::new("DateModified", ColumnType::Timestamp),
        StagingColumn::new("Likes", ColumnType::Text),
    ],
};

pub static STAGING_RECIPES: StagingTable = StagingTable {
    name: "staging_recipes",
    columns: &[
        StagingColumn::new("RecipeId", ColumnType::Integer),
        StagingColumn::new("Name", ColumnType::Text),
        StagingColumn::new("AuthorId", ColumnType::Integer),
        StagingColumn::new("AuthorName", ColumnType::Text),
        StagingColumn::new("CookTime", ColumnType::Interval),
        StagingColumn::new("PrepTime", ColumnType::Interval),
        StagingColumn::new("TotalTime", ColumnType::Interval),
        StagingColumn::new("DatePublished", ColumnType::Timestamp),
        StagingColumn::new("Description", ColumnType::Text),
        StagingColumn::new("RecipeCategory", ColumnType::Text),
        StagingColumn::new("Keywords", ColumnType::Text),
        StagingColumn::new("RecipeIngredientParts", ColumnType::Text),
        StagingColumn::new("AggregatedRating", decimal(3, 1)),
        StagingColumn::new("ReviewCount", decimal(5, 1)),
        StagingColumn::new("Calories", NUTRIENT),
        StagingColumn::new("FatContent", NUTRIENT),
        StagingColumn::new("SaturatedFatContent", NUTRIENT),
        StagingColumn::new("CholesterolContent", NUTRIENT),
        StagingColumn::new("SodiumContent", NUTRIENT),
        StagingColumn::new("CarbohydrateContent", NUTRIENT),
        StagingColumn::new("FiberContent", NUTRIENT),
        StagingColumn::new("SugarContent", NUTRIENT),
        StagingColumn::new("ProteinContent", NUTRIENT),
        StagingColumn::new("RecipeServings", decimal(10, 1)),
        StagingColumn::new("RecipeYield", ColumnType::Text),
        StagingColumn::new("RecipeInstructions", ColumnType::Text),
        StagingColumn::new("FavoriteUsers", ColumnType::Text),
    ],
};

/// Characters stripped from both ends of an ID token: whitespace and quotes.
/// Must agree with `tokens::ID_TRIM`.
const ID_TRIM_SQL: &str = "' \"''' || char(9, 10, 13)";

/// Whitespace stripped from instruction fragments.
/// Must agree with `tokens::STEP_TRIM`.
const STEP_TRIM_SQL: &str = "' ' || char(9, 10, 13)";

/// Build the statement that splits `list_column` of `source` on commas and
/// inserts `(owner, id)` pairs for every token that is a plain number.
///
/// `select` receives the row's own id as `owner` and the token as `token_id`.
fn id_list_insert(
    source: &str,
    owner_column: &str,
    list_column: &str,
    insert: &str,
    select: &str,
) -> String {
    format!(
        "WITH RECURSIVE split(owner, token, rest) AS (
            SELECT {owner_column}, NULL, {list_column} || ','
            FROM {source}
            WHERE {list_column} IS NOT NULL
            UNION ALL
            SELECT owner,
                   substr(rest, 1, instr(rest, ',') - 1),
                   substr(rest, instr(rest, ',') + 1)
            FROM split
            WHERE rest <> ''
        ),
        cleaned(owner, token) AS (
            SELECT owner, trim(token, {trim})
            FROM split
            WHERE token IS NOT NULL
        )
        {insert}
        SELECT {select}
        FROM (SELECT owner, CAST(token AS INTEGER) AS token_id
              FROM cleaned
              WHERE token <> '' AND token NOT GLOB '*[^0-9]*')",
        trim = ID_TRIM_SQL,
    )
}

/// A final table: how to create it and how to fill it from staging
pub struct FinalTableDef {
    pub table: FinalTable,
    pub create: &'static str,
    pub populate: fn() -> Vec<String>,
}

impl FinalTableDef {
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.table.as_str())
    }
}

fn populate_users() -> Vec<String> {
    vec!["INSERT INTO Users_rf
          SELECT AuthorId, AuthorName, Age, Gender, Following, Followers
          FROM staging_users"
        .to_string()]
}

fn populate_reviews() -> Vec<String> {
    vec!["INSERT INTO Reviews_rf
          SELECT ReviewId, Rating, Review, DateSubmitted, DateModified
          FROM staging_reviews"
        .to_string()]
}

fn populate_recipes() -> Vec<String> {
    vec!["INSERT INTO Recipes_rf
          SELECT RecipeId, Name, DatePublished, RecipeCategory, Description,
                 PrepTime, CookTime, TotalTime, RecipeYield, RecipeIngredientParts,
                 RecipeServings, RecipeInstructions
          FROM staging_recipes"
        .to_string()]
}

fn populate_likes() -> Vec<String> {
    vec![id_list_insert(
        "staging_reviews",
        "ReviewId",
        "Likes",
        "INSERT INTO Likes (ReviewId, AuthorId)",
        "owner, token_id",
    )]
}

fn populate_favorites() -> Vec<String> {
    vec![id_list_insert(
        "staging_recipes",
        "RecipeId",
        "FavoriteUsers",
        "INSERT INTO Favorites (RecipeId, AuthorId)",
        "owner, token_id",
    )]
}

/// Edges from the "following" list point away from the user, edges from the
/// "follower" list point at the user. The second pass skips pairs the first
/// one already produced.
fn populate_follow() -> Vec<String> {
    vec![
        id_list_insert(
            "staging_users",
            "AuthorId",
            "FollowingUsers",
            "INSERT INTO Follow (FollowerID, FollowingID)",
            "owner, token_id",
        ),
        id_list_insert(
            "staging_users",
            "AuthorId",
            "FollowerUsers",
            "INSERT OR IGNORE INTO Follow (FollowerID, FollowingID)",
            "token_id, owner",
        ),
    ]
}

fn populate_nutrient() -> Vec<String> {
    vec!["INSERT INTO Nutrient
          SELECT RecipeId, Calories, FatContent, SaturatedFatContent, CholesterolContent,
                 SodiumContent, CarbohydrateContent, FiberContent, SugarContent, ProteinContent
          FROM staging_recipes"
        .to_string()]
}

fn populate_ingredient() -> Vec<String> {
    vec!["INSERT INTO Ingredient SELECT RecipeId, RecipeIngredientParts FROM staging_recipes"
        .to_string()]
}

fn populate_keyword() -> Vec<String> {
    vec!["INSERT INTO KeyWord SELECT RecipeId, Keywords FROM staging_recipes".to_string()]
}

/// Steps are numbered in split order, starting at 1
fn populate_instruction() -> Vec<String> {
    vec![format!(
        "WITH RECURSIVE split(recipe_id, step, fragment, rest) AS (
            SELECT RecipeId, 0, NULL, RecipeInstructions || ','
            FROM staging_recipes
            WHERE RecipeInstructions IS NOT NULL AND RecipeInstructions <> ''
            UNION ALL
            SELECT recipe_id,
                   step + 1,
                   substr(rest, 1, instr(rest, ',') - 1),
                   substr(rest, instr(rest, ',') + 1)
            FROM split
            WHERE rest <> ''
        )
        INSERT INTO Instruction (RecipeID, Step_Number, Instruction)
        SELECT recipe_id, step, trim(fragment, {trim})
        FROM split
        WHERE step > 0",
        trim = STEP_TRIM_SQL,
    )]
}

/// Final tables in creation order: every table comes after the tables its
/// foreign keys reference.
pub static FINAL_TABLES: [FinalTableDef; 10] = [
    FinalTableDef {
        table: FinalTable::Users,
        create: r#"CREATE TABLE Users_rf (
            "AuthorID" INT NOT NULL PRIMARY KEY,
            "Name" VARCHAR(255),
            Age INT,
            Gender VARCHAR(10),
            "Following Count" INT,
            "Follower Count" INT
        )"#,
        populate: populate_users,
    },
    FinalTableDef {
        table: FinalTable::Reviews,
        create: r#"CREATE TABLE Reviews_rf (
            "ReviewID" INT NOT NULL PRIMARY KEY,
            Rating INT,
            "Review Content" TEXT,
            "Date Submitted" TIMESTAMPTZ,
            "Date Modified" TIMESTAMPTZ
        )"#,
        populate: populate_reviews,
    },
    FinalTableDef {
        table: FinalTable::Recipes,
        create: r#"CREATE TABLE Recipes_rf (
            "RecipeID" INT NOT NULL PRIMARY KEY,
            RecipeName TEXT,
            "Date Published" TIMESTAMPTZ,
            Category TEXT,
            Description TEXT,
            "Prep Time" INTERVAL,
            "Cook Time" INTERVAL,
            "Total Time" INTERVAL,
            "Recipe Yield" TEXT,
            "Recipe Ingredient Parts" TEXT,
            "Recipe Servings" DECIMAL(10,1),
            "Recipe Instructions" TEXT
        )"#,
        populate: populate_recipes,
    },
    FinalTableDef {
        table: FinalTable::Likes,
        create: r#"CREATE TABLE Likes (
            ReviewId INT NOT NULL,
            AuthorId INT NOT NULL,
            PRIMARY KEY (ReviewId, AuthorId),
            FOREIGN KEY (ReviewId) REFERENCES Reviews_rf("ReviewID") ON DELETE CASCADE,
            FOREIGN KEY (AuthorId) REFERENCES Users_rf("AuthorID") ON DELETE CASCADE
        )"#,
        populate: populate_likes,
    },
    FinalTableDef {
        table: FinalTable::Favorites,
        create: r#"CREATE TABLE Favorites (
            RecipeId INT NOT NULL,
            AuthorId INT NOT NULL,
            PRIMARY KEY (RecipeId, AuthorId),
            FOREIGN KEY (RecipeId) REFERENCES Recipes_rf("RecipeID") ON DELETE CASCADE,
            FOREIGN KEY (AuthorId) REFERENCES Users_rf("AuthorID") ON DELETE CASCADE
        )"#,
        populate: populate_favorites,
    },
    FinalTableDef {
        table: FinalTable::Follow,
        create: r#"CREATE TABLE Follow (
            FollowerID INT NOT NULL,
            FollowingID INT NOT NULL,
            PRIMARY KEY (FollowerID, FollowingID),
            FOREIGN KEY (FollowerID) REFERENCES Users_rf("AuthorID") ON DELETE CASCADE,
            FOREIGN KEY (FollowingID) REFERENCES Users_rf("AuthorID") ON DELETE CASCADE
        )"#,
        populate: populate_follow,
    },
    FinalTableDef {
        table: FinalTable::Nutrient,
        create: r#"CREATE TABLE Nutrient (
            RecipeID INT NOT NULL PRIMARY KEY,
            Calories DECIMAL(8,1),
            FatContent DECIMAL(8,1),
            SaturatedFatContent DECIMAL(8,1),
            CholesterolContent DECIMAL(8,1),
            SodiumContent DECIMAL(8,1),
            CarbohydrateContent DECIMAL(8,1),
            FiberContent DECIMAL(8,1),
            SugarContent DECIMAL(8,1),
            ProteinContent DECIMAL(8,1),
            FOREIGN KEY (RecipeID) REFERENCES Recipes_rf("RecipeID") ON DELETE CASCADE
        )"#,
        populate: populate_nutrient,
    },
    // Ingredient and KeyWord keep the whole comma-joined text in one row
    FinalTableDef {
        table: FinalTable::Ingredient,
        create: r#"CREATE TABLE Ingredient (
            RecipeID INT NOT NULL,
            Ingredient TEXT,
            PRIMARY KEY (RecipeID, Ingredient),
            FOREIGN KEY (RecipeID) REFERENCES Recipes_rf("RecipeID") ON DELETE CASCADE
        )"#,
        populate: populate_ingredient,
    },
    FinalTableDef {
        table: FinalTable::KeyWord,
        create: r#"CREATE TABLE KeyWord (
            RecipeID INT NOT NULL PRIMARY KEY,
            KeyWord TEXT,
            FOREIGN KEY (RecipeID) REFERENCES Recipes_rf("RecipeID") ON DELETE CASCADE
        )"#,
        populate: populate_keyword,
    },
    FinalTableDef {
        table: FinalTable::Instruction,
        create: r#"CREATE TABLE Instruction (
            RecipeID INT NOT NULL,
            Step_Number INT NOT NULL,
            Instruction TEXT,
            PRIMARY KEY (RecipeID, Step_Number),
            FOREIGN KEY (RecipeID) REFERENCES Recipes_rf("RecipeID") ON DELETE CASCADE
        )"#,
        populate: populate_instruction,
    },
];
