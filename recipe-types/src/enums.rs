use serde::{Deserialize, Serialize};

/// Final tables produced by the import, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FinalTable {
    Users,
    Reviews,
    Recipes,
    Likes,
    Favorites,
    Follow,
    Nutrient,
    Ingredient,
    KeyWord,
    Instruction,
}

impl FinalTable {
    /// Every final table, parents before children.
    pub const ALL: [FinalTable; 10] = [
        FinalTable::Users,
        FinalTable::Reviews,
        FinalTable::Recipes,
        FinalTable::Likes,
        FinalTable::Favorites,
        FinalTable::Follow,
        FinalTable::Nutrient,
        FinalTable::Ingredient,
        FinalTable::KeyWord,
        FinalTable::Instruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FinalTable::Users => "Users_rf",
            FinalTable::Reviews => "Reviews_rf",
            FinalTable::Recipes => "Recipes_rf",
            FinalTable::Likes => "Likes",
            FinalTable::Favorites => "Favorites",
            FinalTable::Follow => "Follow",
            FinalTable::Nutrient => "Nutrient",
            FinalTable::Ingredient => "Ingredient",
            FinalTable::KeyWord => "KeyWord",
            FinalTable::Instruction => "Instruction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        FinalTable::ALL
            .into_iter()
            .find(|table| table.as_str().eq_ignore_ascii_case(s))
    }

    /// Users, reviews and recipes: the tables summed into the imported total.
    pub fn is_primary_entity(&self) -> bool {
        matches!(
            self,
            FinalTable::Users | FinalTable::Reviews | FinalTable::Recipes
        )
    }
}

impl std::fmt::Display for FinalTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a staging column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 32-bit signed integer
    Integer,
    /// Fixed precision decimal, `precision` total digits with `scale` after the point
    Decimal { precision: u8, scale: u8 },
    /// Timestamp with time zone, normalized to UTC
    Timestamp,
    /// Duration, stored as whole seconds
    Interval,
    /// Bounded text
    Varchar(u16),
    Text,
}

impl ColumnType {
    /// SQL type name used in the staging DDL
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            ColumnType::Timestamp => "TIMESTAMPTZ".to_string(),
            ColumnType::Interval => "INTERVAL".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({})", len),
            ColumnType::Text => "TEXT".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_table_round_trip_names() {
        for table in FinalTable::ALL {
            assert_eq!(FinalTable::parse(table.as_str()), Some(table));
        }
        assert_eq!(FinalTable::parse("users_rf"), Some(FinalTable::Users));
        assert_eq!(FinalTable::parse("staging_users"), None);
    }

    #[test]
    fn test_primary_entities() {
        let primary: Vec<_> = FinalTable::ALL
            .into_iter()
            .filter(FinalTable::is_primary_entity)
            .collect();
        assert_eq!(
            primary,
            vec![FinalTable::Users, FinalTable::Reviews, FinalTable::Recipes]
        );
    }

    #[test]
    fn test_sql_type_names() {
        assert_eq!(ColumnType::Integer.sql_type(), "INT");
        assert_eq!(
            ColumnType::Decimal { precision: 8, scale: 1 }.sql_type(),
            "DECIMAL(8,1)"
        );
        assert_eq!(ColumnType::Varchar(255).sql_type(), "VARCHAR(255)");
        assert_eq!(ColumnType::Timestamp.sql_type(), "TIMESTAMPTZ");
        assert_eq!(ColumnType::Interval.sql_type(), "INTERVAL");
    }
}
