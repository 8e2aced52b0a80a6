//! Arrow schema definitions for all lakehouse Delta tables
//!
//! Each table has:
//! - An Arrow `Schema` for RecordBatch construction
//! - A list of Delta `StructField`s for table creation
//! - Partition columns for optimized storage

use deltalake::arrow::datatypes::{DataType, Field, Schema};
use deltalake::kernel::{DataType as DeltaDataType, PrimitiveType, StructField};

// ─── Table Names (constants) ───

pub const TABLE_IDENTITIES: &str = "identities";
pub const TABLE_RECIPES: &str = "recipes";

fn string_field(name: &str, nullable: bool) -> StructField {
    StructField::new(name, DeltaDataType::Primitive(PrimitiveType::String), nullable)
}

// ─── Identities Table ───

/// Arrow schema for the `identities` Delta table
pub fn identities_arrow_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("display_name", DataType::Utf8, false),
        Field::new("address", DataType::Utf8, false),
        Field::new("secret_hash", DataType::Utf8, false),
        Field::new("role", DataType::Utf8, false),
        Field::new("profile_image", DataType::Utf8, true),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("updated_at", DataType::Utf8, false),
    ])
}

/// Delta StructFields for `identities` table creation
pub fn identities_delta_fields() -> Vec<StructField> {
    vec![
        string_field("id", false),
        string_field("display_name", false),
        string_field("address", false),
        string_field("secret_hash", false),
        string_field("role", false),
        string_field("profile_image", true),
        string_field("created_at", false),
        string_field("updated_at", false),
    ]
}

pub fn identities_partition_columns() -> Vec<String> {
    vec![] // looked up by id or address, never scanned by range
}

// ─── Recipes Table ───

/// Arrow schema for the `recipes` Delta table
pub fn recipes_arrow_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("preparation", DataType::Utf8, false),
        Field::new("ingredients", DataType::Utf8, false),
        Field::new("image", DataType::Utf8, true),
        Field::new("owner_id", DataType::Utf8, false),
        Field::new("slug", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("updated_at", DataType::Utf8, false),
    ])
}

/// Delta StructFields for `recipes` table creation
pub fn recipes_delta_fields() -> Vec<StructField> {
    vec![
        string_field("id", false),
        string_field("title", false),
        string_field("preparation", false),
        string_field("ingredients", false),
        string_field("image", true),
        string_field("owner_id", false),
        string_field("slug", false),
        string_field("created_at", false),
        string_field("updated_at", false),
    ]
}

pub fn recipes_partition_columns() -> Vec<String> {
    vec![]
}

/// Table definition bundle for `DeltaStore::ensure_table`
pub struct TableDefinition {
    pub name: &'static str,
    pub arrow_schema: Schema,
    pub delta_fields: Vec<StructField>,
    pub partition_columns: Vec<String>,
}

/// Get all table definitions for lakehouse initialization
pub fn all_tables() -> Vec<TableDefinition> {
    vec![
        TableDefinition {
            name: TABLE_IDENTITIES,
            arrow_schema: identities_arrow_schema(),
            delta_fields: identities_delta_fields(),
            partition_columns: identities_partition_columns(),
        },
        TableDefinition {
            name: TABLE_RECIPES,
            arrow_schema: recipes_arrow_schema(),
            delta_fields: recipes_delta_fields(),
            partition_columns: recipes_partition_columns(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_and_delta_fields_agree() {
        for table in all_tables() {
            let arrow_names: Vec<&str> = table
                .arrow_schema
                .fields()
                .iter()
                .map(|f| f.name().as_str())
                .collect();
            let delta_names: Vec<&str> = table.delta_fields.iter().map(|f| f.name().as_str()).collect();
            assert_eq!(arrow_names, delta_names, "column mismatch in {}", table.name);
        }
    }
}
