//! Table schema definitions for the loaded entities and the summary table

use super::types::*;
use crate::entity::EntityKind;

// =============================================================================
// Entity Tables (one per fetched kind)
// =============================================================================

pub static MISSIONS: TableSchema = TableSchema {
    name: "missions",
    source: Some(EntityKind::Missions),
    columns: &[
        Column::primary("id_mission", ColumnType::Char(CHAR_WIDTH)).field("id"),
        Column::char("description").field("description"),
        Column::char("manufacturers").field("manufacturers"),
        Column::char("name").field("name"),
        Column::char("twitter").field("twitter"),
        Column::char("website").field("website"),
    ],
    foreign_keys: &[],
};

pub static ROCKETS: TableSchema = TableSchema {
    name: "rockets",
    source: Some(EntityKind::Rockets),
    columns: &[
        Column::primary("id_rocket", ColumnType::Char(CHAR_WIDTH)).field("id"),
        Column::char("rocket_name").field("name"),
        Column::new("active", ColumnType::Boolean).field("active"),
        Column::new("boosters", ColumnType::Integer).field("boosters"),
        Column::char("company").field("company"),
        Column::new("cost_per_launch", ColumnType::Integer).field("cost_per_launch"),
        Column::char("country").field("country"),
        Column::new("stages", ColumnType::Integer).field("stages"),
        Column::new("success_rate_pct", ColumnType::Integer).field("success_rate_pct"),
        Column::char("rocket_type").field("type"),
        Column::new("diameter_m", ColumnType::Float).field("diameter.meters"),
        Column::new("height_m", ColumnType::Float).field("height.meters"),
        Column::new("mass_kg", ColumnType::Integer).field("mass.kg"),
    ],
    foreign_keys: &[],
};

pub static LAUNCHES: TableSchema = TableSchema {
    name: "launches",
    source: Some(EntityKind::Launches),
    columns: &[
        Column::primary("id_launch", ColumnType::Char(CHAR_WIDTH)).field("id"),
        Column::new("details", ColumnType::Text).field("details"),
        Column::char("id_mission").field("mission_id"),
        Column::char("mission_name").field("mission_name"),
        Column::new("upcoming", ColumnType::Boolean).field("upcoming"),
        // Unknown until the launch has flown
        Column::new("launch_success", ColumnType::Boolean).field("launch_success"),
        Column::char("rocket_name").field("rocket.rocket_name"),
        Column::char("rocket_type").field("rocket.rocket_type"),
        Column::char("id_rocket").field("rocket.rocket.id"),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Summary Table
// =============================================================================

pub static ALL_VITRINE: TableSchema = TableSchema {
    name: "all_vitrine",
    source: None,
    columns: &[
        Column::primary("id", ColumnType::Serial),
        Column::char("id_mission"),
        Column::char("id_rocket"),
        Column::char("id_launch"),
        Column::new("count_missions", ColumnType::Integer),
        Column::new("count_rockets", ColumnType::Integer),
        Column::new("count_launches", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("id_mission", "missions", "id_mission"),
        ForeignKey::new("id_rocket", "rockets", "id_rocket"),
        ForeignKey::new("id_launch", "launches", "id_launch"),
    ],
};

/// All tables in creation order
pub static ALL_TABLES: &[&TableSchema] = &[&MISSIONS, &ROCKETS, &LAUNCHES, &ALL_VITRINE];

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

/// Look up a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}
