use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let pk = if col.primary_key { " PRIMARY KEY" } else { "" };
        // INTEGER PRIMARY KEY is already an alias for rowid
        let null_constraint = if !col.nullable && col.col_type != ColumnType::Serial {
            " NOT NULL"
        } else {
            ""
        };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint
        ));
    }

    // Declared only; the connection never enables foreign key enforcement
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    CONSTRAINT fk_{}_{} FOREIGN KEY ({}) REFERENCES {}({}) ON UPDATE NO ACTION ON DELETE NO ACTION",
            schema.name, fk.column, fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate a positional INSERT for the given columns
pub fn generate_insert(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{ALL_VITRINE, LAUNCHES, ROCKETS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&ROCKETS);
        assert!(sql.starts_with("CREATE TABLE rockets ("));
        assert!(sql.contains("id_rocket CHAR(50) PRIMARY KEY NOT NULL"));
        assert!(sql.contains("active BOOLEAN"));
        assert!(sql.contains("diameter_m FLOAT"));
        assert!(sql.contains("mass_kg INT"));
    }

    #[test]
    fn test_details_is_unbounded_text() {
        let sql = generate_create_table(&LAUNCHES);
        assert!(sql.contains("details TEXT"));
        assert!(sql.contains("launch_success BOOLEAN,"));
    }

    #[test]
    fn test_summary_declares_foreign_keys() {
        let sql = generate_create_table(&ALL_VITRINE);
        assert!(sql.contains("id INTEGER PRIMARY KEY,"));
        assert!(sql.contains(
            "CONSTRAINT fk_all_vitrine_id_rocket FOREIGN KEY (id_rocket) REFERENCES rockets(id_rocket)"
        ));
    }

    #[test]
    fn test_generate_insert() {
        assert_eq!(
            generate_insert("t", &["a", "b", "c"]),
            "INSERT INTO t (a, b, c) VALUES (?1, ?2, ?3)"
        );
    }
}
