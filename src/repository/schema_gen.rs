use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let default = col
            .default
            .map(|d| format!(" DEFAULT {}", d))
            .unwrap_or_default();

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint,
            default
        ));
    }

    columns.push(format!(
        "    PRIMARY KEY ({})",
        schema.primary_key.join(", ")
    ));

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for the declared indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .indexes
        .iter()
        .map(|index| {
            let unique = if index.unique { "UNIQUE " } else { "" };
            format!(
                "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                unique,
                schema.name,
                index.columns.join("_"),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

/// Generate a SELECT matching `fetch_key IN (?, ...)` with `count` placeholders
pub fn generate_select_in(schema: &TableSchema, count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        schema.column_names().join(", "),
        schema.name,
        schema.fetch_key,
        placeholders,
        schema.primary_key.join(", ")
    )
}

/// Generate an INSERT covering every column
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns = schema.column_names();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders
    )
}
