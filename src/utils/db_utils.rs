use actix_web::error::ErrorBadRequest;
use chrono::NaiveDate;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Date(NaiveDate),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Columns come from typed handler code, never from request JSON keys.
pub fn build_update_sql(
    table: &str,
    fields: Vec<(&str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    if fields.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    let set_clause = fields
        .iter()
        .map(|(col, _)| format!("{} = ?", col))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = fields.into_iter().map(|(_, v)| v).collect();
    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_clause_in_field_order() {
        let update = build_update_sql(
            "users",
            vec![
                ("name", SqlValue::String("Jane".to_string())),
                ("role_id", SqlValue::I64(1)),
            ],
            "id",
            7,
        )
        .unwrap();

        assert_eq!(update.sql, "UPDATE users SET name = ?, role_id = ? WHERE id = ?");
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_empty_field_list() {
        assert!(build_update_sql("users", vec![], "id", 7).is_err());
    }
}
