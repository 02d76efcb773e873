// src/common/db_utils.rs

use sqlx::{Encode, Postgres, QueryBuilder, Type};

// ---
// Partial UPDATE helpers
// ---
/// Starts `UPDATE <table> SET updated_at = NOW()` so every optional column can be
/// appended with a leading comma, even when the payload sets nothing else.
pub(crate) fn update_statement<'args>(table: &str) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(table).push(" SET updated_at = NOW()");
    builder
}

/// Appends `, <column> = $n` only when the payload carried a value.
pub(crate) fn push_set<'args, T>(
    builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = value {
        builder.push(", ").push(column).push(" = ").push_bind(value);
    }
}

/// Closes the statement with `WHERE id = $n RETURNING *`.
pub(crate) fn finish_update<'args>(builder: &mut QueryBuilder<'args, Postgres>, id: uuid::Uuid) {
    builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
}
