//! Generic persistence gateway over Postgres.
//!
//! Record types declare their backing table, column list and per-column
//! values through the [`Record`] trait; the [`Gateway`] builds the SQL at
//! runtime with [`QueryBuilder`]. Each operation opens its own
//! transactional scope, nothing spans two calls.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::StoreError;

/// A typed, possibly-null column value. `None` on the inner option is a SQL
/// NULL; the variant still carries the column type so binds keep the right
/// Postgres type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Option<String>),
    Int(Option<i32>),
    Timestamp(Option<DateTime<Utc>>),
}

impl Value {
    pub fn text(value: impl AsRef<str>) -> Self {
        Value::Text(Some(value.as_ref().to_owned()))
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Text(value) => value.is_none(),
            Value::Int(value) => value.is_none(),
            Value::Timestamp(value) => value.is_none(),
        }
    }
}

/// Mapping between a Rust type and its backing table.
pub trait Record: for<'r> sqlx::FromRow<'r, PgRow> + Send + Sync + Unpin {
    /// Backing table name.
    const TABLE: &'static str;

    /// Idempotent DDL for the backing table.
    const CREATE_TABLE: &'static str;

    /// All mapped columns.
    fn columns() -> &'static [&'static str];

    /// Columns written on insert. Store-assigned columns are left out.
    fn insert_columns() -> &'static [&'static str];

    /// The value of a single column, or `None` for an unmapped column.
    fn value(&self, column: &str) -> Option<Value>;
}

/// Equality filter over mapped columns.
pub type Filter<'a> = &'a [(&'a str, Value)];

/// Simplified create/read/update/upsert surface over one record type.
pub struct Gateway<T> {
    pool: PgPool,
    record: PhantomData<T>,
}

impl<T: Record> Gateway<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            record: PhantomData,
        }
    }

    /// Create the backing table if it does not exist yet.
    #[tracing::instrument(skip(self), fields(table = T::TABLE))]
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(T::CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// True iff at least one stored record matches all filter equalities.
    pub async fn exists(&self, filter: Filter<'_>) -> Result<bool, StoreError> {
        check_filter::<T>(filter)?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT EXISTS (SELECT 1 FROM {}", T::TABLE));
        push_filter(&mut query, filter);
        query.push(")");

        Ok(query
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?)
    }

    /// First record matching the filter, in store order.
    pub async fn find_one(&self, filter: Filter<'_>) -> Result<Option<T>, StoreError> {
        check_filter::<T>(filter)?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            T::columns().join(", "),
            T::TABLE
        ));
        push_filter(&mut query, filter);
        query.push(" LIMIT 1");

        Ok(query
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Apply the non-null fields of `item` onto every record matching the
    /// filter. Null fields on `item` leave the stored columns untouched;
    /// matching zero rows is a no-op, not an error.
    #[tracing::instrument(skip(self, item), fields(table = T::TABLE))]
    pub async fn update_where(&self, item: &T, filter: Filter<'_>) -> Result<u64, StoreError> {
        check_filter::<T>(filter)?;

        let assignments: Vec<(&str, Value)> = T::columns()
            .iter()
            .filter_map(|column| {
                item.value(column)
                    .filter(|value| !value.is_null())
                    .map(|value| (*column, value))
            })
            .collect();

        if assignments.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
        for (position, (column, value)) in assignments.into_iter().enumerate() {
            if position > 0 {
                query.push(", ");
            }
            query.push(format!("{column} = "));
            push_bind(&mut query, value);
        }
        push_filter(&mut query, filter);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Insert all items as new rows in a single transaction. A constraint
    /// violation on any row aborts the whole batch.
    #[tracing::instrument(skip(self, items), fields(table = T::TABLE))]
    pub async fn bulk_insert<'i, I>(&self, items: I) -> Result<u64, StoreError>
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        let items: Vec<&T> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            T::TABLE,
            T::insert_columns().join(", ")
        ));
        query.push_values(&items, |mut row, item| {
            for column in T::insert_columns() {
                match item.value(column) {
                    Some(Value::Text(value)) => row.push_bind(value),
                    Some(Value::Int(value)) => row.push_bind(value),
                    Some(Value::Timestamp(value)) => row.push_bind(value),
                    None => row.push_bind(Option::<String>::None),
                };
            }
        });

        let mut transaction = self.pool.begin().await?;
        let result = query.build().execute(&mut *transaction).await?;
        transaction.commit().await?;

        let inserted = result.rows_affected();
        tracing::info!("{} elements created in {}", inserted, T::TABLE);
        Ok(inserted)
    }

    /// Insert-or-update every item, keyed by `key`: items whose key already
    /// exists are updated in place, the rest are bulk inserted at the end.
    /// Re-running with identical input converges instead of duplicating.
    ///
    /// New items are not deduplicated against each other here; that happens
    /// upstream, before the batch reaches the store.
    #[tracing::instrument(skip(self, items), fields(table = T::TABLE))]
    pub async fn upsert(&self, items: &[T], key: &str) -> Result<(), StoreError> {
        let mut new_items = Vec::new();
        for item in items {
            let key_value = item
                .value(key)
                .ok_or_else(|| StoreError::UnknownColumn(key.to_owned()))?;
            let filter = [(key, key_value)];
            if self.exists(&filter).await? {
                self.update_where(item, &filter).await?;
            } else {
                new_items.push(item);
            }
        }
        self.bulk_insert(new_items).await?;

        tracing::info!("{} elements updated or created in {}", items.len(), T::TABLE);
        Ok(())
    }
}

fn check_filter<T: Record>(filter: Filter<'_>) -> Result<(), StoreError> {
    for (column, _) in filter {
        if !T::columns().contains(column) {
            return Err(StoreError::UnknownColumn((*column).to_owned()));
        }
    }
    Ok(())
}

/// Append ` WHERE a = $n AND b = $m ...` for every filter pair. An empty
/// filter appends nothing and matches everything.
fn push_filter(query: &mut QueryBuilder<Postgres>, filter: Filter<'_>) {
    for (position, (column, value)) in filter.iter().enumerate() {
        query.push(if position == 0 { " WHERE " } else { " AND " });
        query.push(format!("{column} = "));
        push_bind(query, value.clone());
    }
}

fn push_bind(query: &mut QueryBuilder<Postgres>, value: Value) {
    match value {
        Value::Text(value) => query.push_bind(value),
        Value::Int(value) => query.push_bind(value),
        Value::Timestamp(value) => query.push_bind(value),
    };
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::Article;

    #[test]
    fn filters_are_validated_against_the_column_list() {
        let filter = [("handle", Value::text("world/a"))];
        assert_that!(check_filter::<Article>(&filter)).is_ok();

        let filter = [("no_such_column", Value::text("x"))];
        let error = check_filter::<Article>(&filter).unwrap_err();
        assert!(matches!(error, StoreError::UnknownColumn(column) if column == "no_such_column"));
    }

    #[test]
    fn filter_pairs_become_where_equalities() {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM articles");
        let filter = [
            ("handle", Value::text("world/a")),
            ("wordcount", Value::Int(Some(3))),
        ];
        push_filter(&mut query, &filter);

        assert_that!(query.sql())
            .is_equal_to("SELECT 1 FROM articles WHERE handle = $1 AND wordcount = $2");
    }

    #[test]
    fn null_values_are_null_whatever_the_type() {
        assert!(Value::Text(None).is_null());
        assert!(Value::Int(None).is_null());
        assert!(Value::Timestamp(None).is_null());
        assert!(!Value::text("").is_null());
        assert!(!Value::Int(Some(0)).is_null());
    }
}
