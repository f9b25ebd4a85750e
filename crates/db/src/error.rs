//! Translation of store-native failures into a closed set of conditions.
//!
//! Services never inspect PostgreSQL error codes themselves; they match on
//! [`DbError`] instead. Logical absence is not an error and is expressed as
//! `Option::None` or an empty `Vec` by the repositories.

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A unique constraint or unique index rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Any other store failure. Treated as fatal by callers.
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),
}

impl DbError {
    /// Whether this is a unique violation raised by the named constraint.
    pub fn is_unique_violation_on(&self, name: &str) -> bool {
        matches!(self, DbError::UniqueViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return DbError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        DbError::Sqlx(err)
    }
}
