//! Error types for the record store

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage engine itself cannot be reached or opened
    #[error("storage engine unavailable: {0}")]
    Unavailable(String),

    /// Table is not part of the schema
    #[error("table not found: {0}")]
    MissingTable(String),

    /// `where` clause on a field that is neither primary key nor index
    #[error("field `{field}` is not indexed on table `{table}`")]
    NotIndexed {
        /// Table queried
        table: String,
        /// Field used in the clause
        field: String,
    },

    /// Add with a key that already exists
    #[error("duplicate key `{key}` in table `{table}`")]
    DuplicateKey {
        /// Table written
        table: String,
        /// Conflicting key
        key: String,
    },

    /// Record lacks its primary key and the table does not auto-increment
    #[error("record in table `{table}` has no primary key `{field}`")]
    MissingKey {
        /// Table written
        table: String,
        /// Primary key field
        field: String,
    },

    /// Record is not a JSON object, or a patch touches the primary key
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Row could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file I/O
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected through [`crate::Faults`]
    #[error("{operation} failed on table `{table}`: {reason}")]
    Injected {
        /// Table touched
        table: String,
        /// `read` or `write`
        operation: &'static str,
        /// Configured failure text
        reason: String,
    },
}

impl StoreError {
    /// Check if the error only says the table does not exist
    #[inline]
    #[must_use]
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::MissingTable(_))
    }

    /// Check if the storage engine is down as a whole
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::NotIndexed {
            table: "products".to_string(),
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "field `price` is not indexed on table `products`");
    }

    #[test]
    fn store_error_classification() {
        assert!(StoreError::MissingTable("x".into()).is_missing_table());
        assert!(!StoreError::MissingTable("x".into()).is_unavailable());
        assert!(StoreError::Unavailable("gone".into()).is_unavailable());
    }
}
