use thiserror::Error;

use crate::network::{ColumnType, Table};

/// Failures raised by a [`crate::network::NetworkSink`].
#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    #[error("column {name} does not exist in the {table} table")]
    MissingColumn { table: Table, name: String },

    #[error("column {name} in the {table} table is {existing}, cannot redeclare as {requested}")]
    ColumnConflict {
        table: Table,
        name: String,
        existing: ColumnType,
        requested: ColumnType,
    },

    #[error("column {name} in the {table} table holds {expected} values")]
    TypeMismatch {
        table: Table,
        name: String,
        expected: ColumnType,
    },

    #[error("no {table} row with index {index}")]
    UnknownRow { table: Table, index: usize },
}

/// Failures of a single mapping pass.
#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("entry {entry} has no graphics record")]
    MissingGraphics { entry: String },

    #[error("entry {entry} has a non-numeric {field}: {value:?}")]
    InvalidNumber {
        entry: String,
        field: &'static str,
        value: String,
    },

    #[error("relation {entry1} -> {entry2} references unknown entry {missing}")]
    UnresolvedRelation {
        entry1: String,
        entry2: String,
        missing: String,
    },

    #[error("reaction {reaction} references unknown entry {missing}")]
    UnresolvedReaction { reaction: String, missing: String },

    #[error("mapper has already run (state: {0})")]
    AlreadyMapped(crate::mapper::MappingState),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
