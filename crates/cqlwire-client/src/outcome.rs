use bytes::Bytes;
use cqlwire_frame::{ColumnSpec, ResultMetadata, Row, Value};

/// What a successful request resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(QueryResult),
    /// Nothing to return.
    Void,
    Prepared(PreparedStatement),
    /// The server wants credentials before accepting requests.
    AuthenticationRequired(AuthenticationRequired),
    KeyspaceChanged(KeyspaceChanged),
}

impl Outcome {
    pub fn is_void(&self) -> bool {
        matches!(self, Outcome::Void)
    }
}

/// Rows returned by a query, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    metadata: ResultMetadata,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(metadata: ResultMetadata, rows: Vec<Row>) -> Self {
        Self { metadata, rows }
    }

    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Cell at `row` in the column named `column`; `None` for nulls and unknown names.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.metadata.index_of(column)?;
        self.rows.get(row)?.get(index)
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Handle to a statement the server has prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    id: Bytes,
    metadata: ResultMetadata,
}

impl PreparedStatement {
    pub fn new(id: Bytes, metadata: ResultMetadata) -> Self {
        Self { id, metadata }
    }

    /// Server-assigned statement id, sent back with EXECUTE.
    pub fn id(&self) -> &Bytes {
        &self.id
    }

    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    /// Bound-variable specification by column name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.metadata.column(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequired {
    pub authentication_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceChanged {
    pub keyspace: String,
}
