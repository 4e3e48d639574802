//! The chainable query builder.
//!
//! A [`QueryBuilder`] is one pending request against one collection. Chain
//! methods take and return the builder by value; [`QueryBuilder::execute`]
//! consumes it and resolves to a [`Response`]. Running the same request
//! twice requires an explicit `clone()`.
//!
//! ```rust,ignore
//! let Response { data, error } = client
//!     .from("complaints")
//!     .update(json!({ "status": "Resolved" }))
//!     .eq("id", complaint_id)
//!     .select("*")
//!     .single()
//!     .execute()
//!     .await;
//! ```
//!
//! The first mutating call (`insert`, `update`, `delete`) fixes the
//! operation; `select()` never overrides it. Chaining a different mutation
//! afterwards makes the builder resolve to an error without touching the
//! backend.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::client::Client;
use crate::document::Record;
use crate::error::{QueryError, QueryResult};
use crate::filter::{EmptyInPolicy, Filter, FilterValue};
use crate::operations::{
    DeleteOperation, InsertOperation, SelectOperation, Target, UpdateOperation,
};
use crate::response::{Data, Response};
use crate::traits::DocumentQuery;
use crate::types::{OrderByField, Payload, SortOrder};

/// The operation a builder will perform.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOperation {
    /// Read; the default until a mutation is chained.
    Select {
        /// Requested columns. Recorded only; every field is returned.
        columns: String,
    },
    /// Create documents.
    Insert(Payload),
    /// Merge a partial record into matched documents.
    Update(Record),
    /// Delete matched documents.
    Delete,
}

impl PendingOperation {
    /// Operation name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }

    /// Check if this operation writes.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Select { .. })
    }
}

impl Default for PendingOperation {
    fn default() -> Self {
        Self::Select {
            columns: "*".to_string(),
        }
    }
}

/// A mistake in the chain, reported when the builder resolves.
#[derive(Debug, Clone, PartialEq)]
enum ChainMisuse {
    Conflicting {
        first: &'static str,
        second: &'static str,
    },
    InvalidPayload(String),
    MissingPayload(&'static str),
}

impl From<ChainMisuse> for QueryError {
    fn from(misuse: ChainMisuse) -> Self {
        match misuse {
            ChainMisuse::Conflicting { first, second } => {
                QueryError::conflicting_operation(first, second)
            }
            ChainMisuse::InvalidPayload(message) => QueryError::invalid_payload(message),
            ChainMisuse::MissingPayload(operation) => QueryError::missing_payload(operation),
        }
    }
}

/// One pending request against one collection.
#[derive(Clone)]
pub struct QueryBuilder {
    client: Client,
    collection: String,
    operation: PendingOperation,
    filters: Vec<Filter>,
    matches_nothing: bool,
    order_by: Vec<OrderByField>,
    limit: Option<u64>,
    single: bool,
    allow_unscoped: bool,
    misuse: Option<ChainMisuse>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("collection", &self.collection)
            .field("operation", &self.operation.name())
            .field("filters", &self.filters)
            .field("matches_nothing", &self.matches_nothing)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("single", &self.single)
            .finish_non_exhaustive()
    }
}

impl QueryBuilder {
    /// Create a builder for a collection.
    pub fn new(client: Client, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            operation: PendingOperation::default(),
            filters: Vec::new(),
            matches_nothing: false,
            order_by: Vec::new(),
            limit: None,
            single: false,
            allow_unscoped: false,
            misuse: None,
        }
    }

    /// Read matching documents. Has no effect once a mutation is chained.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        if let PendingOperation::Select { columns: current } = &mut self.operation {
            *current = columns.into();
        }
        self
    }

    /// Create one record or a list of records.
    pub fn insert(self, payload: impl Serialize) -> Self {
        let parsed = match serde_json::to_value(payload) {
            Ok(Value::Null) => return self.misused(ChainMisuse::MissingPayload("insert")),
            Ok(value) => Payload::from_value(value),
            Err(err) => Err(QueryError::from(err)),
        };
        match parsed {
            Ok(payload) => self.mutate(PendingOperation::Insert(payload)),
            Err(err) => self.misused(ChainMisuse::InvalidPayload(err.message)),
        }
    }

    /// Merge a partial record into every matched document.
    pub fn update(self, payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(record)) => self.mutate(PendingOperation::Update(record)),
            Ok(Value::Null) => self.misused(ChainMisuse::MissingPayload("update")),
            Ok(other) => self.misused(ChainMisuse::InvalidPayload(format!(
                "update expects an object, found {}",
                other
            ))),
            Err(err) => self.misused(ChainMisuse::InvalidPayload(err.to_string())),
        }
    }

    /// Delete every matched document.
    pub fn delete(self) -> Self {
        self.mutate(PendingOperation::Delete)
    }

    /// Equality filter. `id` targets the document identifier.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::equals(field, value));
        self
    }

    /// Membership filter. `id` targets the document identifier.
    ///
    /// An empty list is never sent to the backend; what it means is set by
    /// [`EmptyInPolicy`].
    pub fn in_<T: Into<FilterValue>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let field = field.into();
        let values: Vec<FilterValue> = values.into_iter().map(Into::into).collect();

        if values.is_empty() {
            match self.client.config().query.empty_in {
                EmptyInPolicy::MatchNothing => self.matches_nothing = true,
                EmptyInPolicy::NoFilter => {
                    debug!(collection = %self.collection, field = %field, "Dropping empty in() filter");
                }
            }
            return self;
        }

        self.filters.push(Filter::in_list(field, values));
        self
    }

    /// Add a sort key. Accepts [`SortOrder`] or
    /// [`OrderOptions`](crate::types::OrderOptions).
    pub fn order(mut self, field: impl Into<String>, direction: impl Into<SortOrder>) -> Self {
        self.order_by.push(OrderByField::new(field, direction));
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Return a single record and limit the request to one document.
    pub fn single(mut self) -> Self {
        self.single = true;
        self.limit = Some(1);
        self
    }

    /// Confirm an update or delete without filters.
    pub fn allow_unscoped(mut self) -> Self {
        self.allow_unscoped = true;
        self
    }

    /// The collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The pending operation.
    pub fn operation(&self) -> &PendingOperation {
        &self.operation
    }

    /// The chained filters.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Check if single-row mode is on.
    pub fn is_single(&self) -> bool {
        self.single
    }

    /// Resolve the request.
    ///
    /// Failures of any kind come back in the envelope's `error`.
    pub async fn execute(self) -> Response<Data> {
        let collection = self.collection.clone();
        let operation = self.operation.name();

        match self.run().await {
            Ok(data) => Response { data, error: None },
            Err(err) => {
                if err.is_misuse() {
                    warn!(collection = %collection, operation, code = %err.code, "{}", err.message);
                } else if !err.is_not_found() {
                    debug!(collection = %collection, operation, error = %err, "Query failed");
                }
                Response::err(err)
            }
        }
    }

    fn mutate(mut self, next: PendingOperation) -> Self {
        if self.operation.is_mutation()
            && std::mem::discriminant(&self.operation) != std::mem::discriminant(&next)
        {
            let misuse = ChainMisuse::Conflicting {
                first: self.operation.name(),
                second: next.name(),
            };
            return self.misused(misuse);
        }
        self.operation = next;
        self
    }

    fn misused(mut self, misuse: ChainMisuse) -> Self {
        if self.misuse.is_none() {
            self.misuse = Some(misuse);
        }
        self
    }

    fn target(&self) -> Target {
        if self.matches_nothing {
            return Target::Nothing;
        }
        Target::Query(DocumentQuery {
            collection: self.collection.clone(),
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
        })
    }

    fn check_scoped(&self, target: &Target) -> QueryResult<()> {
        let allowed = self.allow_unscoped || self.client.config().query.allow_unscoped_mutations;
        if !allowed && !target.is_scoped() {
            return Err(QueryError::unscoped_mutation(
                &self.collection,
                self.operation.name(),
            ));
        }
        Ok(())
    }

    async fn run(self) -> QueryResult<Option<Data>> {
        if let Some(misuse) = self.misuse.clone() {
            return Err(misuse.into());
        }

        debug!(
            collection = %self.collection,
            operation = self.operation.name(),
            filters = self.filters.len(),
            single = self.single,
            "Resolving query"
        );

        let target = self.target();
        let client = &self.client;

        match &self.operation {
            PendingOperation::Select { .. } => {
                SelectOperation::new(client, &self.collection, target)
                    .single(self.single)
                    .exec()
                    .await
                    .map(Some)
            }
            PendingOperation::Insert(payload) => {
                InsertOperation::new(client, &self.collection, payload.clone())
                    .exec()
                    .await
                    .map(Some)
            }
            PendingOperation::Update(updates) => {
                self.check_scoped(&target)?;
                UpdateOperation::new(client, &self.collection, target, updates.clone())
                    .single(self.single)
                    .exec()
                    .await
                    .map(Some)
            }
            PendingOperation::Delete => {
                self.check_scoped(&target)?;
                DeleteOperation::new(client, &self.collection, target)
                    .exec()
                    .await
                    .map(|()| None)
            }
        }
    }
}
