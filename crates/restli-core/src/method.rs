//! Rest.li operation kinds and the HTTP verbs they travel on.

use std::fmt;

/// HTTP method of a prepared request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the query parameters of an operation are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Plain [`param_encode`](crate::encoding::param_encode)
    Standard,
    /// GET-family encoding with verbatim `fields` projection
    GetFamily,
}

/// Static properties of a Rest.li operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationShape {
    /// Verb used when the request is not tunneled
    pub http_method: HttpMethod,
    /// Whether the operation adds `ids=List(...)` to the query
    pub ids_in_query: bool,
    /// Whether the operation carries a JSON request body
    pub has_body: bool,
    /// Query serialization variant
    pub query_encoding: QueryEncoding,
}

/// The Rest.li operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestliMethod {
    /// Fetch a single entity
    Get,
    /// Fetch several entities by id
    BatchGet,
    /// Fetch every entity of a collection
    GetAll,
    /// Run a named search
    Finder,
    /// Run several searches of one finder
    BatchFinder,
    /// Create an entity
    Create,
    /// Create several entities
    BatchCreate,
    /// Replace an entity
    Update,
    /// Replace several entities
    BatchUpdate,
    /// Patch an entity
    PartialUpdate,
    /// Patch several entities
    BatchPartialUpdate,
    /// Delete an entity
    Delete,
    /// Delete several entities
    BatchDelete,
    /// Invoke a named action
    Action,
}

impl RestliMethod {
    /// Every operation kind, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Get,
        Self::BatchGet,
        Self::GetAll,
        Self::Finder,
        Self::BatchFinder,
        Self::Create,
        Self::BatchCreate,
        Self::Update,
        Self::BatchUpdate,
        Self::PartialUpdate,
        Self::BatchPartialUpdate,
        Self::Delete,
        Self::BatchDelete,
        Self::Action,
    ];

    /// Value sent in the `X-RestLi-Method` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::BatchGet => "BATCH_GET",
            Self::GetAll => "GET_ALL",
            Self::Finder => "FINDER",
            Self::BatchFinder => "BATCH_FINDER",
            Self::Create => "CREATE",
            Self::BatchCreate => "BATCH_CREATE",
            Self::Update => "UPDATE",
            Self::BatchUpdate => "BATCH_UPDATE",
            Self::PartialUpdate => "PARTIAL_UPDATE",
            Self::BatchPartialUpdate => "BATCH_PARTIAL_UPDATE",
            Self::Delete => "DELETE",
            Self::BatchDelete => "BATCH_DELETE",
            Self::Action => "ACTION",
        }
    }

    /// Dispatch table entry for this operation.
    #[must_use]
    pub const fn shape(self) -> OperationShape {
        use HttpMethod::{Delete, Get, Post, Put};
        use QueryEncoding::{GetFamily, Standard};

        let (http_method, ids_in_query, has_body, query_encoding) = match self {
            Self::Get | Self::GetAll | Self::Finder | Self::BatchFinder => {
                (Get, false, false, GetFamily)
            }
            Self::BatchGet => (Get, true, false, GetFamily),
            Self::Create | Self::BatchCreate | Self::PartialUpdate | Self::Action => {
                (Post, false, true, Standard)
            }
            Self::Update => (Put, false, true, Standard),
            Self::BatchUpdate => (Put, true, true, Standard),
            Self::BatchPartialUpdate => (Post, true, true, Standard),
            Self::Delete => (Delete, false, false, Standard),
            Self::BatchDelete => (Delete, true, false, Standard),
        };

        OperationShape {
            http_method,
            ids_in_query,
            has_body,
            query_encoding,
        }
    }

    /// Verb used when the request is not tunneled.
    #[must_use]
    pub const fn http_method(self) -> HttpMethod {
        self.shape().http_method
    }
}

impl fmt::Display for RestliMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
