//! Mapping of Rest.li operations onto HTTP requests.
//!
//! Each [`RestliOperation`] carries its operation-specific inputs and turns
//! into a [`RequestShape`]: the operation kind, the final encoded query and
//! an optional JSON body. [`prepare_request`] then adds the URL and headers
//! and applies query tunneling.

use crate::encoding::{encode, encode_query_params_for_get_requests, param_encode, QueryParams};
use crate::error::{RestliError, Result};
use crate::http::PreparedRequest;
use crate::method::{QueryEncoding, RestliMethod};
use crate::tunneling::{
    maybe_apply_query_tunneling_get_requests, maybe_apply_query_tunneling_requests_with_body,
    TunnelContext,
};
use crate::url::{build_rest_url, ApiHosts, PathKeys};
use serde_json::{json, Map, Value};

/// Per-call request options shared by every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RestliRequest {
    /// Resource path template, e.g. `/adAccounts/{id}`
    pub resource_path: String,
    /// Bearer token
    pub access_token: String,
    /// Values for the placeholders of `resource_path`
    pub path_keys: Option<PathKeys>,
    /// Caller query parameters, before encoding
    pub query_params: Option<QueryParams>,
    /// API version such as `202401`; selects the versioned host
    pub version: Option<String>,
}

impl RestliRequest {
    /// Create options for `resource_path`, authorized with `access_token`.
    pub fn new(resource_path: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            access_token: access_token.into(),
            path_keys: None,
            query_params: None,
            version: None,
        }
    }

    /// Set one path key.
    #[must_use]
    pub fn with_path_key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.path_keys
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all path keys.
    #[must_use]
    pub fn with_path_keys(mut self, path_keys: PathKeys) -> Self {
        self.path_keys = Some(path_keys);
        self
    }

    /// Set one query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all query parameters.
    #[must_use]
    pub fn with_query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = Some(query_params);
        self
    }

    /// Use a versioned API.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A Rest.li operation together with its operation-specific inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum RestliOperation {
    /// Fetch the entity addressed by the resource path
    Get,
    /// Fetch entities by id
    BatchGet {
        /// Entity ids, simple or composite
        ids: Vec<Value>,
    },
    /// Fetch a page of the collection
    GetAll {
        /// Index of the first result
        start: Option<u64>,
        /// Page size
        count: Option<u64>,
    },
    /// Run a named finder; finder parameters travel as query parameters
    Finder {
        /// Finder name, sent as `q`
        finder_name: String,
    },
    /// Run several searches of one batch finder
    BatchFinder {
        /// Batch finder name, sent as `bq`
        finder_name: String,
        /// Name of the criteria query parameter
        criteria_name: String,
        /// One criteria object per search, results come back in this order
        criteria: Vec<Value>,
    },
    /// Create an entity
    Create {
        /// Entity to create
        entity: Value,
    },
    /// Create several entities
    BatchCreate {
        /// Entities to create
        entities: Vec<Value>,
    },
    /// Replace the entity addressed by the resource path
    Update {
        /// Replacement entity
        entity: Value,
    },
    /// Replace several entities
    BatchUpdate {
        /// Entity ids
        ids: Vec<Value>,
        /// Replacement entities, index-aligned with `ids`
        entities: Vec<Value>,
    },
    /// Set fields on the entity addressed by the resource path
    PartialUpdate {
        /// Fields to set
        patch_set: Value,
    },
    /// Set fields on several entities
    BatchPartialUpdate {
        /// Entity ids
        ids: Vec<Value>,
        /// Fields to set, index-aligned with `ids`
        patch_sets: Vec<Value>,
    },
    /// Delete the entity addressed by the resource path
    Delete,
    /// Delete entities by id
    BatchDelete {
        /// Entity ids
        ids: Vec<Value>,
    },
    /// Invoke a named action
    Action {
        /// Action name, sent as `action`
        action_name: String,
        /// Action parameters; an empty object when `None`
        params: Option<Value>,
    },
}

/// Encoded query and body of an operation, before URL and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestShape {
    /// Operation kind
    pub method: RestliMethod,
    /// Encoded query string without the leading `?`
    pub query: String,
    /// JSON body for write operations
    pub body: Option<Value>,
}

impl RestliOperation {
    /// Operation kind.
    #[must_use]
    pub fn method(&self) -> RestliMethod {
        match self {
            Self::Get => RestliMethod::Get,
            Self::BatchGet { .. } => RestliMethod::BatchGet,
            Self::GetAll { .. } => RestliMethod::GetAll,
            Self::Finder { .. } => RestliMethod::Finder,
            Self::BatchFinder { .. } => RestliMethod::BatchFinder,
            Self::Create { .. } => RestliMethod::Create,
            Self::BatchCreate { .. } => RestliMethod::BatchCreate,
            Self::Update { .. } => RestliMethod::Update,
            Self::BatchUpdate { .. } => RestliMethod::BatchUpdate,
            Self::PartialUpdate { .. } => RestliMethod::PartialUpdate,
            Self::BatchPartialUpdate { .. } => RestliMethod::BatchPartialUpdate,
            Self::Delete => RestliMethod::Delete,
            Self::BatchDelete { .. } => RestliMethod::BatchDelete,
            Self::Action { .. } => RestliMethod::Action,
        }
    }

    /// Merge the operation inputs with the caller's query parameters.
    ///
    /// Parameters added by the operation (`ids`, `q`, `bq`, `action`, ...)
    /// replace caller parameters of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`RestliError::InvalidArgument`] when batch ids and entities
    /// are not index-aligned.
    pub fn into_shape(self, query_params: Option<&QueryParams>) -> Result<RequestShape> {
        let method = self.method();
        let mut query = query_params.cloned().unwrap_or_default();

        let body = match self {
            Self::Get | Self::Delete => None,
            Self::BatchGet { ids } | Self::BatchDelete { ids } => {
                query.insert("ids".into(), Value::Array(ids));
                None
            }
            Self::GetAll { start, count } => {
                if let Some(start) = start {
                    query.insert("start".into(), start.into());
                }
                if let Some(count) = count {
                    query.insert("count".into(), count.into());
                }
                None
            }
            Self::Finder { finder_name } => {
                query.insert("q".into(), finder_name.into());
                None
            }
            Self::BatchFinder {
                finder_name,
                criteria_name,
                criteria,
            } => {
                query.insert("bq".into(), finder_name.into());
                query.insert(criteria_name, Value::Array(criteria));
                None
            }
            Self::Create { entity } | Self::Update { entity } => Some(entity),
            Self::BatchCreate { entities } => Some(json!({ "elements": entities })),
            Self::BatchUpdate { ids, entities } => {
                let entities = keyed_by_encoded_id(method, &ids, entities)?;
                query.insert("ids".into(), Value::Array(ids));
                Some(json!({ "entities": entities }))
            }
            Self::PartialUpdate { patch_set } => Some(patch_document(patch_set)),
            Self::BatchPartialUpdate { ids, patch_sets } => {
                let patches = patch_sets.into_iter().map(patch_document).collect();
                let entities = keyed_by_encoded_id(method, &ids, patches)?;
                query.insert("ids".into(), Value::Array(ids));
                Some(json!({ "entities": entities }))
            }
            Self::Action {
                action_name,
                params,
            } => {
                query.insert("action".into(), action_name.into());
                Some(params.unwrap_or_else(|| Value::Object(Map::new())))
            }
        };

        let query = match method.shape().query_encoding {
            QueryEncoding::GetFamily => encode_query_params_for_get_requests(Some(&query)),
            QueryEncoding::Standard => param_encode(Some(&query)),
        };

        Ok(RequestShape {
            method,
            query,
            body,
        })
    }
}

fn patch_document(patch_set: Value) -> Value {
    json!({ "patch": { "$set": patch_set } })
}

fn keyed_by_encoded_id(
    method: RestliMethod,
    ids: &[Value],
    values: Vec<Value>,
) -> Result<Map<String, Value>> {
    if ids.len() != values.len() {
        return Err(RestliError::InvalidArgument(format!(
            "{method} requires one entity per id, got {} ids and {} entities",
            ids.len(),
            values.len()
        )));
    }

    Ok(ids.iter().map(encode).zip(values).collect())
}

/// Build the final transport-ready request for an operation.
///
/// Validates the resource path before anything else; no request is produced
/// for invalid arguments.
///
/// # Errors
///
/// Returns [`RestliError::InvalidArgument`] for path/key mismatches and
/// misaligned batch inputs, and [`RestliError::Internal`] if no multipart
/// boundary could be chosen for a tunneled request.
pub fn prepare_request(
    hosts: &ApiHosts,
    request: &RestliRequest,
    operation: RestliOperation,
) -> Result<PreparedRequest> {
    let url = build_rest_url(
        hosts,
        &request.resource_path,
        request.path_keys.as_ref(),
        request.version.as_deref(),
    )?;
    let shape = operation.into_shape(request.query_params.as_ref())?;

    let ctx = TunnelContext {
        url: &url,
        restli_method: shape.method,
        access_token: &request.access_token,
        version: request.version.as_deref(),
    };

    let prepared = match &shape.body {
        Some(body) => maybe_apply_query_tunneling_requests_with_body(&ctx, &shape.query, body)?,
        None => maybe_apply_query_tunneling_get_requests(&ctx, &shape.query),
    };

    tracing::debug!(
        restli_method = %shape.method,
        http_method = %prepared.method,
        url = %prepared.url,
        "Prepared Rest.li request"
    );

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;

    fn shape(op: RestliOperation) -> RequestShape {
        op.into_shape(None).unwrap()
    }

    #[test]
    fn get_has_no_query_or_body() {
        let s = shape(RestliOperation::Get);
        assert_eq!(s.method, RestliMethod::Get);
        assert_eq!(s.query, "");
        assert!(s.body.is_none());
    }

    #[test]
    fn batch_get_adds_ids_and_keeps_fields_verbatim() {
        let params = json!({"fields": "id,name"});
        let s = RestliOperation::BatchGet {
            ids: vec![json!(1), json!({"account": "urn:li:a:1"})],
        }
        .into_shape(params.as_object())
        .unwrap();

        assert_eq!(s.query, "ids=List(1,(account:urn%3Ali%3Aa%3A1))&fields=id,name");
        assert!(s.body.is_none());
    }

    #[test]
    fn get_all_paging() {
        let s = shape(RestliOperation::GetAll {
            start: Some(10),
            count: Some(5),
        });
        assert_eq!(s.query, "count=5&start=10");

        let s = shape(RestliOperation::GetAll {
            start: None,
            count: None,
        });
        assert_eq!(s.query, "");
    }

    #[test]
    fn finder_sets_q() {
        let params = json!({"search": {"status": {"values": ["ACTIVE"]}}});
        let s = RestliOperation::Finder {
            finder_name: "search".into(),
        }
        .into_shape(params.as_object())
        .unwrap();
        assert_eq!(s.query, "q=search&search=(status:(values:List(ACTIVE)))");
    }

    #[test]
    fn batch_finder_sets_bq_and_criteria() {
        let s = shape(RestliOperation::BatchFinder {
            finder_name: "authActions".into(),
            criteria_name: "authActionsCriteria".into(),
            criteria: vec![
                json!({"OrgRoleAuthAction": {"actionType": "ADMIN_READ"}}),
                json!({"OrgContentAuthAction": {"actionType": "ORGANIC_SHARE_DELETE"}}),
            ],
        });
        assert_eq!(
            s.query,
            "authActionsCriteria=List((OrgRoleAuthAction:(actionType:ADMIN_READ)),\
             (OrgContentAuthAction:(actionType:ORGANIC_SHARE_DELETE)))&bq=authActions"
        );
    }

    #[test]
    fn create_and_update_send_entity_verbatim() {
        let entity = json!({"name": "Test", "tags": [1, 2]});
        let s = shape(RestliOperation::Create {
            entity: entity.clone(),
        });
        assert_eq!(s.body, Some(entity.clone()));
        assert_eq!(s.query, "");

        let s = shape(RestliOperation::Update {
            entity: entity.clone(),
        });
        assert_eq!(s.method.http_method(), HttpMethod::Put);
        assert_eq!(s.body, Some(entity));
    }

    #[test]
    fn batch_create_wraps_elements() {
        let s = shape(RestliOperation::BatchCreate {
            entities: vec![json!({"a": 1}), json!({"b": 2})],
        });
        assert_eq!(s.body, Some(json!({"elements": [{"a": 1}, {"b": 2}]})));
    }

    #[test]
    fn batch_update_keys_entities_by_encoded_id() {
        let s = shape(RestliOperation::BatchUpdate {
            ids: vec![json!("urn:li:x:1"), json!(2)],
            entities: vec![json!({"n": "a"}), json!({"n": "b"})],
        });
        assert_eq!(s.query, "ids=List(urn%3Ali%3Ax%3A1,2)");
        assert_eq!(
            s.body,
            Some(json!({"entities": {"urn%3Ali%3Ax%3A1": {"n": "a"}, "2": {"n": "b"}}}))
        );
    }

    #[test]
    fn partial_update_wraps_patch() {
        let s = shape(RestliOperation::PartialUpdate {
            patch_set: json!({"name": "New"}),
        });
        assert_eq!(s.body, Some(json!({"patch": {"$set": {"name": "New"}}})));
    }

    #[test]
    fn batch_partial_update_wraps_each_patch() {
        let s = shape(RestliOperation::BatchPartialUpdate {
            ids: vec![json!(1), json!(2)],
            patch_sets: vec![json!({"a": 1}), json!({"b": 2})],
        });
        assert_eq!(s.query, "ids=List(1,2)");
        assert_eq!(
            s.body,
            Some(json!({"entities": {
                "1": {"patch": {"$set": {"a": 1}}},
                "2": {"patch": {"$set": {"b": 2}}}
            }}))
        );
    }

    #[test]
    fn misaligned_batch_inputs_are_rejected() {
        let err = RestliOperation::BatchUpdate {
            ids: vec![json!(1), json!(2)],
            entities: vec![json!({})],
        }
        .into_shape(None)
        .unwrap_err();
        assert!(matches!(err, RestliError::InvalidArgument(_)));
    }

    #[test]
    fn batch_delete_uses_standard_encoding() {
        let params = json!({"fields": ["id"]});
        let s = RestliOperation::BatchDelete {
            ids: vec![json!(1)],
        }
        .into_shape(params.as_object())
        .unwrap();
        assert_eq!(s.query, "fields=List(id)&ids=List(1)");
        assert!(s.body.is_none());
    }

    #[test]
    fn action_defaults_to_empty_params() {
        let s = shape(RestliOperation::Action {
            action_name: "doSomething".into(),
            params: None,
        });
        assert_eq!(s.query, "action=doSomething");
        assert_eq!(s.body, Some(json!({})));

        let s = shape(RestliOperation::Action {
            action_name: "run".into(),
            params: Some(json!({"x": 1})),
        });
        assert_eq!(s.body, Some(json!({"x": 1})));
    }

    #[test]
    fn operation_inputs_override_caller_params() {
        let params = json!({"q": "other", "x": 1});
        let s = RestliOperation::Finder {
            finder_name: "search".into(),
        }
        .into_shape(params.as_object())
        .unwrap();
        assert_eq!(s.query, "q=search&x=1");
    }

    #[test]
    fn method_matches_shape_table() {
        let ops = [
            RestliOperation::Get,
            RestliOperation::Delete,
            RestliOperation::BatchDelete { ids: vec![] },
            RestliOperation::Create { entity: json!({}) },
        ];
        for op in ops {
            let method = op.method();
            let s = op.into_shape(None).unwrap();
            assert_eq!(s.body.is_some(), method.shape().has_body, "{method}");
        }
    }

    #[test]
    fn prepare_simple_get() {
        let request = RestliRequest::new("/adAccounts/{id}", "ABC123")
            .with_path_key("id", 123)
            .with_query_param("param1", "foobar");
        let prepared =
            prepare_request(&ApiHosts::default(), &request, RestliOperation::Get).unwrap();

        assert_eq!(prepared.method, HttpMethod::Get);
        assert_eq!(
            prepared.url,
            "https://api.linkedin.com/v2/adAccounts/123?param1=foobar"
        );
        assert!(prepared.body.is_none());
        assert_eq!(prepared.header("X-RestLi-Method"), Some("GET"));
    }

    #[test]
    fn prepare_rejects_bad_path_before_anything_else() {
        let request = RestliRequest::new("/adAccounts/{id}", "t");
        let err =
            prepare_request(&ApiHosts::default(), &request, RestliOperation::Get).unwrap_err();
        assert!(matches!(err, RestliError::InvalidArgument(_)));
    }
}
