//! Rest.li API client.
//!
//! Every operation goes through the same pipeline: the request is prepared
//! by the core (URL, query, body, headers, tunneling), executed by the
//! transport, and the raw response is formatted into the operation's typed
//! result. Argument errors surface before the transport is called.

use crate::config::RestliClientConfig;
use crate::error::ClientError;
use crate::transport::{ReqwestTransport, Transport};
use restli_core::{
    format_response, prepare_request, ActionResult, ApiHosts, BatchCreateResult,
    BatchDeleteResult, BatchFinderResult, BatchGetResult, BatchUpdateResult, CollectionResult,
    CreateResult, DeleteResult, FromRestliResponse, GetResult, RestliOperation, RestliRequest,
    RestliResponse, UpdateResult, Value,
};

/// Client for Rest.li resources.
#[derive(Debug, Clone)]
pub struct RestliClient<T = ReqwestTransport> {
    transport: T,
    hosts: ApiHosts,
}

impl RestliClient<ReqwestTransport> {
    /// Create a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(&RestliClientConfig::default())
    }

    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a base URL is invalid, or if the HTTP client cannot
    /// be created.
    pub fn from_config(config: &RestliClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.transport_config())?;
        Ok(Self::with_transport(transport, config.api_hosts()))
    }
}

impl<T: Transport> RestliClient<T> {
    /// Create a client on top of an arbitrary transport.
    pub fn with_transport(transport: T, hosts: ApiHosts) -> Self {
        Self { transport, hosts }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Hosts requests are sent to.
    pub fn hosts(&self) -> &ApiHosts {
        &self.hosts
    }

    /// Run one operation and format its response as `R`.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be built, the exchange fails, or
    /// the response does not have the shape `R` expects.
    pub async fn execute<R: FromRestliResponse>(
        &self,
        request: &RestliRequest,
        operation: RestliOperation,
    ) -> Result<RestliResponse<R>, ClientError> {
        let method = operation.method();
        let prepared = prepare_request(&self.hosts, request, operation)?;
        let response = self.transport.send(prepared).await?;

        tracing::debug!(
            restli_method = %method,
            status = response.status,
            "Rest.li call completed"
        );

        Ok(format_response(method, response)?)
    }

    /// Fetch the entity addressed by the resource path.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn get(
        &self,
        request: &RestliRequest,
    ) -> Result<RestliResponse<GetResult>, ClientError> {
        self.execute(request, RestliOperation::Get).await
    }

    /// Fetch several entities by id.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn batch_get(
        &self,
        request: &RestliRequest,
        ids: Vec<Value>,
    ) -> Result<RestliResponse<BatchGetResult>, ClientError> {
        self.execute(request, RestliOperation::BatchGet { ids }).await
    }

    /// Fetch a page of the whole collection.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn get_all(
        &self,
        request: &RestliRequest,
        start: Option<u64>,
        count: Option<u64>,
    ) -> Result<RestliResponse<CollectionResult>, ClientError> {
        self.execute(request, RestliOperation::GetAll { start, count })
            .await
    }

    /// Run a finder. Finder parameters are passed as query parameters.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn finder(
        &self,
        request: &RestliRequest,
        finder_name: &str,
    ) -> Result<RestliResponse<CollectionResult>, ClientError> {
        self.execute(
            request,
            RestliOperation::Finder {
                finder_name: finder_name.to_string(),
            },
        )
        .await
    }

    /// Run a batch finder; results come back in the order of `criteria`.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn batch_finder(
        &self,
        request: &RestliRequest,
        finder_name: &str,
        criteria_name: &str,
        criteria: Vec<Value>,
    ) -> Result<RestliResponse<BatchFinderResult>, ClientError> {
        self.execute(
            request,
            RestliOperation::BatchFinder {
                finder_name: finder_name.to_string(),
                criteria_name: criteria_name.to_string(),
                criteria,
            },
        )
        .await
    }

    /// Create an entity.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn create(
        &self,
        request: &RestliRequest,
        entity: Value,
    ) -> Result<RestliResponse<CreateResult>, ClientError> {
        self.execute(request, RestliOperation::Create { entity }).await
    }

    /// Create several entities.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn batch_create(
        &self,
        request: &RestliRequest,
        entities: Vec<Value>,
    ) -> Result<RestliResponse<BatchCreateResult>, ClientError> {
        self.execute(request, RestliOperation::BatchCreate { entities })
            .await
    }

    /// Replace the entity addressed by the resource path.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn update(
        &self,
        request: &RestliRequest,
        entity: Value,
    ) -> Result<RestliResponse<UpdateResult>, ClientError> {
        self.execute(request, RestliOperation::Update { entity }).await
    }

    /// Replace several entities.
    ///
    /// # Errors
    ///
    /// Returns [`restli_core::RestliError::InvalidArgument`] if `ids` and
    /// `entities` differ in length; otherwise see [`RestliClient::execute`].
    pub async fn batch_update(
        &self,
        request: &RestliRequest,
        ids: Vec<Value>,
        entities: Vec<Value>,
    ) -> Result<RestliResponse<BatchUpdateResult>, ClientError> {
        self.execute(request, RestliOperation::BatchUpdate { ids, entities })
            .await
    }

    /// Set fields on the entity addressed by the resource path.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn partial_update(
        &self,
        request: &RestliRequest,
        patch_set: Value,
    ) -> Result<RestliResponse<UpdateResult>, ClientError> {
        self.execute(request, RestliOperation::PartialUpdate { patch_set })
            .await
    }

    /// Set fields on several entities.
    ///
    /// # Errors
    ///
    /// Returns [`restli_core::RestliError::InvalidArgument`] if `ids` and
    /// `patch_sets` differ in length; otherwise see [`RestliClient::execute`].
    pub async fn batch_partial_update(
        &self,
        request: &RestliRequest,
        ids: Vec<Value>,
        patch_sets: Vec<Value>,
    ) -> Result<RestliResponse<BatchUpdateResult>, ClientError> {
        self.execute(
            request,
            RestliOperation::BatchPartialUpdate { ids, patch_sets },
        )
        .await
    }

    /// Delete the entity addressed by the resource path.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn delete(
        &self,
        request: &RestliRequest,
    ) -> Result<RestliResponse<DeleteResult>, ClientError> {
        self.execute(request, RestliOperation::Delete).await
    }

    /// Delete several entities by id.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn batch_delete(
        &self,
        request: &RestliRequest,
        ids: Vec<Value>,
    ) -> Result<RestliResponse<BatchDeleteResult>, ClientError> {
        self.execute(request, RestliOperation::BatchDelete { ids })
            .await
    }

    /// Invoke a named action.
    ///
    /// # Errors
    ///
    /// See [`RestliClient::execute`].
    pub async fn action(
        &self,
        request: &RestliRequest,
        action_name: &str,
        params: Option<Value>,
    ) -> Result<RestliResponse<ActionResult>, ClientError> {
        self.execute(
            request,
            RestliOperation::Action {
                action_name: action_name.to_string(),
                params,
            },
        )
        .await
    }
}
