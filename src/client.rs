//! API client
//!
//! `Winbooks` ties the pieces together:
//!
//! 1. Guards: tokens must be set (`Unauthenticated`) and a folder selected
//!    (`UndefinedFolder`) before any call
//! 2. Refresh policy: a 401 triggers one token refresh and one retry; a
//!    second rejection fails with `InvalidTokens`
//! 3. Continuation: while a response carries a `ContinuePath` header, the
//!    same request is sent again with that header attached. List pages are
//!    accumulated in a `Collection`, object pages are merged together.

use crate::auth::{Authenticator, OAuthTokenExchange, TokenExchange, Tokens};
use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{ApiResponse, HttpClient, Method, RequestConfig};
use crate::model::{to_model, IntoModelKind, ObjectModel, Value};
use crate::query::Query;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header carrying the continuation marker of a truncated response
pub const CONTINUE_PATH_HEADER: &str = "ContinuePath";

/// Criteria accepted by `Winbooks::query`
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    /// A built query
    Query(Query),
    /// A criteria document, sent as is
    Document(JsonValue),
}

impl QueryInput {
    /// The criteria document to send
    pub fn to_document(&self) -> Result<JsonValue> {
        match self {
            QueryInput::Query(query) => query.to_document(),
            QueryInput::Document(document) => Ok(document.clone()),
        }
    }
}

impl From<Query> for QueryInput {
    fn from(query: Query) -> Self {
        QueryInput::Query(query)
    }
}

impl From<JsonValue> for QueryInput {
    fn from(document: JsonValue) -> Self {
        QueryInput::Document(document)
    }
}

/// Client for one API host
#[derive(Debug)]
pub struct Winbooks {
    http: HttpClient,
    auth: Authenticator,
    folder: Option<String>,
}

impl Winbooks {
    /// Create a client from configuration. Tokens, e-mail and folder are
    /// taken from the config when present.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http_config())?;
        let exchange = Arc::new(OAuthTokenExchange::new(http.clone()));
        Ok(Self::with_exchange(config, http, exchange))
    }

    /// Create a client with a custom token exchange
    pub fn with_exchange(
        config: ClientConfig,
        http: HttpClient,
        exchange: Arc<dyn TokenExchange>,
    ) -> Self {
        let mut auth = match config.tokens() {
            Some(tokens) => Authenticator::with_tokens(exchange, tokens),
            None => Authenticator::new(exchange),
        };

        if let Some(email) = config.email {
            auth = auth.with_email(email);
        }

        Self {
            http,
            auth,
            folder: config.folder,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Trade an e-mail and exchange token for a token pair
    pub async fn authenticate(&self, email: &str, exchange_token: &str) -> Result<Tokens> {
        self.auth.authenticate(email, exchange_token).await
    }

    /// Whether both tokens are set
    pub async fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated().await
    }

    pub async fn tokens(&self) -> Option<Tokens> {
        self.auth.tokens().await
    }

    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.auth.set_access_token(token).await;
    }

    pub async fn set_refresh_token(&self, token: impl Into<String>) {
        self.auth.set_refresh_token(token).await;
    }

    /// Select the folder targeted by the following requests
    pub fn folder(&mut self, folder: impl Into<String>) -> &mut Self {
        self.folder = Some(folder.into());
        self
    }

    /// Owned variant of `folder`
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Every object of an entity (`GET app/{oms}/Folder/{folder}`)
    pub async fn all(&self, oms: &str) -> Result<Collection> {
        let folder = self.ensure_ready().await?;
        info!("Fetching all {oms}");

        self.fetch_collection(
            Method::GET,
            &format!("app/{oms}/Folder/{folder}"),
            RequestConfig::new(),
        )
        .await
    }

    /// One object, with nested objects expanded up to `max_level`
    pub async fn get(&self, om: &str, code: &str, max_level: u32) -> Result<Value> {
        let folder = self.ensure_ready().await?;
        info!("Fetching {om} {code}");

        self.fetch_value(
            Method::GET,
            &format!("app/{om}/{code}/Folder/{folder}"),
            RequestConfig::new().query("maxLevel", max_level.to_string()),
        )
        .await
    }

    /// Run a criteria query (`POST app/{oms}/Folder/{folder}/ExecuteCriteria`)
    pub async fn query(&self, oms: &str, input: impl Into<QueryInput>) -> Result<Collection> {
        let folder = self.ensure_ready().await?;
        let document = input.into().to_document()?;
        info!("Querying {oms}");
        debug!("Criteria: {document}");

        self.fetch_collection(
            Method::POST,
            &format!("app/{oms}/Folder/{folder}/ExecuteCriteria"),
            RequestConfig::new().json(document),
        )
        .await
    }

    /// Run a query built by `configure` from a fresh query on the entity
    /// named by `oms`
    pub async fn query_with<F>(&self, oms: &str, configure: F) -> Result<Collection>
    where
        F: FnOnce(Query) -> Result<Query>,
    {
        let query = configure(Query::of(oms)?)?;
        self.query(oms, query).await
    }

    /// Create an object. `Code` is filled from `code` when missing.
    pub async fn add(&self, om: &str, code: &str, data: JsonValue) -> Result<Value> {
        let folder = self.ensure_ready().await?;

        let data = match data {
            JsonValue::Object(mut map) => {
                if !map.contains_key("Code") {
                    map.insert("Code".to_string(), JsonValue::from(code));
                }
                JsonValue::Object(map)
            }
            _ => {
                return Err(Error::invalid_argument(
                    "Object data must be a JSON object",
                ))
            }
        };

        info!("Adding {om} {code}");
        self.fetch_value(
            Method::POST,
            &format!("app/{om}/{code}/Folder/{folder}"),
            RequestConfig::new().json(data),
        )
        .await
    }

    /// Create several objects at once
    pub async fn add_many(&self, oms: &str, objects: JsonValue) -> Result<Value> {
        let folder = self.ensure_ready().await?;
        info!("Adding many {oms}");

        self.fetch_value(
            Method::POST,
            &format!("app/{oms}/Folder/{folder}"),
            RequestConfig::new().json(objects),
        )
        .await
    }

    /// Update an object
    pub async fn update(&self, om: &str, code: &str, data: JsonValue) -> Result<Value> {
        let folder = self.ensure_ready().await?;
        info!("Updating {om} {code}");

        self.fetch_value(
            Method::PUT,
            &format!("app/{om}/{code}/Folder/{folder}"),
            RequestConfig::new().json(data),
        )
        .await
    }

    /// Update several objects at once
    pub async fn update_many(&self, oms: &str, objects: JsonValue) -> Result<Value> {
        let folder = self.ensure_ready().await?;
        info!("Updating many {oms}");

        self.fetch_value(
            Method::PUT,
            &format!("app/{oms}/Folder/{folder}"),
            RequestConfig::new().json(objects),
        )
        .await
    }

    /// Delete an object
    pub async fn delete(&self, om: &str, code: &str) -> Result<Value> {
        let folder = self.ensure_ready().await?;
        info!("Deleting {om} {code}");

        self.fetch_value(
            Method::DELETE,
            &format!("app/{om}/{code}/Folder/{folder}"),
            RequestConfig::new(),
        )
        .await
    }

    /// Create an object from a model, addressed by its OM and code
    pub async fn add_model(&self, model: &ObjectModel) -> Result<Value> {
        let code = model
            .code()
            .ok_or_else(|| Error::invalid_argument("Model has neither a Code nor an Id"))?;
        let folder = self.ensure_ready().await?;
        info!("Adding {} {code}", model.om());

        self.fetch_value(
            Method::POST,
            &format!("app/{}/{code}/Folder/{folder}", model.om()),
            RequestConfig::new().json(serde_json::to_value(model)?),
        )
        .await
    }

    /// Create several models at once. The path is built from the first
    /// model's OMS.
    pub async fn add_models(&self, models: &[ObjectModel]) -> Result<Value> {
        let first = models
            .first()
            .ok_or_else(|| Error::invalid_argument("No models given"))?;
        let oms = first.oms();
        let folder = self.ensure_ready().await?;
        info!("Adding {} {oms}", models.len());

        self.fetch_value(
            Method::POST,
            &format!("app/{oms}/Folder/{folder}"),
            RequestConfig::new().json(serde_json::to_value(models)?),
        )
        .await
    }

    /// Manual request through the guards and the refresh policy. The body
    /// is decoded when the status is 200, `None` otherwise.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Option<JsonValue>> {
        self.ensure_ready().await?;

        let response = self.attempt(method, path, config).await?;
        if response.status == 200 {
            response.json().map(Some)
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn ensure_ready(&self) -> Result<&str> {
        if !self.auth.is_authenticated().await {
            return Err(Error::unauthenticated(
                "Authenticate first with an e-mail and exchange token, or provide an access and refresh token.",
            ));
        }

        self.folder.as_deref().ok_or(Error::UndefinedFolder)
    }

    /// Send with the current access token, refreshing once on 401
    async fn attempt(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse> {
        let token = self.auth.access_token().await?;

        match self.send(method.clone(), path, config.clone(), &token).await {
            Err(e) if e.is_unauthorized() => {
                warn!("Access token rejected, refreshing");
                self.auth.refresh().await?;
                let token = self.auth.access_token().await?;

                self.send(method, path, config, &token)
                    .await
                    .map_err(|e| match e {
                        Error::HttpStatus { status, .. } if (400..500).contains(&status) => {
                            Error::InvalidTokens
                        }
                        other => other,
                    })
            }
            other => other,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        token: &str,
    ) -> Result<ApiResponse> {
        let config = config.header("Authorization", format!("Bearer {token}"));
        self.http.request(method, path, config).await
    }

    /// Follow continuation markers, accumulating list pages
    async fn fetch_collection(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Collection> {
        let mut collection = Collection::new();

        self.paginate(method, path, config, |page, more| {
            collection.fill(page, more);
        })
        .await?;

        debug!("Fetched {} records", collection.count());
        Ok(collection)
    }

    /// Follow continuation markers, merging object pages
    async fn fetch_value(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Value> {
        let mut result: Option<Value> = None;

        self.paginate(method, path, config, |page, _| match result.as_mut() {
            Some(value) => value.merge(page),
            None => result = Some(page),
        })
        .await?;

        Ok(result.unwrap_or_default())
    }

    async fn paginate<F>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        mut on_page: F,
    ) -> Result<()>
    where
        F: FnMut(Value, bool),
    {
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let request = match &continuation {
                Some(marker) => config.clone().header(CONTINUE_PATH_HEADER, marker.as_str()),
                None => config.clone(),
            };

            let response = self.attempt(method.clone(), path, request).await?;
            continuation = response
                .header(CONTINUE_PATH_HEADER)
                .filter(|marker| !marker.is_empty())
                .map(str::to_string);
            pages += 1;

            on_page(decode(&response)?, continuation.is_some());

            if continuation.is_none() {
                break;
            }
            debug!("Response truncated after page {pages}, continuing");
        }

        Ok(())
    }
}

/// Decode a 200 response into promoted values; other statuses yield null
fn decode(response: &ApiResponse) -> Result<Value> {
    if response.status != 200 {
        return Ok(Value::default());
    }
    Ok(to_model(response.json()?))
}

/// Criteria document for an entity built by `configure`, without sending it
pub fn criteria_for<F>(target: impl IntoModelKind, configure: F) -> Result<JsonValue>
where
    F: FnOnce(Query) -> Result<Query>,
{
    configure(Query::of(target)?)?.to_document()
}
