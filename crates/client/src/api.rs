//! Typed HTTP client for the Golazo REST API.
//!
//! Every call returns the same models the server serializes. Non-2xx
//! responses are turned into [`ClientError::Api`] carrying the server's
//! `{"error": ...}` message.

use reqwest::{Method, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use golazo_core::{
    AuthResponse, CartLineRequest, Category, CreateOrderRequest, ErrorResponse, LoginRequest,
    MessageResponse, Order, OrderId, OrderWithItems, Product, ProductId, ProductInput,
    RegisterRequest, RegisterResponse, StockReduction, UploadResponse, UserId,
    ValidateCartRequest, ValidatedCart,
};

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL or a path could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

type Result<T> = std::result::Result<T, ClientError>;

/// Client for the storefront API.
///
/// Cheap to clone. A bearer token attached with [`ApiClient::with_token`]
/// is sent on every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the API served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Return a copy of this client that authenticates with `token`.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// The bearer token in use, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path)?;
        self.send(self.request(Method::POST, url).json(body)).await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or not healthy.
    pub async fn health(&self) -> Result<()> {
        let url = self.url("health")?;
        check_status(self.request(Method::GET, url).send().await?).await?;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /api/auth/register`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 400 if the email is taken or
    /// the input is invalid.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.post("api/auth/register", request).await
    }

    /// `POST /api/auth/login`
    ///
    /// The returned token is not attached to this client; use
    /// [`ApiClient::with_token`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 400 on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        self.post("api/auth/login", &request).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// `GET /api/products[?category=]`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self, category: Option<Category>) -> Result<Vec<Product>> {
        let mut url = self.url("api/products")?;
        if let Some(category) = category {
            url.query_pairs_mut()
                .append_pair("category", category.as_str());
        }
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/products/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 if the product is unknown.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.get(&format!("api/products/{id}")).await
    }

    /// `POST /api/products`
    ///
    /// # Errors
    ///
    /// Returns an error if the input is rejected or the request fails.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product> {
        self.post("api/products", input).await
    }

    /// `PUT /api/products/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the input is rejected.
    pub async fn update_product(&self, id: ProductId, input: &ProductInput) -> Result<Product> {
        let url = self.url(&format!("api/products/{id}"))?;
        self.send(self.request(Method::PUT, url).json(input)).await
    }

    /// `DELETE /api/products/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the request fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<MessageResponse> {
        let url = self.url(&format!("api/products/{id}"))?;
        self.send(self.request(Method::DELETE, url)).await
    }

    /// `POST /api/products/reduce-stock`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 400 if there is not enough
    /// stock left.
    #[instrument(skip(self))]
    pub async fn reduce_stock(&self, product_id: ProductId, quantity: i32) -> Result<Product> {
        let body = StockReduction {
            product_id,
            quantity,
        };
        self.post("api/products/reduce-stock", &body).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// `POST /api/cart/validate` (requires a token)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 401 without a token, 404 for
    /// an unknown product and 400 when stock is short.
    pub async fn validate_cart(&self, items: &[CartLineRequest]) -> Result<ValidatedCart> {
        let body = ValidateCartRequest {
            items: items.to_vec(),
        };
        self.post("api/cart/validate", &body).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// `POST /api/orders`
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected or the request fails.
    #[instrument(skip_all, fields(items = request.items.len()))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        self.post("api/orders", request).await
    }

    /// `GET /api/orders/my-orders`
    ///
    /// With a token the server uses the token's user; `user_id` is only
    /// needed for anonymous clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn my_orders(&self, user_id: Option<UserId>) -> Result<Vec<OrderWithItems>> {
        let mut url = self.url("api/orders/my-orders")?;
        if let Some(user_id) = user_id {
            url.query_pairs_mut()
                .append_pair("user_id", &user_id.to_string());
        }
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/orders/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 401 without a token, or 404
    /// if the order is unknown or belongs to another customer.
    pub async fn order(&self, id: OrderId) -> Result<OrderWithItems> {
        self.get(&format!("api/orders/{id}")).await
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// `POST /api/upload/image` as multipart field `image`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 400 for non-image content
    /// types and 413 when the file is too large.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("image", part);
        let url = self.url("api/upload/image")?;
        self.send(self.request(Method::POST, url).multipart(form))
            .await
    }
}

/// Pass successful responses through; turn anything else into
/// [`ClientError::Api`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    debug!(status = %status, body = %body.chars().take(200).collect::<String>(), "API error response");
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(&body, status.canonical_reason()),
    })
}

/// Extract the `error` field of an error body, falling back to the raw
/// text and then to the status reason.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("unknown error").to_owned()
    } else {
        trimmed.to_owned()
    }
}
