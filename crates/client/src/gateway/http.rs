//! HTTP implementation of [`RemoteGateway`].
//!
//! REST+JSON over `reqwest`. Addresses are cached with `moka` (5-minute
//! TTL); everything else is fetched fresh, since the order and wishlist
//! stores own their own caching semantics. The push channel is a streamed
//! NDJSON response: one JSON event frame per line.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use kirana_core::{Address, Order, OrderDraft, OrderId, ProductId, PushEvent, WishlistEntry};

use super::wire::{WireOrder, WireWishlistEntry};
use super::{EventStream, GatewayError, RemoteGateway};
use crate::config::ClientConfig;

/// TTL for the address cache.
const ADDRESS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Shape of a structured error body from the backend.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for the Kirana backend.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    client: reqwest::Client,
    api_url: Url,
    push_url: Url,
    token: RwLock<Option<SecretString>>,
    address_cache: Cache<&'static str, Arc<Vec<Address>>>,
}

impl HttpGateway {
    /// Create a gateway from client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let address_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(ADDRESS_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(HttpGatewayInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                push_url: config.push_url.clone(),
                token: RwLock::new(config.auth_token.clone()),
                address_cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.inner.api_url.join(path).map_err(|e| GatewayError::Api {
            status: 0,
            message: format!("invalid endpoint {path}: {e}"),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.inner.token.read().expect("token lock poisoned");
        match token.as_ref() {
            Some(t) => request.bearer_auth(t.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode the JSON response body.
    ///
    /// The body is read as text first so decode failures can be logged with
    /// the offending payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(GatewayError::AuthRequired);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(
                    |_| body.chars().take(200).collect::<String>(),
                    |parsed| parsed.message,
                );
            warn!(status = %status, message = %message, "backend returned an error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to decode backend response"
            );
            GatewayError::Parse(e)
        })
    }

    /// Send a request where only the status matters; the response body (an
    /// ack or an echo of the updated list) is discarded.
    async fn execute_ack(&self, request: reqwest::RequestBuilder) -> Result<(), GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(GatewayError::AuthRequired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(
                    |_| body.chars().take(200).collect::<String>(),
                    |parsed| parsed.message,
                );
            warn!(status = %status, message = %message, "backend returned an error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    fn set_auth_token(&self, token: Option<SecretString>) {
        let mut slot = self.inner.token.write().expect("token lock poisoned");
        *slot = token;
    }

    #[instrument(skip(self))]
    async fn fetch_orders(&self) -> Result<Vec<Order>, GatewayError> {
        let url = self.endpoint("orders")?;
        let wire: Vec<WireOrder> = self.execute(self.inner.client.get(url)).await?;
        Ok(wire.into_iter().map(WireOrder::normalize).collect())
    }

    #[instrument(skip_all)]
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, GatewayError> {
        let url = self.endpoint("orders")?;
        let wire: WireOrder = self
            .execute(self.inner.client.post(url).json(draft))
            .await?;
        Ok(wire.normalize())
    }

    #[instrument(skip(self, reason))]
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        reason: &str,
    ) -> Result<Order, GatewayError> {
        let url = self.endpoint(&format!("orders/{order_id}/cancel"))?;
        let body = serde_json::json!({ "reason": reason });
        let wire: WireOrder = self
            .execute(self.inner.client.post(url).json(&body))
            .await?;
        Ok(wire.normalize())
    }

    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError> {
        let url = self.endpoint("wishlist")?;
        let wire: Vec<WireWishlistEntry> = self.execute(self.inner.client.get(url)).await?;
        Ok(wire.into_iter().map(WireWishlistEntry::normalize).collect())
    }

    #[instrument(skip(self))]
    async fn add_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        let url = self.endpoint("wishlist")?;
        let body = serde_json::json!({ "productId": product_id });
        // Response body (the updated list or an ack) is intentionally
        // ignored; the wishlist store treats the local entry as truth.
        self.execute_ack(self.inner.client.post(url).json(&body)).await
    }

    #[instrument(skip(self))]
    async fn remove_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        let url = self.endpoint(&format!("wishlist/{product_id}"))?;
        self.execute_ack(self.inner.client.delete(url)).await
    }

    #[instrument(skip(self))]
    async fn fetch_addresses(&self) -> Result<Vec<Address>, GatewayError> {
        if let Some(cached) = self.inner.address_cache.get("addresses").await {
            debug!("address cache hit");
            return Ok(cached.as_ref().clone());
        }

        let url = self.endpoint("profile/addresses")?;
        let addresses: Vec<Address> = self.execute(self.inner.client.get(url)).await?;
        self.inner
            .address_cache
            .insert("addresses", Arc::new(addresses.clone()))
            .await;
        Ok(addresses)
    }

    #[instrument(skip(self))]
    async fn subscribe_events(&self) -> Result<EventStream, GatewayError> {
        let request = self
            .inner
            .client
            .get(self.inner.push_url.clone())
            .header(reqwest::header::ACCEPT, "application/x-ndjson");
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(GatewayError::AuthRequired);
        }
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: "push channel refused".to_string(),
            });
        }

        // Reassemble NDJSON frames across chunk boundaries and forward the
        // decoded events. Undecodable lines are logged and skipped.
        let (tx, rx) = futures::channel::mpsc::unbounded();
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                            let frame: Vec<u8> = buffer.drain(..=newline).collect();
                            let line = String::from_utf8_lossy(&frame);
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<PushEvent>(line) {
                                Ok(event) => {
                                    if tx.unbounded_send(event).is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    warn!(error = %e, frame = %line, "skipping bad push frame");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "push channel read failed");
                        break;
                    }
                }
            }
            debug!("push channel closed");
        });

        Ok(Box::pin(rx))
    }
}
