//! Retrying transport client

use super::config::{Endpoints, TransportConfig};
use super::exchange::{ExchangeErrorKind, HttpExchange, HttpReply, HttpRequest, ReqwestExchange};
use super::{RawResponse, SendResult, Transport, TransportError, TransportErrorKind};
use crate::error::Result;
use crate::providers::{ProviderFamily, ProviderPayload};
use crate::util::sanitize_api_error;
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, instrument, warn};

/// Sends payloads with authentication, timeout and bounded retry
pub struct TransportClient<E = ReqwestExchange> {
    exchange: E,
    endpoints: Endpoints,
    config: TransportConfig,
}

impl<E> fmt::Debug for TransportClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient")
            .field("endpoints", &self.endpoints)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransportClient<ReqwestExchange> {
    /// Client over reqwest
    pub fn new(endpoints: Endpoints, config: TransportConfig) -> Result<Self> {
        let exchange = ReqwestExchange::new(config.timeout)?;
        Ok(Self::with_exchange(exchange, endpoints, config))
    }
}

impl<E: HttpExchange> TransportClient<E> {
    /// Client over any exchange
    pub fn with_exchange(exchange: E, endpoints: Endpoints, config: TransportConfig) -> Self {
        Self {
            exchange,
            endpoints,
            config,
        }
    }

    /// Configured endpoints
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_backoff,
            current_interval: self.config.initial_backoff,
            max_interval: self.config.max_backoff,
            multiplier: self.config.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };
        backoff.reset();
        backoff
    }

    /// Resolve URL and headers for a payload
    fn build_request(
        &self,
        payload: &ProviderPayload,
    ) -> std::result::Result<HttpRequest, TransportError> {
        let endpoint = self.endpoints.get(payload.provider_id()).ok_or_else(|| {
            TransportError::new(
                TransportErrorKind::NotConfigured,
                format!("no endpoint or API key configured for {}", payload.provider_id()),
                0,
            )
        })?;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        match payload.family() {
            ProviderFamily::Gemini => {
                headers.push(("x-goog-api-key".to_string(), endpoint.api_key.clone()));
            }
            ProviderFamily::OpenAiResponses | ProviderFamily::OpenAiDeepResearch => {
                headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", endpoint.api_key),
                ));
            }
            ProviderFamily::OpenRouter => {
                headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", endpoint.api_key),
                ));
                if let Some(site_url) = &endpoint.site_url {
                    headers.push(("HTTP-Referer".to_string(), site_url.clone()));
                }
                if let Some(app_name) = &endpoint.app_name {
                    headers.push(("X-Title".to_string(), app_name.clone()));
                }
            }
        }

        Ok(HttpRequest {
            url: endpoint.url(payload.endpoint()),
            headers,
            body: payload.body().clone(),
        })
    }

    fn into_raw(reply: HttpReply, attempts: u32) -> RawResponse {
        RawResponse {
            status: reply.status,
            headers: reply.headers,
            body: reply.body,
            raw_bytes: reply.raw_bytes,
            attempts,
            received_at: Utc::now(),
        }
    }
}

#[async_trait]
impl<E: HttpExchange> Transport for TransportClient<E> {
    async fn send(&self, payload: ProviderPayload) -> SendResult {
        self.send_counted(payload, &AtomicU32::new(0)).await
    }

    #[instrument(
        skip(self, payload, attempts),
        fields(provider = %payload.provider_id(), model = %payload.model(), family = %payload.family())
    )]
    async fn send_counted(&self, payload: ProviderPayload, attempts: &AtomicU32) -> SendResult {
        let request = self.build_request(&payload)?;
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = self.backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;
            attempts.store(attempt, Ordering::Relaxed);
            let result = self.exchange.post(&request).await;

            let retry_reason = match &result {
                Ok(reply) if reply.is_transient() => Some(format!("HTTP {}", reply.status)),
                Ok(_) => None,
                Err(e) if e.is_transient() => Some(e.detail.clone()),
                Err(_) => None,
            };

            if retry_reason.is_none() || attempt >= max_attempts {
                return match result {
                    Ok(reply) => {
                        debug!(attempt, status = reply.status, "provider replied");
                        Ok(Self::into_raw(reply, attempt))
                    }
                    Err(e) => {
                        let kind = match e.kind {
                            ExchangeErrorKind::Timeout => TransportErrorKind::Timeout,
                            ExchangeErrorKind::Connect => TransportErrorKind::Connect,
                            ExchangeErrorKind::Other => TransportErrorKind::Other,
                        };
                        warn!(attempt, error = %e, "provider request failed");
                        Err(TransportError::new(
                            kind,
                            sanitize_api_error(&e.detail),
                            attempt,
                        ))
                    }
                };
            }

            let delay = backoff
                .next_backoff()
                .unwrap_or(self.config.max_backoff)
                .min(self.config.max_backoff);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                reason = retry_reason.as_deref().unwrap_or_default(),
                "transient provider failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
