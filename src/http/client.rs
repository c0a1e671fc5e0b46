//! Resilient HTTP client facade.
//!
//! Holds a transport and the global resilience defaults. Defaults can be
//! swapped at runtime; each call takes a snapshot when it starts, so a reload
//! never affects calls already in flight.

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use crate::config::schema::{ResilienceConfig, ResilienceOverrides, ResilienceSettings};
use crate::error::{RequestError, TransportError};
use crate::http::invoker;
use crate::http::request::RequestOptions;
use crate::http::transport::{HttpResponse, Transport};

/// Client that applies the resilience policy to every request.
pub struct ResilientHttpClient<Tr> {
    transport: Tr,
    settings: ArcSwap<ResilienceSettings>,
}

impl<Tr: Transport> ResilientHttpClient<Tr> {
    pub fn new(transport: Tr, settings: ResilienceSettings) -> Self {
        Self {
            transport,
            settings: ArcSwap::from_pointee(settings),
        }
    }

    /// Current global defaults.
    pub fn settings(&self) -> Arc<ResilienceSettings> {
        self.settings.load_full()
    }

    /// Replace the global defaults for calls started from now on.
    pub fn reload_settings(&self, settings: ResilienceSettings) {
        tracing::info!(
            topics = settings.topics.len(),
            retries = settings.retry_intervals_ms.len(),
            "Resilience settings reloaded"
        );
        self.settings.store(Arc::new(settings));
    }

    pub fn transport(&self) -> &Tr {
        &self.transport
    }

    /// Resolve the effective policy of a call from the current defaults.
    pub fn resolve(&self, overrides: ResilienceOverrides) -> ResilienceConfig {
        ResilienceConfig::resolve(&self.settings.load(), overrides)
    }

    /// GET `url` and decode the JSON body as `T`.
    pub async fn get<T>(
        &self,
        url: &str,
        overrides: ResilienceOverrides,
        options: &RequestOptions,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned + Debug + Send + 'static,
    {
        let config = self.resolve(overrides);
        let transport = &self.transport;
        invoker::invoke(&config, move || transport.get::<T>(url, options)).await
    }

    /// Run an arbitrary single-attempt operation under the resilience policy.
    pub async fn invoke<T, F, Fut>(
        &self,
        overrides: ResilienceOverrides,
        operation: F,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned + Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpResponse<T>, TransportError>>,
    {
        let config = self.resolve(overrides);
        invoker::invoke(&config, operation).await
    }
}

impl<Tr> Debug for ResilientHttpClient<Tr> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientHttpClient")
            .field("settings", &self.settings.load())
            .finish_non_exhaustive()
    }
}
