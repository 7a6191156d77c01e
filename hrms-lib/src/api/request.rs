//! Request pipeline: send, retry idempotent requests, decode.

use log::{debug, info, warn};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::HrmsClient;
use crate::error::{ApiError, Error};

impl HrmsClient {
    /// Resolve an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Resolve an endpoint path and append the given query parameters.
    pub(crate) fn endpoint_with_query(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<Url, Error> {
        let mut url = self.endpoint(path)?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.send::<()>(Method::GET, url, None).await?;
        read_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, url, Some(body)).await?;
        read_json(response).await
    }

    pub(crate) async fn patch_json<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PATCH, url, Some(body)).await?;
        read_json(response).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Send a request, retrying idempotent methods on 5xx and transport
    /// errors. Non-2xx responses become [`ApiError::Http`].
    async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Response, Error>
    where
        B: Serialize + Sync + ?Sized,
    {
        let retry = &self.inner.retry;
        let idempotent = method == Method::GET || method == Method::DELETE;
        let mut attempts = 0;
        let mut delay = retry.initial_delay;

        loop {
            info!("{method} {url}");

            match self.send_once(method.clone(), url.clone(), body).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("{method} {url} -> {status}");
                        return Ok(response);
                    }

                    if status.is_server_error()
                        && idempotent
                        && retry.retry_on_5xx
                        && attempts < retry.max_retries
                    {
                        warn!("{method} {url} -> {status}, retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        delay = retry.next_delay(delay);
                        attempts += 1;
                        continue;
                    }

                    let mut text = response.text().await.unwrap_or_default();
                    if text.trim().is_empty() {
                        text = status.canonical_reason().unwrap_or_default().to_string();
                    }
                    warn!("{method} {url} -> {status}: {text}");
                    return Err(ApiError::from_body(status.as_u16(), text).into());
                }
                Err(e) => {
                    if e.is_retryable()
                        && idempotent
                        && retry.retry_on_network
                        && attempts < retry.max_retries
                    {
                        warn!("{method} {url} failed ({e}), retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        delay = retry.next_delay(delay);
                        attempts += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Single attempt without retry logic.
    async fn send_once<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut request = self.inner.http_client.request(method, url);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| match self.inner.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(e),
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let body = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body).into())
}
