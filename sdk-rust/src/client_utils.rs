use crate::LanguageModelError;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

/// Create a JSON request, parse the response.
/// Any status outside 2xx is returned as [`LanguageModelError::StatusCode`]
/// with the response body, and a body that does not match `R` is reported
/// as an invariant violation of `provider`.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
    provider: &'static str,
) -> Result<R, LanguageModelError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LanguageModelError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ));
    }

    let body = response.text().await?;
    serde_json::from_str::<R>(&body).map_err(|error| {
        LanguageModelError::Invariant(provider, format!("Failed to parse response body: {error}"))
    })
}

/// Build a header value, naming `label` in the error when the value contains
/// bytes HTTP does not allow.
pub fn header_value(label: &str, value: &str) -> Result<HeaderValue, LanguageModelError> {
    HeaderValue::from_str(value).map_err(|error| {
        LanguageModelError::InvalidInput(format!("Invalid {label} header value: {error}"))
    })
}

/// Copy caller supplied headers into `headers`, overriding defaults with the
/// same name.
pub fn insert_extra_headers(
    headers: &mut HeaderMap,
    extra: &HashMap<String, String>,
    provider_label: &str,
) -> Result<(), LanguageModelError> {
    for (key, value) in extra {
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
            LanguageModelError::InvalidInput(format!(
                "Invalid {provider_label} header name '{key}': {error}"
            ))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|error| {
            LanguageModelError::InvalidInput(format!(
                "Invalid {provider_label} header value for '{key}': {error}"
            ))
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(())
}
