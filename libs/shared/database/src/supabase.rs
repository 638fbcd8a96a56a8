use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_RANGE, CONTENT_TYPE, AUTHORIZATION},
    Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::collections::Collection;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", provider_message(&error_text)),
                404 => anyhow!("Resource not found: {}", provider_message(&error_text)),
                _ => anyhow!("API error ({}): {}", status, provider_message(&error_text)),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, path, auth_token, body, extra_headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Issues a request whose response body is ignored (204 endpoints).
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<()> {
        self.send(method, path, auth_token, body, None).await?;
        Ok(())
    }

    // Document collections

    pub async fn select_all(
        &self,
        collection: Collection,
        order: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = match order {
            Some(order) => format!("{}?select=*&order={}", collection.rest_path(), order),
            None => format!("{}?select=*", collection.rest_path()),
        };

        self.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Exact row count, read from the `Content-Range` total rather than by
    /// downloading the collection.
    pub async fn count(&self, collection: Collection, auth_token: &str) -> Result<usize> {
        let path = format!("{}?select=id&limit=1", collection.rest_path());
        let response = self.send(
            Method::GET,
            &path,
            Some(auth_token),
            None,
            Some(prefer("count=exact")),
        ).await?;

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| anyhow!("Count of {} returned no Content-Range", collection))?;

        content_range_total(range)
    }

    pub async fn select_eq(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = format!(
            "{}?{}=eq.{}",
            collection.rest_path(),
            column,
            urlencoding::encode(value)
        );

        self.request(Method::GET, &path, Some(auth_token), None).await
    }

    pub async fn select_by_id(
        &self,
        collection: Collection,
        id: &str,
        auth_token: &str,
    ) -> Result<Option<Value>> {
        let mut rows = self.select_eq(collection, "id", id, auth_token).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    pub async fn insert(
        &self,
        collection: Collection,
        document: Value,
        auth_token: &str,
    ) -> Result<Value> {
        let mut rows: Vec<Value> = self.request_with_headers(
            Method::POST,
            &collection.rest_path(),
            Some(auth_token),
            Some(document),
            Some(prefer("return=representation")),
        ).await?;

        if rows.is_empty() {
            return Err(anyhow!("Insert into {} returned no document", collection));
        }

        Ok(rows.swap_remove(0))
    }

    /// Inserts or replaces the document keyed by its `id` field.
    pub async fn upsert(
        &self,
        collection: Collection,
        document: Value,
        auth_token: &str,
    ) -> Result<Value> {
        let mut rows: Vec<Value> = self.request_with_headers(
            Method::POST,
            &collection.rest_path(),
            Some(auth_token),
            Some(document),
            Some(prefer("resolution=merge-duplicates,return=representation")),
        ).await?;

        if rows.is_empty() {
            return Err(anyhow!("Upsert into {} returned no document", collection));
        }

        Ok(rows.swap_remove(0))
    }

    /// Returns `None` when no document has the given id.
    pub async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        changes: Value,
        auth_token: &str,
    ) -> Result<Option<Value>> {
        let path = format!("{}?id=eq.{}", collection.rest_path(), urlencoding::encode(id));

        let mut rows: Vec<Value> = self.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(changes),
            Some(prefer("return=representation")),
        ).await?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    /// Returns `false` when no document has the given id.
    pub async fn delete_by_id(
        &self,
        collection: Collection,
        id: &str,
        auth_token: &str,
    ) -> Result<bool> {
        let path = format!("{}?id=eq.{}", collection.rest_path(), urlencoding::encode(id));

        let rows: Vec<Value> = self.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(prefer("return=representation")),
        ).await?;

        Ok(!rows.is_empty())
    }

    // Authentication

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({
                "email": email,
                "password": password,
            })),
        ).await
    }

    pub async fn sign_out(&self, auth_token: &str) -> Result<()> {
        self.execute(Method::POST, "/auth/v1/logout", Some(auth_token), None).await
    }

    pub async fn update_user_metadata(&self, metadata: Value, auth_token: &str) -> Result<Value> {
        self.request(
            Method::PUT,
            "/auth/v1/user",
            Some(auth_token),
            Some(json!({ "data": metadata })),
        ).await
    }
}

fn prefer(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static(value));
    headers
}

/// Pulls the human-readable message out of a provider error body.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

/// Total from a PostgREST `Content-Range` such as `0-0/42` or `*/0`.
fn content_range_total(range: &str) -> Result<usize> {
    range
        .rsplit_once('/')
        .and_then(|(_, total)| total.parse().ok())
        .ok_or_else(|| anyhow!("Unexpected Content-Range: {}", range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_range_total() {
        assert_eq!(content_range_total("0-0/42").unwrap(), 42);
        assert_eq!(content_range_total("*/0").unwrap(), 0);
        assert!(content_range_total("0-0/*").is_err());
    }

    #[test]
    fn test_provider_message_prefers_known_fields() {
        assert_eq!(
            provider_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(provider_message(r#"{"message":"JWT expired"}"#), "JWT expired");
    }

    #[test]
    fn test_provider_message_falls_back_to_raw_body() {
        assert_eq!(provider_message("upstream timeout"), "upstream timeout");
    }
}
