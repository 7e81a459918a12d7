use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::query::TableQuery;
use crate::error::{MindTraceError, Result};

/// Client for the backend's PostgREST table API. Cheap to clone.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: String,
}

impl RestClient {
    /// `project_url` is the project root (e.g. `https://xyz.supabase.co`);
    /// requests go to `{project_url}/rest/v1/{table}`.
    pub fn new(project_url: &str, anon_key: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str, query: &TableQuery) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .query(&query.to_params())
    }

    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &TableQuery) -> Result<Vec<T>> {
        let resp = self
            .request(reqwest::Method::GET, table, query)
            .send()
            .await?;
        read_rows(resp).await
    }

    /// Inserts one row and returns it as stored (server-assigned columns filled in).
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(reqwest::Method::POST, table, &TableQuery::new())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = read_rows(resp).await?;
        rows.into_iter().next().ok_or(MindTraceError::EmptyResponse)
    }

    /// Patches every row matching `query` and returns the updated rows.
    pub async fn update<B, T>(&self, table: &str, query: &TableQuery, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(reqwest::Method::PATCH, table, query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        read_rows(resp).await
    }

    /// Deletes every row matching `query` and returns the deleted rows.
    pub async fn delete<T: DeserializeOwned>(&self, table: &str, query: &TableQuery) -> Result<Vec<T>> {
        let resp = self
            .request(reqwest::Method::DELETE, table, query)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        read_rows(resp).await
    }
}

async fn read_rows<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(MindTraceError::from_response(status, &body));
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
