//! PostgREST-style HTTP store.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    CardPatch, CardPayload, ParaphrasePayload, RemoteCard, RemoteError, RemoteParaphrase,
    RemoteStore,
};
use crate::config::RemoteConfig;

const CARDS_TABLE: &str = "shared_cards";
const PARAPHRASES_TABLE: &str = "paraphrases";

/// HTTP client for the hosted tables.
#[derive(Debug, Clone)]
pub struct RestRemote {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRemote {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn row_url(&self, table: &str, id: i64) -> String {
        format!("{}?id=eq.{}", self.table_url(table), id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Backend { status, message });
        }
        Ok(resp)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, RemoteError> {
        let url = format!("{}?select=*&order=created_at.desc", self.table_url(table));
        tracing::debug!(table, "Fetching rows");

        let resp = self.send(self.request(Method::GET, &url)).await?;
        resp.json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>, RemoteError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);

        let resp = self.send(request).await?;
        resp.json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    async fn patch<B>(&self, table: &str, id: i64, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + Sync,
    {
        let request = self
            .request(Method::PATCH, &self.row_url(table, id))
            .json(body);
        self.send(request).await?;
        Ok(())
    }

    async fn remove(&self, table: &str, id: i64) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &self.row_url(table, id)))
            .await?;
        Ok(())
    }
}

impl RemoteStore for RestRemote {
    async fn fetch_cards(&self) -> Result<Vec<RemoteCard>, RemoteError> {
        self.select(CARDS_TABLE).await
    }

    async fn insert_card(&self, card: &CardPayload) -> Result<RemoteCard, RemoteError> {
        let rows: Vec<RemoteCard> = self.insert(CARDS_TABLE, card).await?;
        rows.into_iter().next().ok_or(RemoteError::EmptyResponse)
    }

    async fn insert_cards(&self, cards: &[CardPayload]) -> Result<Vec<RemoteCard>, RemoteError> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }
        self.insert(CARDS_TABLE, cards).await
    }

    async fn update_card(&self, id: i64, patch: &CardPatch) -> Result<(), RemoteError> {
        self.patch(CARDS_TABLE, id, patch).await
    }

    async fn delete_card(&self, id: i64) -> Result<(), RemoteError> {
        self.remove(CARDS_TABLE, id).await
    }

    async fn fetch_paraphrases(&self) -> Result<Vec<RemoteParaphrase>, RemoteError> {
        self.select(PARAPHRASES_TABLE).await
    }

    async fn insert_paraphrase(
        &self,
        paraphrase: &ParaphrasePayload,
    ) -> Result<RemoteParaphrase, RemoteError> {
        let rows: Vec<RemoteParaphrase> = self.insert(PARAPHRASES_TABLE, paraphrase).await?;
        rows.into_iter().next().ok_or(RemoteError::EmptyResponse)
    }

    async fn update_paraphrase(
        &self,
        id: i64,
        paraphrase: &ParaphrasePayload,
    ) -> Result<(), RemoteError> {
        self.patch(PARAPHRASES_TABLE, id, paraphrase).await
    }

    async fn delete_paraphrase(&self, id: i64) -> Result<(), RemoteError> {
        self.remove(PARAPHRASES_TABLE, id).await
    }
}
