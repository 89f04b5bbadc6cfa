//! # Offer Repository
//!
//! Facade over the hosted data platform.
//!
//! The platform exposes a PostgREST-style table API plus an object store, so
//! every operation here is a plain HTTP request: equality filters and an
//! ascending sort for reads, merge-duplicates upserts for writes, and an
//! overwrite-upload for logos. Nothing is retried; a failed call surfaces a
//! single human-readable cause and the caller decides what the screen shows.
//!
//! Ties on `display_order` are broken by id on the read path, so two offers
//! left with the same rank by a partial reorder persist still come back in a
//! deterministic order.

use std::future::Future;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::Config,
    offers::{Country, LoanOffer, OrderUpdate},
};

const OFFERS_TABLE: &str = "loan_offers";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("offer read failed: {0}")]
    Read(String),
    #[error("offer write failed: {0}")]
    Write(String),
    #[error("logo upload failed: {0}")]
    Upload(String),
}

/// Seam between the admin manager / public presentation and the hosted
/// platform. Tests substitute an in-memory store.
pub trait OfferStore: Send + Sync {
    fn list(
        &self,
        country: Country,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<LoanOffer>, RepositoryError>> + Send;

    fn upsert(&self, offers: &[LoanOffer]) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// One batched write of `{id, display_order}` pairs.
    fn update_order(
        &self,
        updates: &[OrderUpdate],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Stores the asset under `{id}.{ext}` (overwriting) and points the
    /// owning offer's `logo_url` at the public address. Two steps: if the
    /// record update fails after the upload succeeded, the stored asset is
    /// orphaned until the next successful upload for that offer.
    fn upload_logo(
        &self,
        id: Uuid,
        bytes: Vec<u8>,
        ext: &str,
    ) -> impl Future<Output = Result<String, RepositoryError>> + Send;
}

pub fn list_path(country: Country, active_only: bool) -> String {
    let mut path = format!(
        "/rest/v1/{OFFERS_TABLE}?country=eq.{}&order=display_order.asc,id.asc",
        country.as_str()
    );
    if active_only {
        path.push_str("&is_active=eq.true");
    }
    path
}

pub fn delete_path(id: Uuid) -> String {
    format!("/rest/v1/{OFFERS_TABLE}?id=eq.{id}")
}

pub fn patch_path(id: Uuid) -> String {
    format!("/rest/v1/{OFFERS_TABLE}?id=eq.{id}")
}

pub fn upsert_path() -> String {
    format!("/rest/v1/{OFFERS_TABLE}")
}

pub fn object_path(bucket: &str, id: Uuid, ext: &str) -> String {
    format!("/storage/v1/object/{bucket}/{id}.{ext}")
}

pub fn public_logo_url(base_url: &str, bucket: &str, id: Uuid, ext: &str) -> String {
    format!("{base_url}/storage/v1/object/public/{bucket}/{id}.{ext}")
}

#[derive(Clone)]
pub struct HostedOfferStore {
    http: Client,
    base_url: String,
    bucket: String,
    headers: HeaderMap,
}

impl HostedOfferStore {
    pub fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&config.platform_key).expect("Bad platform key!"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.platform_key)).expect("Bad platform key!"),
        );

        Self {
            http: Client::new(),
            base_url: config.platform_url.trim_end_matches('/').to_string(),
            bucket: config.logo_bucket.clone(),
            headers,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, String> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Platform request failed: {status} {body}");
        Err(format!("platform returned {status}"))
    }

    /// Insert-or-replace by identity via the table API's merge semantics.
    async fn merge_upsert<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), RepositoryError> {
        let response = self
            .http
            .post(self.url(path))
            .headers(self.headers.clone())
            .header("Prefer", "resolution=merge-duplicates")
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Self::check(response).await.map_err(RepositoryError::Write)?;
        Ok(())
    }
}

impl OfferStore for HostedOfferStore {
    async fn list(&self, country: Country, active_only: bool) -> Result<Vec<LoanOffer>, RepositoryError> {
        let response = self
            .http
            .get(self.url(&list_path(country, active_only)))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))?;

        let response = Self::check(response).await.map_err(RepositoryError::Read)?;

        response
            .json::<Vec<LoanOffer>>()
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))
    }

    async fn upsert(&self, offers: &[LoanOffer]) -> Result<(), RepositoryError> {
        self.merge_upsert(&upsert_path(), offers).await
    }

    async fn update_order(&self, updates: &[OrderUpdate]) -> Result<(), RepositoryError> {
        self.merge_upsert(&upsert_path(), updates).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let response = self
            .http
            .delete(self.url(&delete_path(id)))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Self::check(response).await.map_err(RepositoryError::Write)?;
        Ok(())
    }

    async fn upload_logo(&self, id: Uuid, bytes: Vec<u8>, ext: &str) -> Result<String, RepositoryError> {
        let response = self
            .http
            .post(self.url(&object_path(&self.bucket, id, ext)))
            .headers(self.headers.clone())
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| RepositoryError::Upload(e.to_string()))?;

        Self::check(response).await.map_err(RepositoryError::Upload)?;

        let public_url = public_logo_url(&self.base_url, &self.bucket, id, ext);

        // Second leg: point the record at the stored asset. Failing here
        // leaves the uploaded object unreferenced.
        let response = self
            .http
            .patch(self.url(&patch_path(id)))
            .headers(self.headers.clone())
            .json(&serde_json::json!({ "logo_url": public_url }))
            .send()
            .await
            .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Self::check(response).await.map_err(RepositoryError::Write)?;

        Ok(public_url)
    }
}
