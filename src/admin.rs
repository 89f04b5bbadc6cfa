//! # Admin Offer Manager
//!
//! Ordered, per-country working copy of the offer list with edit/add/delete/
//! reorder on top of the repository facade.
//!
//! The list is replaced wholesale whenever the country filter changes; there
//! is no incremental merge. Loads are tagged with a generation token so a
//! response that raced with a newer country switch is discarded instead of
//! overwriting fresher state. The token only matters to callers that keep
//! one manager alive across overlapping loads (an embedding shell driving
//! `begin_load`/`complete_load` directly); the request handlers build a
//! request-scoped manager whose single load cannot race.
//!
//! A reorder applies locally first and persists every recomputed rank in one
//! batched write. If that write fails we reconcile by reloading from the
//! platform, so the screen never drifts silently from the source of truth.
//!
//! Every failing operation sets a single current message, replacing the
//! previous one; the next successful operation clears it.

use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::{
    offers::{ApprovalRating, Country, LoanOffer, OrderUpdate},
    repository::{OfferStore, RepositoryError},
};

const LOAD_MESSAGE: &str = "Ошибка при загрузке предложений";
const SAVE_MESSAGE: &str = "Ошибка при сохранении предложения";
const DELETE_MESSAGE: &str = "Ошибка при удалении предложения";
const REORDER_MESSAGE: &str = "Ошибка при изменении порядка";
const UPLOAD_MESSAGE: &str = "Ошибка при загрузке логотипа";

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no offer at position {0}")]
    BadPosition(usize),
}

#[derive(Error, Debug, PartialEq)]
#[error("поле '{field}' должно быть целым числом")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Form buffer for the admin screen. Numeric columns stay text until save,
/// so they are parsed here explicitly instead of being coerced on the way
/// out.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OfferDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub country: Country,
    pub logo_url: Option<String>,
    pub min_amount: String,
    pub max_amount: String,
    pub rate: String,
    pub term: String,
    pub max_term_days: String,
    pub approval_time: String,
    pub first_loan_free: bool,
    pub is_active: bool,
    pub display_order: i32,
    pub approval_rating: ApprovalRating,
}

impl OfferDraft {
    pub fn validate(self) -> Result<LoanOffer, ValidationError> {
        Ok(LoanOffer {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            url: self.url,
            country: self.country,
            logo_url: self.logo_url,
            min_amount: parse_field("min_amount", &self.min_amount)?,
            max_amount: parse_field("max_amount", &self.max_amount)?,
            rate: self.rate,
            term: self.term,
            max_term_days: parse_field("max_term_days", &self.max_term_days)?,
            approval_time: self.approval_time,
            first_loan_free: self.first_loan_free,
            is_active: self.is_active,
            display_order: self.display_order,
            approval_rating: self.approval_rating,
        })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    value.trim().parse().map_err(|_| ValidationError { field })
}

/// Draft template for a new offer, appended at the end of the current list.
pub fn default_draft(country: Country, position: usize) -> OfferDraft {
    OfferDraft {
        id: None,
        name: String::new(),
        url: String::new(),
        country,
        logo_url: None,
        min_amount: "1000".into(),
        max_amount: "15000".into(),
        rate: "0.01".into(),
        term: "7-30 дней".into(),
        max_term_days: "30".into(),
        approval_time: "15 минут".into(),
        first_loan_free: false,
        is_active: true,
        display_order: position as i32,
        approval_rating: ApprovalRating::Medium,
    }
}

pub struct OfferManager<S> {
    store: S,
    country: Country,
    offers: Vec<LoanOffer>,
    generation: u64,
    message: Option<&'static str>,
}

impl<S: OfferStore> OfferManager<S> {
    pub fn new(store: S, country: Country) -> Self {
        Self {
            store,
            country,
            offers: Vec::new(),
            generation: 0,
            message: None,
        }
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn offers(&self) -> &[LoanOffer] {
        &self.offers
    }

    /// Current user-visible error, if the last operation failed.
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Tags an in-flight load. A later `begin_load` invalidates this token.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Installs a finished load unless a newer one has started since.
    pub fn complete_load(
        &mut self,
        token: u64,
        result: Result<Vec<LoanOffer>, RepositoryError>,
    ) -> Result<(), AdminError> {
        if token != self.generation {
            // Stale response from a superseded country selection.
            return Ok(());
        }

        match result {
            Ok(mut offers) => {
                offers.sort_by(|a, b| {
                    a.display_order
                        .cmp(&b.display_order)
                        .then_with(|| a.id.cmp(&b.id))
                });
                self.offers = offers;
                self.message = None;
                Ok(())
            }
            Err(e) => {
                error!("Error loading offers: {e}");
                self.message = Some(LOAD_MESSAGE);
                Err(e.into())
            }
        }
    }

    pub async fn load(&mut self) -> Result<(), AdminError> {
        let token = self.begin_load();
        let result = self.store.list(self.country, false).await;
        self.complete_load(token, result)
    }

    pub async fn set_country(&mut self, country: Country) -> Result<(), AdminError> {
        self.country = country;
        self.load().await
    }

    pub fn new_draft(&self) -> OfferDraft {
        default_draft(self.country, self.offers.len())
    }

    /// Validates and persists the whole record, then reloads. The record is
    /// pinned to the current country filter regardless of what the form
    /// carried.
    pub async fn save(&mut self, mut draft: OfferDraft) -> Result<(), AdminError> {
        draft.country = self.country;

        let offer = match draft.validate() {
            Ok(offer) => offer,
            Err(e) => {
                self.message = Some(SAVE_MESSAGE);
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.upsert(std::slice::from_ref(&offer)).await {
            error!("Error saving offer: {e}");
            self.message = Some(SAVE_MESSAGE);
            return Err(e.into());
        }

        self.load().await
    }

    /// Deletes via the repository, then reloads. A failed delete leaves the
    /// local list untouched.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), AdminError> {
        if let Err(e) = self.store.delete(id).await {
            error!("Error deleting offer: {e}");
            self.message = Some(DELETE_MESSAGE);
            return Err(e.into());
        }

        self.load().await
    }

    /// Moves one element and renumbers every rank as its new 0-based
    /// position, persisted in a single batched write.
    pub async fn reorder(&mut self, from: usize, to: usize) -> Result<(), AdminError> {
        if from >= self.offers.len() {
            return Err(AdminError::BadPosition(from));
        }
        if to >= self.offers.len() {
            return Err(AdminError::BadPosition(to));
        }

        let moved = self.offers.remove(from);
        self.offers.insert(to, moved);

        let mut updates = Vec::with_capacity(self.offers.len());
        for (index, offer) in self.offers.iter_mut().enumerate() {
            offer.display_order = index as i32;
            updates.push(OrderUpdate {
                id: offer.id,
                display_order: offer.display_order,
            });
        }

        if let Err(e) = self.store.update_order(&updates).await {
            error!("Error updating order: {e}");
            // Reconcile with the source of truth instead of keeping a local
            // permutation the platform never acknowledged.
            let token = self.begin_load();
            let result = self.store.list(self.country, false).await;
            let _ = self.complete_load(token, result);
            self.message = Some(REORDER_MESSAGE);
            return Err(e.into());
        }

        self.message = None;
        Ok(())
    }

    pub async fn upload_logo(&mut self, id: Uuid, bytes: Vec<u8>, ext: &str) -> Result<String, AdminError> {
        match self.store.upload_logo(id, bytes, ext).await {
            Ok(url) => {
                self.load().await?;
                Ok(url)
            }
            Err(e) => {
                error!("Error uploading logo: {e}");
                self.message = Some(UPLOAD_MESSAGE);
                Err(e.into())
            }
        }
    }
}
