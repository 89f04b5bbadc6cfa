use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    admin::{AdminError, OfferDraft, OfferManager},
    error::AppError,
    offers::{Country, LoanOffer},
    presentation::OffersView,
    quiz::{self, QuizState},
    recent::{self, RecentLoan},
    repository::OfferStore,
    state::AppState,
};

#[derive(Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct QuestionView {
    pub title: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionView>,
}

#[derive(Serialize)]
pub struct QuizView {
    pub step: usize,
    pub total: usize,
    pub progress: u8,
    pub complete: bool,
    pub can_go_back: bool,
    pub country: Option<Country>,
    pub question: Option<QuestionView>,
}

fn view_of(state: &QuizState) -> QuizView {
    let question = quiz::current_step(state).map(|step| {
        let selected = quiz::selected_value(state, step);
        QuestionView {
            title: step.title,
            description: step.description,
            options: step
                .options
                .iter()
                .map(|o| OptionView {
                    value: o.value,
                    label: o.label,
                    selected: selected == Some(o.value),
                })
                .collect(),
        }
    });

    QuizView {
        step: state.step,
        total: quiz::TOTAL_STEPS,
        progress: quiz::progress_percent(state),
        complete: state.is_complete(),
        can_go_back: quiz::can_go_back(state),
        country: state.answers.country,
        question,
    }
}

fn with_session<T>(
    state: &AppState,
    id: Uuid,
    apply: impl FnOnce(&mut QuizState) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut sessions = state.sessions.lock().unwrap();
    let session = sessions.get_mut(&id).ok_or(AppError::UnknownSession)?;
    apply(session)
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<SessionCreated> {
    let id = Uuid::new_v4();
    let mut session = QuizState::new();
    session.set_started(true);

    state.sessions.lock().unwrap().insert(id, session);
    Json(SessionCreated { id })
}

pub async fn quiz_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    with_session(&state, id, |session| Ok(Json(view_of(session))))
}

#[derive(Deserialize)]
pub struct AnswerBody {
    pub value: String,
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerBody>,
) -> Result<Json<QuizView>, AppError> {
    with_session(&state, id, |session| {
        quiz::select(session, &body.value)?;
        Ok(Json(view_of(session)))
    })
}

pub async fn back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    with_session(&state, id, |session| {
        session.prev_step();
        Ok(Json(view_of(session)))
    })
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    with_session(&state, id, |session| {
        session.reset();
        Ok(Json(view_of(session)))
    })
}

#[derive(Deserialize)]
pub struct CountryQuery {
    pub country: Country,
}

#[derive(Serialize)]
pub struct PublicOffers {
    #[serde(flatten)]
    pub view: OffersView,
    pub recent: &'static [RecentLoan],
    pub recent_highlight: Option<RecentLoan>,
}

/// Public read path: active offers for the visitor's country, ordered by
/// rank, plus the recent-loans showcase.
pub async fn public_offers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Json<PublicOffers> {
    let result = state.offers.list(query.country, true).await;
    let view = OffersView::from_result(query.country, result);

    let recent_highlight = state.ticker.lock().unwrap().advance(query.country);

    Json(PublicOffers {
        view,
        recent: recent::loans_for(query.country),
        recent_highlight,
    })
}

pub async fn login() -> impl IntoResponse {
    "Войдите, чтобы открыть панель администратора"
}

/// Admin gate. The auth protocol itself is the platform's business; here we
/// only check for a valid session token and bounce to the login view
/// otherwise.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token == state.config.admin_token)
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}

/// Admin screen payload: the working list plus the single current error
/// message, if the last operation failed.
#[derive(Serialize)]
pub struct AdminOffers {
    pub offers: Vec<LoanOffer>,
    pub error: Option<&'static str>,
}

impl AdminOffers {
    fn from_manager<S: OfferStore>(manager: &OfferManager<S>) -> Self {
        Self {
            offers: manager.offers().to_vec(),
            error: manager.message(),
        }
    }
}

/// Admin responses always carry the working list plus the current message;
/// a failed operation additionally puts its mapped status on the response,
/// so a validation error or platform outage is visible without parsing the
/// body.
fn admin_response<S: OfferStore>(
    manager: &OfferManager<S>,
    result: Result<(), AdminError>,
) -> Response {
    let body = Json(AdminOffers::from_manager(manager));
    match result {
        Ok(()) => body.into_response(),
        Err(e) => (AppError::from(e).status(), body).into_response(),
    }
}

pub async fn admin_offers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Response {
    let mut manager = OfferManager::new(state.offers.clone(), query.country);
    let result = manager.load().await;
    admin_response(&manager, result)
}

pub async fn save_offer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
    Json(draft): Json<OfferDraft>,
) -> Response {
    let mut manager = OfferManager::new(state.offers.clone(), query.country);
    let result = match manager.load().await {
        Ok(()) => manager.save(draft).await,
        Err(e) => Err(e),
    };
    admin_response(&manager, result)
}

pub async fn delete_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<CountryQuery>,
) -> Response {
    let mut manager = OfferManager::new(state.offers.clone(), query.country);
    let result = match manager.load().await {
        Ok(()) => manager.delete(id).await,
        Err(e) => Err(e),
    };
    admin_response(&manager, result)
}

#[derive(Deserialize)]
pub struct ReorderBody {
    pub country: Country,
    pub from: usize,
    pub to: usize,
}

pub async fn reorder_offers(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderBody>,
) -> Response {
    let mut manager = OfferManager::new(state.offers.clone(), body.country);
    let result = match manager.load().await {
        Ok(()) => manager.reorder(body.from, body.to).await,
        Err(e) => Err(e),
    };
    admin_response(&manager, result)
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub country: Country,
    pub ext: String,
}

fn valid_ext(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    if body.is_empty() || !valid_ext(&query.ext) {
        return Err(AppError::MalformedPayload);
    }

    let mut manager = OfferManager::new(state.offers.clone(), query.country);
    let result = match manager.load().await {
        Ok(()) => manager
            .upload_logo(id, body.to_vec(), &query.ext)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };
    Ok(admin_response(&manager, result))
}
