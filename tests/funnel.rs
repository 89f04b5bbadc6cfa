//! End-to-end funnel behavior against an in-memory platform stand-in.

use mikrozaim::{
    admin::OfferManager,
    offers::{ApprovalRating, Country, LoanOffer, OrderUpdate},
    presentation::OffersView,
    quiz::{self, QuizState},
    repository::{OfferStore, RepositoryError},
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Emulates the hosted table API: equality filters and the ascending
/// rank-then-id ordering the real queries ask for.
#[derive(Clone, Default)]
struct FakePlatform {
    offers: Arc<Mutex<Vec<LoanOffer>>>,
    list_calls: Arc<Mutex<Vec<(Country, bool)>>>,
}

impl OfferStore for FakePlatform {
    async fn list(&self, country: Country, active_only: bool) -> Result<Vec<LoanOffer>, RepositoryError> {
        self.list_calls.lock().unwrap().push((country, active_only));

        let mut offers: Vec<LoanOffer> = self
            .offers
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.country == country && (!active_only || o.is_active))
            .cloned()
            .collect();
        offers.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(offers)
    }

    async fn upsert(&self, incoming: &[LoanOffer]) -> Result<(), RepositoryError> {
        let mut offers = self.offers.lock().unwrap();
        for offer in incoming {
            match offers.iter_mut().find(|o| o.id == offer.id) {
                Some(existing) => *existing = offer.clone(),
                None => offers.push(offer.clone()),
            }
        }
        Ok(())
    }

    async fn update_order(&self, updates: &[OrderUpdate]) -> Result<(), RepositoryError> {
        let mut offers = self.offers.lock().unwrap();
        for update in updates {
            if let Some(offer) = offers.iter_mut().find(|o| o.id == update.id) {
                offer.display_order = update.display_order;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.offers.lock().unwrap().retain(|o| o.id != id);
        Ok(())
    }

    async fn upload_logo(&self, id: Uuid, _bytes: Vec<u8>, ext: &str) -> Result<String, RepositoryError> {
        let url = format!("https://platform.test/storage/v1/object/public/logos/{id}.{ext}");
        if let Some(offer) = self.offers.lock().unwrap().iter_mut().find(|o| o.id == id) {
            offer.logo_url = Some(url.clone());
        }
        Ok(url)
    }
}

fn offer(name: &str, country: Country, order: i32, active: bool) -> LoanOffer {
    LoanOffer {
        id: Uuid::new_v4(),
        name: name.into(),
        url: format!("https://{}.test", name.replace(' ', "-")),
        country,
        logo_url: None,
        min_amount: 1000,
        max_amount: 15000,
        rate: "0.01".into(),
        term: "7-30 дней".into(),
        max_term_days: 30,
        approval_time: "15 минут".into(),
        first_loan_free: false,
        is_active: active,
        display_order: order,
        approval_rating: ApprovalRating::Medium,
    }
}

#[tokio::test]
async fn completing_the_quiz_reads_active_offers_for_the_captured_country() {
    let platform = FakePlatform::default();
    platform
        .upsert(&[
            offer("hidden", Country::Ua, 0, false),
            offer("second", Country::Ua, 2, true),
            offer("first", Country::Ua, 1, true),
            offer("elsewhere", Country::Kz, 0, true),
        ])
        .await
        .unwrap();

    let mut session = QuizState::new();
    session.set_started(true);
    for value in ["ua", "female", "26-35", "no", "employed", "personal"] {
        quiz::select(&mut session, value).unwrap();
    }
    assert!(session.is_complete());

    let country = session.answers.country.expect("country captured at step 0");
    let result = platform.list(country, true).await;
    let view = OffersView::from_result(country, result);

    assert_eq!(
        platform.list_calls.lock().unwrap().as_slice(),
        &[(Country::Ua, true)]
    );

    let OffersView::Loaded { offers } = view else {
        panic!("expected loaded offers");
    };
    let names: Vec<&str> = offers.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn active_filter_never_leaks_inactive_offers() {
    let platform = FakePlatform::default();
    platform
        .upsert(&[
            offer("a", Country::Ru, 0, false),
            offer("b", Country::Ru, 1, true),
            offer("c", Country::Ru, 2, false),
        ])
        .await
        .unwrap();

    let listed = platform.list(Country::Ru, true).await.unwrap();
    assert!(listed.iter().all(|o| o.is_active));
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn admin_reorder_round_trips_through_the_platform() {
    let platform = FakePlatform::default();
    platform
        .upsert(&[
            offer("a", Country::Ua, 0, true),
            offer("b", Country::Ua, 1, true),
            offer("c", Country::Ua, 2, true),
            offer("d", Country::Ua, 3, true),
        ])
        .await
        .unwrap();

    let mut manager = OfferManager::new(platform.clone(), Country::Ua);
    manager.load().await.unwrap();
    manager.reorder(2, 0).await.unwrap();

    // A fresh load (as the public path would issue) sees the new ordering.
    let listed = platform.list(Country::Ua, true).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b", "d"]);
    let orders: Vec<i32> = listed.iter().map(|o| o.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn admin_edit_overwrites_the_whole_record() {
    let platform = FakePlatform::default();
    platform
        .upsert(&[offer("old name", Country::Ua, 0, true)])
        .await
        .unwrap();

    let mut manager = OfferManager::new(platform.clone(), Country::Ua);
    manager.load().await.unwrap();

    let existing = manager.offers()[0].clone();
    let mut draft = manager.new_draft();
    draft.id = Some(existing.id);
    draft.name = "new name".into();
    draft.url = existing.url.clone();
    draft.min_amount = "2000".into();
    draft.display_order = existing.display_order;

    manager.save(draft).await.unwrap();

    assert_eq!(manager.offers().len(), 1);
    assert_eq!(manager.offers()[0].name, "new name");
    assert_eq!(manager.offers()[0].min_amount, 2000);
}
