//! Public offer presentation: turns repository results into the payload the
//! funnel screen renders. Exactly one of four states at a time.

use serde::Serialize;

use crate::{
    offers::{Country, LoanOffer},
    repository::RepositoryError,
};

pub const LOAD_FAILED_MESSAGE: &str =
    "Не удалось загрузить предложения. Пожалуйста, попробуйте позже.";
pub const EMPTY_MESSAGE: &str =
    "К сожалению, сейчас нет доступных предложений. Пожалуйста, попробуйте позже.";

pub fn currency_symbol(country: Country) -> &'static str {
    match country {
        Country::Ua => "₴",
        Country::Kz => "₸",
        Country::Ru => "₽",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferCard {
    pub id: uuid::Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub amount: String,
    pub rate: String,
    pub term: String,
    pub approval_time: String,
    pub approval_label: &'static str,
    pub approval_color: &'static str,
    pub first_loan_free: bool,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OffersView {
    Loading,
    Failed { message: String },
    Empty { message: &'static str },
    Loaded { offers: Vec<OfferCard> },
}

impl OffersView {
    pub fn loading() -> Self {
        OffersView::Loading
    }

    /// Collapses a finished read into one of the three terminal states.
    pub fn from_result(country: Country, result: Result<Vec<LoanOffer>, RepositoryError>) -> Self {
        match result {
            Err(_) => OffersView::Failed {
                message: LOAD_FAILED_MESSAGE.to_string(),
            },
            Ok(offers) if offers.is_empty() => OffersView::Empty { message: EMPTY_MESSAGE },
            Ok(offers) => OffersView::Loaded {
                offers: offers.iter().map(|o| card(country, o)).collect(),
            },
        }
    }
}

fn card(country: Country, offer: &LoanOffer) -> OfferCard {
    let symbol = currency_symbol(country);
    OfferCard {
        id: offer.id,
        name: offer.name.clone(),
        logo_url: offer.logo_url.clone(),
        amount: format!(
            "{} - {} {symbol}",
            group_digits(offer.min_amount),
            group_digits(offer.max_amount)
        ),
        rate: format!("{} в день", offer.rate),
        term: format!("{} (до {} дней)", offer.term, offer.max_term_days),
        approval_time: format!("за {}", offer.approval_time),
        approval_label: offer.approval_rating.label(),
        approval_color: offer.approval_rating.color(),
        first_loan_free: offer.first_loan_free,
        url: offer.url.clone(),
    }
}

/// Thousands grouping with spaces, the way amounts read in the funnel.
fn group_digits(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::offers::ApprovalRating;

    fn offer(rating: ApprovalRating) -> LoanOffer {
        LoanOffer {
            id: Uuid::nil(),
            name: "bank".into(),
            url: "https://bank.test".into(),
            country: Country::Ua,
            logo_url: None,
            min_amount: 1000,
            max_amount: 150000,
            rate: "0.01".into(),
            term: "7-30 дней".into(),
            max_term_days: 30,
            approval_time: "15 минут".into(),
            first_loan_free: true,
            is_active: true,
            display_order: 0,
            approval_rating: rating,
        }
    }

    #[test]
    fn digits_group_in_threes() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1 000");
        assert_eq!(group_digits(150000), "150 000");
        assert_eq!(group_digits(1234567), "1 234 567");
    }

    #[test]
    fn card_formats_amounts_with_the_country_currency() {
        let view = OffersView::from_result(Country::Kz, Ok(vec![offer(ApprovalRating::High)]));
        let OffersView::Loaded { offers } = view else {
            panic!("expected loaded");
        };
        assert_eq!(offers[0].amount, "1 000 - 150 000 ₸");
        assert_eq!(offers[0].rate, "0.01 в день");
        assert_eq!(offers[0].term, "7-30 дней (до 30 дней)");
        assert_eq!(offers[0].approval_label, "Высокая вероятность");
        assert_eq!(offers[0].approval_color, "green");
    }

    #[test]
    fn the_four_states_are_mutually_exclusive() {
        assert_eq!(OffersView::loading(), OffersView::Loading);

        let failed = OffersView::from_result(
            Country::Ua,
            Err(RepositoryError::Read("boom".into())),
        );
        assert!(matches!(failed, OffersView::Failed { .. }));

        let empty = OffersView::from_result(Country::Ua, Ok(vec![]));
        assert!(matches!(empty, OffersView::Empty { .. }));

        let loaded = OffersView::from_result(Country::Ua, Ok(vec![offer(ApprovalRating::Low)]));
        assert!(matches!(loaded, OffersView::Loaded { .. }));
    }

    #[test]
    fn failure_message_hides_the_underlying_cause() {
        let view = OffersView::from_result(
            Country::Ru,
            Err(RepositoryError::Read("tls handshake eof".into())),
        );
        let OffersView::Failed { message } = view else {
            panic!("expected failed");
        };
        assert_eq!(message, LOAD_FAILED_MESSAGE);
    }
}
