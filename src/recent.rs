//! Recently issued loans showcase. Static per-country copy cycled one entry
//! at a time on the completion screen.

use serde::Serialize;

use crate::offers::Country;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecentLoan {
    pub name: &'static str,
    pub bank: &'static str,
    pub amount: u32,
    pub ago: &'static str,
}

const UA_LOANS: &[RecentLoan] = &[
    RecentLoan { name: "Олена К.", bank: "Приват Банк", amount: 15000, ago: "2 мин. назад" },
    RecentLoan { name: "Михайло П.", bank: "Моно Банк", amount: 25000, ago: "5 мин. назад" },
    RecentLoan { name: "Ірина В.", bank: "ПУМБ", amount: 20000, ago: "7 мин. назад" },
    RecentLoan { name: "Андрій С.", bank: "Приват Банк", amount: 30000, ago: "8 мин. назад" },
    RecentLoan { name: "Марія Д.", bank: "Моно Банк", amount: 18000, ago: "10 мин. назад" },
    RecentLoan { name: "Василь К.", bank: "ПУМБ", amount: 22000, ago: "12 мин. назад" },
    RecentLoan { name: "Наталія П.", bank: "Приват Банк", amount: 27000, ago: "15 мин. назад" },
    RecentLoan { name: "Сергій М.", bank: "Моно Банк", amount: 35000, ago: "17 мин. назад" },
];

const KZ_LOANS: &[RecentLoan] = &[
    RecentLoan { name: "Айдар Н.", bank: "Халык Банк", amount: 150000, ago: "3 мин. назад" },
    RecentLoan { name: "Динара М.", bank: "Kaspi Bank", amount: 200000, ago: "6 мин. назад" },
    RecentLoan { name: "Арман К.", bank: "ForteBank", amount: 100000, ago: "8 мин. назад" },
    RecentLoan { name: "Асель Т.", bank: "Халык Банк", amount: 180000, ago: "10 мин. назад" },
    RecentLoan { name: "Бауыржан С.", bank: "Kaspi Bank", amount: 250000, ago: "12 мин. назад" },
    RecentLoan { name: "Гульнара Р.", bank: "ForteBank", amount: 120000, ago: "15 мин. назад" },
    RecentLoan { name: "Дархан К.", bank: "Халык Банк", amount: 300000, ago: "17 мин. назад" },
    RecentLoan { name: "Жанар М.", bank: "Kaspi Bank", amount: 170000, ago: "20 мин. назад" },
];

const RU_LOANS: &[RecentLoan] = &[
    RecentLoan { name: "Анна С.", bank: "СберБанк", amount: 50000, ago: "2 мин. назад" },
    RecentLoan { name: "Михаил К.", bank: "Тинькофф", amount: 75000, ago: "5 мин. назад" },
    RecentLoan { name: "Елена В.", bank: "Альфа-Банк", amount: 30000, ago: "7 мин. назад" },
    RecentLoan { name: "Дмитрий П.", bank: "СберБанк", amount: 60000, ago: "9 мин. назад" },
    RecentLoan { name: "Ольга М.", bank: "Тинькофф", amount: 45000, ago: "12 мин. назад" },
    RecentLoan { name: "Сергей К.", bank: "Альфа-Банк", amount: 80000, ago: "15 мин. назад" },
    RecentLoan { name: "Наталья Р.", bank: "СберБанк", amount: 35000, ago: "17 мин. назад" },
    RecentLoan { name: "Александр С.", bank: "Тинькофф", amount: 70000, ago: "20 мин. назад" },
];

pub fn loans_for(country: Country) -> &'static [RecentLoan] {
    match country {
        Country::Ua => UA_LOANS,
        Country::Kz => KZ_LOANS,
        Country::Ru => RU_LOANS,
    }
}

/// Wrapping cursor over a country's showcase entries.
#[derive(Debug, Default)]
pub struct RecentLoansTicker {
    index: usize,
}

impl RecentLoansTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry, advancing for the next caller. `None` when the
    /// country has no showcase entries.
    pub fn advance(&mut self, country: Country) -> Option<RecentLoan> {
        self.advance_in(loans_for(country))
    }

    fn advance_in(&mut self, loans: &[RecentLoan]) -> Option<RecentLoan> {
        if loans.is_empty() {
            return None;
        }
        let loan = loans[self.index % loans.len()];
        self.index = (self.index + 1) % loans.len();
        Some(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_country_has_showcase_entries() {
        for country in [Country::Ua, Country::Kz, Country::Ru] {
            assert!(!loans_for(country).is_empty());
        }
    }

    #[test]
    fn ticker_wraps_around() {
        let mut ticker = RecentLoansTicker::new();
        let total = loans_for(Country::Ua).len();

        let first = ticker.advance(Country::Ua);
        for _ in 0..total - 1 {
            ticker.advance(Country::Ua);
        }
        assert_eq!(ticker.advance(Country::Ua), first);
    }

    #[test]
    fn ticker_index_survives_country_switches() {
        let mut ticker = RecentLoansTicker::new();
        ticker.advance(Country::Ua);
        ticker.advance(Country::Kz);
        let third = ticker.advance(Country::Ru);
        assert_eq!(third, Some(loans_for(Country::Ru)[2]));
    }

    #[test]
    fn empty_showcase_yields_no_entry() {
        let mut ticker = RecentLoansTicker::new();
        assert_eq!(ticker.advance_in(&[]), None);
        assert_eq!(ticker.advance_in(&[]), None);
    }
}
