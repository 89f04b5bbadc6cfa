//! # Quiz Funnel
//!
//! State machine behind the lead-generation quiz.
//!
//! The store holds the visitor's progress and answers; the step table drives
//! which question is asked next. Answers go through a closed [`Answer`] enum,
//! so there is no string-keyed field setter and no unknown-field failure
//! class.
//!
//! Country is captured at step 0, which means it is available to everything
//! downstream (offer retrieval, recent-loans showcase) no matter where the
//! visitor currently is in the flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::offers::Country;

pub const TOTAL_STEPS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46+")]
    Over46,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    Employed,
    SelfEmployed,
    Retired,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanPurpose {
    Personal,
    Business,
    Education,
    Medical,
}

/// One answered question. The closed set of variants is the only way to
/// mutate [`QuizAnswers`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Country(Country),
    Gender(Gender),
    Age(AgeGroup),
    HasChildren(bool),
    Employment(EmploymentType),
    Purpose(LoanPurpose),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizAnswers {
    pub country: Option<Country>,
    pub gender: Option<Gender>,
    pub age: Option<AgeGroup>,
    pub has_children: Option<bool>,
    pub employment_type: Option<EmploymentType>,
    pub loan_purpose: Option<LoanPurpose>,
}

/// Per-session quiz state. Single logical writer; re-answering a question
/// after going back overwrites the previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizState {
    pub started: bool,
    pub step: usize,
    pub answers: QuizAnswers,
}

impl QuizState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_started(&mut self, started: bool) {
        self.started = started;
    }

    pub fn set_answer(&mut self, answer: Answer) {
        match answer {
            Answer::Country(v) => self.answers.country = Some(v),
            Answer::Gender(v) => self.answers.gender = Some(v),
            Answer::Age(v) => self.answers.age = Some(v),
            Answer::HasChildren(v) => self.answers.has_children = Some(v),
            Answer::Employment(v) => self.answers.employment_type = Some(v),
            Answer::Purpose(v) => self.answers.loan_purpose = Some(v),
        }
    }

    /// The store itself does not cap the step; past the end of the step
    /// table the flow simply reports completion.
    pub fn next_step(&mut self) {
        self.step += 1;
    }

    pub fn prev_step(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        self.step >= TOTAL_STEPS
    }
}

/// Which answer field a step writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Country,
    Gender,
    Age,
    HasChildren,
    Employment,
    Purpose,
}

pub struct StepOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub struct StepDef {
    pub title: &'static str,
    pub description: &'static str,
    pub field: Field,
    pub options: &'static [StepOption],
}

pub static STEPS: [StepDef; TOTAL_STEPS] = [
    StepDef {
        title: "Выберите страну",
        description: "В какой стране вы проживаете?",
        field: Field::Country,
        options: &[
            StepOption { value: "ua", label: "Украина" },
            StepOption { value: "kz", label: "Казахстан" },
            StepOption { value: "ru", label: "Россия" },
        ],
    },
    StepDef {
        title: "Укажите ваш пол",
        description: "Это поможет нам подобрать подходящие предложения",
        field: Field::Gender,
        options: &[
            StepOption { value: "male", label: "Мужской" },
            StepOption { value: "female", label: "Женский" },
        ],
    },
    StepDef {
        title: "Сколько вам лет?",
        description: "Выберите вашу возрастную группу",
        field: Field::Age,
        options: &[
            StepOption { value: "18-25", label: "18-25 лет" },
            StepOption { value: "26-35", label: "26-35 лет" },
            StepOption { value: "36-45", label: "36-45 лет" },
            StepOption { value: "46+", label: "46 и старше" },
        ],
    },
    StepDef {
        title: "У вас есть дети?",
        description: "Это может повлиять на условия кредитования",
        field: Field::HasChildren,
        options: &[
            StepOption { value: "yes", label: "Да" },
            StepOption { value: "no", label: "Нет" },
        ],
    },
    StepDef {
        title: "Тип занятости",
        description: "Укажите ваш текущий статус занятости",
        field: Field::Employment,
        options: &[
            StepOption { value: "employed", label: "Работаю по найму" },
            StepOption { value: "self-employed", label: "Предприниматель" },
            StepOption { value: "retired", label: "Пенсионер" },
            StepOption { value: "student", label: "Студент" },
        ],
    },
    StepDef {
        title: "Цель займа",
        description: "На что планируете потратить средства?",
        field: Field::Purpose,
        options: &[
            StepOption { value: "personal", label: "Личные нужды" },
            StepOption { value: "business", label: "Развитие бизнеса" },
            StepOption { value: "education", label: "Образование" },
            StepOption { value: "medical", label: "Медицинские услуги" },
        ],
    },
];

#[derive(Error, Debug, PartialEq)]
pub enum QuizError {
    #[error("unknown option '{0}' for the current step")]
    UnknownOption(String),
    #[error("the quiz is already complete")]
    AlreadyComplete,
}

/// Step definition for the current position, `None` once the funnel is done.
pub fn current_step(state: &QuizState) -> Option<&'static StepDef> {
    STEPS.get(state.step)
}

pub fn can_go_back(state: &QuizState) -> bool {
    state.step > 0
}

pub fn progress_percent(state: &QuizState) -> u8 {
    let step = state.step.min(TOTAL_STEPS);
    (((step + 1) * 100) / TOTAL_STEPS).min(100) as u8
}

fn parse_answer(field: Field, value: &str) -> Option<Answer> {
    match field {
        Field::Country => Country::from_wire(value).map(Answer::Country),
        Field::Gender => match value {
            "male" => Some(Answer::Gender(Gender::Male)),
            "female" => Some(Answer::Gender(Gender::Female)),
            _ => None,
        },
        Field::Age => match value {
            "18-25" => Some(Answer::Age(AgeGroup::From18To25)),
            "26-35" => Some(Answer::Age(AgeGroup::From26To35)),
            "36-45" => Some(Answer::Age(AgeGroup::From36To45)),
            "46+" => Some(Answer::Age(AgeGroup::Over46)),
            _ => None,
        },
        Field::HasChildren => match value {
            "yes" => Some(Answer::HasChildren(true)),
            "no" => Some(Answer::HasChildren(false)),
            _ => None,
        },
        Field::Employment => match value {
            "employed" => Some(Answer::Employment(EmploymentType::Employed)),
            "self-employed" => Some(Answer::Employment(EmploymentType::SelfEmployed)),
            "retired" => Some(Answer::Employment(EmploymentType::Retired)),
            "student" => Some(Answer::Employment(EmploymentType::Student)),
            _ => None,
        },
        Field::Purpose => match value {
            "personal" => Some(Answer::Purpose(LoanPurpose::Personal)),
            "business" => Some(Answer::Purpose(LoanPurpose::Business)),
            "education" => Some(Answer::Purpose(LoanPurpose::Education)),
            "medical" => Some(Answer::Purpose(LoanPurpose::Medical)),
            _ => None,
        },
    }
}

/// Applies the chosen option for the current step and advances. Both the
/// answer and the step change before the caller sees the state again.
pub fn select(state: &mut QuizState, value: &str) -> Result<(), QuizError> {
    let step = current_step(state).ok_or(QuizError::AlreadyComplete)?;

    if !step.options.iter().any(|o| o.value == value) {
        return Err(QuizError::UnknownOption(value.to_string()));
    }

    // Option membership was checked against the step table, so the parse
    // cannot miss.
    let answer = parse_answer(step.field, value).ok_or_else(|| QuizError::UnknownOption(value.to_string()))?;

    state.set_answer(answer);
    state.next_step();
    Ok(())
}

/// Wire value previously chosen for a step, used to highlight the selected
/// option when the visitor navigates back.
pub fn selected_value(state: &QuizState, step: &StepDef) -> Option<&'static str> {
    let wire: Option<String> = match step.field {
        Field::Country => state.answers.country.map(|v| v.as_str().to_string()),
        Field::Gender => state.answers.gender.and_then(to_wire),
        Field::Age => state.answers.age.and_then(to_wire),
        Field::HasChildren => state
            .answers
            .has_children
            .map(|v| if v { "yes" } else { "no" }.to_string()),
        Field::Employment => state.answers.employment_type.and_then(to_wire),
        Field::Purpose => state.answers.loan_purpose.and_then(to_wire),
    };

    let wire = wire?;
    step.options
        .iter()
        .find(|o| o.value == wire)
        .map(|o| o.value)
}

fn to_wire<T: Serialize>(value: T) -> Option<String> {
    match serde_json::to_value(value).ok()? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_never_goes_below_zero() {
        let mut state = QuizState::new();
        state.prev_step();
        state.prev_step();
        assert_eq!(state.step, 0);

        state.next_step();
        state.prev_step();
        state.prev_step();
        state.prev_step();
        assert_eq!(state.step, 0);
    }

    #[test]
    fn six_advances_complete_the_funnel_despite_backtracking() {
        let mut state = QuizState::new();
        let mut advances = 0;

        while advances < TOTAL_STEPS {
            state.next_step();
            advances += 1;

            // Wander back and forth without losing net progress.
            if advances == 2 {
                state.prev_step();
                state.next_step();
            }
        }

        assert!(state.is_complete());
        assert!(current_step(&state).is_none());
    }

    #[test]
    fn answers_survive_back_navigation() {
        let mut state = QuizState::new();
        select(&mut state, "ua").unwrap();
        select(&mut state, "female").unwrap();

        state.prev_step();
        let step = current_step(&state).unwrap();
        assert_eq!(step.field, Field::Gender);
        assert_eq!(selected_value(&state, step), Some("female"));

        state.prev_step();
        let step = current_step(&state).unwrap();
        assert_eq!(step.field, Field::Country);
        assert_eq!(selected_value(&state, step), Some("ua"));
    }

    #[test]
    fn re_answering_overwrites_the_previous_choice() {
        let mut state = QuizState::new();
        select(&mut state, "ua").unwrap();
        state.prev_step();
        select(&mut state, "kz").unwrap();
        assert_eq!(state.answers.country, Some(Country::Kz));
        assert_eq!(state.step, 1);
    }

    #[test]
    fn unknown_option_is_rejected_without_advancing() {
        let mut state = QuizState::new();
        let err = select(&mut state, "de").unwrap_err();
        assert_eq!(err, QuizError::UnknownOption("de".into()));
        assert_eq!(state.step, 0);
        assert_eq!(state.answers.country, None);
    }

    #[test]
    fn selecting_past_the_end_is_an_error() {
        let mut state = QuizState::new();
        for _ in 0..TOTAL_STEPS {
            state.next_step();
        }
        assert_eq!(select(&mut state, "ua"), Err(QuizError::AlreadyComplete));
    }

    #[test]
    fn full_scenario_captures_every_answer() {
        let mut state = QuizState::new();
        state.set_started(true);

        for value in ["ua", "female", "26-35", "no", "employed", "personal"] {
            select(&mut state, value).unwrap();
        }

        assert!(state.is_complete());
        assert_eq!(state.answers.country, Some(Country::Ua));
        assert_eq!(state.answers.gender, Some(Gender::Female));
        assert_eq!(state.answers.age, Some(AgeGroup::From26To35));
        assert_eq!(state.answers.has_children, Some(false));
        assert_eq!(state.answers.employment_type, Some(EmploymentType::Employed));
        assert_eq!(state.answers.loan_purpose, Some(LoanPurpose::Personal));
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut state = QuizState::new();
        state.set_started(true);
        select(&mut state, "ru").unwrap();
        state.reset();
        assert_eq!(state, QuizState::new());
    }

    #[test]
    fn back_is_only_available_after_the_first_step() {
        let mut state = QuizState::new();
        assert!(!can_go_back(&state));
        state.next_step();
        assert!(can_go_back(&state));
    }

    #[test]
    fn progress_reaches_one_hundred_at_the_last_step() {
        let mut state = QuizState::new();
        assert_eq!(progress_percent(&state), 16);
        for _ in 0..TOTAL_STEPS - 1 {
            state.next_step();
        }
        assert_eq!(progress_percent(&state), 100);
    }
}
