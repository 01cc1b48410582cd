use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Raw survey fields as submitted by the client. Untrusted; always
/// re-validated server-side regardless of client-side checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub initiative: String,
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub systems: Vec<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub contact_preference: Option<String>,
}

/// A survey that passed validation. Fields are carried through unchanged;
/// the type exists so downstream code can require proof of validation.
#[derive(Debug, Clone)]
pub struct SurveySubmission {
    pub email: String,
    pub initiative: String,
    pub challenge: String,
    pub systems: Vec<String>,
    pub value: String,
    pub contact_preference: Option<String>,
}

/// One field-level violation. All violations for a submission are collected
/// and returned together so the caller can surface every problem at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Syntactic check only: one '@', no whitespace, dotted domain.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
    })
}

/// Validate a raw survey form. Returns the typed submission, or every
/// field-level violation found (never fail-fast).
pub fn validate_survey(form: &SurveyForm) -> Result<SurveySubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    if form.email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email_regex().is_match(&form.email) {
        errors.push(FieldError::new(
            "email",
            "Please enter a valid email address",
        ));
    }

    if form.initiative.is_empty() {
        errors.push(FieldError::new("initiative", "Initiative name is required"));
    } else if form.initiative.chars().count() < 3 {
        errors.push(FieldError::new(
            "initiative",
            "Initiative name must be at least 3 characters",
        ));
    } else if form.initiative.chars().count() > 200 {
        errors.push(FieldError::new(
            "initiative",
            "Initiative name must be less than 200 characters",
        ));
    }

    if form.challenge.is_empty() {
        errors.push(FieldError::new("challenge", "Primary challenge is required"));
    } else if form.challenge.chars().count() < 10 {
        errors.push(FieldError::new(
            "challenge",
            "Please provide a more detailed challenge description",
        ));
    } else if form.challenge.chars().count() > 1000 {
        errors.push(FieldError::new(
            "challenge",
            "Challenge description must be less than 1000 characters",
        ));
    }

    if form.systems.is_empty() {
        errors.push(FieldError::new(
            "systems",
            "Please select at least one system",
        ));
    } else if form.systems.len() > 10 {
        errors.push(FieldError::new(
            "systems",
            "Please select no more than 10 systems",
        ));
    }

    if form.value.is_empty() {
        errors.push(FieldError::new("value", "Business value metric is required"));
    } else if form.value.chars().count() < 5 {
        errors.push(FieldError::new(
            "value",
            "Please provide more detail about the business value",
        ));
    } else if form.value.chars().count() > 500 {
        errors.push(FieldError::new(
            "value",
            "Value description must be less than 500 characters",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(SurveySubmission {
        email: form.email.clone(),
        initiative: form.initiative.clone(),
        challenge: form.challenge.clone(),
        systems: form.systems.clone(),
        value: form.value.clone(),
        contact_preference: form.contact_preference.clone(),
    })
}
