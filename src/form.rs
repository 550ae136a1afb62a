use serde::{Deserialize, Serialize};

use crate::core::{MortgageInput, PaymentType};
use crate::error::InputError;

pub const PRINCIPAL: &str = "principal";
pub const INTEREST_RATE: &str = "interestRate";
pub const PAYMENT_TYPE: &str = "paymentType";
pub const MORTGAGE_TERM: &str = "mortgageTerm";
pub const TAX_RATE: &str = "taxRate";
pub const INFLATION_RATE: &str = "inflationRate";

/// Terms beyond this are rejected so a single request cannot build an
/// unbounded schedule.
pub const MAX_TERM_YEARS: u32 = 100;
pub const MAX_INFLATION_PERCENT: f64 = 20.0;

/// The six form fields exactly as typed. This is also the shape that gets
/// persisted, so values are never normalized here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    #[serde(default)]
    pub principal: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub mortgage_term: String,
    #[serde(default)]
    pub tax_rate: String,
    #[serde(default)]
    pub inflation_rate: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            principal: "300000".to_string(),
            interest_rate: "4".to_string(),
            payment_type: "annuity".to_string(),
            mortgage_term: "30".to_string(),
            tax_rate: "37".to_string(),
            inflation_rate: "2".to_string(),
        }
    }
}

impl FormValues {
    /// Fills every blank field from `fallback`.
    pub fn or(self, fallback: &FormValues) -> FormValues {
        fn pick(value: String, fallback: &str) -> String {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value
            }
        }

        FormValues {
            principal: pick(self.principal, &fallback.principal),
            interest_rate: pick(self.interest_rate, &fallback.interest_rate),
            payment_type: pick(self.payment_type, &fallback.payment_type),
            mortgage_term: pick(self.mortgage_term, &fallback.mortgage_term),
            tax_rate: pick(self.tax_rate, &fallback.tax_rate),
            inflation_rate: pick(self.inflation_rate, &fallback.inflation_rate),
        }
    }

    pub fn empty() -> FormValues {
        FormValues {
            principal: String::new(),
            interest_rate: String::new(),
            payment_type: String::new(),
            mortgage_term: String::new(),
            tax_rate: String::new(),
            inflation_rate: String::new(),
        }
    }
}

/// A field value sent by a client, either as the raw input string or as a
/// JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Text(String),
    Number(f64),
}

impl RawField {
    fn into_text(self) -> String {
        match self {
            RawField::Text(s) => s,
            RawField::Number(v) => v.to_string(),
        }
    }
}

/// Request body of the calculate endpoint. Fields are optional so that a
/// missing field can be reported by name instead of as a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormPayload {
    pub principal: Option<RawField>,
    pub interest_rate: Option<RawField>,
    pub payment_type: Option<RawField>,
    pub mortgage_term: Option<RawField>,
    pub tax_rate: Option<RawField>,
    pub inflation_rate: Option<RawField>,
}

impl FormPayload {
    pub fn into_form_values(self) -> Result<FormValues, InputError> {
        let mut missing = Vec::new();
        let mut take = |name: &'static str, field: Option<RawField>| match field {
            Some(v) => v.into_text(),
            None => {
                missing.push(name);
                String::new()
            }
        };

        let principal = take(PRINCIPAL, self.principal);
        let interest_rate = take(INTEREST_RATE, self.interest_rate);
        let payment_type = take(PAYMENT_TYPE, self.payment_type);
        let mortgage_term = take(MORTGAGE_TERM, self.mortgage_term);
        let tax_rate = take(TAX_RATE, self.tax_rate);
        // Older clients never sent an inflation field.
        let inflation_rate = self
            .inflation_rate
            .map(RawField::into_text)
            .unwrap_or_default();

        if !missing.is_empty() {
            return Err(InputError::MissingFields(missing));
        }

        Ok(FormValues {
            principal,
            interest_rate,
            payment_type,
            mortgage_term,
            tax_rate,
            inflation_rate,
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn invalid(field: &'static str, message: &'static str) -> InputError {
    InputError::InvalidField { field, message }
}

pub fn parse_payment_type(raw: &str) -> Option<PaymentType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "annuity" => Some(PaymentType::Annuity),
        "linear" => Some(PaymentType::Linear),
        _ => None,
    }
}

/// Validates the raw form in field order and converts percentages to
/// fractions. The first failing field wins.
pub fn parse_form(values: &FormValues) -> Result<MortgageInput, InputError> {
    let principal = parse_number(&values.principal)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| invalid(PRINCIPAL, "Please enter a valid mortgage amount"))?;

    let interest_percent = parse_number(&values.interest_rate)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| invalid(INTEREST_RATE, "Please enter a valid interest rate"))?;

    let payment_type = parse_payment_type(&values.payment_type)
        .ok_or_else(|| invalid(PAYMENT_TYPE, "Please select a valid payment type"))?;

    let term_years = parse_number(&values.mortgage_term)
        .filter(|v| *v > 0.0 && v.fract() == 0.0 && *v <= MAX_TERM_YEARS as f64)
        .map(|v| v as u32)
        .ok_or_else(|| invalid(MORTGAGE_TERM, "Please enter a valid mortgage term"))?;

    let tax_percent = parse_number(&values.tax_rate)
        .filter(|v| (0.0..=100.0).contains(v))
        .ok_or_else(|| invalid(TAX_RATE, "Please enter a valid tax rate (0-100)"))?;

    let inflation_percent = if values.inflation_rate.trim().is_empty() {
        0.0
    } else {
        parse_number(&values.inflation_rate)
            .filter(|v| (0.0..=MAX_INFLATION_PERCENT).contains(v))
            .ok_or_else(|| invalid(INFLATION_RATE, "Please enter a valid inflation rate (0-20)"))?
    };

    Ok(MortgageInput {
        principal,
        annual_interest_rate: interest_percent / 100.0,
        term_years,
        payment_type,
        tax_rate: tax_percent / 100.0,
        inflation_rate: inflation_percent / 100.0,
    })
}
