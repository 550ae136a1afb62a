use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Annuity,
    Linear,
}

/// Loan parameters as the engine consumes them. Rates are fractions
/// (0.04 = 4%), not percentages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageInput {
    pub principal: f64,
    pub annual_interest_rate: f64,
    pub term_years: u32,
    pub payment_type: PaymentType,
    pub tax_rate: f64,
    pub inflation_rate: f64,
}

impl MortgageInput {
    pub fn monthly_interest_rate(&self) -> f64 {
        self.annual_interest_rate / 12.0
    }

    pub fn total_months(&self) -> u32 {
        self.term_years * 12
    }

    /// Real figures are only worth showing when they can differ from nominal.
    pub fn shows_real_values(&self) -> bool {
        self.inflation_rate > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEntry {
    pub month: u32,
    pub year: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining: f64,
}

/// Inflation-deflated counterparts of the nominal yearly figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealFigures {
    pub bruto_payment: f64,
    pub net_payment: f64,
    pub tax_deduction: f64,
    pub interest: f64,
    pub principal: f64,
}

impl RealFigures {
    pub(crate) fn accumulate(&mut self, other: &RealFigures) {
        self.bruto_payment += other.bruto_payment;
        self.net_payment += other.net_payment;
        self.tax_deduction += other.tax_deduction;
        self.interest += other.interest;
        self.principal += other.principal;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    pub year: u32,
    pub months: u32,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub remaining_debt: f64,
    pub tax_deduction: f64,
    pub bruto_payment: f64,
    pub net_payment: f64,
    pub discount_factor: f64,
    pub real: RealFigures,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalSummary {
    pub principal: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub tax_deduction: f64,
    pub bruto_payment: f64,
    pub net_payment: f64,
    pub real: RealFigures,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstMonthPayment {
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverages {
    pub bruto_payment: f64,
    pub net_payment: f64,
    pub tax_deduction: f64,
    pub interest: f64,
    pub principal: f64,
    pub real_bruto_payment: f64,
    pub real_net_payment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub input: MortgageInput,
    pub schedule: Vec<PeriodEntry>,
    pub yearly: Vec<YearlySummary>,
    pub total: TotalSummary,
    pub first_month: FirstMonthPayment,
    pub monthly_averages: MonthlyAverages,
}
