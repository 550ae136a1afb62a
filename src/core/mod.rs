mod engine;
mod types;

pub use engine::{
    amortization_schedule, discount_factor, first_month_payment, monthly_annuity_payment,
    monthly_averages, run_calculation, total_summary, yearly_summaries,
};
pub use types::{
    Calculation, FirstMonthPayment, MonthlyAverages, MortgageInput, PaymentType, PeriodEntry,
    RealFigures, TotalSummary, YearlySummary,
};
