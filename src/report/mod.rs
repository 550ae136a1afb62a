//! Turns a [`Calculation`] into everything the UI shows: formatted display
//! slots, the yearly table with its totals row, and the two chart data sets.

mod format;

pub use format::{CURRENCY_SYMBOL, format_currency, format_percent};

use serde::Serialize;

use crate::core::{Calculation, YearlySummary};
use crate::error::CalculationError;

/// Formatted figures keyed by the element ids the page renders into.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySlots {
    pub avg_monthly_payment: String,
    pub avg_monthly_bruto: String,
    pub avg_monthly_net: String,
    pub avg_monthly_tax_deduction: String,
    pub avg_monthly_interest: String,
    pub avg_monthly_principal: String,

    pub monthly_payment: String,
    pub monthly_interest: String,
    pub monthly_principal: String,

    pub yearly_payment: String,
    pub yearly_bruto: String,
    pub yearly_net: String,
    pub yearly_tax_deduction: String,
    pub yearly_interest: String,
    pub yearly_principal: String,

    pub total_payment: String,
    pub total_bruto: String,
    pub total_net: String,
    pub total_tax_deduction: String,
    pub total_interest: String,
    pub total_principal: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_monthly_bruto_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_monthly_net_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bruto_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_net_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax_deduction_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_interest_real: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_principal_real: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub year: String,
    pub bruto: String,
    pub interest: String,
    pub principal: String,
    pub tax_deduction: String,
    pub net: String,
    pub remaining_debt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_bruto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_net: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTable {
    pub rows: Vec<TableRow>,
    pub totals: TableRow,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    pub share_percent: f64,
    /// Tooltip text, e.g. `€ 300.000 (58,3%)`.
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub fill: bool,
}

/// Tick labels are `{prefix}{value / divisor}{suffix}`, e.g. `€12k`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisFormat {
    pub begin_at_zero: bool,
    pub divisor: f64,
    pub prefix: &'static str,
    pub suffix: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub labels: Vec<u32>,
    pub datasets: Vec<LineDataset>,
    pub y_axis: AxisFormat,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub distribution: Vec<PieSlice>,
    pub yearly: LineChart,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub show_real_values: bool,
    pub display: DisplaySlots,
    pub table: YearTable,
    pub charts: Charts,
}

pub fn build_report(calc: &Calculation) -> Result<Report, CalculationError> {
    ensure_finite(calc)?;
    let show_real = calc.input.shows_real_values();

    Ok(Report {
        show_real_values: show_real,
        display: display_slots(calc, show_real),
        table: year_table(&calc.yearly, show_real),
        charts: Charts {
            distribution: distribution_chart(calc),
            yearly: yearly_chart(&calc.yearly, show_real),
        },
    })
}

fn ensure_finite(calc: &Calculation) -> Result<(), CalculationError> {
    let total = &calc.total;
    let checks = [
        ("total payment", total.total_payment),
        ("total interest", total.total_interest),
        ("net payment", total.net_payment),
        ("real net payment", total.real.net_payment),
        ("first month payment", calc.first_month.payment),
    ];
    for (figure, value) in checks {
        if !value.is_finite() {
            return Err(CalculationError::NonFinite {
                figure: figure.to_string(),
            });
        }
    }
    if let Some(year) = calc
        .yearly
        .iter()
        .find(|y| !y.remaining_debt.is_finite() || !y.real.bruto_payment.is_finite())
    {
        return Err(CalculationError::NonFinite {
            figure: format!("figure in year {}", year.year),
        });
    }
    Ok(())
}

fn display_slots(calc: &Calculation, show_real: bool) -> DisplaySlots {
    let avg = &calc.monthly_averages;
    let first = &calc.first_month;
    let total = &calc.total;
    let real = |value: f64| show_real.then(|| format_currency(value));

    // A schedule always has at least one year for a valid input; an empty
    // one shows zeros.
    let (y_payment, y_bruto, y_net, y_tax, y_interest, y_principal) = calc
        .yearly
        .first()
        .map(|y| {
            (
                y.total_payment,
                y.bruto_payment,
                y.net_payment,
                y.tax_deduction,
                y.total_interest,
                y.total_principal,
            )
        })
        .unwrap_or_default();

    DisplaySlots {
        avg_monthly_payment: format_currency(avg.bruto_payment),
        avg_monthly_bruto: format_currency(avg.bruto_payment),
        avg_monthly_net: format_currency(avg.net_payment),
        avg_monthly_tax_deduction: format_currency(avg.tax_deduction),
        avg_monthly_interest: format_currency(avg.interest),
        avg_monthly_principal: format_currency(avg.principal),

        monthly_payment: format_currency(first.payment),
        monthly_interest: format_currency(first.interest),
        monthly_principal: format_currency(first.principal),

        yearly_payment: format_currency(y_payment),
        yearly_bruto: format_currency(y_bruto),
        yearly_net: format_currency(y_net),
        yearly_tax_deduction: format_currency(y_tax),
        yearly_interest: format_currency(y_interest),
        yearly_principal: format_currency(y_principal),

        total_payment: format_currency(total.total_payment),
        total_bruto: format_currency(total.bruto_payment),
        total_net: format_currency(total.net_payment),
        total_tax_deduction: format_currency(total.tax_deduction),
        total_interest: format_currency(total.total_interest),
        total_principal: format_currency(total.total_principal),

        avg_monthly_bruto_real: real(avg.real_bruto_payment),
        avg_monthly_net_real: real(avg.real_net_payment),
        total_bruto_real: real(total.real.bruto_payment),
        total_net_real: real(total.real.net_payment),
        total_tax_deduction_real: real(total.real.tax_deduction),
        total_interest_real: real(total.real.interest),
        total_principal_real: real(total.real.principal),
    }
}

#[derive(Default)]
struct ColumnTotals {
    bruto: f64,
    interest: f64,
    principal: f64,
    tax_deduction: f64,
    net: f64,
    real_bruto: f64,
    real_net: f64,
}

fn year_table(yearly: &[YearlySummary], show_real: bool) -> YearTable {
    let mut sums = ColumnTotals::default();
    let rows = yearly
        .iter()
        .map(|y| {
            sums.bruto += y.bruto_payment;
            sums.interest += y.total_interest;
            sums.principal += y.total_principal;
            sums.tax_deduction += y.tax_deduction;
            sums.net += y.net_payment;
            sums.real_bruto += y.real.bruto_payment;
            sums.real_net += y.real.net_payment;

            TableRow {
                year: y.year.to_string(),
                bruto: format_currency(y.bruto_payment),
                interest: format_currency(y.total_interest),
                principal: format_currency(y.total_principal),
                tax_deduction: format_currency(y.tax_deduction),
                net: format_currency(y.net_payment),
                remaining_debt: format_currency(y.remaining_debt),
                real_bruto: show_real.then(|| format_currency(y.real.bruto_payment)),
                real_net: show_real.then(|| format_currency(y.real.net_payment)),
            }
        })
        .collect();

    let totals = TableRow {
        year: "Total".to_string(),
        bruto: format_currency(sums.bruto),
        interest: format_currency(sums.interest),
        principal: format_currency(sums.principal),
        tax_deduction: format_currency(sums.tax_deduction),
        net: format_currency(sums.net),
        remaining_debt: "-".to_string(),
        real_bruto: show_real.then(|| format_currency(sums.real_bruto)),
        real_net: show_real.then(|| format_currency(sums.real_net)),
    };

    YearTable { rows, totals }
}

fn distribution_chart(calc: &Calculation) -> Vec<PieSlice> {
    let principal = calc.total.principal;
    let interest = calc.total.total_interest;
    let whole = principal + interest;
    let share = |value: f64| {
        if whole > 0.0 {
            value / whole * 100.0
        } else {
            0.0
        }
    };

    [("Principal", principal), ("Interest", interest)]
        .into_iter()
        .map(|(label, value)| {
            let share_percent = share(value);
            PieSlice {
                label,
                value,
                share_percent,
                tooltip: format!(
                    "{} ({})",
                    format_currency(value),
                    format_percent(share_percent)
                ),
            }
        })
        .collect()
}

fn yearly_chart(yearly: &[YearlySummary], show_real: bool) -> LineChart {
    let series = |pick: fn(&YearlySummary) -> f64| yearly.iter().map(pick).collect::<Vec<_>>();

    let mut datasets = vec![
        LineDataset {
            label: "Bruto Payment",
            data: series(|y| y.bruto_payment),
            fill: true,
        },
        LineDataset {
            label: "Net Payment",
            data: series(|y| y.net_payment),
            fill: true,
        },
        LineDataset {
            label: "Interest",
            data: series(|y| y.total_interest),
            fill: false,
        },
        LineDataset {
            label: "Principal",
            data: series(|y| y.total_principal),
            fill: false,
        },
    ];
    if show_real {
        datasets.push(LineDataset {
            label: "Real Net Payment",
            data: series(|y| y.real.net_payment),
            fill: false,
        });
    }

    LineChart {
        labels: yearly.iter().map(|y| y.year).collect(),
        datasets,
        y_axis: AxisFormat {
            begin_at_zero: true,
            divisor: 1000.0,
            prefix: CURRENCY_SYMBOL,
            suffix: "k",
        },
    }
}
