use super::types::{
    Calculation, FirstMonthPayment, MonthlyAverages, MortgageInput, PaymentType, PeriodEntry,
    RealFigures, TotalSummary, YearlySummary,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Constant monthly payment that repays `principal` over `months` periods.
pub fn monthly_annuity_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }
    let factor = (1.0 + monthly_rate).powf(months as f64);
    principal * monthly_rate * factor / (factor - 1.0)
}

/// Cumulative inflation factor for a 1-indexed year. Year 1 is undiscounted.
pub fn discount_factor(inflation_rate: f64, year: u32) -> f64 {
    (1.0 + inflation_rate).powf(year.saturating_sub(1) as f64)
}

fn year_of_month(month: u32) -> u32 {
    month.div_ceil(MONTHS_PER_YEAR)
}

pub fn amortization_schedule(input: &MortgageInput) -> Vec<PeriodEntry> {
    let months = input.total_months();
    let rate = input.monthly_interest_rate();
    let annuity_payment = monthly_annuity_payment(input.principal, rate, months);
    let linear_principal = if months == 0 {
        0.0
    } else {
        input.principal / months as f64
    };

    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = input.principal;
    for month in 1..=months {
        let interest = balance * rate;
        let (payment, principal) = match input.payment_type {
            PaymentType::Annuity => (annuity_payment, annuity_payment - interest),
            PaymentType::Linear => (linear_principal + interest, linear_principal),
        };
        // Clamp absorbs floating drift in the final month.
        balance = (balance - principal).max(0.0);

        schedule.push(PeriodEntry {
            month,
            year: year_of_month(month),
            payment,
            interest,
            principal,
            remaining: balance,
        });
    }
    schedule
}

#[derive(Debug, Clone, Copy)]
struct YearAccumulator {
    year: u32,
    months: u32,
    payment: f64,
    interest: f64,
    principal: f64,
    remaining: f64,
}

impl YearAccumulator {
    fn new(year: u32) -> Self {
        Self {
            year,
            months: 0,
            payment: 0.0,
            interest: 0.0,
            principal: 0.0,
            remaining: 0.0,
        }
    }

    fn add(&mut self, entry: &PeriodEntry) {
        self.months += 1;
        self.payment += entry.payment;
        self.interest += entry.interest;
        self.principal += entry.principal;
        // Entries arrive in month order, so the last one wins.
        self.remaining = entry.remaining;
    }

    fn finish(self, input: &MortgageInput) -> YearlySummary {
        let tax_deduction = self.interest * input.tax_rate;
        let net_payment = self.payment - tax_deduction;
        let factor = discount_factor(input.inflation_rate, self.year);

        YearlySummary {
            year: self.year,
            months: self.months,
            total_payment: self.payment,
            total_interest: self.interest,
            total_principal: self.principal,
            remaining_debt: self.remaining,
            tax_deduction,
            bruto_payment: self.payment,
            net_payment,
            discount_factor: factor,
            real: RealFigures {
                bruto_payment: self.payment / factor,
                net_payment: net_payment / factor,
                tax_deduction: tax_deduction / factor,
                interest: self.interest / factor,
                principal: self.principal / factor,
            },
        }
    }
}

/// Groups a schedule by year. Works for any payment type and for a short
/// final year.
pub fn yearly_summaries(input: &MortgageInput, schedule: &[PeriodEntry]) -> Vec<YearlySummary> {
    let mut years: Vec<YearAccumulator> = Vec::new();
    for entry in schedule {
        if years.last().is_none_or(|acc| acc.year != entry.year) {
            years.push(YearAccumulator::new(entry.year));
        }
        if let Some(acc) = years.last_mut() {
            acc.add(entry);
        }
    }
    years.into_iter().map(|acc| acc.finish(input)).collect()
}

/// Nominal totals come from the schedule; real totals are the sum of the
/// per-year real figures, never one blended discount on the nominal total.
pub fn total_summary(
    input: &MortgageInput,
    schedule: &[PeriodEntry],
    yearly: &[YearlySummary],
) -> TotalSummary {
    let total_interest: f64 = schedule.iter().map(|e| e.interest).sum();
    let total_principal: f64 = schedule.iter().map(|e| e.principal).sum();
    let total_payment = total_interest + total_principal;
    let tax_deduction = total_interest * input.tax_rate;

    let mut real = RealFigures::default();
    for year in yearly {
        real.accumulate(&year.real);
    }

    TotalSummary {
        principal: input.principal,
        total_payment,
        total_interest,
        total_principal,
        tax_deduction,
        bruto_payment: total_payment,
        net_payment: total_payment - tax_deduction,
        real,
    }
}

pub fn first_month_payment(input: &MortgageInput) -> FirstMonthPayment {
    let months = input.total_months();
    let rate = input.monthly_interest_rate();
    let interest = input.principal * rate;
    match input.payment_type {
        PaymentType::Annuity => {
            let payment = monthly_annuity_payment(input.principal, rate, months);
            FirstMonthPayment {
                payment,
                interest,
                principal: payment - interest,
            }
        }
        PaymentType::Linear => {
            let principal = if months == 0 {
                0.0
            } else {
                input.principal / months as f64
            };
            FirstMonthPayment {
                payment: principal + interest,
                interest,
                principal,
            }
        }
    }
}

pub fn monthly_averages(input: &MortgageInput, total: &TotalSummary) -> MonthlyAverages {
    let months = input.total_months();
    if months == 0 {
        return MonthlyAverages::default();
    }
    let n = months as f64;
    MonthlyAverages {
        bruto_payment: total.bruto_payment / n,
        net_payment: total.net_payment / n,
        tax_deduction: total.tax_deduction / n,
        interest: total.total_interest / n,
        principal: total.total_principal / n,
        real_bruto_payment: total.real.bruto_payment / n,
        real_net_payment: total.real.net_payment / n,
    }
}

pub fn run_calculation(input: &MortgageInput) -> Calculation {
    let schedule = amortization_schedule(input);
    let yearly = yearly_summaries(input, &schedule);
    let total = total_summary(input, &schedule, &yearly);
    let first_month = first_month_payment(input);
    let monthly_averages = monthly_averages(input, &total);

    Calculation {
        input: input.clone(),
        schedule,
        yearly,
        total,
        first_month,
        monthly_averages,
    }
}
