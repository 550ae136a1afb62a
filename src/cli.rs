use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tabled::{Table, builder::Builder};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiError, CalculateResponse, calculate_form, run_http_server};
use crate::form::FormValues;
use crate::report::{TableRow, format_percent};
use crate::storage::{FileStore, load_form_values, save_form_values};

#[derive(Parser, Debug)]
#[command(
    name = "hypotheek",
    version,
    about = "Dutch mortgage calculator: annuity and linear schedules with interest deduction and inflation-adjusted figures"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculator page and its JSON API
    Serve(ServeArgs),
    /// Print a yearly breakdown in the terminal
    Calculate(CalculateArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HYPOTHEEK_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, env = "HYPOTHEEK_PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliPaymentType {
    Annuity,
    Linear,
}

impl CliPaymentType {
    fn form_value(self) -> &'static str {
        match self {
            CliPaymentType::Annuity => "annuity",
            CliPaymentType::Linear => "linear",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Numeric fields stay strings so they go through the same validation as the
/// web form.
#[derive(Args, Debug, Default)]
pub struct CalculateArgs {
    #[arg(long, allow_negative_numbers = true, help = "Mortgage amount in euros")]
    pub principal: Option<String>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Annual interest rate in percent, e.g. 4"
    )]
    pub interest_rate: Option<String>,
    #[arg(long, value_enum)]
    pub payment_type: Option<CliPaymentType>,
    #[arg(long, allow_negative_numbers = true, help = "Term in whole years")]
    pub term: Option<String>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Mortgage interest deduction rate in percent (0-100)"
    )]
    pub tax_rate: Option<String>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Expected yearly inflation in percent (0-20); 0 hides real values"
    )]
    pub inflation_rate: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
    #[arg(
        long,
        env = "HYPOTHEEK_STATE_FILE",
        help = "Remember the last form here; blank flags are filled from it"
    )]
    pub state_file: Option<PathBuf>,
}

impl CalculateArgs {
    fn form_values(&self) -> FormValues {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        FormValues {
            principal: text(&self.principal),
            interest_rate: text(&self.interest_rate),
            payment_type: self
                .payment_type
                .map(|p| p.form_value().to_string())
                .unwrap_or_default(),
            mortgage_term: text(&self.term),
            tax_rate: text(&self.tax_rate),
            inflation_rate: text(&self.inflation_rate),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),

    #[error("{}", .0.user_message())]
    Calculation(#[from] ApiError),

    #[error("could not render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            let addr = SocketAddr::new(args.host, args.port);
            run_http_server(addr).await.map_err(CliError::Server)
        }
        Command::Calculate(args) => {
            let out = run_calculate(&args)?;
            println!("{out}");
            Ok(())
        }
    }
}

/// Flags win over the remembered form, which wins over the defaults. The
/// merged form is remembered before validation, like the page does on every
/// edit.
pub fn resolve_form(args: &CalculateArgs) -> FormValues {
    let from_flags = args.form_values();
    let Some(path) = &args.state_file else {
        return from_flags.or(&FormValues::default());
    };

    let mut store = FileStore::new(path);
    let remembered = load_form_values(&mut store).unwrap_or_else(FormValues::empty);
    let values = from_flags.or(&remembered).or(&FormValues::default());
    if let Err(e) = save_form_values(&mut store, &values) {
        warn!(path = %store.path().display(), error = %e, "could not remember form values");
    }
    values
}

pub fn run_calculate(args: &CalculateArgs) -> Result<String, CliError> {
    let values = resolve_form(args);
    let response = calculate_form(&values).inspect_err(|e| {
        if let ApiError::Calculation(inner) = e {
            error!(error = %inner, "mortgage calculation failed");
        }
    })?;
    info!(
        months = response.total_months,
        payment_type = ?response.input.payment_type,
        "calculated mortgage"
    );

    match args.output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&response)?),
        OutputFormat::Table => Ok(render_tables(&response)),
    }
}

pub fn render_tables(response: &CalculateResponse) -> String {
    let report = &response.report;
    let d = &report.display;

    let mut summary = Builder::default();
    summary.push_record(["", "Bruto", "Net", "Tax deduction", "Interest", "Principal"]);
    summary.push_record([
        "Average monthly",
        d.avg_monthly_bruto.as_str(),
        d.avg_monthly_net.as_str(),
        d.avg_monthly_tax_deduction.as_str(),
        d.avg_monthly_interest.as_str(),
        d.avg_monthly_principal.as_str(),
    ]);
    summary.push_record([
        "First month",
        d.monthly_payment.as_str(),
        "",
        "",
        d.monthly_interest.as_str(),
        d.monthly_principal.as_str(),
    ]);
    summary.push_record([
        "First year",
        d.yearly_bruto.as_str(),
        d.yearly_net.as_str(),
        d.yearly_tax_deduction.as_str(),
        d.yearly_interest.as_str(),
        d.yearly_principal.as_str(),
    ]);
    summary.push_record([
        "Total",
        d.total_bruto.as_str(),
        d.total_net.as_str(),
        d.total_tax_deduction.as_str(),
        d.total_interest.as_str(),
        d.total_principal.as_str(),
    ]);
    if report.show_real_values {
        let real = |v: &Option<String>| v.clone().unwrap_or_default();
        summary.push_record([
            "Total (real)".to_string(),
            real(&d.total_bruto_real),
            real(&d.total_net_real),
            real(&d.total_tax_deduction_real),
            real(&d.total_interest_real),
            real(&d.total_principal_real),
        ]);
    }

    let mut yearly = Builder::default();
    let mut header = vec![
        "Year",
        "Bruto",
        "Interest",
        "Principal",
        "Tax deduction",
        "Net",
        "Remaining debt",
    ];
    if report.show_real_values {
        header.extend(["Real bruto", "Real net"]);
    }
    yearly.push_record(header);
    for row in report.table.rows.iter().chain([&report.table.totals]) {
        yearly.push_record(table_record(row, report.show_real_values));
    }

    let shares = report
        .charts
        .distribution
        .iter()
        .map(|slice| format!("{} {}", slice.label, format_percent(slice.share_percent)))
        .collect::<Vec<_>>()
        .join(" / ");

    format!(
        "{}\n\n{}\n\n{}",
        Table::from(summary),
        Table::from(yearly),
        shares
    )
}

fn table_record(row: &TableRow, show_real: bool) -> Vec<String> {
    let mut record = vec![
        row.year.clone(),
        row.bruto.clone(),
        row.interest.clone(),
        row.principal.clone(),
        row.tax_deduction.clone(),
        row.net.clone(),
        row.remaining_debt.clone(),
    ];
    if show_real {
        record.push(row.real_bruto.clone().unwrap_or_default());
        record.push(row.real_net.clone().unwrap_or_default());
    }
    record
}
