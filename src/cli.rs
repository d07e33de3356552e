//! Command-line arguments and command dispatch

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    config::AnalyticsSource,
    error::{AppError, AppResult},
    models::{dates, AnalyticsReport, ChartData, Gender, Prescription, PrescriptionForm},
    services::analytics::{AnalyticsOptions, MAX_DAILY_WINDOW_DAYS, MAX_MONTHLY_WINDOW_MONTHS},
    views::{
        charts::ChartsView, form::PrescriptionFormView, list::PrescriptionListView,
        login::LoginView, Notification,
    },
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "prescription-console", version, about = "Manage prescriptions from the command line")]
pub struct Cli {
    /// Configuration file (defaults to config/default.toml and environment variables)
    #[arg(long, short = 'c', global = true, env = "PRESCRIPTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// API server root, e.g. http://localhost:8080
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Check credentials against the API and remember them
    Login {
        #[arg(long, short = 'u')]
        username: String,
        #[arg(long, short = 'p', env = "PRESCRIPTION_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credentials
    Logout,
    /// Show whether a session is stored
    Status,
    /// List prescriptions, one page at a time
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, value_parser = parse_date_arg)]
        start_date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end_date: Option<NaiveDate>,
    },
    /// Show one prescription
    Show { id: i64 },
    /// Create a prescription
    Create(PrescriptionArgs),
    /// Edit a prescription; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: PrescriptionArgs,
    },
    /// Delete a prescription
    Delete { id: i64 },
    /// Print chart data and headline metrics
    Charts {
        /// Trailing window of the daily chart, in days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAILY_WINDOW_DAYS)))]
        window: Option<u32>,
        /// Trailing window of the monthly chart, in months
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_MONTHLY_WINDOW_MONTHS)))]
        months: Option<u32>,
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct PrescriptionArgs {
    /// Prescription date (YYYY-MM-DD), defaults to today on create
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub age: Option<i32>,
    /// male, female or other
    #[arg(long, value_parser = parse_gender_arg)]
    pub gender: Option<Gender>,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub medicines: Option<String>,
    /// Next visit date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub next_visit: Option<NaiveDate>,
}

impl PrescriptionArgs {
    pub fn into_form(self) -> PrescriptionForm {
        PrescriptionForm {
            prescription_date: self.date,
            patient_name: self.name,
            patient_age: self.age,
            patient_gender: self.gender,
            diagnosis: self.diagnosis,
            medicines: self.medicines,
            next_visit_date: self.next_visit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Server,
    Client,
}

impl From<SourceArg> for AnalyticsSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Server => AnalyticsSource::Server,
            SourceArg::Client => AnalyticsSource::Client,
        }
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    dates::parse_date(value).map_err(|e| e.to_string())
}

fn parse_gender_arg(value: &str) -> Result<Gender, String> {
    value.parse::<Gender>().map_err(|e| e.to_string())
}

/// Run one command, writing its output to `out`
pub async fn run(state: &AppState, command: Command, out: &mut impl Write) -> AppResult<()> {
    let services = &state.services;

    match command {
        Command::Login { username, password } => {
            let mut view = LoginView::new(services.session.clone());
            let note = view.submit(&username, &password).await;
            report(note, out)
        }
        Command::Logout => {
            let mut view = LoginView::new(services.session.clone());
            report(view.logout(), out)
        }
        Command::Status => {
            let written = match services.session.current_credential()? {
                Some(credentials) => writeln!(
                    out,
                    "Logged in as {} on {}",
                    credentials.username, state.config.api.base_url
                ),
                None => writeln!(out, "Not logged in"),
            };
            written.map_err(output_failed)
        }
        Command::List {
            page,
            size,
            start_date,
            end_date,
        } => {
            let page_size = size.unwrap_or(state.config.list.page_size);
            let mut view = PrescriptionListView::new(services.prescriptions.clone(), page_size);
            if let Some(note) = view.set_filters(start_date, end_date) {
                return report(note, out);
            }
            if let Some(note) = view.load(page).await {
                return report(note, out);
            }
            render_list(&view, out).map_err(output_failed)
        }
        Command::Show { id } => {
            let prescription = services.prescriptions.get(id).await?;
            render_prescription(&prescription, out).map_err(output_failed)
        }
        Command::Create(fields) => {
            let mut view = PrescriptionFormView::create(services.prescriptions.clone(), services.clock.today());
            view.form_mut().patch(fields.into_form());
            submit_form(view, out).await
        }
        Command::Update { id, fields } => {
            let mut view = PrescriptionFormView::edit(services.prescriptions.clone(), id);
            if let Some(note) = view.load().await {
                return report(note, out);
            }
            view.form_mut().patch(fields.into_form());
            submit_form(view, out).await
        }
        Command::Delete { id } => {
            let mut view = PrescriptionListView::new(services.prescriptions.clone(), state.config.list.page_size);
            let note = view.delete(id).await;
            report(note, out)
        }
        Command::Charts {
            window,
            months,
            source,
        } => {
            let mut options = AnalyticsOptions::from(&state.config.analytics);
            if let Some(window) = window {
                options.daily_window_days = window;
            }
            if let Some(months) = months {
                options.monthly_window_months = months;
            }
            if let Some(source) = source {
                options.source = source.into();
            }

            let mut view = ChartsView::new(services.analytics.clone(), options);
            if let Some(note) = view.load().await {
                return report(note, out);
            }
            match view.report() {
                Some(report) => render_report(report, out).map_err(output_failed),
                None => Err(AppError::Internal("analytics loaded without a report".to_string())),
            }
        }
    }
}

async fn submit_form(mut view: PrescriptionFormView, out: &mut impl Write) -> AppResult<()> {
    match view.submit().await {
        Ok((saved, note)) => {
            writeln!(out, "{}", note).map_err(output_failed)?;
            render_prescription(&saved, out).map_err(output_failed)
        }
        Err(note) => {
            let messages = view.errors().to_vec();
            if messages.is_empty() {
                report(note, out)
            } else {
                Err(AppError::Validation(messages))
            }
        }
    }
}

/// Success notifications are printed; error notifications become the command's error
fn report(note: Notification, out: &mut impl Write) -> AppResult<()> {
    if note.is_error() {
        return Err(AppError::Reported {
            code: note.code,
            message: note.message,
        });
    }
    writeln!(out, "{}", note).map_err(output_failed)
}

/// Writing to stdout is not a storage failure; a closed pipe exits with the generic code
fn output_failed(e: std::io::Error) -> AppError {
    AppError::Internal(format!("Cannot write output: {}", e))
}

fn render_list(view: &PrescriptionListView, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<10}  {:<24}  {:>3}  {:<6}  {:<24}  {:<10}",
        "ID", "Date", "Patient", "Age", "Gender", "Diagnosis", "Next visit"
    )?;
    for p in view.rows() {
        writeln!(
            out,
            "{:>6}  {:<10}  {:<24}  {:>3}  {:<6}  {:<24}  {:<10}",
            p.id.map(|id| id.to_string()).unwrap_or_default(),
            dates::format_date(p.prescription_date),
            truncate(&p.patient_name, 24),
            p.patient_age,
            p.patient_gender.to_string(),
            truncate(&p.diagnosis, 24),
            dates::format_date(p.next_visit_date),
        )?;
    }
    writeln!(
        out,
        "Page {} of {} ({} prescriptions)",
        view.page_index() + 1,
        view.total_pages().max(1),
        view.total_elements()
    )?;
    Ok(())
}

fn render_prescription(p: &Prescription, out: &mut impl Write) -> std::io::Result<()> {
    if let Some(id) = p.id {
        writeln!(out, "ID:                {}", id)?;
    }
    writeln!(out, "Prescription date: {}", dates::format_date(p.prescription_date))?;
    writeln!(out, "Patient:           {} ({}, {})", p.patient_name, p.patient_age, p.patient_gender)?;
    writeln!(out, "Diagnosis:         {}", p.diagnosis)?;
    writeln!(out, "Medicines:         {}", p.medicines)?;
    writeln!(out, "Next visit:        {}", dates::format_date(p.next_visit_date))?;
    Ok(())
}

fn render_report(report: &AnalyticsReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Total prescriptions:     {}", report.summary.total_prescriptions)?;
    writeln!(out, "Today:                   {}", report.summary.today_prescriptions)?;
    writeln!(out, "This week:               {}", report.summary.this_week_prescriptions)?;

    render_chart(&report.daily, out)?;
    for chart in [&report.gender, &report.age, &report.monthly].into_iter().flatten() {
        render_chart(chart, out)?;
    }
    Ok(())
}

fn render_chart(chart: &ChartData, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", chart.title)?;
    let width = chart.entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
    for entry in &chart.entries {
        let bar = "#".repeat(entry.value.min(60) as usize);
        writeln!(out, "  {:<width$}  {:>4}  {}", entry.label, entry.value, bar, width = width)?;
    }
    Ok(())
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
