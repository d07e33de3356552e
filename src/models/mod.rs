//! Data models for Prescription Console

pub mod analytics;
pub mod dates;
pub mod enums;
pub mod prescription;
pub mod user;

// Re-export commonly used types
pub use analytics::{AnalyticsReport, AnalyticsSummary, ChartData, ReportSource, StatEntry};
pub use enums::Gender;
pub use prescription::{Page, Prescription, PrescriptionForm, PrescriptionQuery};
pub use user::Credentials;
