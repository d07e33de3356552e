//! Prescription model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::enums::Gender;
use crate::error::{AppError, AppResult};

/// Prescription record as exchanged with the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub prescription_date: NaiveDate,
    pub patient_name: String,
    pub patient_age: i32,
    pub patient_gender: Gender,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: NaiveDate,
}

/// Spring-style page envelope returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub pageable: serde_json::Value,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub empty: bool,
}

/// List query parameters (`page`, `size`, optional date range)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl PrescriptionQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_dates(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Reject queries the server would answer with an empty page
    pub fn check(&self) -> AppResult<()> {
        if self.size == 0 {
            return Err(AppError::invalid("Page size must be at least 1"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(AppError::invalid("Start date must not be after end date"));
            }
        }
        Ok(())
    }
}

impl Default for PrescriptionQuery {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// Create / edit form values, validated before any request is issued
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct PrescriptionForm {
    #[validate(required(message = "Prescription Date is required"))]
    pub prescription_date: Option<NaiveDate>,
    #[validate(
        required(message = "Patient Name is required"),
        length(min = 2, message = "Patient Name must be at least 2 characters")
    )]
    pub patient_name: Option<String>,
    #[validate(
        required(message = "Patient Age is required"),
        range(min = 0, max = 150, message = "Patient Age must be between 0 and 150")
    )]
    pub patient_age: Option<i32>,
    #[validate(required(message = "Patient Gender is required"))]
    pub patient_gender: Option<Gender>,
    #[validate(
        required(message = "Diagnosis is required"),
        length(min = 3, message = "Diagnosis must be at least 3 characters")
    )]
    pub diagnosis: Option<String>,
    #[validate(
        required(message = "Medicines is required"),
        length(min = 3, message = "Medicines must be at least 3 characters")
    )]
    pub medicines: Option<String>,
    #[validate(required(message = "Next Visit Date is required"))]
    pub next_visit_date: Option<NaiveDate>,
}

/// Field order used when reporting validation messages
const FORM_FIELDS: [&str; 7] = [
    "prescription_date",
    "patient_name",
    "patient_age",
    "patient_gender",
    "diagnosis",
    "medicines",
    "next_visit_date",
];

impl PrescriptionForm {
    /// Blank form for a new prescription, dated today
    pub fn new(today: NaiveDate) -> Self {
        Self {
            prescription_date: Some(today),
            ..Self::default()
        }
    }

    /// Overwrite every field that is set in `other`
    pub fn patch(&mut self, other: PrescriptionForm) {
        if other.prescription_date.is_some() {
            self.prescription_date = other.prescription_date;
        }
        if other.patient_name.is_some() {
            self.patient_name = other.patient_name;
        }
        if other.patient_age.is_some() {
            self.patient_age = other.patient_age;
        }
        if other.patient_gender.is_some() {
            self.patient_gender = other.patient_gender;
        }
        if other.diagnosis.is_some() {
            self.diagnosis = other.diagnosis;
        }
        if other.medicines.is_some() {
            self.medicines = other.medicines;
        }
        if other.next_visit_date.is_some() {
            self.next_visit_date = other.next_visit_date;
        }
    }

    /// Validation messages in form order; empty when the form is valid
    pub fn errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => ordered_messages(&errors),
        }
    }

    /// Validate and build the record to send
    pub fn to_prescription(&self, id: Option<i64>) -> AppResult<Prescription> {
        self.validate()
            .map_err(|e| AppError::Validation(ordered_messages(&e)))?;

        // All fields are guaranteed present once validation has passed
        let missing = || AppError::Internal("validated form has an empty field".to_string());
        Ok(Prescription {
            id,
            prescription_date: self.prescription_date.ok_or_else(missing)?,
            patient_name: self.patient_name.clone().ok_or_else(missing)?,
            patient_age: self.patient_age.ok_or_else(missing)?,
            patient_gender: self.patient_gender.ok_or_else(missing)?,
            diagnosis: self.diagnosis.clone().ok_or_else(missing)?,
            medicines: self.medicines.clone().ok_or_else(missing)?,
            next_visit_date: self.next_visit_date.ok_or_else(missing)?,
        })
    }
}

impl From<&Prescription> for PrescriptionForm {
    fn from(p: &Prescription) -> Self {
        Self {
            prescription_date: Some(p.prescription_date),
            patient_name: Some(p.patient_name.clone()),
            patient_age: Some(p.patient_age),
            patient_gender: Some(p.patient_gender),
            diagnosis: Some(p.diagnosis.clone()),
            medicines: Some(p.medicines.clone()),
            next_visit_date: Some(p.next_visit_date),
        }
    }
}

fn ordered_messages(errors: &ValidationErrors) -> Vec<String> {
    let by_field = errors.field_errors();
    FORM_FIELDS
        .iter()
        .filter_map(|field| by_field.get(*field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect()
}
