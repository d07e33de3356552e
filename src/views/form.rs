//! Create / edit prescription form

use chrono::NaiveDate;

use crate::{
    models::{Prescription, PrescriptionForm},
    services::prescriptions::PrescriptionService,
};

use super::{Completed, Notification, Pending, RequestTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

pub struct PrescriptionFormView {
    service: PrescriptionService,
    tracker: RequestTracker,
    mode: FormMode,
    form: PrescriptionForm,
    errors: Vec<String>,
    loading: bool,
}

impl PrescriptionFormView {
    /// Empty form for a new prescription, dated `today`
    pub fn create(service: PrescriptionService, today: NaiveDate) -> Self {
        Self {
            service,
            tracker: RequestTracker::default(),
            mode: FormMode::Create,
            form: PrescriptionForm::new(today),
            errors: Vec::new(),
            loading: false,
        }
    }

    /// Form for editing `id`; call [`load`](Self::load) to fill it
    pub fn edit(service: PrescriptionService, id: i64) -> Self {
        Self {
            service,
            tracker: RequestTracker::default(),
            mode: FormMode::Edit(id),
            form: PrescriptionForm::default(),
            errors: Vec::new(),
            loading: false,
        }
    }

    pub fn form(&self) -> &PrescriptionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PrescriptionForm {
        &mut self.form
    }

    /// Messages from the last rejected submit
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn start_load(&mut self) -> Option<Pending<Prescription>> {
        let FormMode::Edit(id) = self.mode else {
            return None;
        };
        let ticket = self.tracker.begin();
        self.loading = true;
        let service = self.service.clone();
        Some(Pending::new(ticket, async move { service.get(id).await }))
    }

    pub fn finish_load(&mut self, completed: Completed<Prescription>) -> Option<Notification> {
        if !self.tracker.is_current(completed.ticket) {
            return None;
        }
        self.loading = false;

        match completed.result {
            Ok(prescription) => {
                self.form = PrescriptionForm::from(&prescription);
                None
            }
            Err(e) => Some(Notification::from_error("Error loading prescription", &e)),
        }
    }

    /// Fill the form from the server in edit mode; no-op when creating
    pub async fn load(&mut self) -> Option<Notification> {
        let pending = self.start_load()?;
        let completed = pending.resolve().await;
        self.finish_load(completed)
    }

    /// Validate locally, then create or update.
    ///
    /// Invalid input never reaches the server; the messages stay available
    /// through [`errors`](Self::errors).
    pub async fn submit(&mut self) -> Result<(Prescription, Notification), Notification> {
        self.errors = self.form.errors();
        if !self.errors.is_empty() {
            return Err(Notification::error(self.errors.join("; ")));
        }

        self.loading = true;
        let result = match self.mode {
            FormMode::Create => self.service.create(&self.form).await,
            FormMode::Edit(id) => self.service.update(id, &self.form).await,
        };
        self.loading = false;

        match result {
            Ok(saved) => {
                let message = match self.mode {
                    FormMode::Create => "Prescription created successfully",
                    FormMode::Edit(_) => "Prescription updated successfully",
                };
                Ok((saved, Notification::success(message)))
            }
            Err(e) => Err(Notification::from_error("Error saving prescription", &e)),
        }
    }
}
