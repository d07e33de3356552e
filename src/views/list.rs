//! Paginated, date-filtered prescription list

use chrono::NaiveDate;

use crate::{
    models::{Page, Prescription, PrescriptionQuery},
    services::prescriptions::PrescriptionService,
};

use super::{Completed, Notification, Pending, RequestTracker};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub struct PrescriptionListView {
    service: PrescriptionService,
    tracker: RequestTracker,
    page_index: u32,
    requested_page: u32,
    page_size: u32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    rows: Vec<Prescription>,
    total_elements: u64,
    total_pages: u32,
    loading: bool,
}

impl PrescriptionListView {
    pub fn new(service: PrescriptionService, page_size: u32) -> Self {
        Self {
            service,
            tracker: RequestTracker::default(),
            page_index: 0,
            requested_page: 0,
            page_size: page_size.max(1),
            start_date: None,
            end_date: None,
            rows: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            loading: false,
        }
    }

    pub fn rows(&self) -> &[Prescription] {
        &self.rows
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn filters(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.start_date, self.end_date)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn query(&self, page: u32) -> PrescriptionQuery {
        PrescriptionQuery::new(page, self.page_size).with_dates(self.start_date, self.end_date)
    }

    /// Issue the request for `page` without waiting for it
    pub fn start_load(&mut self, page: u32) -> Pending<Page<Prescription>> {
        let ticket = self.tracker.begin();
        self.loading = true;
        self.requested_page = page;
        let service = self.service.clone();
        let query = self.query(page);
        Pending::new(ticket, async move { service.list(&query).await })
    }

    /// Apply a finished load. Stale results are dropped silently.
    pub fn finish_load(&mut self, completed: Completed<Page<Prescription>>) -> Option<Notification> {
        if !self.tracker.is_current(completed.ticket) {
            tracing::debug!("Discarding stale prescription page");
            return None;
        }
        self.loading = false;

        match completed.result {
            Ok(page) => {
                self.page_index = self.requested_page;
                self.total_elements = page.total_elements;
                self.total_pages = page.total_pages;
                self.rows = page.content;
                None
            }
            Err(e) => Some(Notification::from_error("Error loading prescriptions", &e)),
        }
    }

    pub async fn load(&mut self, page: u32) -> Option<Notification> {
        let pending = self.start_load(page);
        let completed = pending.resolve().await;
        self.finish_load(completed)
    }

    pub async fn reload(&mut self) -> Option<Notification> {
        self.load(self.page_index).await
    }

    pub async fn next_page(&mut self) -> Option<Notification> {
        if self.page_index + 1 >= self.total_pages {
            return None;
        }
        self.load(self.page_index + 1).await
    }

    pub async fn previous_page(&mut self) -> Option<Notification> {
        if self.page_index == 0 {
            return None;
        }
        self.load(self.page_index - 1).await
    }

    /// Set the date range used by the next load without issuing a request
    pub fn set_filters(
        &mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Option<Notification> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Some(Notification::error("Start date must not be after end date"));
            }
        }
        self.start_date = start_date;
        self.end_date = end_date;
        None
    }

    /// Set the date range and go back to the first page
    pub async fn apply_filters(
        &mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Option<Notification> {
        if let Some(rejected) = self.set_filters(start_date, end_date) {
            return Some(rejected);
        }
        self.load(0).await
    }

    pub async fn clear_filters(&mut self) -> Option<Notification> {
        self.start_date = None;
        self.end_date = None;
        self.load(0).await
    }

    /// Delete a prescription and refresh the current page
    pub async fn delete(&mut self, id: i64) -> Notification {
        match self.service.delete(id).await {
            Ok(()) => {
                if let Some(failure) = self.reload().await {
                    return failure;
                }
                // The last row of the last page is gone
                if self.rows.is_empty() && self.page_index > 0 {
                    if let Some(failure) = self.previous_page().await {
                        return failure;
                    }
                }
                Notification::success("Prescription deleted successfully")
            }
            Err(e) => Notification::from_error("Error deleting prescription", &e),
        }
    }

    /// Leaving the screen: any in-flight load must not land afterwards
    pub fn leave(&mut self) {
        self.tracker.invalidate();
        self.loading = false;
    }
}
