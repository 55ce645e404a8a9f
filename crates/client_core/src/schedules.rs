use reqwest::{Client, StatusCode};
use shared::{
    domain::{Schedule, ScheduleId},
    protocol::{CreateScheduleRequest, ErrorBody, ScheduleListResponse},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::RequestFailure;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const UNAVAILABLE_NOTICE: &str = "Unable to load schedules";
pub const CREATED_NOTICE: &str = "Created";
pub const CREATE_FAILED_NOTICE: &str = "Error creating schedule";
pub const DELETE_FAILED_NOTICE: &str = "Error deleting schedule";

/// The schedule table body. Either a list of rows in server order, or the
/// single full-width unavailable notice after a failed list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableState {
    Rows(Vec<ScheduleRow>),
    Unavailable,
}

impl Default for TableState {
    fn default() -> Self {
        TableState::Rows(Vec::new())
    }
}

/// One rendered table row: five display cells in fixed column order
/// `[id, url, interval_minutes, enabled, last_run-or-blank]`, plus the id its
/// delete control carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub delete_id: ScheduleId,
    pub cells: [String; 5],
}

impl ScheduleRow {
    pub fn project(schedule: &Schedule) -> Self {
        Self {
            delete_id: schedule.id.clone(),
            cells: [
                schedule.id.to_string(),
                schedule.url.clone(),
                schedule.interval_minutes.to_string(),
                schedule.enabled.to_string(),
                schedule
                    .last_run
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ],
        }
    }
}

/// Outcome banner next to the create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    Created,
    CreateFailed,
    DeleteFailed(ScheduleId),
}

impl SyncNotice {
    pub fn message(&self) -> String {
        match self {
            SyncNotice::Created => CREATED_NOTICE.to_string(),
            SyncNotice::CreateFailed => CREATE_FAILED_NOTICE.to_string(),
            SyncNotice::DeleteFailed(id) => format!("{DELETE_FAILED_NOTICE} {id}"),
        }
    }
}

/// Everything the schedules page renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleView {
    pub table: TableState,
    pub notice: Option<SyncNotice>,
}

/// Keeps the rendered schedule table consistent with server-held state.
///
/// The table is a pure order-preserving projection of the last successful
/// list fetch. Mutations are never applied speculatively: every accepted
/// create or delete is followed by a full re-fetch, and only that re-fetch
/// updates the rows.
pub struct ScheduleBoard {
    http: Client,
    server_url: String,
    api_key: String,
    view: Mutex<ScheduleView>,
}

impl ScheduleBoard {
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            view: Mutex::new(ScheduleView::default()),
        }
    }

    /// Snapshot of the current view state.
    pub async fn view(&self) -> ScheduleView {
        self.view.lock().await.clone()
    }

    /// Replaces the table with the server's current collection. A failed
    /// fetch, whatever the layer, degrades the table to the unavailable
    /// notice instead of propagating.
    pub async fn load_schedules(&self) {
        let table = match self.fetch_rows().await {
            Ok(rows) => {
                info!(rows = rows.len(), "schedule list loaded");
                TableState::Rows(rows)
            }
            Err(failure) => {
                warn!(%failure, "schedule list fetch failed");
                TableState::Unavailable
            }
        };
        self.view.lock().await.table = table;
    }

    /// Submits a new schedule. On 201 the notice reads created and the table
    /// is resynchronized from a fresh list fetch; the POST response itself is
    /// never rendered. Any other outcome sets the error notice and leaves the
    /// table untouched. Inputs are not validated here.
    pub async fn create_schedule(&self, url: &str, interval_minutes: u32) {
        match self.post_schedule(url, interval_minutes).await {
            Ok(()) => {
                self.view.lock().await.notice = Some(SyncNotice::Created);
                self.load_schedules().await;
            }
            Err(failure) => {
                warn!(%failure, url, "schedule create rejected");
                self.view.lock().await.notice = Some(SyncNotice::CreateFailed);
            }
        }
    }

    /// Deletes by the id the row's delete control carries, then
    /// resynchronizes. A rejected or failed delete surfaces on the notice and
    /// skips the re-fetch.
    pub async fn delete_schedule(&self, id: &ScheduleId) {
        match self.send_delete(id).await {
            Ok(()) => self.load_schedules().await,
            Err(failure) => {
                warn!(%failure, id = %id, "schedule delete rejected");
                self.view.lock().await.notice = Some(SyncNotice::DeleteFailed(id.clone()));
            }
        }
    }

    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>, RequestFailure> {
        let response = self
            .http
            .get(format!("{}/schedules", self.server_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestFailure::rejected("GET /schedules", status, None));
        }
        let body: ScheduleListResponse = response.json().await?;
        Ok(body.schedules.iter().map(ScheduleRow::project).collect())
    }

    async fn post_schedule(
        &self,
        url: &str,
        interval_minutes: u32,
    ) -> Result<(), RequestFailure> {
        let response = self
            .http
            .post(format!("{}/schedules", self.server_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&CreateScheduleRequest {
                url: url.to_string(),
                interval_minutes,
            })
            .send()
            .await?;
        let status = response.status();
        // Only 201 counts as created; a 200 means the server did something
        // other than what was asked.
        if status != StatusCode::CREATED {
            let detail = response.json::<ErrorBody>().await.ok().map(|b| b.error);
            return Err(RequestFailure::rejected("POST /schedules", status, detail));
        }
        Ok(())
    }

    async fn send_delete(&self, id: &ScheduleId) -> Result<(), RequestFailure> {
        let response = self
            .http
            .delete(format!("{}/schedules/{}", self.server_url, id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<ErrorBody>().await.ok().map(|b| b.error);
            return Err(RequestFailure::rejected(
                format!("DELETE /schedules/{id}"),
                status,
                detail,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/schedules_tests.rs"]
mod tests;
