//! Hometax collection-job lifecycle.
//!
//! Both hometax modules share the same job protocol: request a collection
//! job, poll its state until it finishes, then search or summarize the
//! collected documents. [`JobLifecycle`] implements the shared
//! request/state/list steps against a module-specific base path; the search
//! endpoints stay in the feature clients because their filters differ.

use popbill_core::{JobId, PartnerIdentity};
use reqwest::Method;
use serde::Deserialize;

use crate::error::PopbillError;
use crate::transport::{Payload, Transport};

/// Processing state of a collection job.
///
/// The wire form is an integer. Codes outside the documented range decode
/// as [`JobStateCode::Unknown`] so a service-side addition never breaks
/// deserialization of an otherwise valid response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "i32")]
pub enum JobStateCode {
    /// Accepted, not yet started.
    Requested,
    /// Collection in progress.
    Running,
    /// Finished; every requested document was collected.
    Succeeded,
    /// Finished with no usable result.
    Failed,
    /// Finished, but some documents could not be collected.
    PartiallyFailed,
    /// A code this client does not know about.
    Unknown(i32),
}

impl From<i32> for JobStateCode {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::Requested,
            2 => Self::Running,
            3 => Self::Succeeded,
            4 => Self::Failed,
            5 => Self::PartiallyFailed,
            other => Self::Unknown(other),
        }
    }
}

impl From<JobStateCode> for i32 {
    fn from(state: JobStateCode) -> i32 {
        match state {
            JobStateCode::Requested => 1,
            JobStateCode::Running => 2,
            JobStateCode::Succeeded => 3,
            JobStateCode::Failed => 4,
            JobStateCode::PartiallyFailed => 5,
            JobStateCode::Unknown(code) => code,
        }
    }
}

impl JobStateCode {
    /// Whether the job has stopped, in any outcome.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::PartiallyFailed)
    }
}

/// Snapshot of a collection job as reported by the state endpoints.
///
/// Every field except the ID and state is optional: the service omits
/// fields that do not apply to the job's current phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    #[serde(rename = "jobID")]
    pub job_id: JobId,
    pub job_state: JobStateCode,
    /// Collection target kind the job was requested with.
    #[serde(default)]
    pub query_type: Option<String>,
    /// Which date the requested range applied to.
    #[serde(default)]
    pub query_date_type: Option<String>,
    #[serde(default)]
    pub query_st_date: Option<String>,
    #[serde(default)]
    pub query_en_date: Option<String>,
    /// Service error code when the job failed, `0` otherwise.
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_reason: Option<String>,
    #[serde(rename = "jobStartDT", default)]
    pub job_start_dt: Option<String>,
    #[serde(rename = "jobEndDT", default)]
    pub job_end_dt: Option<String>,
    /// Number of documents collected so far.
    #[serde(default)]
    pub collect_count: Option<i64>,
    #[serde(rename = "regDT", default)]
    pub reg_dt: Option<String>,
}

/// One page of search results over a finished job's documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub total: i64,
    pub per_page: i64,
    pub page_num: i64,
    pub page_count: i64,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// Sort direction for search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "A",
            Self::Desc => "D",
        }
    }
}

/// Server acknowledgment of a job request.
#[derive(Debug, Deserialize)]
struct JobAck {
    #[serde(rename = "jobID")]
    job_id: String,
}

/// Shared request/poll steps of the collection-job protocol, bound to one
/// module's base path.
pub(crate) struct JobLifecycle {
    transport: Transport,
    base_path: &'static str,
}

impl JobLifecycle {
    pub(crate) fn new(transport: Transport, base_path: &'static str) -> Self {
        Self { transport, base_path }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    pub(crate) fn base_path(&self) -> &'static str {
        self.base_path
    }

    /// Request a collection job. `request_path` already carries the target
    /// kind and date range; the response acknowledges with the job ID.
    pub(crate) async fn request_job(
        &self,
        identity: &PartnerIdentity,
        request_path: &str,
    ) -> Result<JobId, PopbillError> {
        let ack: JobAck = self
            .transport
            .request_json(Method::POST, request_path, identity, Payload::None)
            .await?;
        // A malformed ID here is a service contract violation, not bad input.
        JobId::new(ack.job_id).map_err(|e| PopbillError::Decode {
            endpoint: format!("POST /{request_path}"),
            reason: e.to_string(),
        })
    }

    /// Fetch the current state of one job.
    pub(crate) async fn job_state(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
    ) -> Result<JobState, PopbillError> {
        let path = format!("{}/{}/State", self.base_path, job_id);
        self.transport
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// List the states of recent jobs (the service keeps roughly the last
    /// week's worth).
    pub(crate) async fn list_jobs(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<Vec<JobState>, PopbillError> {
        let path = format!("{}/JobList", self.base_path);
        self.transport
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }
}
