//! Client for the schedule table of the hosted database (REST interface)

use super::{RemoteSchedule, ScheduleRow};
use crate::config::RemoteConfig;
use crate::error::{OnAirError, Result};
use crate::logging::{StructuredLogger, get_logger};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use std::time::Duration;

/// Reads active schedule rows ordered by day and start time
pub struct HostedTableClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    logger: StructuredLogger,
}

impl HostedTableClient {
    pub fn new(cfg: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            endpoint: table_endpoint(&cfg.url, &cfg.table),
            api_key: cfg.api_key.trim().to_string(),
            client,
            logger: get_logger("remote"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `{base}/rest/v1/{table}` with a single slash between the parts
pub fn table_endpoint(base_url: &str, table: &str) -> String {
    format!(
        "{}/rest/v1/{}",
        base_url.trim().trim_end_matches('/'),
        table.trim().trim_matches('/')
    )
}

/// Query parameters selecting active rows in resolver order
pub const ROW_QUERY: [(&str, &str); 3] = [
    ("select", "*"),
    ("is_active", "eq.true"),
    ("order", "day_of_week.asc,start_time.asc"),
];

#[async_trait]
impl RemoteSchedule for HostedTableClient {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&ROW_QUERY)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("onair/", env!("CARGO_PKG_VERSION")));
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", &self.api_key)
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            self.logger
                .error(&format!("Schedule table query failed: {}", status));
            return Err(OnAirError::api(format!(
                "schedule table returned {}",
                status
            )));
        }

        let body = resp.bytes().await?;
        let rows: Vec<ScheduleRow> = serde_json::from_slice(&body)?;
        self.logger
            .debug(&format!("Schedule table returned {} rows", rows.len()));
        Ok(rows)
    }
}
