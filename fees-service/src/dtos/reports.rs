use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DailyCollectionsQuery {
    /// Defaults to today (UTC) when omitted.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AuditTrailQuery {
    pub limit: Option<i64>,
}
