use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of `emails_by_segment_daily.csv`: the counters for a single
/// (date, segment) pair. `sends >= opens >= clicks` is expected but not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySegmentRecord {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub segment_id: String,
    pub segment_name: String,
    pub sends: u64,
    pub opens: u64,
    pub clicks: u64,
    pub unsubs: u64,
    pub spam_complaints: u64,
    pub unique_contacts_reached: u64,
}

/// One row of `segment_engagement_windows.csv`: the daily counters plus the
/// trailing 7-row ratios for the same segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowRecord {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub segment_id: String,
    pub segment_name: String,
    pub sends: u64,
    pub opens: u64,
    pub clicks: u64,
    pub unsubs: u64,
    pub spam_complaints: u64,
    pub unique_contacts_reached: u64,
    /// Sends per unique contact reached. `None` when no contacts were reached.
    #[serde(rename = "EPC_7d")]
    pub epc_7d: Option<f64>,
    pub ctor_7d: Option<f64>,
    pub unsub_rate_7d: Option<f64>,
    #[serde(deserialize_with = "de_flag")]
    pub oversaturation_flag: bool,
    pub fatigue_score: f64,
}

/// Accepts `2025-09-28` as well as timestamp renderings such as
/// `2025-09-28 00:00:00` or `2025-09-28T00:00:00`.
fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean flag '{other}'"
        ))),
    }
}
