//! Latest-day fatigue and oversaturation alerts.

use chrono::NaiveDate;
use copilot_core::RollingWindowRecord;
use serde::Serialize;

/// Fatigue score above which a segment is alerted even without the oversaturation flag.
pub const FATIGUE_ALERT_THRESHOLD: f64 = 0.6;

pub const THROTTLE_RECOMMENDATION: &str = "Throttle non-essential journeys for 7 days; shift FYI to portal/SMS; prioritize high-utility content.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueAlert {
    pub date: NaiveDate,
    pub segment_id: String,
    pub segment_name: String,
    #[serde(rename = "EPC_7d")]
    pub epc_7d: Option<f64>,
    pub ctor_7d: Option<f64>,
    pub unsub_rate_7d: Option<f64>,
    pub fatigue_score: f64,
    pub oversaturation_flag: bool,
    pub recommendation: String,
}

impl FatigueAlert {
    fn from_record(r: &RollingWindowRecord) -> Self {
        Self {
            date: r.date,
            segment_id: r.segment_id.clone(),
            segment_name: r.segment_name.clone(),
            epc_7d: r.epc_7d,
            ctor_7d: r.ctor_7d,
            unsub_rate_7d: r.unsub_rate_7d,
            fatigue_score: r.fatigue_score,
            oversaturation_flag: r.oversaturation_flag,
            recommendation: THROTTLE_RECOMMENDATION.to_string(),
        }
    }
}

pub fn is_alerting(r: &RollingWindowRecord) -> bool {
    r.oversaturation_flag || r.fatigue_score > FATIGUE_ALERT_THRESHOLD
}

/// Alerts for the most recent date in `rolling`, in table order.
///
/// `segment_ids` restricts the candidates; an empty slice keeps every segment.
pub fn latest_alerts(rolling: &[RollingWindowRecord], segment_ids: &[String]) -> Vec<FatigueAlert> {
    let Some(latest) = rolling.iter().map(|r| r.date).max() else {
        return Vec::new();
    };

    rolling
        .iter()
        .filter(|r| r.date == latest)
        .filter(|r| segment_ids.is_empty() || segment_ids.contains(&r.segment_id))
        .filter(|r| is_alerting(r))
        .map(FatigueAlert::from_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seg: &str, day: u32, flag: bool, score: f64) -> RollingWindowRecord {
        RollingWindowRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            segment_id: seg.into(),
            segment_name: format!("{seg} name"),
            sends: 100,
            opens: 30,
            clicks: 3,
            unsubs: 0,
            spam_complaints: 0,
            unique_contacts_reached: 20,
            epc_7d: Some(score * 5.0),
            ctor_7d: Some(0.1),
            unsub_rate_7d: Some(0.0),
            oversaturation_flag: flag,
            fatigue_score: score,
        }
    }

    #[test]
    fn test_only_latest_day_considered() {
        let rolling = vec![row("A", 27, true, 1.0), row("A", 28, false, 0.2)];
        assert!(latest_alerts(&rolling, &[]).is_empty());
    }

    #[test]
    fn test_flag_or_score_triggers() {
        let rolling = vec![
            row("A", 28, true, 0.1),
            row("B", 28, false, 0.61),
            row("C", 28, false, 0.6),
            row("D", 28, false, 0.2),
        ];
        let alerts = latest_alerts(&rolling, &[]);
        let ids: Vec<_> = alerts.iter().map(|a| a.segment_id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert_eq!(alerts[0].recommendation, THROTTLE_RECOMMENDATION);
    }

    #[test]
    fn test_segment_filter() {
        let rolling = vec![row("A", 28, true, 1.0), row("B", 28, true, 1.0)];
        let alerts = latest_alerts(&rolling, &["B".to_string()]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].segment_id, "B");
    }

    #[test]
    fn test_empty_table_has_no_alerts() {
        assert!(latest_alerts(&[], &[]).is_empty());
    }

    #[test]
    fn test_serializes_epc_column_name() {
        let alert = FatigueAlert::from_record(&row("A", 28, true, 1.0));
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["EPC_7d"], 5.0);
        assert_eq!(json["date"], "2025-09-28");
    }
}
