//! Trailing 7-row fatigue indicators per segment.

use copilot_core::{DailySegmentRecord, RollingWindowRecord};
use std::collections::VecDeque;

/// Number of trailing rows summed for each rolling indicator.
pub const ROLLING_ROWS: usize = 7;

/// EPC above this marks a segment as oversaturated.
pub const OVERSATURATION_EPC: f64 = 4.0;

/// EPC at which the fatigue score saturates at 1.0.
pub const FATIGUE_EPC_CEILING: f64 = 5.0;

pub fn is_oversaturated(epc_7d: Option<f64>) -> bool {
    epc_7d.is_some_and(|epc| epc > OVERSATURATION_EPC)
}

/// `clamp(EPC_7d / 5, 0, 1)`, with an undefined EPC counting as zero.
pub fn fatigue_score(epc_7d: Option<f64>) -> f64 {
    (epc_7d.unwrap_or(0.0) / FATIGUE_EPC_CEILING).clamp(0.0, 1.0)
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[derive(Default)]
struct RunningSums {
    sends: u64,
    opens: u64,
    clicks: u64,
    unsubs: u64,
    unique_contacts: u64,
}

impl RunningSums {
    fn add(&mut self, r: &DailySegmentRecord) {
        self.sends += r.sends;
        self.opens += r.opens;
        self.clicks += r.clicks;
        self.unsubs += r.unsubs;
        self.unique_contacts += r.unique_contacts_reached;
    }

    fn remove(&mut self, r: &DailySegmentRecord) {
        self.sends -= r.sends;
        self.opens -= r.opens;
        self.clicks -= r.clicks;
        self.unsubs -= r.unsubs;
        self.unique_contacts -= r.unique_contacts_reached;
    }
}

/// Derive the rolling table from daily rows.
///
/// Rows are ordered by `(segment_id, date)`; each output row sums the current
/// row and up to six preceding rows of the same segment.
pub fn build_rolling(records: &[DailySegmentRecord]) -> Vec<RollingWindowRecord> {
    let mut sorted: Vec<&DailySegmentRecord> = records.iter().collect();
    sorted.sort_by(|a, b| (&a.segment_id, a.date).cmp(&(&b.segment_id, b.date)));

    let mut out = Vec::with_capacity(sorted.len());
    let mut window: VecDeque<&DailySegmentRecord> = VecDeque::with_capacity(ROLLING_ROWS);
    let mut sums = RunningSums::default();

    for record in sorted {
        if window
            .front()
            .is_some_and(|first| first.segment_id != record.segment_id)
        {
            window.clear();
            sums = RunningSums::default();
        }
        if window.len() == ROLLING_ROWS {
            if let Some(expired) = window.pop_front() {
                sums.remove(expired);
            }
        }
        window.push_back(record);
        sums.add(record);

        let epc_7d = ratio(sums.sends, sums.unique_contacts);
        out.push(RollingWindowRecord {
            date: record.date,
            segment_id: record.segment_id.clone(),
            segment_name: record.segment_name.clone(),
            sends: record.sends,
            opens: record.opens,
            clicks: record.clicks,
            unsubs: record.unsubs,
            spam_complaints: record.spam_complaints,
            unique_contacts_reached: record.unique_contacts_reached,
            epc_7d,
            ctor_7d: ratio(sums.clicks, sums.opens),
            unsub_rate_7d: ratio(sums.unsubs, sums.sends),
            oversaturation_flag: is_oversaturated(epc_7d),
            fatigue_score: fatigue_score(epc_7d),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(seg: &str, day: u32, sends: u64, opens: u64, clicks: u64, unique: u64) -> DailySegmentRecord {
        DailySegmentRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            segment_id: seg.into(),
            segment_name: format!("Segment {seg}"),
            sends,
            opens,
            clicks,
            unsubs: 0,
            spam_complaints: 0,
            unique_contacts_reached: unique,
        }
    }

    #[test]
    fn test_first_row_uses_min_one_period() {
        let rows = build_rolling(&[rec("A", 1, 1000, 200, 20, 500)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].epc_7d, Some(2.0));
        assert_eq!(rows[0].ctor_7d, Some(0.1));
        assert_eq!(rows[0].fatigue_score, 0.4);
        assert!(!rows[0].oversaturation_flag);
    }

    #[test]
    fn test_window_drops_rows_older_than_seven() {
        let mut input: Vec<_> = (1..=7).map(|d| rec("A", d, 100, 10, 1, 100)).collect();
        input.push(rec("A", 8, 800, 10, 1, 100));
        let rows = build_rolling(&input);
        // day 8: rows 2..=8 -> sends 600 + 800, unique 700
        assert_eq!(rows[7].epc_7d, Some(1400.0 / 700.0));
    }

    #[test]
    fn test_segments_do_not_share_windows() {
        let input = vec![
            rec("B", 1, 100, 10, 1, 100),
            rec("A", 1, 900, 10, 1, 100),
            rec("B", 2, 100, 10, 1, 100),
        ];
        let rows = build_rolling(&input);
        assert_eq!(rows[0].segment_id, "A");
        assert_eq!(rows[0].epc_7d, Some(9.0));
        assert!(rows[0].oversaturation_flag);
        assert_eq!(rows[2].segment_id, "B");
        assert_eq!(rows[2].epc_7d, Some(1.0));
    }

    #[test]
    fn test_zero_denominators_are_undefined() {
        let rows = build_rolling(&[rec("A", 1, 0, 0, 0, 0)]);
        assert_eq!(rows[0].epc_7d, None);
        assert_eq!(rows[0].ctor_7d, None);
        assert_eq!(rows[0].unsub_rate_7d, None);
        assert_eq!(rows[0].fatigue_score, 0.0);
        assert!(!rows[0].oversaturation_flag);
    }

    #[test]
    fn test_flag_and_score_track_epc_exactly() {
        let input: Vec<_> = [(400, 100), (401, 100), (250, 100), (600, 100), (100, 300)]
            .iter()
            .enumerate()
            .map(|(i, (s, u))| rec(&format!("S{i}"), 1, *s, 0, 0, *u))
            .collect();
        for row in build_rolling(&input) {
            let epc = row.epc_7d.unwrap();
            assert_eq!(row.oversaturation_flag, epc > 4.0);
            assert_eq!(row.fatigue_score, (epc / 5.0).clamp(0.0, 1.0));
        }
    }
}
