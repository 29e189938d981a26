//! Window aggregation — per-window and per-segment sums and engagement ratios.

use chrono::NaiveDate;
use copilot_core::{DailySegmentRecord, DateWindow};
use std::collections::BTreeMap;

/// `numerator / max(1, denominator)`.
pub fn guarded_rate(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

/// Summed counters and ratios for a set of daily rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowTotals {
    pub rows: usize,
    pub sends: u64,
    pub opens: u64,
    pub clicks: u64,
    pub unsubs: u64,
    pub open_rate: f64,
    pub ctr: f64,
    pub ctor: f64,
}

impl WindowTotals {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DailySegmentRecord>,
    {
        let mut totals = Self::default();
        for r in records {
            totals.rows += 1;
            totals.sends += r.sends;
            totals.opens += r.opens;
            totals.clicks += r.clicks;
            totals.unsubs += r.unsubs;
        }
        totals.open_rate = guarded_rate(totals.opens, totals.sends);
        totals.ctr = guarded_rate(totals.clicks, totals.sends);
        totals.ctor = guarded_rate(totals.clicks, totals.opens);
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// One row of the segment performance table.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPerformance {
    pub segment_name: String,
    pub sends: u64,
    pub opens: u64,
    pub clicks: u64,
    pub unsubs: u64,
    pub open_rate: f64,
    pub ctr: f64,
    pub ctor: f64,
}

/// Relative change (in percent) of each KPI card against the prior window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KpiDeltas {
    pub sends: Option<f64>,
    pub open_rate: Option<f64>,
    pub ctr: Option<f64>,
    pub ctor: Option<f64>,
}

/// Daily CTOR for one segment, used by the trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub segment_name: String,
    pub date: NaiveDate,
    /// `None` when the segment had no opens that day.
    pub ctor: Option<f64>,
}

/// A window's aggregates alongside the same-length window before it.
#[derive(Debug, Clone)]
pub struct WindowComparison {
    pub window: DateWindow,
    pub prior_window: DateWindow,
    pub current: WindowTotals,
    pub prior: WindowTotals,
    /// Ordered by segment name.
    pub segments: Vec<SegmentPerformance>,
}

/// Latest date present in the daily table.
pub fn latest_date(records: &[DailySegmentRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.date).max()
}

/// Trailing `days`-day window that ends on the latest date in the data.
pub fn default_window(records: &[DailySegmentRecord], days: u32) -> Option<DateWindow> {
    latest_date(records).map(|end| DateWindow::trailing(end, days))
}

/// Sorted, de-duplicated segment names present in the data.
pub fn segment_names(records: &[DailySegmentRecord]) -> Vec<String> {
    let mut names: Vec<String> = records.iter().map(|r| r.segment_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

fn selected(record: &DailySegmentRecord, segments: &[String]) -> bool {
    segments.is_empty() || segments.iter().any(|s| s == &record.segment_name)
}

/// Rows inside `window` whose segment name is in `segments`. An empty filter
/// keeps every segment.
pub fn filter_window<'a>(
    records: &'a [DailySegmentRecord],
    window: &DateWindow,
    segments: &[String],
) -> Vec<&'a DailySegmentRecord> {
    records
        .iter()
        .filter(|r| window.contains(r.date) && selected(r, segments))
        .collect()
}

/// Group rows by segment name, ordered by name.
pub fn segment_performance(records: &[&DailySegmentRecord]) -> Vec<SegmentPerformance> {
    let mut groups: BTreeMap<&str, [u64; 4]> = BTreeMap::new();
    for r in records {
        let sums = groups.entry(r.segment_name.as_str()).or_default();
        sums[0] += r.sends;
        sums[1] += r.opens;
        sums[2] += r.clicks;
        sums[3] += r.unsubs;
    }

    groups
        .into_iter()
        .map(|(name, [sends, opens, clicks, unsubs])| SegmentPerformance {
            segment_name: name.to_string(),
            sends,
            opens,
            clicks,
            unsubs,
            open_rate: guarded_rate(opens, sends),
            ctr: guarded_rate(clicks, sends),
            ctor: guarded_rate(clicks, opens),
        })
        .collect()
}

/// Segment with the highest CTOR; the first one wins a tie.
pub fn top_segment(segments: &[SegmentPerformance]) -> Option<&SegmentPerformance> {
    segments
        .iter()
        .fold(None, |best: Option<&SegmentPerformance>, s| match best {
            Some(b) if s.ctor <= b.ctor => Some(b),
            _ => Some(s),
        })
}

/// Segment with the lowest CTOR; the first one wins a tie.
pub fn lagging_segment(segments: &[SegmentPerformance]) -> Option<&SegmentPerformance> {
    segments
        .iter()
        .fold(None, |worst: Option<&SegmentPerformance>, s| match worst {
            Some(w) if s.ctor >= w.ctor => Some(w),
            _ => Some(s),
        })
}

fn relative_change(current: f64, previous: f64) -> Option<f64> {
    (previous != 0.0).then(|| (current - previous) / previous * 100.0)
}

impl WindowComparison {
    pub fn compute(records: &[DailySegmentRecord], window: DateWindow, segments: &[String]) -> Self {
        let prior_window = window.prior();
        let current_rows = filter_window(records, &window, segments);
        let prior_rows = filter_window(records, &prior_window, segments);

        Self {
            window,
            prior_window,
            current: WindowTotals::from_records(current_rows.iter().copied()),
            prior: WindowTotals::from_records(prior_rows.iter().copied()),
            segments: segment_performance(&current_rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Relative KPI deltas. All `None` when the prior window has no rows.
    pub fn kpi_deltas(&self) -> KpiDeltas {
        if self.prior.is_empty() {
            return KpiDeltas::default();
        }
        KpiDeltas {
            sends: relative_change(self.current.sends as f64, self.prior.sends as f64),
            open_rate: relative_change(self.current.open_rate, self.prior.open_rate),
            ctr: relative_change(self.current.ctr, self.prior.ctr),
            ctor: relative_change(self.current.ctor, self.prior.ctor),
        }
    }

    /// Absolute CTOR change; an empty prior window counts as a CTOR of zero.
    pub fn ctor_delta(&self) -> f64 {
        let prior_ctor = if self.prior.is_empty() {
            0.0
        } else {
            self.prior.ctor
        };
        self.current.ctor - prior_ctor
    }

    pub fn top_segment(&self) -> Option<&SegmentPerformance> {
        top_segment(&self.segments)
    }

    pub fn lagging_segment(&self) -> Option<&SegmentPerformance> {
        lagging_segment(&self.segments)
    }
}

/// Daily CTOR per selected segment within `window`, ordered by segment name then date.
pub fn ctor_trend(
    records: &[DailySegmentRecord],
    window: &DateWindow,
    segments: &[String],
) -> Vec<TrendPoint> {
    let mut daily: BTreeMap<(&str, NaiveDate), (u64, u64)> = BTreeMap::new();
    for r in filter_window(records, window, segments) {
        let entry = daily.entry((r.segment_name.as_str(), r.date)).or_default();
        entry.0 += r.opens;
        entry.1 += r.clicks;
    }

    daily
        .into_iter()
        .map(|((name, date), (opens, clicks))| TrendPoint {
            segment_name: name.to_string(),
            date,
            ctor: (opens > 0).then(|| clicks as f64 / opens as f64),
        })
        .collect()
}
