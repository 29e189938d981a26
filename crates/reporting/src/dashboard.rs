//! Executive dashboard — KPI cards, segment table, CTOR charts, fatigue
//! alerts and the weekly brief, rendered as plain text for the terminal.

use crate::brief::{compose_brief, percent, BriefDocument};
use copilot_core::DateWindow;
use copilot_metrics::aggregate::{ctor_trend, segment_names, TrendPoint};
use copilot_metrics::alerts::latest_alerts;
use copilot_metrics::{Dataset, FatigueAlert, WindowComparison};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

const BAR_WIDTH: usize = 40;
const RULE_WIDTH: usize = 96;

/// Everything one dashboard render needs, computed from a full dataset scan.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Every segment name in the daily table, sorted.
    pub available_segments: Vec<String>,
    /// Selected segment names; empty means all segments.
    pub segments: Vec<String>,
    pub comparison: WindowComparison,
    pub trend: Vec<TrendPoint>,
    pub alerts: Vec<FatigueAlert>,
    pub brief: BriefDocument,
}

impl DashboardView {
    pub fn build(data: &Dataset, window: DateWindow, segments: &[String]) -> Self {
        let comparison = WindowComparison::compute(&data.daily, window, segments);

        // Alerts are keyed by segment id; map the selected names across.
        let segment_ids: Vec<String> = if segments.is_empty() {
            Vec::new()
        } else {
            data.daily
                .iter()
                .filter(|r| segments.contains(&r.segment_name))
                .map(|r| r.segment_id.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };
        let alerts = if !segments.is_empty() && segment_ids.is_empty() {
            Vec::new()
        } else {
            latest_alerts(&data.rolling, &segment_ids)
        };

        Self {
            available_segments: segment_names(&data.daily),
            segments: segments.to_vec(),
            trend: ctor_trend(&data.daily, &window, segments),
            brief: compose_brief(&comparison),
            comparison,
            alerts,
        }
    }
}

fn delta_label(delta: Option<f64>) -> String {
    delta.map_or_else(|| "–".to_string(), |d| format!("{d:+.1}%"))
}

fn opt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

fn rule(f: &mut impl Write) -> fmt::Result {
    writeln!(f, "{}", "─".repeat(RULE_WIDTH))
}

fn write_header(f: &mut impl Write, view: &DashboardView) -> fmt::Result {
    let cmp = &view.comparison;
    writeln!(f, "Eloqua Intelligence Copilot")?;
    writeln!(f, "Executive Insights • Fatigue Optimizer • A/B Test Guidance")?;
    let selected = if view.segments.is_empty() {
        "all".to_string()
    } else {
        view.segments.join(", ")
    };
    writeln!(
        f,
        "Window: {} (prior: {})   Segments: {selected}",
        cmp.window, cmp.prior_window
    )?;
    writeln!(f, "Available segments: {}", view.available_segments.join(", "))?;
    rule(f)
}

fn write_kpis(f: &mut impl Write, cmp: &WindowComparison) -> fmt::Result {
    let deltas = cmp.kpi_deltas();
    let cards = [
        ("Sends", cmp.current.sends.to_string(), deltas.sends),
        ("Open Rate", percent(cmp.current.open_rate), deltas.open_rate),
        ("CTR", percent(cmp.current.ctr), deltas.ctr),
        ("CTOR", percent(cmp.current.ctor), deltas.ctor),
    ];
    for (label, _, _) in &cards {
        write!(f, "{label:<18}")?;
    }
    writeln!(f)?;
    for (_, value, _) in &cards {
        write!(f, "{value:<18}")?;
    }
    writeln!(f)?;
    for (_, _, delta) in &cards {
        write!(f, "{:<18}", delta_label(*delta))?;
    }
    writeln!(f)?;
    rule(f)
}

fn write_segments(f: &mut impl Write, cmp: &WindowComparison) -> fmt::Result {
    writeln!(f, "Segment Performance")?;
    if cmp.segments.is_empty() {
        writeln!(f, "No data in the selected window/segments.")?;
        return rule(f);
    }
    writeln!(
        f,
        "{:<28}{:>9}{:>9}{:>9}{:>9}{:>11}{:>9}{:>9}",
        "Segment", "Sends", "Opens", "Clicks", "Unsubs", "Open Rate", "CTR", "CTOR"
    )?;
    for s in &cmp.segments {
        writeln!(
            f,
            "{:<28}{:>9}{:>9}{:>9}{:>9}{:>11}{:>9}{:>9}",
            s.segment_name,
            s.sends,
            s.opens,
            s.clicks,
            s.unsubs,
            percent(s.open_rate),
            percent(s.ctr),
            percent(s.ctor)
        )?;
    }

    writeln!(f, "\nCTOR by Segment")?;
    let max_ctor = cmp
        .segments
        .iter()
        .map(|s| s.ctor)
        .fold(0.0_f64, f64::max);
    for s in &cmp.segments {
        let len = if max_ctor > 0.0 {
            ((s.ctor / max_ctor) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        writeln!(
            f,
            "{:<28}{:<w$} {}",
            s.segment_name,
            "█".repeat(len),
            percent(s.ctor),
            w = BAR_WIDTH
        )?;
    }
    rule(f)
}

fn write_trend(f: &mut impl Write, trend: &[TrendPoint]) -> fmt::Result {
    writeln!(f, "CTOR Trend (Selected Segments)")?;
    if trend.is_empty() {
        writeln!(f, "No daily data in the selected window.")?;
        return rule(f);
    }
    let names: BTreeSet<&str> = trend.iter().map(|p| p.segment_name.as_str()).collect();
    let mut by_date: BTreeMap<_, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    for p in trend {
        by_date
            .entry(p.date)
            .or_default()
            .insert(p.segment_name.as_str(), p.ctor);
    }

    write!(f, "{:<12}", "Date")?;
    for name in &names {
        write!(f, "{name:>26}")?;
    }
    writeln!(f)?;
    for (date, values) in &by_date {
        write!(f, "{:<12}", date.to_string())?;
        for name in &names {
            let cell = match values.get(name) {
                Some(Some(ctor)) => percent(*ctor),
                Some(None) => "n/a".to_string(),
                None => String::new(),
            };
            write!(f, "{cell:>26}")?;
        }
        writeln!(f)?;
    }
    rule(f)
}

fn write_alerts(f: &mut impl Write, alerts: &[FatigueAlert]) -> fmt::Result {
    writeln!(f, "Fatigue & Frequency Alerts")?;
    if alerts.is_empty() {
        writeln!(f, "No fatigue alerts for the latest day.")?;
        return rule(f);
    }
    writeln!(
        f,
        "{:<12}{:<12}{:>9}{:>9}{:>15}{:>15}{:>21}",
        "Date", "Segment", "EPC_7d", "ctor_7d", "unsub_rate_7d", "fatigue_score", "oversaturation_flag"
    )?;
    for a in alerts {
        writeln!(
            f,
            "{:<12}{:<12}{:>9}{:>9}{:>15}{:>15.3}{:>21}",
            a.date.to_string(),
            a.segment_id,
            opt_ratio(a.epc_7d),
            opt_ratio(a.ctor_7d),
            opt_ratio(a.unsub_rate_7d),
            a.fatigue_score,
            a.oversaturation_flag
        )?;
    }
    rule(f)
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, self)?;
        write_kpis(f, &self.comparison)?;
        write_segments(f, &self.comparison)?;
        write_trend(f, &self.trend)?;
        write_alerts(f, &self.alerts)?;
        writeln!(f, "Executive-Ready Weekly Brief\n")?;
        f.write_str(&self.brief.markdown)?;
        if !self.brief.markdown.ends_with('\n') {
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn render_dashboard(view: &DashboardView) -> String {
    view.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use copilot_core::DailySegmentRecord;
    use copilot_metrics::rolling::build_rolling;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn dataset(unique: u64) -> Dataset {
        let mut daily = Vec::new();
        for d in 1..=14 {
            for (id, name, clicks) in [("MPE", "Owner Relations – East", 30), ("CORP", "Corporate HQ", 40)] {
                daily.push(DailySegmentRecord {
                    date: day(d),
                    segment_id: id.into(),
                    segment_name: name.into(),
                    sends: 1000,
                    opens: 300,
                    clicks,
                    unsubs: 0,
                    spam_complaints: 0,
                    unique_contacts_reached: unique,
                });
            }
        }
        let rolling = build_rolling(&daily);
        Dataset { daily, rolling }
    }

    #[test]
    fn test_dashboard_sections() {
        let view = DashboardView::build(&dataset(800), DateWindow::trailing(day(14), 7), &[]);
        let text = render_dashboard(&view);
        assert!(text.contains("Window: 2025-09-08 to 2025-09-14"));
        assert!(text.contains("Segment Performance"));
        assert!(text.contains("CTOR by Segment"));
        assert!(text.contains("No fatigue alerts for the latest day."));
        assert!(text.contains("# Eloqua Performance Brief (2025-09-08 to 2025-09-14)"));
        assert!(text.contains("+0.0%"));
        assert!(text.contains("Available segments: Corporate HQ, Owner Relations – East"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_oversaturated_data_lists_alerts() {
        let view = DashboardView::build(&dataset(100), DateWindow::trailing(day(14), 7), &[]);
        assert_eq!(view.alerts.len(), 2);
        let text = render_dashboard(&view);
        assert!(text.contains("Fatigue & Frequency Alerts"));
        assert!(text.contains("10.000"));
        assert!(!text.contains("No fatigue alerts"));
    }

    #[test]
    fn test_segment_selection_filters_alerts_and_trend() {
        let selected = vec!["Corporate HQ".to_string()];
        let view = DashboardView::build(&dataset(100), DateWindow::trailing(day(14), 7), &selected);
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.alerts[0].segment_id, "CORP");
        assert!(view.trend.iter().all(|p| p.segment_name == "Corporate HQ"));
        assert_eq!(view.comparison.segments.len(), 1);
    }

    #[test]
    fn test_unknown_segment_selection_is_empty() {
        let selected = vec!["Nobody".to_string()];
        let view = DashboardView::build(&dataset(100), DateWindow::trailing(day(14), 7), &selected);
        assert!(view.alerts.is_empty());
        let text = render_dashboard(&view);
        assert!(text.contains("No data in the selected window/segments."));
        assert!(text.contains("No data in selected window."));
    }
}
