//! Weekly executive brief — a fixed Markdown template over window aggregates.

use copilot_core::DateWindow;
use copilot_metrics::aggregate::SegmentPerformance;
use copilot_metrics::WindowComparison;

pub const EMPTY_BRIEF: &str = "# Brief\nNo data in selected window.";

const FATIGUE_GUIDANCE: &str =
    "Review latest-day alerts above. Throttle where EPC-7d > 4 and CTOR-7d breaks below baseline.";

const NEXT_BEST_TESTS: [&str; 3] = [
    "Subject: Verb-led, 5–7 words vs urgency phrase",
    "CTA: “Review & Confirm” vs “Confirm Now”",
    "Send-time: 09:30 vs 13:00",
];

/// The rendered brief together with the window it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct BriefDocument {
    pub window: DateWindow,
    pub markdown: String,
}

/// `0.1234` -> `12.34%`
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// `0.01` -> `+1.00%`
pub fn signed_percent(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

fn segment_line(label: &str, segment: Option<&SegmentPerformance>) -> String {
    let (name, ctor) = segment
        .map(|s| (s.segment_name.as_str(), s.ctor))
        .unwrap_or(("N/A", 0.0));
    format!("- {label}: **{name}** (CTOR {})", percent(ctor))
}

pub fn compose_brief(cmp: &WindowComparison) -> BriefDocument {
    if cmp.is_empty() {
        return BriefDocument {
            window: cmp.window,
            markdown: EMPTY_BRIEF.to_string(),
        };
    }

    let mut lines = vec![
        format!(
            "# Eloqua Performance Brief ({} to {})",
            cmp.window.start, cmp.window.end
        ),
        String::new(),
        "**Headlines**".to_string(),
        format!(
            "- Overall CTOR: {} (Δ vs prior window: {})",
            percent(cmp.current.ctor),
            signed_percent(cmp.ctor_delta())
        ),
        segment_line("Top segment", cmp.top_segment()),
        segment_line("Lagging segment", cmp.lagging_segment()),
        String::new(),
        "**Fatigue & Risk**".to_string(),
        format!("- {FATIGUE_GUIDANCE}"),
        String::new(),
        "**Next Best Tests**".to_string(),
    ];
    lines.extend(NEXT_BEST_TESTS.iter().map(|t| format!("- {t}")));

    let mut markdown = lines.join("\n");
    markdown.push('\n');

    BriefDocument {
        window: cmp.window,
        markdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use copilot_core::DailySegmentRecord;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn rec(name: &str, d: u32, opens: u64, clicks: u64) -> DailySegmentRecord {
        DailySegmentRecord {
            date: day(d),
            segment_id: name.into(),
            segment_name: name.into(),
            sends: 1000,
            opens,
            clicks,
            unsubs: 0,
            spam_complaints: 0,
            unique_contacts_reached: 800,
        }
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.1234), "12.34%");
        assert_eq!(signed_percent(0.01), "+1.00%");
        assert_eq!(signed_percent(-0.005), "-0.50%");
    }

    #[test]
    fn test_full_brief() {
        let rows = vec![
            rec("Corporate HQ", 1, 100, 10),
            rec("Corporate HQ", 8, 100, 20),
            rec("Owner Relations – East", 8, 100, 10),
        ];
        let window = DateWindow::trailing(day(8), 7);
        let brief = compose_brief(&WindowComparison::compute(&rows, window, &[]));
        let md = &brief.markdown;

        assert!(md.starts_with("# Eloqua Performance Brief (2025-09-02 to 2025-09-08)\n"));
        assert!(md.contains("- Overall CTOR: 15.00% (Δ vs prior window: +5.00%)"));
        assert!(md.contains("- Top segment: **Corporate HQ** (CTOR 20.00%)"));
        assert!(md.contains("- Lagging segment: **Owner Relations – East** (CTOR 10.00%)"));
        assert!(md.contains("**Fatigue & Risk**"));
        assert!(md.contains("- Send-time: 09:30 vs 13:00"));
        assert_eq!(brief.window, window);
    }

    #[test]
    fn test_delta_without_prior_data_counts_prior_as_zero() {
        let rows = vec![rec("Corporate HQ", 8, 100, 20)];
        let brief = compose_brief(&WindowComparison::compute(
            &rows,
            DateWindow::trailing(day(8), 7),
            &[],
        ));
        assert!(brief.markdown.contains("(Δ vs prior window: +20.00%)"));
    }

    #[test]
    fn test_empty_window_brief() {
        let rows = vec![rec("Corporate HQ", 1, 100, 10)];
        let brief = compose_brief(&WindowComparison::compute(
            &rows,
            DateWindow::trailing(day(20), 7),
            &[],
        ));
        assert_eq!(brief.markdown, EMPTY_BRIEF);
    }

    #[test]
    fn test_brief_is_deterministic() {
        let rows = vec![rec("Corporate HQ", 8, 100, 20)];
        let cmp = WindowComparison::compute(&rows, DateWindow::trailing(day(8), 7), &[]);
        assert_eq!(compose_brief(&cmp), compose_brief(&cmp));
    }
}
