//! Synthetic per-segment daily counters for demos and first runs.

use crate::rolling::build_rolling;
use crate::store::DataStore;
use chrono::{Duration, NaiveDate};
use copilot_core::{CopilotResult, DailySegmentRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// The fixed segments that example data is generated for.
pub const EXAMPLE_SEGMENTS: [(&str, &str); 3] = [
    ("MPE", "Owner Relations – East"),
    ("MPW", "Owner Relations – West"),
    ("CORP", "Corporate HQ"),
];

/// Generation parameters for example data.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    /// Last day of generated data.
    pub anchor: NaiveDate,
    pub days: u32,
    pub seed: u64,
}

/// Produce one record per (day, segment) for `spec.days` days ending at
/// `spec.anchor`, in date order. Deterministic for a given seed.
pub fn generate_daily_records(spec: &SyntheticSpec) -> Vec<DailySegmentRecord> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut rows = Vec::with_capacity(spec.days as usize * EXAMPLE_SEGMENTS.len());

    for offset in (0..i64::from(spec.days)).rev() {
        let date = spec.anchor - Duration::days(offset);
        for (segment_id, segment_name) in EXAMPLE_SEGMENTS {
            let sends: u64 = rng.gen_range(600..1400);
            let opens = (sends as f64 * rng.gen_range(0.25..0.40)) as u64;
            let clicks = (opens as f64 * rng.gen_range(0.07..0.13)) as u64;
            let unsubs = rng.gen_range(0..(sends / 1500).max(1));
            let unique_contacts_reached = (sends as f64 * rng.gen_range(0.7..0.95)) as u64;
            rows.push(DailySegmentRecord {
                date,
                segment_id: segment_id.to_string(),
                segment_name: segment_name.to_string(),
                sends,
                opens,
                clicks,
                unsubs,
                spam_complaints: 0,
                unique_contacts_reached,
            });
        }
    }

    rows
}

/// Write both example CSV files unless they already exist.
/// Returns `true` when new data was generated.
pub fn ensure_example_data(store: &DataStore, spec: &SyntheticSpec) -> CopilotResult<bool> {
    if store.daily_path().exists() && store.rolling_path().exists() {
        return Ok(false);
    }
    write_example_data(store, spec)?;
    Ok(true)
}

/// Unconditionally (re)generate both CSV files.
pub fn write_example_data(store: &DataStore, spec: &SyntheticSpec) -> CopilotResult<()> {
    let daily = generate_daily_records(spec);
    let rolling = build_rolling(&daily);
    store.write_daily(&daily)?;
    store.write_rolling(&rolling)?;
    info!(
        dir = %store.dir().display(),
        rows = daily.len(),
        anchor = %spec.anchor,
        seed = spec.seed,
        "Generated synthetic example data"
    );
    Ok(())
}
