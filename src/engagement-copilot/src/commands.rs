//! Command implementations behind the CLI. Each returns what it rendered or
//! wrote so `main` only handles printing.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use copilot_core::config::AppConfig;
use copilot_core::DateWindow;
use copilot_metrics::aggregate::latest_date;
use copilot_metrics::synthetic::{ensure_example_data, write_example_data, SyntheticSpec};
use copilot_metrics::{DataStore, Dataset, WindowComparison};
use copilot_reporting::{compose_brief, export_brief, render_dashboard, DashboardView, ExportFormat};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// First day of the window (defaults to a trailing week)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the window (defaults to the latest date in the data)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Segment name to include; repeat for several. Omit for all segments.
    #[arg(long = "segment")]
    pub segments: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    Md,
    Pdf,
    Pptx,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Md => vec![ExportFormat::Markdown],
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::Pptx => vec![ExportFormat::Slides],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}

/// Overrides for the `generate` command; unset fields fall back to config.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateArgs {
    pub force: bool,
    pub seed: Option<u64>,
    pub days: Option<u32>,
    pub anchor: Option<NaiveDate>,
}

pub fn synthetic_spec(config: &AppConfig) -> SyntheticSpec {
    SyntheticSpec {
        anchor: config.data.anchor_date,
        days: config.data.days,
        seed: config.data.seed,
    }
}

/// Load both tables, generating example data first if either file is missing.
pub fn load_or_generate(config: &AppConfig) -> anyhow::Result<Dataset> {
    let store = DataStore::new(config.data.dir.clone());
    if ensure_example_data(&store, &synthetic_spec(config))? {
        warn!(dir = %store.dir().display(), "Input files missing; using synthetic example data");
    }
    Ok(store.load()?)
}

/// Resolve the requested window against the data: the end defaults to the
/// latest day and the start to `window_days` before it.
pub fn resolve_window(args: &WindowArgs, data: &Dataset, window_days: u32) -> anyhow::Result<DateWindow> {
    let end = match args.end {
        Some(end) => end,
        None => latest_date(&data.daily).context("no daily engagement records to report on")?,
    };
    let start = args
        .start
        .unwrap_or(DateWindow::trailing(end, window_days).start);
    Ok(DateWindow::new(start, end)?)
}

fn comparison(config: &AppConfig, args: &WindowArgs) -> anyhow::Result<WindowComparison> {
    let data = load_or_generate(config)?;
    let window = resolve_window(args, &data, config.brief.window_days)?;
    Ok(WindowComparison::compute(&data.daily, window, &args.segments))
}

pub fn dashboard(config: &AppConfig, args: &WindowArgs) -> anyhow::Result<String> {
    let data = load_or_generate(config)?;
    let window = resolve_window(args, &data, config.brief.window_days)?;
    let view = DashboardView::build(&data, window, &args.segments);
    Ok(render_dashboard(&view))
}

pub fn brief(config: &AppConfig, args: &WindowArgs) -> anyhow::Result<String> {
    Ok(compose_brief(&comparison(config, args)?).markdown)
}

/// Write the brief in each requested format under `out`. Returns the written paths.
pub fn export(
    config: &AppConfig,
    args: &WindowArgs,
    format: FormatArg,
    out: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let brief = compose_brief(&comparison(config, args)?);

    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let mut written = Vec::new();
    for format in format.formats() {
        let document = export_brief(&brief, format)?;
        let path = out.join(document.file_name);
        std::fs::write(&path, &document.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), size = document.bytes.len(), "Brief exported");
        written.push(path);
    }
    Ok(written)
}

/// Write example data. Returns `false` when files were present and `force` was not set.
pub fn generate(config: &AppConfig, args: GenerateArgs) -> anyhow::Result<bool> {
    let defaults = synthetic_spec(config);
    let spec = SyntheticSpec {
        seed: args.seed.unwrap_or(defaults.seed),
        days: args.days.unwrap_or(defaults.days),
        anchor: args.anchor.unwrap_or(defaults.anchor),
    };

    let store = DataStore::new(config.data.dir.clone());
    if args.force {
        write_example_data(&store, &spec)?;
        return Ok(true);
    }
    let generated = ensure_example_data(&store, &spec)?;
    if !generated {
        info!(dir = %store.dir().display(), "Data files already present; use --force to overwrite");
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::CopilotError;
    use copilot_metrics::store::{DAILY_FILE, ROLLING_FILE};
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn scratch() -> (TempDir, AppConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data.dir = dir.path().join("example_data");
        (dir, config)
    }

    #[test]
    fn test_default_window_ends_on_latest_data_date() {
        let (_dir, config) = scratch();
        let data = load_or_generate(&config).unwrap();
        let window = resolve_window(&WindowArgs::default(), &data, 7).unwrap();
        assert_eq!(window, DateWindow::new(day(22), day(28)).unwrap());
    }

    #[test]
    fn test_explicit_bounds_are_used() {
        let (_dir, config) = scratch();
        let data = load_or_generate(&config).unwrap();
        let args = WindowArgs {
            start: Some(day(10)),
            end: Some(day(12)),
            segments: Vec::new(),
        };
        let window = resolve_window(&args, &data, 7).unwrap();
        assert_eq!(window.len_days(), 3);
    }

    #[test]
    fn test_start_after_latest_date_is_rejected() {
        let (_dir, config) = scratch();
        let data = load_or_generate(&config).unwrap();
        let args = WindowArgs {
            start: Some(day(29)),
            ..WindowArgs::default()
        };
        let err = resolve_window(&args, &data, 7).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CopilotError>(),
            Some(CopilotError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_empty_daily_table_has_no_default_window() {
        let err = resolve_window(&WindowArgs::default(), &Dataset::default(), 7).unwrap_err();
        assert!(err.to_string().contains("no daily engagement records"));
    }

    #[test]
    fn test_dashboard_and_brief_generate_missing_data() {
        let (_dir, config) = scratch();
        let text = dashboard(&config, &WindowArgs::default()).unwrap();
        assert!(config.data.dir.join(DAILY_FILE).exists());
        assert!(config.data.dir.join(ROLLING_FILE).exists());
        assert!(text.contains("Window: 2025-09-22 to 2025-09-28"));

        let (_dir, config) = scratch();
        let markdown = brief(&config, &WindowArgs::default()).unwrap();
        assert!(markdown.starts_with("# Eloqua Performance Brief (2025-09-22 to 2025-09-28)"));
    }

    #[test]
    fn test_export_all_writes_every_format() {
        let (dir, config) = scratch();
        let out = dir.path().join("out");
        let written = export(&config, &WindowArgs::default(), FormatArg::All, &out).unwrap();
        assert_eq!(written.len(), 3);
        for name in ["weekly_brief.md", "weekly_brief.pdf", "weekly_brief.pptx"] {
            let bytes = std::fs::read(out.join(name)).unwrap();
            assert!(!bytes.is_empty(), "{name} is empty");
        }
        assert!(config.data.dir.join(DAILY_FILE).exists());
    }

    #[test]
    fn test_export_single_format() {
        let (dir, config) = scratch();
        let written = export(&config, &WindowArgs::default(), FormatArg::Pdf, dir.path()).unwrap();
        assert_eq!(written, [dir.path().join("weekly_brief.pdf")]);
        assert!(!dir.path().join("weekly_brief.md").exists());
    }

    #[test]
    fn test_generate_respects_force_and_overrides() {
        let (_dir, config) = scratch();
        assert!(generate(&config, GenerateArgs::default()).unwrap());
        assert!(!generate(&config, GenerateArgs::default()).unwrap());

        let args = GenerateArgs {
            force: true,
            days: Some(3),
            anchor: Some(day(10)),
            ..GenerateArgs::default()
        };
        assert!(generate(&config, args).unwrap());
        let data = DataStore::new(config.data.dir.clone()).load().unwrap();
        assert_eq!(data.daily.len(), 9);
        assert_eq!(latest_date(&data.daily), Some(day(10)));
    }
}
