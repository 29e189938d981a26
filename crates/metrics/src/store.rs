//! CSV-backed store for the daily and rolling tables.

use copilot_core::{CopilotError, CopilotResult, DailySegmentRecord, RollingWindowRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DAILY_FILE: &str = "emails_by_segment_daily.csv";
pub const ROLLING_FILE: &str = "segment_engagement_windows.csv";

/// Both tables, freshly read from disk.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub daily: Vec<DailySegmentRecord>,
    pub rolling: Vec<RollingWindowRecord>,
}

/// Location of the two CSV files. Holds no cached rows: every load is a full scan.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn daily_path(&self) -> PathBuf {
        self.dir.join(DAILY_FILE)
    }

    pub fn rolling_path(&self) -> PathBuf {
        self.dir.join(ROLLING_FILE)
    }

    pub fn load(&self) -> CopilotResult<Dataset> {
        Ok(Dataset {
            daily: self.load_daily()?,
            rolling: self.load_rolling()?,
        })
    }

    pub fn load_daily(&self) -> CopilotResult<Vec<DailySegmentRecord>> {
        read_rows(&self.daily_path())
    }

    pub fn load_rolling(&self) -> CopilotResult<Vec<RollingWindowRecord>> {
        read_rows(&self.rolling_path())
    }

    pub fn write_daily(&self, rows: &[DailySegmentRecord]) -> CopilotResult<()> {
        write_rows(&self.dir, &self.daily_path(), rows)
    }

    pub fn write_rolling(&self, rows: &[RollingWindowRecord]) -> CopilotResult<()> {
        write_rows(&self.dir, &self.rolling_path(), rows)
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> CopilotResult<Vec<T>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CopilotError::MissingData(path.to_path_buf()),
        _ => CopilotError::Io(e),
    })?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    debug!(path = %path.display(), rows = rows.len(), "Loaded CSV");
    Ok(rows)
}

fn write_rows<T: Serialize>(dir: &Path, path: &Path, rows: &[T]) -> CopilotResult<()> {
    fs::create_dir_all(dir)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
