//! Recording sessions and CSV export.

use chrono::{DateTime, Local};
use std::path::Path;

/// One channel's contribution to a recorded row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedValue {
    pub raw: f64,
    pub calibrated: f64,
}

/// One recorded sample across all channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub wall_clock: DateTime<Local>,
    /// Seconds since the recording was started (not since the session
    /// origin).
    pub elapsed_s: f64,
    pub channels: Vec<RecordedValue>,
}

/// Captures incoming samples between start and stop into an exportable
/// row sequence. Rows survive `stop()` until the next `start()` or an
/// explicit clear.
#[derive(Debug, Default)]
pub struct RecordingSession {
    active: bool,
    start_time_s: Option<f64>,
    rows: Vec<Row>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin a fresh recording at `now_s`; prior rows are discarded.
    pub fn start(&mut self, now_s: f64) {
        self.active = true;
        self.start_time_s = Some(now_s);
        self.rows.clear();
    }

    /// Stop capturing. Idempotent; already-captured rows are retained.
    pub fn stop(&mut self) {
        self.active = false;
        self.start_time_s = None;
    }

    /// Append one row; a no-op while inactive.
    pub fn record(&mut self, now_s: f64, wall_clock: DateTime<Local>, channels: Vec<RecordedValue>) {
        if !self.active {
            return;
        }
        let Some(start) = self.start_time_s else {
            return;
        };
        self.rows.push(Row {
            wall_clock,
            elapsed_s: now_s - start,
            channels,
        });
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Discard captured rows without touching the active flag.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Write all rows as CSV. Header is the single-channel form for one
    /// channel, the `Raw_CHn`/`Calibrated_CHn_g` form otherwise; the wall
    /// clock is local time at millisecond precision.
    pub fn write_csv<W: std::io::Write>(&self, out: W, channel_count: usize) -> eyre::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);

        let mut header = vec!["Windows_Timestamp".to_string(), "Recording_Time_s".to_string()];
        if channel_count <= 1 {
            header.push("Raw_Value".to_string());
            header.push("Calibrated_g".to_string());
        } else {
            for ch in 1..=channel_count {
                header.push(format!("Raw_CH{ch}"));
                header.push(format!("Calibrated_CH{ch}_g"));
            }
        }
        wtr.write_record(&header)
            .map_err(|e| eyre::eyre!("write CSV header: {e}"))?;

        for row in &self.rows {
            let mut record = vec![
                row.wall_clock.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                format!("{:.3}", row.elapsed_s),
            ];
            for v in &row.channels {
                record.push(v.raw.to_string());
                record.push(v.calibrated.to_string());
            }
            wtr.write_record(&record)
                .map_err(|e| eyre::eyre!("write CSV row: {e}"))?;
        }
        wtr.flush().map_err(|e| eyre::eyre!("flush CSV: {e}"))?;
        Ok(())
    }

    pub fn export_csv(&self, path: &Path, channel_count: usize) -> eyre::Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| eyre::eyre!("create CSV file {:?}: {}", path, e))?;
        self.write_csv(file, channel_count)
    }
}
