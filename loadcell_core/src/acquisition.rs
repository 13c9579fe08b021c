//! Acquisition session: producer thread, shared channel state, and the
//! operator command surface.
//!
//! The producer thread owns the `Transport`, polls it for lines, parses,
//! calibrates, and appends into the per-channel series. The consumer
//! (display/CLI tick) reads committed state and issues operator commands.
//! Only the per-channel slots, the recording session, and the time origin
//! cross the boundary; each sits behind its own lock so a tare or a
//! recording toggle excludes a concurrent append without a global lock.
//!
//! Safety: each connect spawns exactly one thread that is shut down when
//! the monitor disconnects or is dropped, preventing thread leaks.

use crate::calibration::ChannelCalibration;
use crate::config::AcquisitionCfg;
use crate::conversions;
use crate::error::{AcquisitionError, Report, Result};
use crate::parse;
use crate::recording::{RecordedValue, RecordingSession, Row};
use crate::stats::{self, WindowStats};
use crate::store::{ChannelSeries, SeriesWindow};
use crossbeam_channel as xch;
use loadcell_config::{CalibrationFile, MultiChannelCalibrationFile};
use loadcell_traits::{Clock, MonotonicClock, Transport};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Link state of the acquisition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Streaming = 2,
}

/// How many of the most recent raw samples feed tare/calibrate.
pub const SETTLE_WINDOW: usize = 10;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means another thread panicked mid-append; the
    // deque contents are still structurally valid.
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct ChannelSlot {
    series: ChannelSeries,
    calibration: ChannelCalibration,
    enabled: bool,
}

struct Shared {
    channels: Vec<Mutex<ChannelSlot>>,
    recording: Mutex<RecordingSession>,
    /// Session time origin; set on the first ingested sample, cleared only
    /// by an explicit clear. Reconnecting mid-session keeps it.
    origin: Mutex<Option<Instant>>,
    state: AtomicU8,
}

impl Shared {
    fn set_state(&self, s: LinkState) {
        self.state.store(s as u8, Ordering::Relaxed);
    }

    fn state(&self) -> LinkState {
        match self.state.load(Ordering::Relaxed) {
            1 => LinkState::Connecting,
            2 => LinkState::Streaming,
            _ => LinkState::Disconnected,
        }
    }
}

struct Worker {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

/// Owner of the acquisition pipeline and the surface the display layer
/// talks to. All commands are synchronous and non-blocking beyond brief
/// per-channel lock holds.
pub struct Monitor {
    shared: Arc<Shared>,
    clock: Arc<dyn Clock + Send + Sync>,
    channel_count: usize,
    poll: Duration,
    read_timeout: Duration,
    worker: Option<Worker>,
    err_tx: xch::Sender<AcquisitionError>,
    err_rx: xch::Receiver<AcquisitionError>,
}

impl Monitor {
    pub fn new(cfg: &AcquisitionCfg) -> Self {
        Self::with_clock(cfg, Arc::new(MonotonicClock::new()))
    }

    /// Provide a custom clock implementation; defaults to MonotonicClock.
    pub fn with_clock(cfg: &AcquisitionCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let channel_count = cfg.channel_count.max(1);
        let channels = (0..channel_count)
            .map(|_| {
                Mutex::new(ChannelSlot {
                    series: ChannelSeries::new(cfg.capacity),
                    calibration: ChannelCalibration::new(),
                    enabled: true,
                })
            })
            .collect();
        let (err_tx, err_rx) = xch::bounded(1);
        Self {
            shared: Arc::new(Shared {
                channels,
                recording: Mutex::new(RecordingSession::new()),
                origin: Mutex::new(None),
                state: AtomicU8::new(LinkState::Disconnected as u8),
            }),
            clock,
            channel_count,
            poll: Duration::from_millis(cfg.poll_ms.max(1)),
            read_timeout: Duration::from_millis(cfg.read_timeout_ms.max(1)),
            worker: None,
            err_tx,
            err_rx,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    /// Spawn the producer thread around `transport`. Fails if already
    /// connected; open the transport first and hand it over here.
    pub fn connect(&mut self, transport: Box<dyn Transport + Send>) -> Result<()> {
        if self.worker.is_some() {
            return Err(Report::new(AcquisitionError::State(
                "already connected".into(),
            )));
        }
        self.shared.set_state(LinkState::Connecting);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let shared = self.shared.clone();
        let clock = self.clock.clone();
        let err_tx = self.err_tx.clone();
        let poll = self.poll;
        let read_timeout = self.read_timeout;
        let channel_count = self.channel_count;
        let mut transport = transport;

        let join_handle = std::thread::spawn(move || {
            shared.set_state(LinkState::Streaming);
            tracing::debug!("acquisition thread streaming");
            loop {
                if shutdown_thread.load(Ordering::Relaxed) {
                    tracing::debug!("acquisition thread received shutdown signal");
                    break;
                }
                match transport.read_line(read_timeout) {
                    Ok(Some(line)) => {
                        ingest_line(&shared, clock.as_ref(), &line, channel_count);
                    }
                    Ok(None) => {
                        // Quiet poll; re-check shutdown before sleeping so
                        // disconnect is observed within one poll cycle.
                        if shutdown_thread.load(Ordering::Relaxed) {
                            break;
                        }
                        clock.sleep(poll);
                    }
                    Err(e) => {
                        let mapped = map_transport_error_dyn(&*e);
                        tracing::error!(error = %mapped, "transport failed, disconnecting");
                        let _ = err_tx.try_send(mapped);
                        break;
                    }
                }
            }
            shared.set_state(LinkState::Disconnected);
            // Transport handle is released here, with the thread.
            tracing::trace!("acquisition thread exiting cleanly");
        });

        self.worker = Some(Worker {
            shutdown,
            join_handle: Some(join_handle),
        });
        Ok(())
    }

    /// Stop acquisition and release the transport. Idempotent: stopping an
    /// already stopped session is a no-op.
    pub fn disconnect(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown.store(true, Ordering::Relaxed);
            if let Some(handle) = worker.join_handle.take() {
                match handle.join() {
                    Ok(()) => tracing::trace!("acquisition thread joined"),
                    Err(e) => tracing::warn!(?e, "acquisition thread panicked during shutdown"),
                }
            }
        }
        self.shared.set_state(LinkState::Disconnected);
    }

    /// Terminal transport error of the last session, if one occurred.
    /// Consuming read; a session ends with at most one of these.
    pub fn take_error(&self) -> Option<AcquisitionError> {
        self.err_rx.try_recv().ok()
    }

    fn channel(&self, channel: usize) -> Result<&Mutex<ChannelSlot>> {
        self.shared.channels.get(channel).ok_or_else(|| {
            Report::new(AcquisitionError::State(format!(
                "channel {channel} out of range"
            )))
        })
    }

    /// Elapsed seconds on the session timeline; 0 before the first sample.
    fn current_elapsed(&self) -> f64 {
        let origin = *lock(&self.shared.origin);
        origin.map(|t0| self.clock.secs_since(t0)).unwrap_or(0.0)
    }

    // ── Calibration commands (operator side) ────────────────────────────

    /// Tare `channel` from its most recent buffered readings.
    pub fn tare(&self, channel: usize) -> Result<()> {
        let mut slot = lock(self.channel(channel)?);
        let recent = slot.series.recent_raw(SETTLE_WINDOW);
        slot.calibration.tare(&recent).map_err(Report::new)?;
        tracing::info!(
            channel,
            zero_point = slot.calibration.zero_reference(),
            "channel tared"
        );
        Ok(())
    }

    /// Calibrate `channel` against a known weight currently on the cell.
    pub fn calibrate(&self, channel: usize, known_weight: f64) -> Result<()> {
        let mut slot = lock(self.channel(channel)?);
        let recent = slot.series.recent_raw(SETTLE_WINDOW);
        slot.calibration
            .calibrate_with_weight(&recent, known_weight)
            .map_err(Report::new)?;
        tracing::info!(
            channel,
            factor = slot.calibration.factor(),
            "channel calibrated"
        );
        Ok(())
    }

    pub fn calibration(&self, channel: usize) -> Result<ChannelCalibration> {
        Ok(lock(self.channel(channel)?).calibration.clone())
    }

    /// Replace a channel's calibration wholesale (e.g. from a loaded file).
    pub fn set_calibration(&self, channel: usize, calibration: ChannelCalibration) -> Result<()> {
        lock(self.channel(channel)?).calibration = calibration;
        Ok(())
    }

    pub fn channel_enabled(&self, channel: usize) -> Result<bool> {
        Ok(lock(self.channel(channel)?).enabled)
    }

    pub fn set_channel_enabled(&self, channel: usize, enabled: bool) -> Result<()> {
        lock(self.channel(channel)?).enabled = enabled;
        Ok(())
    }

    // ── Series reads (display side) ─────────────────────────────────────

    pub fn sample_count(&self, channel: usize) -> Result<usize> {
        Ok(lock(self.channel(channel)?).series.len())
    }

    /// Trailing window of a channel's series for plotting.
    pub fn series_window(&self, channel: usize, window_s: f64) -> Result<SeriesWindow> {
        Ok(lock(self.channel(channel)?).series.window(window_s))
    }

    /// Display statistics over the trailing window; `None` when empty.
    pub fn window_stats(&self, channel: usize, window_s: f64) -> Result<Option<WindowStats>> {
        Ok(stats::window_stats(
            &lock(self.channel(channel)?).series,
            window_s,
        ))
    }

    // ── Recording commands ──────────────────────────────────────────────

    pub fn is_recording(&self) -> bool {
        lock(&self.shared.recording).is_active()
    }

    /// Start a fresh recording; prior rows are discarded.
    pub fn start_recording(&self) {
        let now = self.current_elapsed();
        lock(&self.shared.recording).start(now);
        tracing::info!(start_s = now, "recording started");
    }

    /// Stop recording, keeping captured rows for export. No-op when idle.
    pub fn stop_recording(&self) {
        lock(&self.shared.recording).stop();
        tracing::info!("recording stopped");
    }

    pub fn recorded_rows(&self) -> Vec<Row> {
        lock(&self.shared.recording).rows().to_vec()
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        lock(&self.shared.recording).export_csv(path, self.channel_count)
    }

    // ── Clearing ────────────────────────────────────────────────────────

    /// Empty all channel series and reset the session time origin.
    /// Lock order is origin → channels, same as ingestion, so a clear
    /// cannot interleave with a half-committed sample.
    pub fn clear_graph(&self) {
        let mut origin = lock(&self.shared.origin);
        for ch in &self.shared.channels {
            lock(ch).series.clear();
        }
        *origin = None;
        tracing::debug!("graph cleared, time origin reset");
    }

    /// `clear_graph` plus discarding any recorded rows.
    pub fn clear_data(&self) {
        self.clear_graph();
        lock(&self.shared.recording).clear();
        tracing::debug!("recorded data cleared");
    }

    // ── Calibration persistence ─────────────────────────────────────────

    /// Persist calibration as JSON: the flat legacy schema for a
    /// single legacy-mode channel, the nested schema otherwise.
    pub fn save_calibration(&self, path: &Path) -> Result<()> {
        let file = self.calibration_file();
        loadcell_config::save_calibration_json(path, &file)
    }

    fn calibration_file(&self) -> CalibrationFile {
        if self.channel_count == 1 {
            let slot = lock(&self.shared.channels[0]);
            if let Some(mut single) = conversions::to_single_file(&slot.calibration) {
                single.timestamp = Some(loadcell_config::timestamp_now());
                return CalibrationFile::SingleChannel(single);
            }
        }
        let mut channels = Vec::with_capacity(self.channel_count);
        let mut channel_enabled = Vec::with_capacity(self.channel_count);
        for ch in &self.shared.channels {
            let slot = lock(ch);
            channels.push(slot.calibration.to_record());
            channel_enabled.push(slot.enabled);
        }
        CalibrationFile::MultiChannel(MultiChannelCalibrationFile {
            channels,
            channel_enabled,
            timestamp: Some(loadcell_config::timestamp_now()),
        })
    }

    /// Load either persisted schema. In-memory state is untouched if the
    /// file cannot be read or parsed.
    pub fn load_calibration(&self, path: &Path) -> Result<()> {
        let file = loadcell_config::load_calibration_json(path)?;
        self.apply_calibration_file(&file);
        Ok(())
    }

    pub fn apply_calibration_file(&self, file: &CalibrationFile) {
        match file {
            CalibrationFile::MultiChannel(multi) => {
                for (i, record) in multi.channels.iter().enumerate().take(self.channel_count) {
                    let mut slot = lock(&self.shared.channels[i]);
                    slot.calibration = ChannelCalibration::from(record);
                }
                for (i, &enabled) in multi
                    .channel_enabled
                    .iter()
                    .enumerate()
                    .take(self.channel_count)
                {
                    lock(&self.shared.channels[i]).enabled = enabled;
                }
                tracing::info!(
                    channels = multi.channels.len(),
                    "multi-channel calibration loaded"
                );
            }
            CalibrationFile::SingleChannel(single) => {
                let mut slot = lock(&self.shared.channels[0]);
                slot.calibration = ChannelCalibration::from(single);
                tracing::info!(mode = single.calibration_mode, "legacy calibration loaded");
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Parse one line and commit it: per channel, calibrate and append under
/// that channel's lock, then append a recording row if a session is live.
fn ingest_line(shared: &Shared, clock: &dyn Clock, line: &str, channel_count: usize) {
    let Some(sample) = parse::parse_line(line, channel_count) else {
        return;
    };
    let now = clock.now();
    // The origin guard is held across the appends (lock order origin →
    // channels, matching clear_graph) so elapsed stays non-decreasing
    // even when a clear races the producer.
    let mut origin = lock(&shared.origin);
    let t0 = origin.get_or_insert(now);
    let elapsed_s = now.saturating_duration_since(*t0).as_secs_f64();

    let mut recorded = Vec::with_capacity(channel_count);
    for (i, &raw) in sample.channels.iter().enumerate() {
        let mut slot = lock(&shared.channels[i]);
        let calibrated = slot.calibration.weight(raw);
        slot.series.append(elapsed_s, raw, calibrated);
        recorded.push(RecordedValue { raw, calibrated });
    }

    let mut recording = lock(&shared.recording);
    if recording.is_active() {
        recording.record(elapsed_s, chrono::Local::now(), recorded);
    }
    tracing::trace!(
        elapsed_s,
        device_time_ms = sample.device_time_ms,
        "sample ingested"
    );
}

// Map any transport error to a typed AcquisitionError, with special
// handling for hardware errors.
fn map_transport_error_dyn(e: &(dyn std::error::Error + 'static)) -> AcquisitionError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<loadcell_hardware::error::HwError>() {
        use loadcell_hardware::error::HwError;
        return match hw {
            HwError::Disconnected => AcquisitionError::Disconnected,
            other => AcquisitionError::TransportFault(other.to_string()),
        };
    }
    let s = e.to_string();
    if s.to_lowercase().contains("disconnect") {
        AcquisitionError::Disconnected
    } else {
        AcquisitionError::Transport(s)
    }
}
