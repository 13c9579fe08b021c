//! Transport implementations for the load-cell monitor.
//!
//! `SerialTransport` wraps a real serial port; `SimulatedTransport` emits a
//! deterministic synthetic stream in the same line protocol so the rest of
//! the stack can run without a device attached.
pub mod error;

use crate::error::HwError;
use loadcell_traits::Transport;
use std::io::Read;
use std::time::Duration;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Pop one complete line (through the first `\n`) off the pending buffer.
/// Invalid byte sequences are replaced, never fatal.
fn take_line(pending: &mut Vec<u8>) -> Option<String> {
    let pos = pending.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = pending.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line).into_owned())
}

/// Line transport over a physical serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    pending: Vec<u8>,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud: u32, timeout: Duration) -> error::Result<Self> {
        let port = serialport::new(port_name, baud)
            .timeout(timeout)
            .open()
            .map_err(|e| HwError::Open(format!("{port_name}: {e}")))?;
        tracing::debug!(port = port_name, baud, "serial port opened");
        Ok(Self {
            port,
            pending: Vec::new(),
        })
    }

    /// Names of serial ports currently present on the system.
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }
}

impl Transport for SerialTransport {
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, BoxedError> {
        // A line left over from a previous chunk is served before touching the port.
        if let Some(line) = take_line(&mut self.pending) {
            return Ok(Some(line));
        }

        self.port
            .set_timeout(timeout)
            .map_err(|e| Box::new(HwError::Config(e.to_string())) as BoxedError)?;

        let mut chunk = [0u8; 256];
        match self.port.read(&mut chunk) {
            Ok(0) => {
                tracing::error!("serial port returned EOF");
                Err(Box::new(HwError::Disconnected))
            }
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                Ok(take_line(&mut self.pending))
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => {
                tracing::error!(error = %e, "serial read failed");
                Err(Box::new(HwError::Io(e)))
            }
        }
    }
}

/// Simulated device: one header line, then a paced ramp with a small
/// deterministic wobble per channel. Useful for demos and self-checks.
pub struct SimulatedTransport {
    channel_count: usize,
    interval: Duration,
    tick: u64,
}

impl SimulatedTransport {
    pub fn new(channel_count: usize) -> Self {
        Self::with_interval(channel_count, Duration::from_millis(10))
    }

    pub fn with_interval(channel_count: usize, interval: Duration) -> Self {
        Self {
            channel_count: channel_count.max(1),
            interval,
            tick: 0,
        }
    }

    fn synth_line(&self) -> String {
        let t_ms = self.tick * 10;
        let mut line = format!("{t_ms}");
        for ch in 0..self.channel_count {
            let base = 100_000.0 + (ch as f64) * 10_000.0;
            let ramp = (self.tick as f64) * 2.0;
            let wobble = ((self.tick as f64) * 0.37 + ch as f64).sin() * 25.0;
            let counts = (base + ramp + wobble).round();
            line.push(',');
            line.push_str(&format!("{counts:.0}"));
        }
        line.push('\n');
        line
    }
}

impl Transport for SimulatedTransport {
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, BoxedError> {
        std::thread::sleep(self.interval.min(timeout));
        if self.tick == 0 {
            self.tick = 1;
            let mut header = String::from("millis");
            for ch in 0..self.channel_count {
                header.push_str(&format!(",raw_ch{}", ch + 1));
            }
            header.push('\n');
            return Ok(Some(header));
        }
        let line = self.synth_line();
        self.tick += 1;
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_stream_starts_with_header() {
        let mut sim = SimulatedTransport::with_interval(2, Duration::from_millis(0));
        let header = sim.read_line(Duration::from_millis(1)).unwrap().unwrap();
        assert!(header.starts_with("millis"));
    }

    #[test]
    fn simulated_lines_have_expected_arity() {
        let mut sim = SimulatedTransport::with_interval(4, Duration::from_millis(0));
        let _ = sim.read_line(Duration::from_millis(1)).unwrap(); // header
        let line = sim.read_line(Duration::from_millis(1)).unwrap().unwrap();
        let fields: Vec<&str> = line.trim().split(',').collect();
        assert_eq!(fields.len(), 5);
        for f in fields {
            f.parse::<f64>().unwrap();
        }
    }

    #[test]
    fn take_line_splits_and_preserves_remainder() {
        let mut pending = b"12,34\n56,".to_vec();
        let line = take_line(&mut pending).unwrap();
        assert_eq!(line, "12,34\n");
        assert_eq!(pending, b"56,");
        assert!(take_line(&mut pending).is_none());
    }
}
