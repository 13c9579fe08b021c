//! Device line protocol parsing.

/// One parsed device line: an advisory device timestamp plus one raw
/// reading per channel. Transient; only relayed, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Device-side milliseconds. Diagnostic only; buffering uses local
    /// receipt time.
    pub device_time_ms: f64,
    pub channels: Vec<f64>,
}

/// Parse one decoded text line of `<device_time_ms>,<raw_1>,...,<raw_N>`.
///
/// Returns `None` for empty lines, header lines (first field literally
/// `millis`), wrong field arity, or any field that fails numeric parse.
/// Malformed lines are skipped silently; reduced throughput is the only
/// observable effect.
pub fn parse_line(line: &str, channel_count: usize) -> Option<RawSample> {
    let line = line.trim();
    if line.is_empty() || !line.contains(',') {
        return None;
    }
    let fields: Vec<&str> = line.split(',').collect();
    if fields[0].trim() == "millis" {
        return None;
    }
    if fields.len() != channel_count + 1 {
        tracing::trace!(
            got = fields.len(),
            want = channel_count + 1,
            "line arity mismatch"
        );
        return None;
    }
    let device_time_ms: f64 = fields[0].trim().parse().ok()?;
    let mut channels = Vec::with_capacity(channel_count);
    for field in &fields[1..] {
        channels.push(field.trim().parse::<f64>().ok()?);
    }
    Some(RawSample {
        device_time_ms,
        channels,
    })
}
