//! Human-readable error descriptions and stable exit codes.

use loadcell_core::{AcquisitionError, CalibrationError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::InsufficientData { got, need } => format!(
                "What happened: Not enough buffered readings to tare/calibrate ({got} of {need}).\nLikely causes: The command ran before the device streamed enough samples.\nHow to fix: Keep the connection open a moment longer, then re-issue the command."
            ),
            CalibrationError::NotTared => {
                "What happened: Calibration was requested before taring.\nLikely causes: The zero reference has not been set for this channel.\nHow to fix: Tare the empty cell first, then calibrate with the known weight.".to_string()
            }
            CalibrationError::InvalidWeight => {
                "What happened: The known weight was zero or negative.\nLikely causes: Typo in the weight value.\nHow to fix: Pass the reference weight in grams, greater than zero.".to_string()
            }
            CalibrationError::WeightChangeTooSmall { delta, need } => format!(
                "What happened: The raw reading changed by only {delta:.1} counts (need >= {need:.0}).\nLikely causes: The reference weight is not on the cell, or it is too light for this cell.\nHow to fix: Place the weight and wait for the reading to settle, or use a heavier reference."
            ),
        };
    }

    if let Some(ae) = err.downcast_ref::<AcquisitionError>() {
        return match ae {
            AcquisitionError::Disconnected => {
                "What happened: The device disconnected mid-stream.\nLikely causes: USB cable unplugged or device reset.\nHow to fix: Reconnect the device and start the monitor again.".to_string()
            }
            other => format!(
                "What happened: {other}.\nLikely causes: Wrong port/baud, or the device is held by another program.\nHow to fix: Check `loadcell ports`, the configured baud rate, and that nothing else has the port open."
            ),
        };
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {err}"
    )
}

/// Stable exit codes: calibration misuse 2, transport failures 3, other 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<CalibrationError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<AcquisitionError>().is_some() {
        return 3;
    }
    1
}
