//! Indicator symbol selection.
//!
//! Two cycling modes share one entry point:
//!
//! - while counting down normally the palette is walked exactly once
//!   over the whole duration and sticks on the last symbol near expiry,
//!   so an exhausted palette reads as "nearly out of time";
//! - in grace and overtime the palette wraps on a short fixed period,
//!   decoupled from the total duration, which reads as blinking.

use super::countdown::Status;

/// Pick the current symbol for `status` out of `palette`.
///
/// `cycle_period_secs` is the per-status period: `duration / len` for
/// [`Status::Normal`], the configured fixed period otherwise. Returns
/// `None` for an empty palette (a disabled suffix slot; prefix palettes
/// are validated non-empty at construction).
pub(crate) fn pick(
    status: Status,
    elapsed_secs: f64,
    palette: &[String],
    cycle_period_secs: f64,
) -> Option<&str> {
    if palette.is_empty() {
        return None;
    }
    let index = match status {
        Status::Normal => saturating_index(elapsed_secs, cycle_period_secs, palette.len()),
        Status::Grace | Status::Overtime => {
            wrapping_index(elapsed_secs, cycle_period_secs, palette.len())
        }
    };
    Some(palette[index].as_str())
}

/// Monotonic index: advances with elapsed time and saturates on the
/// last slot. Clamped at zero from below, since `elapsed` is negative
/// when sampled before the start instant.
fn saturating_index(elapsed_secs: f64, period_secs: f64, len: usize) -> usize {
    let phase = elapsed_secs / period_secs;
    (phase.floor().max(0.0) as usize).min(len - 1)
}

/// Wrapping index: revisits every slot forever while the status lasts.
fn wrapping_index(elapsed_secs: f64, period_secs: f64, len: usize) -> usize {
    let phase = (elapsed_secs / period_secs).round() as i64;
    phase.rem_euclid(len as i64) as usize
}
