//! Wall-clock countdown with grace and overtime phases.
//!
//! The countdown is a pure function of `now`: it keeps no cursor and no
//! internal thread, so every read is independently reproducible and the
//! caller may sample it as often as it likes per tick. State changes
//! only because the sampled instant does.
//!
//! ## Phase transitions
//!
//! ```text
//! Normal -> Grace -> Overtime
//! ```
//!
//! Both transitions are derived from the fixed end instant; nothing is
//! stored when they happen.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::indicator;
use crate::config::{DisplayGranularity, OverlaySettings};
use crate::error::ConfigError;

/// Discrete countdown phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Time remaining.
    Normal,
    /// Recently expired, inside the grace window.
    Grace,
    /// Expired past the grace window.
    Overtime,
}

/// A single countdown.
///
/// `start` and `end` are fixed at construction; only `now` varies.
#[derive(Debug, Clone)]
pub struct Countdown {
    settings: OverlaySettings,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Countdown {
    /// Create a countdown beginning at `start`.
    ///
    /// Fails if the settings are unusable; no countdown exists after a
    /// validation error.
    pub fn new(settings: OverlaySettings, start: DateTime<Utc>) -> Result<Self, ConfigError> {
        settings.validate()?;
        let end = start + Duration::milliseconds((settings.duration_secs * 1000.0).round() as i64);
        Ok(Self {
            settings,
            start,
            end,
        })
    }

    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end_instant(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Seconds until expiry; negative once expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> f64 {
        (self.end - now).num_milliseconds() as f64 / 1000.0
    }

    /// Current phase. Strict comparisons: at exactly zero remaining the
    /// countdown is already in grace, at exactly `-grace_secs` it is in
    /// overtime.
    pub fn status(&self, now: DateTime<Utc>) -> Status {
        let remaining = self.remaining_secs(now);
        if remaining > 0.0 {
            Status::Normal
        } else if remaining > -self.settings.grace_secs {
            Status::Grace
        } else {
            Status::Overtime
        }
    }

    /// Elapsed seconds computed from the *rounded* remaining time.
    /// Rounding first keeps the indicator from flickering between
    /// adjacent symbols on sub-second sampling jitter.
    fn rounded_elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        self.settings.duration_secs - self.remaining_secs(now).round()
    }

    /// The prefix indicator symbol for `now`.
    pub fn indicator(&self, now: DateTime<Utc>) -> &str {
        let status = self.status(now);
        let palette = match status {
            Status::Normal => &self.settings.good_palette,
            Status::Grace => &self.settings.grace_palette,
            Status::Overtime => &self.settings.overtime_palette,
        };
        // Prefix palettes are validated non-empty at construction.
        self.symbol(status, palette, now).unwrap_or("")
    }

    /// The suffix indicator symbol for `now`, if the suffix slot is
    /// enabled for the current status.
    pub fn suffix_indicator(&self, now: DateTime<Utc>) -> Option<&str> {
        let status = self.status(now);
        let palette = match status {
            Status::Normal => &self.settings.good_suffix_palette,
            Status::Grace => &self.settings.grace_suffix_palette,
            Status::Overtime => &self.settings.overtime_suffix_palette,
        };
        self.symbol(status, palette, now)
    }

    fn symbol<'a>(
        &self,
        status: Status,
        palette: &'a [String],
        now: DateTime<Utc>,
    ) -> Option<&'a str> {
        let period = match status {
            Status::Normal => self.settings.duration_secs / palette.len().max(1) as f64,
            Status::Grace => self.settings.grace_period_secs,
            Status::Overtime => self.settings.overtime_period_secs,
        };
        indicator::pick(status, self.rounded_elapsed_secs(now), palette, period)
    }

    /// Remaining time as the primary display string: the formatted time
    /// with the indicator appended (and the suffix symbol, when that
    /// slot is configured).
    pub fn display_text(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining_secs(now);
        let time = match self.settings.display {
            DisplayGranularity::Minutes => {
                let biased = remaining + self.settings.minute_bias_secs;
                format!("{}", (biased.abs() / 60.0).floor() as i64)
            }
            DisplayGranularity::MinutesSeconds => format_mm_ss(remaining),
        };
        let mut text = format!("{}{}", time, self.indicator(now));
        if let Some(suffix) = self.suffix_indicator(now) {
            text.push_str(suffix);
        }
        text
    }

    /// Remaining time as the companion display string: plain `MM:SS`,
    /// no indicator. The slower-polling stuck surface renders this.
    pub fn companion_text(&self, now: DateTime<Utc>) -> String {
        format_mm_ss(self.remaining_secs(now))
    }
}

/// `MM:SS` of the rounded remaining magnitude; an expired countdown
/// counts up again.
fn format_mm_ss(remaining_secs: f64) -> String {
    let total = remaining_secs.round().abs() as i64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn settings() -> OverlaySettings {
        OverlaySettings {
            duration_secs: 1500.0,
            grace_secs: 300.0,
            ..OverlaySettings::default()
        }
    }

    fn at(offset_secs: i64) -> DateTime<Utc> {
        start() + Duration::seconds(offset_secs)
    }

    #[test]
    fn status_partitions_the_timeline() {
        let clock = Countdown::new(settings(), start()).unwrap();
        assert_eq!(clock.status(at(0)), Status::Normal);
        assert_eq!(clock.status(at(1499)), Status::Normal);
        // Exactly at expiry: strictly greater-than test, so grace.
        assert_eq!(clock.status(at(1500)), Status::Grace);
        assert_eq!(clock.status(at(1799)), Status::Grace);
        // Exactly at the end of grace: overtime.
        assert_eq!(clock.status(at(1800)), Status::Overtime);
        assert_eq!(clock.status(at(90_000)), Status::Overtime);
    }

    #[test]
    fn invalid_settings_abort_construction() {
        let bad = OverlaySettings {
            good_palette: Vec::new(),
            ..settings()
        };
        assert!(Countdown::new(bad, start()).is_err());
    }

    #[test]
    fn end_instant_is_fixed() {
        let clock = Countdown::new(settings(), start()).unwrap();
        assert_eq!(clock.end_instant() - clock.start_instant(), Duration::seconds(1500));
    }

    #[test]
    fn indicator_walks_good_palette_over_the_duration() {
        // 1500s over a 5-symbol palette: first symbol at 0, last
        // (saturated) at 1499, then grace takes over at 1500.
        let clock = Countdown::new(settings(), start()).unwrap();
        let palette = clock.settings().good_palette.clone();
        assert_eq!(clock.indicator(at(0)), palette[0]);
        assert_eq!(clock.indicator(at(1499)), palette[4]);
        assert_eq!(clock.status(at(1500)), Status::Grace);
        assert_eq!(clock.indicator(at(1500)), clock.settings().grace_palette[0]);
    }

    #[test]
    fn grace_indicator_cycles_with_grace_period() {
        let clock = Countdown::new(settings(), start()).unwrap();
        let palette = clock.settings().grace_palette.clone();
        // Default grace period is 4s over 3 symbols: lap length 12s.
        assert_eq!(clock.indicator(at(1500)), palette[0]);
        assert_eq!(clock.indicator(at(1504)), palette[1]);
        assert_eq!(clock.indicator(at(1508)), palette[2]);
        assert_eq!(clock.indicator(at(1512)), palette[0]);
    }

    #[test]
    fn reads_are_reproducible() {
        let clock = Countdown::new(settings(), start()).unwrap();
        let now = at(742);
        assert_eq!(clock.display_text(now), clock.display_text(now));
        assert_eq!(clock.indicator(now), clock.indicator(now));
    }

    #[test]
    fn minutes_display_is_biased() {
        let clock = Countdown::new(settings(), start()).unwrap();
        // 1495s remaining + 15s bias = 25 minutes, floor -> "25".
        let text = clock.display_text(at(5));
        assert!(text.starts_with("25"), "got {text}");
        // Without the bias 1495s would floor to 24.
    }

    #[test]
    fn minutes_seconds_display() {
        let s = OverlaySettings {
            display: DisplayGranularity::MinutesSeconds,
            ..settings()
        };
        let clock = Countdown::new(s, start()).unwrap();
        let text = clock.display_text(at(63));
        assert!(text.starts_with("23:57"), "got {text}");
    }

    #[test]
    fn companion_counts_up_after_expiry() {
        let clock = Countdown::new(settings(), start()).unwrap();
        assert_eq!(clock.companion_text(at(0)), "25:00");
        assert_eq!(clock.companion_text(at(1510)), "00:10");
    }

    #[test]
    fn suffix_slot_appends_when_configured() {
        let s = OverlaySettings {
            good_suffix_palette: vec!["*".into()],
            ..settings()
        };
        let clock = Countdown::new(s, start()).unwrap();
        assert_eq!(clock.suffix_indicator(at(0)), Some("*"));
        assert!(clock.display_text(at(0)).ends_with('*'));

        let plain = Countdown::new(settings(), start()).unwrap();
        assert_eq!(plain.suffix_indicator(at(0)), None);
    }
}
