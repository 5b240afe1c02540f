// src/watch/debounce.rs

//! Coalescing gate between raw change events and rebuild triggers.
//!
//! A single save in most editors produces a burst of notifications (write,
//! rename, chmod, ...). The gate lets the first event of a burst through and
//! suppresses every following event that arrives within `window` of the last
//! accepted one. Once the window has elapsed the gate is armed again, so a
//! second deliberate edit is picked up right away.

use std::time::{Duration, Instant};

/// Window used when the configuration does not set one.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(1);

/// Returns true if an event observed at `now` may trigger a rebuild.
///
/// The caller is responsible for recording `now` as the new last trigger
/// when this returns true.
pub fn should_trigger(now: Instant, last_trigger: Option<Instant>, window: Duration) -> bool {
    match last_trigger {
        None => true,
        Some(last) => now.saturating_duration_since(last) >= window,
    }
}

/// Debounce state owned by one orchestrator.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    /// Check the gate for an event observed at `now`, re-arming it on success.
    pub fn admit(&mut self, now: Instant) -> bool {
        if should_trigger(now, self.last_trigger, self.window) {
            self.last_trigger = Some(now);
            true
        } else {
            false
        }
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

/// Parse a duration string like `"500us"`, `"250ms"`, `"3s"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let seconds = |per_unit: u64| {
        value
            .checked_mul(per_unit)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{}' is too large", s))
    };

    match unit.as_str() {
        "us" | "µs" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => seconds(60),
        "h" => seconds(60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected us, ms, s, m, or h",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_event_always_passes() {
        let mut gate = DebounceGate::new(Duration::from_millis(5));
        assert!(gate.admit(Instant::now()));
    }

    #[test]
    fn burst_inside_window_is_collapsed() {
        let t0 = Instant::now();
        let mut gate = DebounceGate::new(Duration::from_millis(5));

        assert!(gate.admit(t0));
        assert!(!gate.admit(t0 + Duration::from_millis(1)));
        assert!(!gate.admit(t0 + Duration::from_millis(4)));
        assert_eq!(gate.last_trigger(), Some(t0));
    }

    #[test]
    fn gate_rearms_exactly_at_window_boundary() {
        let t0 = Instant::now();
        let mut gate = DebounceGate::new(Duration::from_millis(5));

        assert!(gate.admit(t0));
        assert!(gate.admit(t0 + Duration::from_millis(5)));
        assert_eq!(gate.last_trigger(), Some(t0 + Duration::from_millis(5)));
    }

    #[test]
    fn suppressed_events_do_not_extend_the_window() {
        let t0 = Instant::now();
        let mut gate = DebounceGate::new(Duration::from_millis(5));

        assert!(gate.admit(t0));
        assert!(!gate.admit(t0 + Duration::from_millis(3)));
        // 6ms after the accepted event, 3ms after the suppressed one.
        assert!(gate.admit(t0 + Duration::from_millis(6)));
    }

    #[test]
    fn out_of_order_timestamps_are_suppressed() {
        let t0 = Instant::now() + Duration::from_secs(1);
        assert!(!should_trigger(
            t0 - Duration::from_millis(10),
            Some(t0),
            Duration::from_millis(1)
        ));
    }

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("200us"), Ok(Duration::from_micros(200)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5 fortnights").is_err());
    }

    #[test]
    fn huge_values_are_rejected_instead_of_wrapping() {
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("5124095576030432h").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
    }
}
