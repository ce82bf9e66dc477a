//! Shift-time parsing and the time-of-day traffic buffer (§4.2, §4.9).

use crate::models::profile::Tunables;

#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    #[error("malformed HHMM time string: {0}")]
    MalformedHhmm(String),
}

/// Parses an `HHMM` string (e.g. "0930") into `(hour, minute)`.
pub fn parse_hhmm(value: &str) -> Result<(u32, u32), TimeError> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimeError::MalformedHhmm(value.to_string()));
    }
    let hour: u32 = value[0..2].parse().map_err(|_| TimeError::MalformedHhmm(value.to_string()))?;
    let minute: u32 = value[2..4].parse().map_err(|_| TimeError::MalformedHhmm(value.to_string()))?;
    if hour > 23 || minute > 59 {
        return Err(TimeError::MalformedHhmm(value.to_string()));
    }
    Ok((hour, minute))
}

pub fn decimal_hour(hour: u32, minute: u32) -> f64 {
    hour as f64 + (minute as f64) / 60.0
}

/// Seconds since midnight for an `HHMM` string.
pub fn hhmm_to_seconds(value: &str) -> Result<i64, TimeError> {
    let (h, m) = parse_hhmm(value)?;
    Ok((h as i64) * 3600 + (m as i64) * 60)
}

/// The piecewise time-of-day traffic buffer (§4.2): 07:00–10:00 → 0.60,
/// 10:00–16:00 → 0.40, 16:00–20:00 → 0.60, else the profile default (0.40).
pub fn traffic_buffer(shift_decimal_hour: f64, tunables: &Tunables) -> f64 {
    for band in &tunables.traffic_buffer_bands {
        if shift_decimal_hour >= band.start_hour && shift_decimal_hour < band.end_hour {
            return band.buffer;
        }
    }
    tunables.traffic_buffer_default
}

/// Applies the traffic buffer to a raw duration, optionally capped (§4.9: ETA
/// synthesis caps the buffer at 0.40, i.e. a 1.40x multiplier ceiling).
pub fn buffered_duration(raw_duration_s: f64, shift_decimal_hour: f64, tunables: &Tunables, cap: Option<f64>) -> f64 {
    let buffer = traffic_buffer(shift_decimal_hour, tunables);
    let effective = match cap {
        Some(c) => buffer.min(c),
        None => buffer,
    };
    raw_duration_s * (1.0 + effective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_hhmm() {
        assert_eq!(parse_hhmm("0930").unwrap(), (9, 30));
        assert_eq!(parse_hhmm("2359").unwrap(), (23, 59));
    }

    #[test]
    fn rejects_malformed_hhmm() {
        assert!(parse_hhmm("93:0").is_err());
        assert!(parse_hhmm("2460").is_err());
        assert!(parse_hhmm("abcd").is_err());
    }

    #[test]
    fn buffer_bands_match_spec() {
        let tunables = Tunables::default();
        assert_eq!(traffic_buffer(8.0, &tunables), 0.60);
        assert_eq!(traffic_buffer(12.0, &tunables), 0.40);
        assert_eq!(traffic_buffer(18.0, &tunables), 0.60);
        assert_eq!(traffic_buffer(22.0, &tunables), 0.40);
    }

    #[test]
    fn eta_cap_limits_multiplier() {
        let tunables = Tunables::default();
        let buffered = buffered_duration(100.0, 8.0, &tunables, Some(tunables.eta_buffer_cap));
        assert!((buffered - 140.0).abs() < 1e-9);
    }
}
