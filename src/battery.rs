/* Raw battery byte -> normalized percentage.
 *
 * Decoding never fails: firmware occasionally reports values slightly
 * outside the nominal range, so anything out of bounds is clamped
 * rather than rejected. */

use crate::profile::BatteryRange;

/* Map a raw battery byte to 0..=100 under the given range convention. */
pub fn decode(raw: u8, range: BatteryRange) -> u8 {
    let percent = match range {
        BatteryRange::Fractional => f64::from(raw) / 4.0 * 100.0,
        BatteryRange::Offset100 => (f64::from(raw) - 100.0) / 65.0 * 100.0,
        BatteryRange::Direct => f64::from(raw),
    };
    percent.round().clamp(0.0, 100.0) as u8
}
