//! Human-readable rendering of the bitmask and enum columns carried by
//! slow frames.

/// Bit names of the `flightModeFlags` column, LSB first.
pub const FLIGHT_MODE_NAMES: [&str; 10] = [
    "ANGLE_MODE",
    "HORIZON_MODE",
    "MAG",
    "BARO",
    "GPS_HOME",
    "GPS_HOLD",
    "HEADFREE",
    "AUTOTUNE",
    "PASSTHRU",
    "SONAR",
];

/// Bit names of the `stateFlags` column, LSB first.
pub const STATE_NAMES: [&str; 5] = [
    "GPS_FIX_HOME",
    "GPS_FIX",
    "CALIBRATE_MAG",
    "SMALL_ANGLE",
    "FIXED_WING",
];

/// Values of the `failsafePhase` column.
pub const FAILSAFE_PHASE_NAMES: [&str; 4] = ["IDLE", "RX_LOSS_DETECTED", "LANDING", "LANDED"];

/// Render a bitmask as its named bits joined with `|`. Unnamed bits
/// are ignored; a value with no named bit set renders as the plain
/// number.
fn render_bitmask(value: i32, names: &[&str]) -> String {
    let bits = value as u32;
    let set: Vec<&str> = names
        .iter()
        .enumerate()
        .filter(|(i, _)| bits & (1 << i) != 0)
        .map(|(_, name)| *name)
        .collect();
    if set.is_empty() {
        value.to_string()
    } else {
        set.join("|")
    }
}

/// Render an enumeration value by name, falling back to the plain
/// number for out-of-range values.
fn render_enumeration(value: i32, names: &[&str]) -> String {
    usize::try_from(value)
        .ok()
        .and_then(|index| names.get(index))
        .map_or_else(|| value.to_string(), |name| (*name).to_string())
}

/// Render one slow-frame cell. Columns without special handling come
/// back as the plain number.
pub fn render_slow_cell(column: &str, value: i32) -> String {
    match column {
        "flightModeFlags" => render_bitmask(value, &FLIGHT_MODE_NAMES),
        "stateFlags" => render_bitmask(value, &STATE_NAMES),
        "failsafePhase" => render_enumeration(value, &FAILSAFE_PHASE_NAMES),
        _ => value.to_string(),
    }
}
