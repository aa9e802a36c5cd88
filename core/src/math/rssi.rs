const STRONG_DBM: i32 = -30;
const WEAK_DBM: i32 = -90;
const NEAREST: f64 = 0.5;

/// Maps a received signal strength in dBm onto the 0-100 strength scale.
/// -30 dBm and above is full strength, -90 dBm and below is zero.
pub fn rssi_to_strength(rssi_dbm: i32) -> u8 {
    if rssi_dbm >= STRONG_DBM {
        return 100;
    }
    if rssi_dbm <= WEAK_DBM {
        return 0;
    }
    let span = f64::from(STRONG_DBM - WEAK_DBM);
    (100.0 * f64::from(rssi_dbm - WEAK_DBM) / span) as u8
}

/// Log-distance approximation in radar units, kept within `[0.5, max_range]`.
pub fn rssi_to_distance(rssi_dbm: i32, max_range: f64) -> f64 {
    let exponent = f64::from(-rssi_dbm + STRONG_DBM) / 20.0;
    let distance = 10f64.powf(exponent) * 2.0;
    distance.max(NEAREST).min(max_range.max(NEAREST))
}
