pub mod angle;
pub mod rssi;

pub use angle::{angular_distance, normalize_angle, within_beam};
pub use rssi::{rssi_to_distance, rssi_to_strength};
