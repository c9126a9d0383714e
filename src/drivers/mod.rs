//! Peripheral drivers, hardware initialisation, and pin helpers.

pub mod bh1750;
pub mod button;
pub mod hw_init;
pub mod hx711;
pub mod lcd;
pub mod relay;
pub mod sht3x;
pub mod status_led;
