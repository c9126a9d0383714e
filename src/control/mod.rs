//! Actuator control.

pub mod automation;
