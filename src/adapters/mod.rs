//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                  |
//! |------------|---------------------|------------------------------|
//! | `hardware` | InputPort           | button GPIOs                 |
//! |            | ScalePort           | HX711                        |
//! |            | EnvironmentPort     | ADC1, BH1750, SHT3x          |
//! |            | RelayPort           | relay GPIOs                  |
//! |            | IndicatorPort       | bicolor LED                  |
//! |            | DisplayPort         | two HD44780 / PCF8574 panels |
//! | `log_sink` | EventSink           | serial log output            |
//! | `time`     | ClockPort           | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod time;
