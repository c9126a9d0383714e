//! GPIO / peripheral pin assignments for the CoopWatch main board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or bus addresses.

// ---------------------------------------------------------------------------
// Relay drivers (active HIGH = energised)
// ---------------------------------------------------------------------------

/// Relay 1: exhaust fan.
pub const RELAY_EXHAUST_GPIO: i32 = 26;
/// Relay 2: curtain motor.
pub const RELAY_CURTAIN_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Buttons (active LOW, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_UP_GPIO: i32 = 32;
pub const BUTTON_DOWN_GPIO: i32 = 33;
pub const BUTTON_SELECT_GPIO: i32 = 14;
pub const BUTTON_BACK_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Sensors: Digital / Pulse
// ---------------------------------------------------------------------------

/// Hall-effect flow sensor, interrupt on falling edge.
pub const FLOW_PULSE_GPIO: i32 = 4;

/// HX711 data-out (input).  Shared by both load cells.
pub const HX711_DOUT_GPIO: i32 = 16;
/// HX711 serial clock (output).
pub const HX711_SCK_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// MQ-series gas sensor, 12-bit raw (0 – 4095).
pub const GAS_ADC_GPIO: i32 = 36;
/// Sound level module.  Read and displayed, not used by automation.
pub const SOUND_ADC_GPIO: i32 = 39;

// ---------------------------------------------------------------------------
// Status indicator (bicolor)
// ---------------------------------------------------------------------------

pub const LED_RED_GPIO: i32 = 18;
pub const LED_GREEN_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// I²C bus
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Fast mode; every device on the bus supports 400 kHz.
pub const I2C_BAUD_HZ: u32 = 400_000;

/// Primary 16x2 display (menu), PCF8574 backpack.
pub const LCD_PRIMARY_ADDR: u8 = 0x27;
/// Secondary 16x2 display (live readings).
pub const LCD_SECONDARY_ADDR: u8 = 0x26;
/// BH1750 ambient light sensor, ADDR pin low.
pub const BH1750_ADDR: u8 = 0x23;
/// SHT3x temperature / humidity sensor, ADDR pin low.
pub const SHT3X_ADDR: u8 = 0x44;
