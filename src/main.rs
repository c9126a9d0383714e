//! CoopWatch Firmware: Main Entry Point
//!
//! Single-threaded cooperative loop; the only concurrency is the flow
//! pulse interrupt, which bumps an atomic counter.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              LogEventSink    MonotonicClock   │
//! │  (buttons · HX711 · ADC ·     (EventSink)     (ClockPort)      │
//! │   BH1750 · SHT3x · relays ·                                    │
//! │   LED · two LCDs)                                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Menu · Sampler · Automation · Presenter · Telemetry   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Flow ISR ──▶ PulseAccumulator (atomic)                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use coopwatch::adapters::hardware::HardwareAdapter;
use coopwatch::adapters::log_sink::LogEventSink;
use coopwatch::adapters::time::MonotonicClock;
use coopwatch::app::ports::ClockPort;
use coopwatch::app::service::{AppService, VERSION};
use coopwatch::config::SystemConfig;
use coopwatch::drivers::bh1750::Bh1750;
use coopwatch::drivers::button::ButtonPins;
use coopwatch::drivers::hw_init::{self, SysPin};
use coopwatch::drivers::hx711::Hx711;
use coopwatch::drivers::lcd::{CharLcd, DualDisplay};
use coopwatch::drivers::relay::RelayOutputs;
use coopwatch::drivers::sht3x::Sht3x;
use coopwatch::drivers::status_led::BicolorLed;
use coopwatch::error::{Error, SensorError};
use coopwatch::pins;
use coopwatch::sensors::environment::EnvironmentSensors;
use coopwatch::sensors::flow::FLOW_PULSES;

fn adc_channel(channel: u32) -> impl FnMut() -> coopwatch::error::Result<u16> {
    move || hw_init::adc1_read(channel).ok_or(Error::Sensor(SensorError::BusFault))
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CoopWatch v{}                       ║", VERSION);
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate()?;

    // ── 2. Raw peripherals (ADC, GPIO, flow ISR) ──────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without GPIO and ADC there is nothing to run; halt until the
        // task watchdog resets the chip.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, flow will read zero", e);
    }

    // ── 3. Shared I2C bus ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_cfg,
    )?;
    let bus = RefCell::new(i2c);

    // ── 4. Drivers ────────────────────────────────────────────
    let clock = MonotonicClock::new();

    // The light sensor's first conversion runs while the scale tares.
    let mut light = Bh1750::new(RefCellDevice::new(&bus), pins::BH1750_ADDR, &clock);
    if let Err(e) = light.start() {
        warn!("light sensor start failed: {}, retrying on first read", e);
    }

    let displays = DualDisplay {
        primary: CharLcd::new(RefCellDevice::new(&bus), FreeRtos, pins::LCD_PRIMARY_ADDR),
        secondary: CharLcd::new(RefCellDevice::new(&bus), FreeRtos, pins::LCD_SECONDARY_ADDR),
    };

    let environment = EnvironmentSensors::new(
        adc_channel(hw_init::ADC1_CH_GAS),
        adc_channel(hw_init::ADC1_CH_SOUND),
        light,
        Sht3x::new(RefCellDevice::new(&bus), FreeRtos, pins::SHT3X_ADDR),
    );

    let scale = Hx711::new(
        SysPin::new(pins::HX711_DOUT_GPIO),
        SysPin::new(pins::HX711_SCK_GPIO),
        Ets,
    )?;

    let mut hw = HardwareAdapter {
        buttons: ButtonPins::new(
            SysPin::new(pins::BUTTON_UP_GPIO),
            SysPin::new(pins::BUTTON_DOWN_GPIO),
            SysPin::new(pins::BUTTON_SELECT_GPIO),
            SysPin::new(pins::BUTTON_BACK_GPIO),
        ),
        scale,
        environment,
        relays: RelayOutputs::new(
            SysPin::new(pins::RELAY_EXHAUST_GPIO),
            SysPin::new(pins::RELAY_CURTAIN_GPIO),
        )?,
        indicator: BicolorLed::new(
            SysPin::new(pins::LED_RED_GPIO),
            SysPin::new(pins::LED_GREEN_GPIO),
        ),
        displays,
    };

    let mut log_sink = LogEventSink::new();
    let loop_delay_ms = config.loop_delay_ms;

    // ── 5. Startup tare ───────────────────────────────────────
    let mut app = AppService::new(config, &FLOW_PULSES);
    app.startup(&mut hw, &clock, &mut FreeRtos, &mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        app.cycle(clock.now_ms(), &mut hw, &mut log_sink);
        FreeRtos::delay_ms(loop_delay_ms);
    }
}
