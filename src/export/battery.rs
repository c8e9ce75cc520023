//! Battery telemetry conversion: raw ADC readings to volts, amps and
//! cumulative energy.

use crate::blackbox::Sysconfig;

/// ADC reference voltage, premultiplied by 10 (3.3V).
const ADC_VREF: f64 = 33.0;

/// Running battery state across the main frames of a log.
#[derive(Debug)]
pub struct BatteryState {
    vbat_scale: f64,
    current_offset: f64,
    current_scale: f64,
    current_amps: f64,
    energy_milliamp_hours: f64,
    last_time_us: i64,
}

impl BatteryState {
    pub fn new(sysconfig: &Sysconfig) -> Self {
        Self {
            vbat_scale: f64::from(sysconfig.vbat_scale),
            current_offset: f64::from(sysconfig.current_meter_offset),
            current_scale: f64::from(sysconfig.current_meter_scale),
            current_amps: 0.0,
            energy_milliamp_hours: 0.0,
            last_time_us: 0,
        }
    }

    /// Convert a raw `vbatLatest` reading to volts. The ADC is 12 bit
    /// and `vbatscale` is premultiplied by 100.
    pub fn vbat_volts(&self, value: i32) -> f64 {
        f64::from(value) * ADC_VREF * self.vbat_scale / 4095.0 / 100.0
    }

    /// Feed a raw `amperageLatest` reading and the frame timestamp;
    /// returns the current in amps and integrates energy consumption.
    pub fn set_latest_amperage(&mut self, value: i32, time_us: i64) -> f64 {
        let amps =
            (f64::from(value) * ADC_VREF * 100.0 / 4095.0 - self.current_offset) * 10.0
                / self.current_scale;
        if self.last_time_us != 0 {
            let delta_us = (time_us - self.last_time_us) as f64;
            self.energy_milliamp_hours += amps * delta_us / 3600.0 / 1000.0;
        }
        self.current_amps = amps;
        self.last_time_us = time_us;
        amps
    }

    pub fn current_amps(&self) -> f64 {
        self.current_amps
    }

    pub fn energy_milliamp_hours(&self) -> f64 {
        self.energy_milliamp_hours
    }
}
