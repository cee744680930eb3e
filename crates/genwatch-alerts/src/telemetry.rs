//! Generator telemetry snapshots.
//!
//! A [`TelemetrySnapshot`] is one immutable reading of the generator
//! controller: mains (grid) side, generator side, engine sensors and the
//! controller's health flags. Values are taken as reported; nothing here
//! rejects out-of-range readings, rules evaluate them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Operating mode reported by the controller's mode register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum OperatingMode {
    /// Engine stopped, no automatic start.
    #[default]
    Stop,
    /// Operator-driven start/stop.
    Manual,
    /// Automatic start on mains failure.
    Auto,
    /// Test run.
    Test,
    /// A register value this crate does not know.
    Unknown(u16),
}

impl OperatingMode {
    /// Returns the register code for this mode.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Stop => 1,
            Self::Manual => 2,
            Self::Auto => 4,
            Self::Test => 8,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns the mode as an upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Manual => "MANUAL",
            Self::Auto => "AUTO",
            Self::Test => "TEST",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<u16> for OperatingMode {
    fn from(code: u16) -> Self {
        match code {
            1 => Self::Stop,
            2 => Self::Manual,
            4 => Self::Auto,
            8 => Self::Test,
            other => Self::Unknown(other),
        }
    }
}

impl From<OperatingMode> for u16 {
    fn from(mode: OperatingMode) -> Self {
        mode.code()
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// Mains (utility grid) side readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridReading {
    /// Line voltages L1..L3 in volts.
    pub voltages: [f64; 3],
    /// Frequency in Hz.
    pub frequency_hz: f64,
    /// Total power drawn from the grid.
    pub total_power: f64,
    /// Whether the controller considers mains present.
    pub present: bool,
}

/// Generator side readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorReading {
    /// Line voltages L1..L3 in volts.
    pub voltages: [f64; 3],
    /// Frequency in Hz.
    pub frequency_hz: f64,
    /// Power currently produced.
    pub output_power: f64,
    /// Power factor.
    pub power_factor: f64,
}

/// Engine sensor readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineReading {
    /// Crankshaft speed.
    pub rpm: f64,
    /// Coolant temperature.
    pub temperature: f64,
    /// Oil pressure.
    pub oil_pressure: f64,
    /// Fuel level in percent; expected within 0..=100 but not enforced.
    pub fuel_level_percent: f64,
    /// Starter battery voltage.
    pub battery_voltage: f64,
}

/// Controller health flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthFlags {
    /// A shutdown alarm is latched.
    pub shutdown_alarm: bool,
    /// A load-shed alarm is latched.
    pub load_shed_alarm: bool,
    /// A warning alarm is latched.
    pub warning_alarm: bool,
    /// The controller reports itself healthy.
    pub system_healthy: bool,
}

/// One immutable telemetry reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    /// Controller operating mode.
    pub mode: OperatingMode,
    /// Cumulative runtime in seconds.
    pub runtime_secs: u64,
    /// Mains readings.
    pub grid: GridReading,
    /// Generator readings.
    pub generator: GeneratorReading,
    /// Engine readings.
    pub engine: EngineReading,
    /// Health flags.
    pub health: HealthFlags,
    /// Capture time in epoch milliseconds.
    pub timestamp_ms: i64,
}

impl TelemetrySnapshot {
    /// Creates a snapshot builder with every reading zeroed.
    pub fn builder(timestamp_ms: i64) -> TelemetrySnapshotBuilder {
        TelemetrySnapshotBuilder::new(timestamp_ms)
    }

    /// Parses one snapshot from its JSON form.
    ///
    /// Omitted readings default to zero. Fields the snapshot does not model,
    /// such as the controller's free-text status line, are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::SerializationError` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the reading for `field` as a number.
    ///
    /// Flags map to `1.0`/`0.0`.
    #[must_use]
    pub fn value(&self, field: TelemetryField) -> f64 {
        match field {
            TelemetryField::RuntimeSecs => self.runtime_secs as f64,
            TelemetryField::GridVoltageL1 => self.grid.voltages[0],
            TelemetryField::GridVoltageL2 => self.grid.voltages[1],
            TelemetryField::GridVoltageL3 => self.grid.voltages[2],
            TelemetryField::GridFrequency => self.grid.frequency_hz,
            TelemetryField::GridTotalPower => self.grid.total_power,
            TelemetryField::GridPresent => flag(self.grid.present),
            TelemetryField::GeneratorVoltageL1 => self.generator.voltages[0],
            TelemetryField::GeneratorVoltageL2 => self.generator.voltages[1],
            TelemetryField::GeneratorVoltageL3 => self.generator.voltages[2],
            TelemetryField::GeneratorFrequency => self.generator.frequency_hz,
            TelemetryField::GeneratorOutputPower => self.generator.output_power,
            TelemetryField::GeneratorPowerFactor => self.generator.power_factor,
            TelemetryField::EngineRpm => self.engine.rpm,
            TelemetryField::EngineTemperature => self.engine.temperature,
            TelemetryField::OilPressure => self.engine.oil_pressure,
            TelemetryField::FuelLevel => self.engine.fuel_level_percent,
            TelemetryField::BatteryVoltage => self.engine.battery_voltage,
            TelemetryField::ShutdownAlarm => flag(self.health.shutdown_alarm),
            TelemetryField::LoadShedAlarm => flag(self.health.load_shed_alarm),
            TelemetryField::WarningAlarm => flag(self.health.warning_alarm),
            TelemetryField::SystemHealthy => flag(self.health.system_healthy),
        }
    }

    /// Returns the capture time, or `None` if the timestamp is out of range.
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// Returns true if the fuel level is within 0..=100.
    #[must_use]
    pub fn fuel_level_in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.engine.fuel_level_percent)
    }
}

const fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// A reading that rules can address by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    /// Cumulative runtime in seconds.
    RuntimeSecs,
    /// Grid line voltage L1.
    GridVoltageL1,
    /// Grid line voltage L2.
    GridVoltageL2,
    /// Grid line voltage L3.
    GridVoltageL3,
    /// Grid frequency.
    GridFrequency,
    /// Grid total power.
    GridTotalPower,
    /// Grid present flag.
    GridPresent,
    /// Generator line voltage L1.
    GeneratorVoltageL1,
    /// Generator line voltage L2.
    GeneratorVoltageL2,
    /// Generator line voltage L3.
    GeneratorVoltageL3,
    /// Generator frequency.
    GeneratorFrequency,
    /// Generator output power.
    GeneratorOutputPower,
    /// Generator power factor.
    GeneratorPowerFactor,
    /// Engine speed.
    EngineRpm,
    /// Engine temperature.
    EngineTemperature,
    /// Oil pressure.
    OilPressure,
    /// Fuel level in percent.
    FuelLevel,
    /// Battery voltage.
    BatteryVoltage,
    /// Shutdown alarm flag.
    ShutdownAlarm,
    /// Load-shed alarm flag.
    LoadShedAlarm,
    /// Warning alarm flag.
    WarningAlarm,
    /// System healthy flag.
    SystemHealthy,
}

impl TelemetryField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 22] = [
        Self::RuntimeSecs,
        Self::GridVoltageL1,
        Self::GridVoltageL2,
        Self::GridVoltageL3,
        Self::GridFrequency,
        Self::GridTotalPower,
        Self::GridPresent,
        Self::GeneratorVoltageL1,
        Self::GeneratorVoltageL2,
        Self::GeneratorVoltageL3,
        Self::GeneratorFrequency,
        Self::GeneratorOutputPower,
        Self::GeneratorPowerFactor,
        Self::EngineRpm,
        Self::EngineTemperature,
        Self::OilPressure,
        Self::FuelLevel,
        Self::BatteryVoltage,
        Self::ShutdownAlarm,
        Self::LoadShedAlarm,
        Self::WarningAlarm,
        Self::SystemHealthy,
    ];

    /// Returns the snake_case name used in configs and message templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RuntimeSecs => "runtime_secs",
            Self::GridVoltageL1 => "grid_voltage_l1",
            Self::GridVoltageL2 => "grid_voltage_l2",
            Self::GridVoltageL3 => "grid_voltage_l3",
            Self::GridFrequency => "grid_frequency",
            Self::GridTotalPower => "grid_total_power",
            Self::GridPresent => "grid_present",
            Self::GeneratorVoltageL1 => "generator_voltage_l1",
            Self::GeneratorVoltageL2 => "generator_voltage_l2",
            Self::GeneratorVoltageL3 => "generator_voltage_l3",
            Self::GeneratorFrequency => "generator_frequency",
            Self::GeneratorOutputPower => "generator_output_power",
            Self::GeneratorPowerFactor => "generator_power_factor",
            Self::EngineRpm => "engine_rpm",
            Self::EngineTemperature => "engine_temperature",
            Self::OilPressure => "oil_pressure",
            Self::FuelLevel => "fuel_level",
            Self::BatteryVoltage => "battery_voltage",
            Self::ShutdownAlarm => "shutdown_alarm",
            Self::LoadShedAlarm => "load_shed_alarm",
            Self::WarningAlarm => "warning_alarm",
            Self::SystemHealthy => "system_healthy",
        }
    }
}

impl std::fmt::Display for TelemetryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for [`TelemetrySnapshot`] values.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshotBuilder {
    snapshot: TelemetrySnapshot,
}

impl TelemetrySnapshotBuilder {
    fn new(timestamp_ms: i64) -> Self {
        Self {
            snapshot: TelemetrySnapshot {
                timestamp_ms,
                ..TelemetrySnapshot::default()
            },
        }
    }

    /// Sets the operating mode.
    #[must_use]
    pub const fn mode(mut self, mode: OperatingMode) -> Self {
        self.snapshot.mode = mode;
        self
    }

    /// Sets the cumulative runtime.
    #[must_use]
    pub const fn runtime_secs(mut self, secs: u64) -> Self {
        self.snapshot.runtime_secs = secs;
        self
    }

    /// Sets the full grid reading.
    #[must_use]
    pub const fn grid(mut self, grid: GridReading) -> Self {
        self.snapshot.grid = grid;
        self
    }

    /// Sets the grid frequency and marks mains present when it is positive.
    #[must_use]
    pub fn grid_frequency(mut self, hz: f64) -> Self {
        self.snapshot.grid.frequency_hz = hz;
        self.snapshot.grid.present = hz > 0.0;
        self
    }

    /// Sets the full generator reading.
    #[must_use]
    pub const fn generator(mut self, generator: GeneratorReading) -> Self {
        self.snapshot.generator = generator;
        self
    }

    /// Sets the generator output power.
    #[must_use]
    pub const fn generator_power(mut self, power: f64) -> Self {
        self.snapshot.generator.output_power = power;
        self
    }

    /// Sets the full engine reading.
    #[must_use]
    pub const fn engine(mut self, engine: EngineReading) -> Self {
        self.snapshot.engine = engine;
        self
    }

    /// Sets the fuel level.
    #[must_use]
    pub const fn fuel_level(mut self, percent: f64) -> Self {
        self.snapshot.engine.fuel_level_percent = percent;
        self
    }

    /// Sets the health flags.
    #[must_use]
    pub const fn health(mut self, health: HealthFlags) -> Self {
        self.snapshot.health = health;
        self
    }

    /// Returns the snapshot.
    #[must_use]
    pub const fn build(self) -> TelemetrySnapshot {
        self.snapshot
    }
}
