//! Robot command vocabulary.
//!
//! The firmware protocol is a set of fixed upper-case strings. The bridge
//! treats them as opaque; these builders only compose them at the call site
//! so argument checks (motor numbers, pulse range, duration fallback) happen
//! before anything reaches a transport.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{QuadbotError, QuadbotResult};

pub const PULSE_MIN_US: u16 = 500;
pub const PULSE_MAX_US: u16 = 2500;
pub const DEFAULT_PULSE_US: u16 = 1500;
pub const DEFAULT_DURATION_MS: u64 = 500;
pub const DEFAULT_SPEED: u8 = 128;

pub const LIMB_COUNT: u8 = 4;
pub const MOTOR_COUNT: u8 = LIMB_COUNT * 2;
pub const BODY_MOTOR_COUNT: u8 = 2;

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Clockwise => write!(f, "CW"),
            Direction::CounterClockwise => write!(f, "CCW"),
        }
    }
}

impl FromStr for Direction {
    type Err = QuadbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Ok(Direction::Clockwise),
            "ccw" | "counterclockwise" | "counter-clockwise" => Ok(Direction::CounterClockwise),
            other => Err(QuadbotError::InvalidInput(format!(
                "Unknown direction '{}'",
                other
            ))),
        }
    }
}

/// Gait patterns the firmware can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Crawl,
    Walk,
    FastCrawl,
}

impl Gait {
    fn start_keyword(self) -> &'static str {
        match self {
            Gait::Crawl => "START_CRAWLING",
            Gait::Walk => "START_WALKING",
            Gait::FastCrawl => "START_FASTCRAWL",
        }
    }
}

/// Firmware control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Individual,
    Gait,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Individual => write!(f, "INDIVIDUAL"),
            ControlMode::Gait => write!(f, "GAIT"),
        }
    }
}

/// Servo pulse width in microseconds, always within the firmware's range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pulse(u16);

impl Pulse {
    pub fn new(micros: u16) -> QuadbotResult<Self> {
        if (PULSE_MIN_US..=PULSE_MAX_US).contains(&micros) {
            Ok(Self(micros))
        } else {
            Err(QuadbotError::InvalidInput(format!(
                "Pulse {}us outside {}..={}us",
                micros, PULSE_MIN_US, PULSE_MAX_US
            )))
        }
    }

    /// Pins an arbitrary value to the valid range, as a slider would
    pub fn clamped(micros: u16) -> Self {
        Self(micros.clamp(PULSE_MIN_US, PULSE_MAX_US))
    }

    pub fn micros(self) -> u16 {
        self.0
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self(DEFAULT_PULSE_US)
    }
}

/// Parses operator-typed duration text.
///
/// Anything that is not a plain run of ASCII digits (including the empty
/// string and values too large to represent) falls back to
/// [`DEFAULT_DURATION_MS`].
pub fn parse_duration(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_DURATION_MS;
    }
    trimmed.parse().unwrap_or(DEFAULT_DURATION_MS)
}

/// `<pulse>_<duration>` argument used by motor rotation commands
pub fn pulse_duration(pulse: Pulse, duration_input: &str) -> String {
    format!("{}_{}", pulse.micros(), parse_duration(duration_input))
}

/// A command string ready for any transport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RobotCommand(String);

impl RobotCommand {
    /// Wraps text verbatim
    pub fn raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn rotate_motor(
        motor: u8,
        direction: Direction,
        pulse: Pulse,
        duration_input: &str,
    ) -> QuadbotResult<Self> {
        check_range("motor", motor, MOTOR_COUNT)?;
        Ok(Self(format!(
            "ROTATE_M{}_{}:{}",
            motor,
            direction,
            pulse_duration(pulse, duration_input)
        )))
    }

    /// Stops both motors of a limb
    pub fn stop_limb(limb: u8) -> QuadbotResult<Self> {
        let (first, second) = limb_motors(limb)?;
        Ok(Self(format!("STOP_M{}_M{}_MOTORS", first, second)))
    }

    pub fn rotate_body(body: u8, direction: Direction, duration_ms: u64) -> QuadbotResult<Self> {
        check_range("body motor", body, BODY_MOTOR_COUNT)?;
        Ok(Self(format!(
            "ROTATE_BODY{}_{}:{}",
            body, direction, duration_ms
        )))
    }

    pub fn stop_body(body: u8) -> QuadbotResult<Self> {
        check_range("body motor", body, BODY_MOTOR_COUNT)?;
        Ok(Self(format!("STOP_BODY{}", body)))
    }

    pub fn stand_up() -> Self {
        Self::raw("STAND_UP")
    }

    pub fn sit_down() -> Self {
        Self::raw("SIT_DOWN")
    }

    pub fn calibrate_limb(limb: u8) -> QuadbotResult<Self> {
        check_range("limb", limb, LIMB_COUNT)?;
        Ok(Self(format!("CALIBRATE_LIMB:{}", limb)))
    }

    pub fn calibrate_all() -> Self {
        Self::raw("CALIBRATE_ALL_LIMBS")
    }

    pub fn start_gait(gait: Gait) -> Self {
        Self::raw(gait.start_keyword())
    }

    pub fn stop_gait() -> Self {
        Self::raw("STOP_GAIT")
    }

    pub fn set_speed(speed: u8) -> Self {
        Self(format!("SET_SPEED:{}", speed))
    }

    pub fn set_mode(mode: ControlMode) -> Self {
        Self(format!("SET_MODE:{}", mode))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RobotCommand {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Motor numbers driven by a limb: limb `n` owns `M(2n-1)` and `M(2n)`
pub fn limb_motors(limb: u8) -> QuadbotResult<(u8, u8)> {
    check_range("limb", limb, LIMB_COUNT)?;
    Ok((limb * 2 - 1, limb * 2))
}

fn check_range(what: &str, value: u8, max: u8) -> QuadbotResult<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(QuadbotError::InvalidInput(format!(
            "{} {} outside 1..={}",
            what, value, max
        )))
    }
}
