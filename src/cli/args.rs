use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::domain::command::{ControlMode, Direction, Gait, DEFAULT_PULSE_US};
use crate::domain::config::{LinkConfig, TransportMode};

/// Command line arguments for Quadbot
#[derive(Parser, Debug)]
#[command(
    name = "quadbot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Operator console for a four-limbed crawling robot",
    long_about = "Sends motion, calibration and gait commands to a four-limbed crawling robot over a serial link or HTTP, and prints the status lines the robot reports back."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Status output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    #[command(flatten)]
    pub link: LinkArgs,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the configured robot link
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct LinkArgs {
    /// Transport to use (serial or wireless)
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// Serial port path
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Serial baud rate
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Robot IP address for wireless mode
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// HTTP request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

impl LinkArgs {
    /// Applies any flags given on the command line over `link`
    pub fn apply(&self, link: &mut LinkConfig) {
        if let Some(mode) = self.mode {
            link.mode = mode.into();
        }
        if let Some(port) = &self.port {
            link.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            link.serial.baud_rate = baud;
        }
        if let Some(host) = &self.host {
            link.wireless.host = host.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            link.wireless.timeout_ms = timeout_ms;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a raw command string verbatim
    Send {
        /// Command text, e.g. ROTATE_M1_CW:1500_500
        command: String,
        /// How long to keep printing status afterwards
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Rotate a single limb motor
    Motor {
        /// Motor number (1-8)
        motor: u8,
        /// Rotation direction
        #[arg(value_enum)]
        direction: DirectionArg,
        /// Pulse width in microseconds (500-2500)
        #[arg(long, default_value_t = DEFAULT_PULSE_US)]
        pulse: u16,
        /// Duration in milliseconds; non-numeric input falls back to 500
        #[arg(short, long, default_value = "500")]
        duration: String,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Stop both motors of a limb
    StopLimb {
        /// Limb number (1-4)
        limb: u8,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Rotate a body motor
    Body {
        /// Body motor number (1-2)
        body: u8,
        #[arg(value_enum)]
        direction: DirectionArg,
        /// Duration in milliseconds
        #[arg(short, long, default_value = "500")]
        duration: u64,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Stop a body motor
    StopBody {
        /// Body motor number (1-2)
        body: u8,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Stand up
    Stand {
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Sit down
    Sit {
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Calibrate one limb, or all limbs when none is given
    Calibrate {
        /// Limb number (1-4)
        #[arg(short, long)]
        limb: Option<u8>,
        #[arg(short, long, default_value = "5000")]
        wait_ms: u64,
    },
    /// Start or stop a gait
    Gait {
        #[arg(value_enum)]
        action: GaitArg,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Set motor speed
    Speed {
        /// Speed (0-255)
        speed: u8,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Switch firmware control mode
    Mode {
        #[arg(value_enum, value_name = "MODE")]
        control: ControlModeArg,
        #[arg(short, long, default_value = "1000")]
        wait_ms: u64,
    },
    /// Print robot status until interrupted
    Monitor,
    /// Read commands from stdin, one per line, and print status
    Console,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a default project configuration in the current directory
    Init,
    /// Print configuration file locations
    Path,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// One JSON object per line
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Serial,
    Wireless,
}

impl From<ModeArg> for TransportMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Serial => TransportMode::Serial,
            ModeArg::Wireless => TransportMode::Wireless,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Cw,
    Ccw,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Cw => Direction::Clockwise,
            DirectionArg::Ccw => Direction::CounterClockwise,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitArg {
    Crawl,
    Walk,
    FastCrawl,
    Stop,
}

impl GaitArg {
    /// `None` for stop
    pub fn gait(self) -> Option<Gait> {
        match self {
            GaitArg::Crawl => Some(Gait::Crawl),
            GaitArg::Walk => Some(Gait::Walk),
            GaitArg::FastCrawl => Some(Gait::FastCrawl),
            GaitArg::Stop => None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlModeArg {
    Gait,
    Individual,
}

impl From<ControlModeArg> for ControlMode {
    fn from(arg: ControlModeArg) -> Self {
        match arg {
            ControlModeArg::Gait => ControlMode::Gait,
            ControlModeArg::Individual => ControlMode::Individual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_motor_command() {
        let args = Args::try_parse_from([
            "quadbot", "motor", "3", "ccw", "--pulse", "2000", "--duration", "abc",
        ])
        .unwrap();

        match args.command {
            Command::Motor {
                motor,
                direction,
                pulse,
                duration,
                ..
            } => {
                assert_eq!(motor, 3);
                assert_eq!(direction, DirectionArg::Ccw);
                assert_eq!(pulse, 2000);
                assert_eq!(duration, "abc");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_link_overrides_apply() {
        let args = Args::try_parse_from([
            "quadbot", "--mode", "wireless", "--host", "10.1.1.1", "stand",
        ])
        .unwrap();

        let mut link = LinkConfig::default();
        args.link.apply(&mut link);
        assert_eq!(link.mode, TransportMode::Wireless);
        assert_eq!(link.wireless.host, "10.1.1.1");
        assert_eq!(link.serial.baud_rate, 115_200);
    }

    #[test]
    fn test_mode_subcommand_alongside_link_mode() {
        let args =
            Args::try_parse_from(["quadbot", "--mode", "serial", "mode", "individual"]).unwrap();
        assert_eq!(args.link.mode, Some(ModeArg::Serial));
        assert!(matches!(
            args.command,
            Command::Mode {
                control: ControlModeArg::Individual,
                ..
            }
        ));
    }

    #[test]
    fn test_speed_out_of_range_rejected() {
        assert!(Args::try_parse_from(["quadbot", "speed", "300"]).is_err());
    }
}
