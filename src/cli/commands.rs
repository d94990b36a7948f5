use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::bridge::CommandBridge;
use crate::domain::command::{Pulse, RobotCommand};
use crate::domain::config::{QuadbotConfig, TransportMode};
use crate::domain::error::{QuadbotError, QuadbotResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Grace period for trailing statuses after the console input ends
const CONSOLE_DRAIN_MS: u64 = 500;
/// How often monitor checks that the poll loop is still alive
const MONITOR_CHECK_MS: u64 = 200;

/// Execute CLI command
pub async fn execute_command(args: Args) -> QuadbotResult<()> {
    let writer = ConsoleWriter::new(args.output);

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new()?;
    let mut config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path.as_ref())?
    } else {
        config_manager.load_config()?
    };
    args.link.apply(&mut config.link);

    if !args.quiet {
        init_logging(&config.global, args.verbose)?;
    }

    match args.command {
        Command::Version => {
            writer.write_message(&format!("quadbot {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Command::Monitor => execute_monitor(&config, writer).await,
        Command::Console => execute_console(&config, writer).await,
        command => {
            let (robot_command, wait_ms) = build_robot_command(&command)?;
            execute_single(&config, writer, robot_command, wait_ms).await
        }
    }
}

/// Maps a one-shot subcommand to its wire command and status wait
pub fn build_robot_command(command: &Command) -> QuadbotResult<(RobotCommand, u64)> {
    let built = match command {
        Command::Send { command, wait_ms } => (RobotCommand::raw(command.trim()), *wait_ms),
        Command::Motor {
            motor,
            direction,
            pulse,
            duration,
            wait_ms,
        } => (
            RobotCommand::rotate_motor(*motor, (*direction).into(), Pulse::new(*pulse)?, duration)?,
            *wait_ms,
        ),
        Command::StopLimb { limb, wait_ms } => (RobotCommand::stop_limb(*limb)?, *wait_ms),
        Command::Body {
            body,
            direction,
            duration,
            wait_ms,
        } => (
            RobotCommand::rotate_body(*body, (*direction).into(), *duration)?,
            *wait_ms,
        ),
        Command::StopBody { body, wait_ms } => (RobotCommand::stop_body(*body)?, *wait_ms),
        Command::Stand { wait_ms } => (RobotCommand::stand_up(), *wait_ms),
        Command::Sit { wait_ms } => (RobotCommand::sit_down(), *wait_ms),
        Command::Calibrate { limb, wait_ms } => {
            let command = match limb {
                Some(limb) => RobotCommand::calibrate_limb(*limb)?,
                None => RobotCommand::calibrate_all(),
            };
            (command, *wait_ms)
        }
        Command::Gait { action, wait_ms } => {
            let command = match action.gait() {
                Some(gait) => RobotCommand::start_gait(gait),
                None => RobotCommand::stop_gait(),
            };
            (command, *wait_ms)
        }
        Command::Speed { speed, wait_ms } => (RobotCommand::set_speed(*speed), *wait_ms),
        Command::Mode { control, wait_ms } => {
            (RobotCommand::set_mode((*control).into()), *wait_ms)
        }
        Command::Monitor | Command::Console | Command::Config(_) | Command::Version => {
            return Err(QuadbotError::InvalidInput(
                "Subcommand does not send a robot command".to_string(),
            ))
        }
    };

    if built.0.as_str().is_empty() {
        return Err(QuadbotError::InvalidInput("Command is empty".to_string()));
    }

    Ok(built)
}

/// Routes every status the bridge reports to the console
fn attach_console(bridge: &CommandBridge, writer: ConsoleWriter) {
    bridge.register_status_observer(move |message| {
        if let Err(e) = writer.write_status(&message) {
            warn!("Failed to print status '{}': {}", message, e);
        }
    });
}

async fn execute_single(
    config: &QuadbotConfig,
    writer: ConsoleWriter,
    command: RobotCommand,
    wait_ms: u64,
) -> QuadbotResult<()> {
    let mut bridge = CommandBridge::connect(config).await?;
    attach_console(&bridge, writer);

    bridge.send_command(&command);
    debug!("Waiting {}ms for status after '{}'", wait_ms, command);
    tokio::time::sleep(Duration::from_millis(wait_ms)).await;

    bridge.shutdown().await;
    Ok(())
}

async fn execute_monitor(config: &QuadbotConfig, writer: ConsoleWriter) -> QuadbotResult<()> {
    let mut bridge = CommandBridge::connect(config).await?;
    attach_console(&bridge, writer);

    match bridge.mode() {
        TransportMode::Serial if !bridge.is_polling() => {
            writer.write_error("Serial port not connected; nothing to monitor")?;
            bridge.shutdown().await;
            return Ok(());
        }
        TransportMode::Serial => {
            writer.write_message("Monitoring robot status (Press Ctrl+C to stop)")?
        }
        TransportMode::Wireless => writer.write_message(
            "Wireless mode reports only command results (Press Ctrl+C to stop)",
        )?,
    }

    let serial = bridge.mode() == TransportMode::Serial;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted; stopping monitor");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(MONITOR_CHECK_MS)) => {
                if serial && !bridge.is_polling() {
                    break;
                }
            }
        }
    }

    bridge.shutdown().await;
    Ok(())
}

async fn execute_console(config: &QuadbotConfig, writer: ConsoleWriter) -> QuadbotResult<()> {
    let mut bridge = CommandBridge::connect(config).await?;
    attach_console(&bridge, writer);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            result = tokio::signal::ctrl_c() => {
                result?;
                None
            }
        };

        let Some(line) = line else { break };
        let command = line.trim();
        match command {
            "" => continue,
            "quit" | "exit" => break,
            command => bridge.send_command(command),
        }
    }

    tokio::time::sleep(Duration::from_millis(CONSOLE_DRAIN_MS)).await;
    bridge.shutdown().await;
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &QuadbotConfig,
    config_manager: &ConfigManager,
) -> QuadbotResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init => {
            let current_dir = std::env::current_dir().map_err(|e| {
                QuadbotError::config(format!("Failed to get current directory: {}", e))
            })?;
            let path = config_manager.init_project_config(&current_dir)?;
            writer.write_message(&format!(
                "Project configuration initialized at '{}'",
                path.display()
            ))?;
            Ok(())
        }
        ConfigCommand::Path => {
            writer.write_paths(
                config_manager.get_global_config_path_ref(),
                config_manager.get_project_config_path().map(|path| path.as_path()),
            )?;
            Ok(())
        }
    }
}
