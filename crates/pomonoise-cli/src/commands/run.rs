//! Foreground session runner.
//!
//! Ticks come from tokio timers; stdin lines are read on a plain thread and
//! forwarded over a channel so both sources meet in one `select!` loop.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use pomonoise_core::audio::{AlarmPattern, CpalAlarm, CpalOutput};
use pomonoise_core::noise::parse_selection;
use pomonoise_core::timer::{TickScheduler, TokioScheduler};
use pomonoise_core::{
    AudioOutput, Config, NoiseCache, NoiseColor, PlaybackController, SessionCoordinator,
    SessionMode, TimerEngine, WorkLog,
};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RunArgs {
    /// Session mode: focus25, focus50, break5, break15
    #[arg(long)]
    mode: Option<SessionMode>,
    /// Noise color: white, pink, brown or none
    #[arg(long)]
    color: Option<String>,
    /// Noise volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,
    /// Task name recorded in the work log
    #[arg(long)]
    task: Option<String>,
    /// Start paused; press `p` to begin
    #[arg(long)]
    paused: bool,
}

/// One line typed while a session runs.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Toggle,
    Reset,
    Color(Option<NoiseColor>),
    Volume(f32),
    Mode(SessionMode),
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        match cmd {
            "p" => Ok(Command::Toggle),
            "r" => Ok(Command::Reset),
            "s" => Ok(Command::Status),
            "q" => Ok(Command::Quit),
            "c" => parse_selection(rest)
                .map(Command::Color)
                .map_err(|e| e.to_string()),
            "v" => rest
                .parse::<f32>()
                .map(Command::Volume)
                .map_err(|_| format!("invalid volume '{rest}'")),
            "m" => rest
                .parse::<SessionMode>()
                .map(Command::Mode)
                .map_err(|e| e.to_string()),
            other => Err(format!(
                "unknown command '{other}' (p toggle, r reset, c <color>, v <volume>, m <mode>, s status, q quit)"
            )),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mode = args.mode.unwrap_or(config.timer.default_mode);
    let color = match args.color.as_deref() {
        Some(c) => parse_selection(c)?,
        None => config.noise_color(),
    };
    let volume = args.volume.unwrap_or(config.audio.volume);
    let task = args
        .task
        .unwrap_or_else(|| config.log.default_task_name.clone());

    let cache = Arc::new(NoiseCache::new(config.noise_dir()?));
    let playback = PlaybackController::new(CpalOutput::new(), cache);
    let (scheduler, mut ticks) = TokioScheduler::new();

    let mut coordinator = SessionCoordinator::new(TimerEngine::new(mode), playback, scheduler);
    if config.audio.alarm_enabled {
        coordinator = coordinator.with_alarm(CpalAlarm::default());
    }
    match WorkLog::open() {
        Ok(log) => coordinator = coordinator.with_log_writer(log),
        Err(e) => tracing::warn!(error = %e, "work log unavailable; sessions won't be recorded"),
    }
    coordinator.set_task_name(task);
    coordinator.on_volume_changed(volume);
    coordinator.on_color_changed(color);
    coordinator.prepare();
    if !args.paused {
        coordinator.on_start_requested();
    }

    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    print_status(&coordinator);

    loop {
        tokio::select! {
            Some(handle) = ticks.recv() => {
                let finished = coordinator.on_tick_fired(handle);
                print_status(&coordinator);
                if let Some(finish) = finished {
                    println!();
                    println!("{} finished ({} min)", finish.mode, finish.elapsed_minutes);
                    if config.audio.alarm_enabled {
                        // Let the alarm thread play out before the process exits.
                        tokio::time::sleep(AlarmPattern::default().total_duration()).await;
                    }
                    break;
                }
            }
            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if let Flow::Quit = handle_line(&mut coordinator, &line) {
                        break;
                    }
                    print_status(&coordinator);
                }
                None => {
                    stdin_open = false;
                    if !coordinator.engine().is_running() {
                        break;
                    }
                }
            },
        }
    }

    coordinator.on_pause();
    println!();
    Ok(())
}

fn handle_line<S: TickScheduler, O: AudioOutput>(
    coordinator: &mut SessionCoordinator<S, O>,
    line: &str,
) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }
    match line.parse::<Command>() {
        Ok(Command::Toggle) => {
            coordinator.on_start_requested();
        }
        Ok(Command::Reset) => {
            coordinator.on_reset();
        }
        Ok(Command::Color(color)) => coordinator.on_color_changed(color),
        Ok(Command::Volume(v)) => coordinator.on_volume_changed(v),
        Ok(Command::Mode(mode)) => {
            coordinator.on_mode_changed(mode);
        }
        Ok(Command::Status) => match serde_json::to_string(&coordinator.engine().snapshot()) {
            Ok(json) => println!("\n{json}"),
            Err(e) => eprintln!("\nerror: {e}"),
        },
        Ok(Command::Quit) => return Flow::Quit,
        Err(message) => eprintln!("\n{message}"),
    }
    Flow::Continue
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_status<S: TickScheduler, O: AudioOutput>(coordinator: &SessionCoordinator<S, O>) {
    let engine = coordinator.engine();
    let playback = coordinator.playback_state();
    let noise = match playback.color {
        Some(color) if playback.is_looping => format!("{color} {:.0}%", playback.gain * 100.0),
        Some(color) => format!("{color} (silent)"),
        None => "off".to_string(),
    };
    print!(
        "\r{}  {}  {:>3.0}%  {:?}  noise: {}   ",
        engine.mode().label(),
        engine.display(),
        engine.progress() * 100.0,
        engine.state(),
        noise
    );
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letter_commands() {
        assert_eq!("p".parse::<Command>(), Ok(Command::Toggle));
        assert_eq!(" r ".parse::<Command>(), Ok(Command::Reset));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("s".parse::<Command>(), Ok(Command::Status));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!("c brown".parse::<Command>(), Ok(Command::Color(Some(NoiseColor::Brown))));
        assert_eq!("c none".parse::<Command>(), Ok(Command::Color(None)));
        assert_eq!("v 0.25".parse::<Command>(), Ok(Command::Volume(0.25)));
        assert_eq!("m Focus 50".parse::<Command>(), Ok(Command::Mode(SessionMode::Focus50)));
        assert_eq!("m break5".parse::<Command>(), Ok(Command::Mode(SessionMode::Break5)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!("x".parse::<Command>().is_err());
        assert!("c purple".parse::<Command>().is_err());
        assert!("v loud".parse::<Command>().is_err());
        assert!("m focus 90".parse::<Command>().is_err());
    }
}
