use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use gateprep_core::{
    DurationSource, NotificationSink, PreferenceFile, Preferences, SessionKind, TimerController,
    TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the study/break timer in the foreground.
    ///
    /// Commands on stdin: s = start, p = pause, r = resume, x = reset, q = quit.
    Run {
        /// Study length in minutes for this run (overrides preferences)
        #[arg(long)]
        study: Option<u32>,
        /// Break length in minutes for this run (overrides preferences)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the configured session lengths
    Durations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "s" | "start" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "resume" => Some(Command::Resume),
        "x" | "reset" => Some(Command::Reset),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

/// Rings the terminal bell and prints a one-line notice on stderr.
struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn session_ended(&self, ended: SessionKind) {
        let message = match ended {
            SessionKind::Study => "Study session complete. Time for a break!",
            SessionKind::Break => "Break is over. Back to studying!",
        };
        tracing::info!(kind = ended.label(), "session ended");
        eprintln!("\x07{message}");
    }
}

fn render(snapshot: &TimerSnapshot, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
    } else {
        writeln!(
            out,
            "{:<5} {:<9} {}",
            snapshot.kind.label(),
            snapshot.phase.label(),
            snapshot.clock()
        )?;
    }
    out.flush()?;
    Ok(())
}

async fn foreground(source: PreferenceFile, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let durations = source.session_durations()?;
    let mut controller = TimerController::new(Arc::new(source), Arc::new(TerminalNotifier));
    let mut snapshots = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!(
        "study {} min / break {} min -- s = start, p = pause, r = resume, x = reset, q = quit",
        durations.study_minutes(),
        durations.break_minutes()
    );
    render(&controller.snapshot(), json)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Start) => controller.start()?,
                    Some(Command::Pause) => controller.pause(),
                    Some(Command::Resume) => controller.resume(),
                    Some(Command::Reset) => controller.reset(),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => eprintln!("unknown command: {}", line.trim()),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                render(&snapshot, json)?;
            }
        }
    }

    // Always finish with the state at exit; the watch may have coalesced it.
    let last = controller.snapshot();
    controller.dispose();
    render(&last, json)?;
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            study,
            break_minutes,
            json,
        } => {
            // Stored lengths are re-read at every start, so `config set`
            // during a run applies to the next session.
            let source = PreferenceFile::default_location()?
                .with_study_minutes(study)
                .with_break_minutes(break_minutes);
            // Fail before entering the session on bad lengths.
            source.session_durations()?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(foreground(source, json));
            // Do not wait on the blocking stdin reader.
            runtime.shutdown_background();
            result
        }
        TimerAction::Durations => {
            let durations = Preferences::load()?.session_durations()?;
            println!(
                "study: {} min\nbreak: {} min",
                durations.study_minutes(),
                durations.break_minutes()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(parse_command("s"), Some(Command::Start));
        assert_eq!(parse_command(" pause \n"), Some(Command::Pause));
        assert_eq!(parse_command("r"), Some(Command::Resume));
        assert_eq!(parse_command("reset"), Some(Command::Reset));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("go"), None);
    }
}
