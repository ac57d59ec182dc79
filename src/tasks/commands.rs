use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

use crate::events::{Command, UiEvent};

/// Parses line commands from `input` on a dedicated OS thread and forwards
/// them to `events`.
///
/// The thread stops on `quit`, end of input, or once the receiver is gone.
/// It is never joined by the runtime, so a read blocked on a terminal does
/// not hold up shutdown.
pub fn spawn_command_reader<R>(input: R, events: Sender<UiEvent>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("command-reader".into())
        .spawn(move || forward_commands(input, &events))
}

fn forward_commands<R: BufRead>(input: R, events: &Sender<UiEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("failed to read command: {err}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => return,
            Ok(Command::Ui(event)) => {
                if events.blocking_send(event).is_err() {
                    return;
                }
            }
            Err(err) => warn!("{err}"),
        }
    }
    info!("command input closed");
}
