//! Line-based terminal front end.
//!
//! Reads one command per line and prints the board whenever the session
//! reports a change. Rendering is plain text on purpose; everything that
//! decides anything lives in the session.

use crate::config::ArenaConfig;
use crate::controller::Controller;
use derive_more::Display;
use std::str::FromStr;
use strictly_grid::{
    BoardSize, Difficulty, GameMode, GameStatus, Outcome, Player, SessionEvent, SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Select a cell (zero-based).
    Cell(usize),
    /// Undo one visible turn.
    Undo,
    /// Start over.
    Reset,
    /// Start over on another board size.
    Size(BoardSize),
    /// Start over in another mode.
    Mode(GameMode),
    /// Change opponent strength.
    Difficulty(Difficulty),
    /// Show the move log.
    History,
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
}

/// Input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Unrecognized input '{}' (type 'help' for commands)", _0)]
pub struct InputError(pub String);

impl std::error::Error for InputError {}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let error = || InputError(line.to_string());
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(error)?.to_ascii_lowercase();
        let argument = words.next();

        let input = match (command.as_str(), argument) {
            ("u" | "undo", None) => Input::Undo,
            ("r" | "reset", None) => Input::Reset,
            ("h" | "history", None) => Input::History,
            ("?" | "help", None) => Input::Help,
            ("q" | "quit", None) => Input::Quit,
            ("size", Some(arg)) => Input::Size(arg.parse().map_err(|_| error())?),
            ("mode", Some(arg)) => Input::Mode(arg.parse().map_err(|_| error())?),
            ("difficulty", Some(arg)) => Input::Difficulty(arg.parse().map_err(|_| error())?),
            (number, None) => {
                let cell = number.parse::<usize>().map_err(|_| error())?;
                Input::Cell(cell.checked_sub(1).ok_or_else(error)?)
            }
            _ => return Err(error()),
        };
        Ok(input)
    }
}

/// Display name of `player` under the session's current mode.
fn name_of(config: &ArenaConfig, mode: GameMode, player: Player) -> String {
    match player {
        Player::X => config.player_x_name(mode),
        Player::O => config.player_o_name(mode),
    }
}

/// One-line description of where the game stands.
pub fn status_line(snapshot: &SessionSnapshot, config: &ArenaConfig) -> String {
    let name = |player| name_of(config, snapshot.mode, player);
    match (snapshot.status, snapshot.outcome) {
        (GameStatus::Finished, Some(Outcome::Winner(player))) => {
            format!("{} ({}) wins!", name(player), player)
        }
        (GameStatus::Finished, _) => "It's a draw.".to_string(),
        (GameStatus::Thinking, _) => format!("{} is thinking...", name(snapshot.turn)),
        _ => format!("{} ({}) to move", name(snapshot.turn), snapshot.turn),
    }
}

/// Board, settings and status as printed after every change.
pub fn render(snapshot: &SessionSnapshot, config: &ArenaConfig) -> String {
    format!(
        "\n{} | {} | {}\n\n{}\n\n{}",
        snapshot.board_size,
        snapshot.mode,
        snapshot.difficulty,
        snapshot.board.display(),
        status_line(snapshot, config)
    )
}

/// The move log with coordinates, time and reasoning.
pub fn history_lines(snapshot: &SessionSnapshot) -> Vec<String> {
    if snapshot.moves.is_empty() {
        return vec!["No moves yet.".to_string()];
    }
    snapshot
        .moves
        .iter()
        .enumerate()
        .map(|(index, mv)| {
            let mut line = format!(
                "{:>2}. {} at {}",
                index + 1,
                mv.label(snapshot.board_size),
                mv.timestamp.format("%H:%M:%S")
            );
            if let Some(reasoning) = mv.reasoning.as_deref().filter(|r| !r.is_empty()) {
                line.push_str(&format!(" \"{}\"", reasoning));
            }
            line
        })
        .collect()
}

const HELP: &str = "Commands: <number> place a mark | u undo | r reset | size 3|4|5 | \
                    mode auto|human | difficulty easy|medium|hard | history | q quit";

/// Runs the terminal loop until the player quits or input closes.
#[instrument(skip_all)]
pub async fn run(
    controller: Controller,
    config: ArenaConfig,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) -> std::io::Result<()> {
    info!("Starting terminal loop");
    println!("{}", HELP);
    println!("{}", render(&controller.snapshot(), &config));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(input) => handle(&controller, input),
                    Err(error) => println!("{}", error),
                }
            }
            Some(event) = events.recv() => on_event(&controller, &config, event),
        }
    }

    controller.settle().await;
    info!("Terminal loop finished");
    Ok(())
}

fn handle(controller: &Controller, input: Input) {
    debug!(?input, "Handling input");
    match input {
        Input::Cell(cell) => {
            if let Err(error) = controller.select_cell(cell) {
                println!("{}", error);
            }
        }
        Input::Undo => {
            if controller.undo() == 0 {
                println!("Nothing to undo right now.");
            }
        }
        Input::Reset => controller.reset(),
        Input::Size(size) => controller.change_board_size(size),
        Input::Mode(mode) => controller.change_mode(mode),
        Input::Difficulty(difficulty) => {
            controller.change_difficulty(difficulty);
            println!("Difficulty set to {}.", difficulty);
        }
        Input::History => {
            for line in history_lines(&controller.snapshot()) {
                println!("{}", line);
            }
        }
        Input::Help => println!("{}", HELP),
        Input::Quit => {}
    }
}

fn on_event(controller: &Controller, config: &ArenaConfig, event: SessionEvent) {
    match event {
        SessionEvent::MoveApplied { .. }
        | SessionEvent::SessionReset { .. }
        | SessionEvent::UndoApplied { .. } => {
            println!("{}", render(&controller.snapshot(), config));
        }
        SessionEvent::ReasoningAvailable(text) if *config.show_reasoning() => {
            let snapshot = controller.snapshot();
            println!("{}: \"{}\"", name_of(config, snapshot.mode, Player::O), text);
        }
        SessionEvent::GameFinished { .. } => {
            println!("Game over. Type 'r' to play again.");
        }
        _ => {}
    }
}
