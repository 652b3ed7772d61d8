//! Tests for intent dispatch and opponent reconciliation.

use std::sync::Arc;
use std::time::Duration;
use strictly_arena::{
    Controller, FUZZY_REASONING, MoveProvider, MoveRequest, MoveResponse, Orchestrator,
    ProviderError,
};
use strictly_grid::{
    Applied, BoardSize, Difficulty, GameMode, GameStatus, MoveError, Player, Session,
    SessionEvent, Square,
};
use tokio::sync::mpsc;

struct Scripted {
    reply: Result<MoveResponse, ProviderError>,
    delay: Duration,
}

#[async_trait::async_trait]
impl MoveProvider for Scripted {
    async fn request_move(&self, _request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

struct Panicking;

#[async_trait::async_trait]
impl MoveProvider for Panicking {
    async fn request_move(&self, _request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        panic!("provider crashed");
    }

    fn name(&self) -> &str {
        "Panicking"
    }
}

fn controller(
    size: BoardSize,
    mode: GameMode,
    reply: Result<MoveResponse, ProviderError>,
    delay: Duration,
) -> (Controller, mpsc::UnboundedReceiver<SessionEvent>) {
    let provider = Arc::new(Scripted { reply, delay });
    let orchestrator = Orchestrator::new(provider).with_seed(5);
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(size, mode, Difficulty::Hard);
    (Controller::new(session, orchestrator, tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_four_by_four_reply_is_applied() {
    let reply = Ok(MoveResponse::new(5, "Taking the inner square".to_string()));
    let (controller, mut rx) = controller(BoardSize::Four, GameMode::VsAuto, reply, Duration::ZERO);

    let applied = controller.select_cell(0).unwrap();
    assert!(matches!(applied, Applied::AwaitingOpponent(_)));
    assert_eq!(controller.snapshot().status, GameStatus::Thinking);

    controller.settle().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.turn, Player::X);
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.moves.len(), 2);
    assert_eq!(
        snapshot.moves[1].reasoning.as_deref(),
        Some("Taking the inner square")
    );
    assert_eq!(
        drain(&mut rx),
        vec![
            SessionEvent::MoveApplied {
                player: Player::X,
                cell: 0
            },
            SessionEvent::ThinkingStarted,
            SessionEvent::ThinkingEnded,
            SessionEvent::MoveApplied {
                player: Player::O,
                cell: 5
            },
            SessionEvent::ReasoningAvailable("Taking the inner square".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_provider_failure_still_reaches_playing() {
    let reply = Err(ProviderError::Transport("connection refused".to_string()));
    let (controller, _rx) = controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::ZERO);

    controller.select_cell(4).unwrap();
    controller.settle().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.moves.len(), 2);
    let fallback = &snapshot.moves[1];
    assert_eq!(fallback.player, Player::O);
    assert_ne!(fallback.cell, 4);
    assert_eq!(fallback.reasoning.as_deref(), Some(FUZZY_REASONING));
}

#[tokio::test(start_paused = true)]
async fn test_moves_rejected_while_thinking() {
    let reply = Ok(MoveResponse::new(8, String::new()));
    let (controller, _rx) =
        controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::from_secs(2));

    controller.select_cell(0).unwrap();
    assert_eq!(controller.select_cell(1), Err(MoveError::OpponentThinking));
    assert_eq!(controller.undo(), 0);

    controller.settle().await;
    assert_eq!(controller.snapshot().moves.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_reply() {
    let reply = Ok(MoveResponse::new(4, "Center".to_string()));
    let (controller, mut rx) =
        controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::from_secs(5));

    controller.select_cell(0).unwrap();
    controller.reset();
    controller.settle().await;

    let snapshot = controller.snapshot();
    assert!(snapshot.board.is_blank());
    assert_eq!(snapshot.status, GameStatus::Idle);
    assert_eq!(snapshot.generation.value(), 1);
    assert!(
        !drain(&mut rx)
            .iter()
            .any(|event| matches!(event, SessionEvent::MoveApplied { player: Player::O, .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_size_change_discards_in_flight_reply() {
    let reply = Ok(MoveResponse::new(4, "Center".to_string()));
    let (controller, _rx) =
        controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::from_secs(5));

    controller.select_cell(0).unwrap();
    controller.change_board_size(BoardSize::Five);
    controller.settle().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.board_size, BoardSize::Five);
    assert_eq!(snapshot.board.get(4), Some(Square::Empty));
}

#[tokio::test(start_paused = true)]
async fn test_undo_after_reply_restores_empty_board() {
    let reply = Ok(MoveResponse::new(5, String::new()));
    let (controller, _rx) = controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::ZERO);

    controller.select_cell(0).unwrap();
    controller.settle().await;

    assert_eq!(controller.undo(), 2);
    let snapshot = controller.snapshot();
    assert!(snapshot.board.is_blank());
    assert_eq!(snapshot.status, GameStatus::Idle);
    assert_eq!(snapshot.turn, Player::X);
}

#[tokio::test(start_paused = true)]
async fn test_two_humans_never_spawn_opponent() {
    let reply = Err(ProviderError::NoMoves);
    let (controller, _rx) = controller(BoardSize::Three, GameMode::VsHuman, reply, Duration::ZERO);

    assert_eq!(controller.select_cell(0), Ok(Applied::Continue));
    assert_eq!(controller.select_cell(4), Ok(Applied::Continue));
    controller.settle().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.moves.len(), 2);
    assert_eq!(snapshot.turn, Player::X);
}

#[tokio::test(start_paused = true)]
async fn test_difficulty_change_keeps_game() {
    let reply = Ok(MoveResponse::new(5, String::new()));
    let (controller, _rx) = controller(BoardSize::Three, GameMode::VsAuto, reply, Duration::ZERO);

    controller.select_cell(0).unwrap();
    controller.settle().await;
    controller.change_difficulty(Difficulty::Easy);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.difficulty, Difficulty::Easy);
    assert_eq!(snapshot.moves.len(), 2);
    assert_eq!(snapshot.generation.value(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_crashed_provider_still_reaches_playing() {
    let orchestrator = Orchestrator::new(Arc::new(Panicking)).with_seed(2);
    let (tx, _rx) = mpsc::unbounded_channel();
    let session = Session::new(BoardSize::Three, GameMode::VsAuto, Difficulty::Hard);
    let controller = Controller::new(session, orchestrator, tx);

    controller.select_cell(4).unwrap();
    controller.settle().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.turn, Player::X);
    assert_eq!(snapshot.moves.len(), 2);
    assert_ne!(snapshot.moves[1].cell, 4);
    assert_eq!(snapshot.moves[1].reasoning.as_deref(), Some(FUZZY_REASONING));
}
