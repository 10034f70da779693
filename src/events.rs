use crate::puzzle::{PuzzleProgress, PuzzleRejection};
use crate::sentinel::SentinelId;

/// How a level was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaughtBy {
    /// Seen by a guard or camera.
    Sight(SentinelId),
    /// Walked into a pursuit guard.
    Contact(SentinelId),
    /// Ran out of time decrypting a document.
    MiniGameTimeout,
}

/// Discrete things that happened during a tick, for audio and UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    MovementStarted,
    MovementStopped,
    Caught(CaughtBy),
    MiniGameStarted { document: usize },
    DocumentCollected { document: usize, narrative: usize },
    ExitUnlocked,
    /// The vault door opened; the connection puzzle is running.
    SecondPhaseStarted,
    Puzzle(PuzzleProgress),
    PuzzleRejected(PuzzleRejection),
    PuzzleExpired,
    Victory,
}

impl From<PuzzleProgress> for GameEvent {
    fn from(progress: PuzzleProgress) -> Self {
        GameEvent::Puzzle(progress)
    }
}

impl From<PuzzleRejection> for GameEvent {
    fn from(rejection: PuzzleRejection) -> Self {
        GameEvent::PuzzleRejected(rejection)
    }
}
