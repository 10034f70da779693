//! The connection puzzle of the vault's second phase.
//!
//! Each pair is wired by activating its A endpoint and then its B endpoint. Only one wire can
//! be live at a time.

use std::time::Duration;

use glam::Vec2;
use tracing::{debug, info};

/// Why an activation did nothing.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleRejection {
    #[error("Connections must start from point A")]
    MustStartFromA,
    #[error("Point belongs to a different pair")]
    WrongPair,
    #[error("The puzzle is no longer active")]
    Inactive,
}

/// What an accepted activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleProgress {
    /// A wire now runs from pair `n`'s A endpoint.
    Started(usize),
    /// Pair `n` is wired.
    Connected(usize),
    /// The last pair was wired.
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuzzlePair {
    pub a: Vec2,
    pub b: Vec2,
    pub a_connected: bool,
    pub b_connected: bool,
    pub completed: bool,
}

impl PuzzlePair {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            a,
            b,
            a_connected: false,
            b_connected: false,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPuzzle {
    pairs: Vec<PuzzlePair>,
    active: Option<usize>,
    deadline: Duration,
    point_range: f32,
    solved: bool,
}

impl ConnectionPuzzle {
    pub fn new(pairs: impl IntoIterator<Item = (Vec2, Vec2)>, now: Duration, time_limit: Duration, point_range: f32) -> Self {
        let pairs: Vec<_> = pairs.into_iter().map(|(a, b)| PuzzlePair::new(a, b)).collect();
        info!(pairs = pairs.len(), "Connection puzzle started");
        Self {
            pairs,
            active: None,
            deadline: now + time_limit,
            point_range,
            solved: false,
        }
    }

    pub fn pairs(&self) -> &[PuzzlePair] {
        &self.pairs
    }

    /// Index of the pair whose wire is currently live.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        !self.solved && now >= self.deadline
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.deadline.saturating_sub(now)
    }

    pub fn completed_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.completed).count()
    }

    /// The closest unconnected endpoint within range of `position`.
    pub fn nearest_endpoint(&self, position: Vec2) -> Option<(usize, Endpoint)> {
        self.pairs
            .iter()
            .enumerate()
            .flat_map(|(i, pair)| {
                [
                    (!pair.a_connected).then_some((i, Endpoint::A, pair.a)),
                    (!pair.b_connected).then_some((i, Endpoint::B, pair.b)),
                ]
            })
            .flatten()
            .map(|(i, end, point)| (i, end, position.distance(point)))
            .filter(|(_, _, distance)| *distance <= self.point_range)
            .min_by(|x, y| x.2.total_cmp(&y.2))
            .map(|(i, end, _)| (i, end))
    }

    /// Activates the nearest endpoint to `position`.
    ///
    /// Returns `Ok(None)` when nothing is in range.
    pub fn activate(&mut self, position: Vec2, now: Duration) -> Result<Option<PuzzleProgress>, PuzzleRejection> {
        if self.solved || self.is_expired(now) {
            return Err(PuzzleRejection::Inactive);
        }
        let Some((index, endpoint)) = self.nearest_endpoint(position) else {
            return Ok(None);
        };

        match (self.active, endpoint) {
            (None, Endpoint::A) => {
                self.pairs[index].a_connected = true;
                self.active = Some(index);
                debug!(pair = index, "Wire started");
                Ok(Some(PuzzleProgress::Started(index)))
            }
            (None, Endpoint::B) => Err(PuzzleRejection::MustStartFromA),
            (Some(active), Endpoint::B) if active == index => {
                let pair = &mut self.pairs[index];
                pair.b_connected = true;
                pair.completed = true;
                self.active = None;
                debug!(pair = index, "Pair connected");
                if self.pairs.iter().all(|p| p.completed) {
                    self.solved = true;
                    info!("Connection puzzle solved");
                    Ok(Some(PuzzleProgress::Solved))
                } else {
                    Ok(Some(PuzzleProgress::Connected(index)))
                }
            }
            (Some(_), _) => Err(PuzzleRejection::WrongPair),
        }
    }

    /// Line segments to draw: every completed pair, plus the live wire to `player`.
    pub fn lines(&self, player: Vec2) -> Vec<(Vec2, Vec2)> {
        let mut lines: Vec<_> = self.pairs.iter().filter(|p| p.completed).map(|p| (p.a, p.b)).collect();
        if let Some(pair) = self.active.and_then(|i| self.pairs.get(i)) {
            lines.push((pair.a, player));
        }
        lines
    }
}
