//! The game session: one level instance and everything that happens in it.
//!
//! [`GameSession::tick`] runs the fixed per-tick order:
//!
//! 1. player input, movement and wall push-back
//! 2. sentinel wall push-back
//! 3. sentinel controllers, then perception (sight and contact)
//! 4. proximity interactions: documents, exits, the connection puzzle
//!
//! Overlays are built on demand by [`GameSession::frame`]. While the mini-game is up, steps
//! 1 to 4 are suspended and only the mini-game advances.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use smallvec::SmallVec;
use tracing::{debug, info, instrument, trace};

use crate::error::{GameError, GameResult};
use crate::events::{CaughtBy, GameEvent};
use crate::input::{Buttons, InputSnapshot, InputTracker};
use crate::level::{LevelCatalog, LevelConfig};
use crate::map::raster::{load_field, RasterSource};
use crate::map::CollisionField;
use crate::minigame::{MiniGame, MiniGamePhase};
use crate::overlay::{
    Compass, DocumentFrame, ExitFrame, Hud, MiniGameFrame, PlayerFrame, Prompt, RenderFrame, SentinelFrame,
};
use crate::player::Player;
use crate::puzzle::{ConnectionPuzzle, PuzzleProgress};
use crate::sentinel::perception::bearing;
use crate::sentinel::pursuit::PlayerTrail;
use crate::sentinel::{PlayerView, Sentinel, SentinelKind, TickContext};

/// How the current level stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Caught(CaughtBy),
    PuzzleTimeout,
    Victory,
}

impl Outcome {
    pub fn is_over(self) -> bool {
        self != Outcome::Playing
    }

    /// Designed failures; all of them lead to [`GameSession::restart`].
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Caught(_) | Outcome::PuzzleTimeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Document {
    pub position: Vec2,
    pub collected: bool,
}

/// Where the level is in its exit sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelPhase {
    /// Collecting documents; the exit unlocks once all are in.
    Infiltration,
    /// The vault door is open and the connection puzzle is running.
    Puzzle(ConnectionPuzzle),
    /// The puzzle is solved; the final exit is open.
    Escape(ConnectionPuzzle),
}

pub struct GameSession {
    catalog: LevelCatalog,
    rasters: Box<dyn RasterSource>,
    level_index: usize,
    config: LevelConfig,
    field: CollisionField,
    player: Player,
    sentinels: Vec<Sentinel>,
    documents: Vec<Document>,
    exit_locked: bool,
    phase: LevelPhase,
    minigame: Option<MiniGame>,
    /// Document whose narrative is on screen, set on every pickup.
    narrative: Option<usize>,
    trail: PlayerTrail,
    input: InputTracker,
    outcome: Outcome,
    clock: Duration,
    level_started: Duration,
    rng: SmallRng,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Starts a session on the first level of `catalog`.
    pub fn new(catalog: LevelCatalog, rasters: impl RasterSource + 'static, seed: u64) -> GameResult<Self> {
        let config = catalog.get(0)?.clone();
        let mut session = Self {
            catalog,
            rasters: Box::new(rasters),
            level_index: 0,
            player: Player::new(config.player_spawn, config.tuning.player.max_energy),
            config,
            field: CollisionField::unloaded(),
            sentinels: Vec::new(),
            documents: Vec::new(),
            exit_locked: true,
            phase: LevelPhase::Infiltration,
            minigame: None,
            narrative: None,
            trail: PlayerTrail::default(),
            input: InputTracker::default(),
            outcome: Outcome::Playing,
            clock: Duration::ZERO,
            level_started: Duration::ZERO,
            rng: SmallRng::seed_from_u64(seed),
            events: Vec::new(),
        };
        session.load_level(0)?;
        Ok(session)
    }

    /// A session that plays a single level.
    pub fn with_level(config: LevelConfig, rasters: impl RasterSource + 'static, seed: u64) -> GameResult<Self> {
        config.validate()?;
        Self::new(LevelCatalog::new(vec![config])?, rasters, seed)
    }

    #[instrument(skip(self))]
    fn load_level(&mut self, index: usize) -> GameResult<()> {
        let config = self.catalog.get(index)?.clone();

        self.field = load_field(self.rasters.as_ref(), &config.raster);
        self.player = Player::new(config.player_spawn, config.tuning.player.max_energy);
        self.sentinels = config.spawn_sentinels(&mut self.rng);
        self.documents = config
            .documents
            .iter()
            .map(|&position| Document {
                position,
                collected: false,
            })
            .collect();
        self.exit_locked = true;
        self.phase = LevelPhase::Infiltration;
        self.minigame = None;
        self.narrative = None;
        self.trail = PlayerTrail::default();
        self.input.reset();
        self.outcome = Outcome::Playing;
        self.level_started = self.clock;
        self.level_index = index;

        info!(
            level = index,
            name = %config.name,
            sentinels = self.sentinels.len(),
            documents = self.documents.len(),
            "Level loaded"
        );
        self.config = config;
        Ok(())
    }

    /// Rebuilds the current level from its config.
    pub fn restart(&mut self) -> GameResult<()> {
        info!(level = self.level_index, outcome = ?self.outcome, "Restarting level");
        self.load_level(self.level_index)
    }

    /// Moves on to the next level after a victory, wrapping to the first.
    pub fn advance(&mut self) -> GameResult<()> {
        if self.outcome != Outcome::Victory {
            return Err(GameError::InvalidState(format!(
                "cannot advance from level {} while {:?}",
                self.level_index, self.outcome
            )));
        }
        self.load_level(self.catalog.next_index(self.level_index))
    }

    /// Advances the session by `dt` using this tick's input.
    pub fn tick(&mut self, dt: Duration, input: &InputSnapshot) {
        if self.outcome.is_over() {
            return;
        }
        self.clock += dt;
        let now = self.clock;
        let pressed = self.input.pressed(input);

        if self.minigame.is_some() {
            self.tick_minigame(now, dt, input, pressed);
            return;
        }

        self.move_player(dt, input);
        if self.trail.is_recording() {
            self.trail
                .record(self.player.position, now, self.config.tuning.pursuit.trail_sample_interval);
        }

        for sentinel in &mut self.sentinels {
            sentinel.resolve_walls(&self.field, &self.config.tuning, now);
        }

        if let Some(caught) = self.update_sentinels(now, dt) {
            self.fail(Outcome::Caught(caught));
            return;
        }

        self.interact(now, pressed);
    }

    fn move_player(&mut self, dt: Duration, input: &InputSnapshot) {
        let tuning = &self.config.tuning.player;
        let direction = input.direction(tuning.dead_zone);
        let sprint = input.buttons.contains(Buttons::SPRINT);
        match self.player.step(direction, sprint, dt, &self.field, tuning) {
            Some(true) => self.events.push(GameEvent::MovementStarted),
            Some(false) => self.events.push(GameEvent::MovementStopped),
            None => {}
        }
    }

    /// Runs every sentinel controller, then checks whether any of them caught the player.
    fn update_sentinels(&mut self, now: Duration, dt: Duration) -> Option<CaughtBy> {
        let tuning = &self.config.tuning;
        let mut ctx = TickContext {
            now,
            dt,
            field: &self.field,
            player: PlayerView {
                position: self.player.position,
                moving: self.player.moving,
            },
            trail: &mut self.trail,
            tuning,
            rng: &mut self.rng,
        };

        for sentinel in &mut self.sentinels {
            sentinel.update(&mut ctx);
        }

        let player = self.player.position;
        self.sentinels.iter().find_map(|sentinel| match sentinel.kind() {
            SentinelKind::PursuitGuard => (sentinel.position().distance(player) <= tuning.pursuit.catch_range)
                .then_some(CaughtBy::Contact(sentinel.id)),
            _ => sentinel
                .can_see(&self.field, player, tuning)
                .then_some(CaughtBy::Sight(sentinel.id)),
        })
    }

    fn tick_minigame(&mut self, now: Duration, dt: Duration, input: &InputSnapshot, pressed: Buttons) {
        let Some(game) = self.minigame.as_mut() else {
            return;
        };

        game.type_chars(input.keystrokes, now);
        if pressed.contains(Buttons::INTERACT) {
            if let Some(outcome) = game.confirm(now) {
                trace!(?outcome, "Slider confirmed");
            }
        }
        game.update(now, dt);

        match game.phase() {
            MiniGamePhase::Complete => {
                let document = game.document();
                self.minigame = None;
                self.collect_document(document);
            }
            MiniGamePhase::Failed => {
                self.minigame = None;
                self.fail(Outcome::Caught(CaughtBy::MiniGameTimeout));
            }
            _ => {}
        }
    }

    fn collect_document(&mut self, document: usize) {
        let Some(doc) = self.documents.get_mut(document) else {
            return;
        };
        if doc.collected {
            return;
        }
        doc.collected = true;
        self.player.documents += 1;
        self.events.push(GameEvent::DocumentCollected {
            document,
            narrative: document,
        });
        self.narrative = Some(document);
        info!(
            document,
            collected = self.player.documents,
            total = self.documents.len(),
            narrative = self.config.narrative(document).unwrap_or_default(),
            "Document collected"
        );

        if self.exit_locked && self.documents.iter().all(|d| d.collected) {
            self.exit_locked = false;
            self.events.push(GameEvent::ExitUnlocked);
            info!("Exit unlocked");
        }
    }

    /// Proximity checks: documents, the exit and the connection puzzle.
    fn interact(&mut self, now: Duration, pressed: Buttons) {
        let position = self.player.position;
        let proximity = self.config.tuning.proximity.clone();
        let interact = pressed.contains(Buttons::INTERACT);

        match &mut self.phase {
            LevelPhase::Infiltration => {
                if interact {
                    if let Some(document) = self.nearest_document() {
                        self.start_minigame(document, now);
                        return;
                    }
                }
                if self.exit_locked {
                    return;
                }
                let distance = position.distance(self.config.exit);
                if self.config.puzzle.is_some() {
                    if distance <= proximity.phase_door {
                        self.open_vault(now);
                    }
                } else if distance <= proximity.exit {
                    self.win();
                }
            }
            LevelPhase::Puzzle(puzzle) => {
                if puzzle.is_expired(now) {
                    self.events.push(GameEvent::PuzzleExpired);
                    self.fail(Outcome::PuzzleTimeout);
                    return;
                }
                if !interact {
                    return;
                }
                match puzzle.activate(position, now) {
                    Ok(Some(progress)) => {
                        self.events.push(progress.into());
                        if progress == PuzzleProgress::Solved {
                            let solved = puzzle.clone();
                            self.phase = LevelPhase::Escape(solved);
                            self.events.push(GameEvent::ExitUnlocked);
                            info!("Final exit unlocked");
                        }
                    }
                    Ok(None) => {}
                    Err(rejection) => {
                        debug!(%rejection, "Puzzle activation rejected");
                        self.events.push(rejection.into());
                    }
                }
            }
            LevelPhase::Escape(_) => {
                let exit = self.config.puzzle.as_ref().map_or(self.config.exit, |p| p.exit);
                if position.distance(exit) <= proximity.exit {
                    self.win();
                }
            }
        }
    }

    fn nearest_document(&self) -> Option<usize> {
        let range = self.config.tuning.proximity.document;
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| !doc.collected)
            .map(|(i, doc)| (i, doc.position.distance(self.player.position)))
            .filter(|(_, distance)| *distance <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn start_minigame(&mut self, document: usize, now: Duration) {
        if self.player.moving {
            self.player.moving = false;
            self.events.push(GameEvent::MovementStopped);
        }
        let text = self.config.document_text(document).to_string();
        self.minigame = Some(MiniGame::new(document, text, self.config.tuning.minigame.clone(), now));
        self.events.push(GameEvent::MiniGameStarted { document });
    }

    /// Swaps in the opened-door map and starts the connection puzzle.
    fn open_vault(&mut self, now: Duration) {
        let Some(puzzle) = &self.config.puzzle else {
            return;
        };
        if let Some(raster) = &self.config.open_raster {
            self.field = load_field(self.rasters.as_ref(), raster);
        }
        self.phase = LevelPhase::Puzzle(ConnectionPuzzle::new(
            puzzle.pairs.iter().map(|pair| (pair.a, pair.b)),
            now,
            self.config.tuning.puzzle_time_limit,
            self.config.tuning.proximity.puzzle_point,
        ));
        self.events.push(GameEvent::SecondPhaseStarted);
        info!(level = self.level_index, "Second phase started");
    }

    fn win(&mut self) {
        self.outcome = Outcome::Victory;
        self.events.push(GameEvent::Victory);
        info!(level = self.level_index, elapsed = ?self.elapsed(), "Level complete");
    }

    fn fail(&mut self, outcome: Outcome) {
        if let Outcome::Caught(by) = outcome {
            self.events.push(GameEvent::Caught(by));
        }
        self.outcome = outcome;
        info!(level = self.level_index, ?outcome, "Level failed");
    }

    /// Takes every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn field(&self) -> &CollisionField {
        &self.field
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn sentinels(&self) -> &[Sentinel] {
        &self.sentinels
    }

    pub fn sentinels_mut(&mut self) -> &mut [Sentinel] {
        &mut self.sentinels
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn documents_collected(&self) -> usize {
        self.documents.iter().filter(|d| d.collected).count()
    }

    pub fn is_exit_locked(&self) -> bool {
        self.exit_locked
    }

    pub fn phase(&self) -> &LevelPhase {
        &self.phase
    }

    pub fn puzzle(&self) -> Option<&ConnectionPuzzle> {
        match &self.phase {
            LevelPhase::Puzzle(puzzle) | LevelPhase::Escape(puzzle) => Some(puzzle),
            LevelPhase::Infiltration => None,
        }
    }

    pub fn minigame(&self) -> Option<&MiniGame> {
        self.minigame.as_ref()
    }

    pub fn trail(&self) -> &PlayerTrail {
        &self.trail
    }

    /// Session clock.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Time spent in the current level instance.
    pub fn elapsed(&self) -> Duration {
        self.clock.saturating_sub(self.level_started)
    }

    /// Snapshot of everything a renderer needs for this tick.
    /// Narrative text of the most recently collected document.
    pub fn narrative_text(&self) -> Option<&str> {
        self.narrative.and_then(|document| self.config.narrative(document))
    }

    /// Directions from the player to nearby threats and to whatever they should do next.
    pub fn compass(&self) -> Compass {
        let origin = self.player.position;
        let proximity = &self.config.tuning.proximity;

        let threats = self
            .sentinels
            .iter()
            .map(Sentinel::position)
            .filter(|position| origin.distance(*position) <= proximity.threat_indicator)
            .map(|position| bearing(origin, position))
            .collect();

        let objective = self
            .documents
            .iter()
            .filter(|doc| !doc.collected)
            .map(|doc| (doc.position, origin.distance(doc.position)))
            .filter(|(_, distance)| *distance <= proximity.objective_indicator)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(position, _)| bearing(origin, position));

        let exit = (matches!(self.phase, LevelPhase::Infiltration) && !self.exit_locked)
            .then(|| bearing(origin, self.config.exit));

        let puzzle_points = match &self.phase {
            LevelPhase::Puzzle(puzzle) => puzzle
                .pairs()
                .iter()
                .filter(|pair| !pair.completed)
                .filter_map(|pair| match (pair.a_connected, pair.b_connected) {
                    (false, _) => Some(pair.a),
                    (true, false) => Some(pair.b),
                    (true, true) => None,
                })
                .map(|point| bearing(origin, point))
                .collect(),
            _ => SmallVec::new(),
        };

        Compass {
            threats,
            objective,
            exit,
            puzzle_points,
        }
    }

    pub fn frame(&self) -> RenderFrame {
        let tuning = &self.config.tuning;
        let now = self.clock;

        let sentinels = self
            .sentinels
            .iter()
            .map(|sentinel| {
                let pursuit = sentinel.pursuit();
                SentinelFrame {
                    id: sentinel.id,
                    kind: sentinel.kind(),
                    position: sentinel.position(),
                    facing: sentinel.facing(),
                    cone: sentinel.cone(&self.field, tuning),
                    energy: pursuit.map(|guard| guard.energy / tuning.pursuit.max_energy),
                    mode: pursuit.map(|guard| guard.mode),
                }
            })
            .collect();

        let prompt = match &self.phase {
            LevelPhase::Infiltration if self.minigame.is_none() => self.nearest_document().map(Prompt::Document),
            LevelPhase::Puzzle(puzzle) => puzzle
                .nearest_endpoint(self.player.position)
                .map(|(pair, endpoint)| Prompt::PuzzlePoint { pair, endpoint }),
            _ => None,
        };

        let exit = match &self.phase {
            LevelPhase::Escape(_) => ExitFrame {
                position: self.config.puzzle.as_ref().map_or(self.config.exit, |p| p.exit),
                locked: false,
            },
            LevelPhase::Puzzle(_) => ExitFrame {
                position: self.config.puzzle.as_ref().map_or(self.config.exit, |p| p.exit),
                locked: true,
            },
            LevelPhase::Infiltration => ExitFrame {
                position: self.config.exit,
                locked: self.exit_locked,
            },
        };

        RenderFrame {
            player: PlayerFrame {
                position: self.player.position,
                facing: self.player.facing,
                sprinting: self.player.sprinting,
                energy: self.player.energy / tuning.player.max_energy,
            },
            sentinels,
            documents: self
                .documents
                .iter()
                .map(|doc| DocumentFrame {
                    position: doc.position,
                    collected: doc.collected,
                })
                .collect(),
            exit,
            prompt,
            puzzle_lines: self
                .puzzle()
                .map(|puzzle| puzzle.lines(self.player.position))
                .unwrap_or_default(),
            compass: self.compass(),
            narrative: self.narrative_text().map(str::to_string),
            minigame: self.minigame.as_ref().map(|game| MiniGameFrame {
                document: game.document(),
                phase: game.phase(),
                progress: game.display_progress(),
                revealed: game.revealed_text().to_string(),
                slider: game.phase().is_slider().then(|| game.slider()),
                showing_miss: game.is_showing_miss(),
                remaining: game.remaining(now),
            }),
            hud: Hud {
                level: self.level_index,
                elapsed: self.elapsed(),
                documents_collected: self.documents_collected(),
                documents_total: self.documents.len(),
                puzzle_remaining: match &self.phase {
                    LevelPhase::Puzzle(puzzle) => Some(puzzle.remaining(now)),
                    _ => None,
                },
            },
        }
    }
}
