use crate::ai::Outlook;
use crate::config::Tuning;
use crate::error::MazeResult;
use crate::grid::{DistanceField, Grid};
use crate::layout::{AdversarySpawn, MazeLayout};
use crate::motion::Motion;
use crate::power::{PowerChange, PowerState};
use crate::rng::{RandomSource, Rng};
use crate::types::{
    AdversaryBehavior, AdversaryView, Consumed, Direction, Mover, Outcome, PlayerView,
    RoundEvent, RoundSnapshot, Vec2, Vulnerability,
};

mod collision;

#[derive(Clone, Debug)]
struct PlayerInternal {
    motion: Motion,
    queued_dir: Direction,
    spawn: Vec2,
}

impl PlayerInternal {
    fn new(spawn: Vec2) -> Self {
        Self {
            motion: Motion::at(spawn),
            queued_dir: Direction::None,
            spawn,
        }
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            x: self.motion.pos.x,
            y: self.motion.pos.y,
            dir: self.motion.dir,
            queued_dir: self.queued_dir,
            progress: self.motion.progress,
        }
    }
}

#[derive(Clone, Debug)]
struct AdversaryInternal {
    id: usize,
    behavior: AdversaryBehavior,
    vulnerability: Vulnerability,
    motion: Motion,
    home: Vec2,
    home_field: DistanceField,
}

impl AdversaryInternal {
    fn new(id: usize, spawn: &AdversarySpawn, grid: &Grid) -> Self {
        Self {
            id,
            behavior: spawn.behavior,
            vulnerability: Vulnerability::Normal,
            motion: Motion::at(spawn.home),
            home: spawn.home,
            home_field: grid.distance_field(spawn.home, Mover::Adversary),
        }
    }

    fn view(&self) -> AdversaryView {
        AdversaryView {
            id: self.id,
            x: self.motion.pos.x,
            y: self.motion.pos.y,
            dir: self.motion.dir,
            progress: self.motion.progress,
            behavior: self.behavior,
            vulnerability: self.vulnerability,
            home: self.home,
        }
    }

    fn is_home(&self) -> bool {
        self.motion.pos == self.home && self.motion.is_aligned()
    }
}

/// Owns one round: grid, entities, power state and the score.
///
/// The random source is only consulted by wandering adversaries, so a round is
/// fully reproducible from its seed and input sequence.
#[derive(Clone, Debug)]
pub struct RoundController<R: RandomSource = Rng> {
    tuning: Tuning,
    initial_grid: Grid,
    grid: Grid,
    rng: R,
    player: PlayerInternal,
    adversaries: Vec<AdversaryInternal>,
    power: PowerState,
    events: Vec<RoundEvent>,

    score: u32,
    lives: u32,
    level: u32,
    tick_counter: u64,
    outcome: Outcome,
    frozen: Option<RoundSnapshot>,
}

impl RoundController<Rng> {
    pub fn new(layout: &MazeLayout, tuning: Tuning, seed: u32) -> MazeResult<Self> {
        Self::with_random(layout, tuning, Rng::new(seed))
    }
}

impl<R: RandomSource> RoundController<R> {
    pub fn with_random(layout: &MazeLayout, tuning: Tuning, rng: R) -> MazeResult<Self> {
        let tuning = tuning.normalized();
        let grid = Grid::new(layout)?;
        let adversaries = layout
            .adversaries
            .iter()
            .enumerate()
            .map(|(id, spawn)| AdversaryInternal::new(id, spawn, &grid))
            .collect();

        Ok(Self {
            power: PowerState::new(&tuning),
            lives: tuning.lives,
            tuning,
            initial_grid: grid.clone(),
            grid,
            rng,
            player: PlayerInternal::new(layout.player_start),
            adversaries,
            events: Vec::new(),
            score: 0,
            level: 1,
            tick_counter: 0,
            outcome: Outcome::InProgress,
            frozen: None,
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Advances the round by one tick. Once the round is won or lost this
    /// returns the frozen final snapshot without touching any state.
    pub fn tick(&mut self, input: Direction) -> RoundSnapshot {
        if let Some(frozen) = &self.frozen {
            return frozen.clone();
        }
        self.events.clear();
        self.tick_counter += 1;

        self.update_power();
        let player_before = self.player.motion.pos;
        let adversaries_before: Vec<Vec2> =
            self.adversaries.iter().map(|a| a.motion.pos).collect();

        self.update_player(input);
        if !self.outcome.is_terminal() && !self.resolve_contacts(None) {
            self.update_adversaries();
            self.resolve_contacts(Some((player_before, adversaries_before.as_slice())));
        }

        let snapshot = self.snapshot();
        if self.outcome.is_terminal() {
            self.frozen = Some(snapshot.clone());
        }
        snapshot
    }

    /// Fresh round on the same layout and tuning. The random source keeps its state.
    pub fn restart(&mut self) -> RoundSnapshot {
        self.grid = self.initial_grid.clone();
        self.score = 0;
        self.lives = self.tuning.lives;
        self.level = 1;
        self.tick_counter = 0;
        self.outcome = Outcome::InProgress;
        self.frozen = None;
        self.events.clear();
        self.reset_positions();
        self.snapshot()
    }

    /// Refills the maze after a win, keeping score and lives. No-op in any other state.
    pub fn next_level(&mut self) -> RoundSnapshot {
        if self.outcome != Outcome::Won {
            return self.frozen.clone().unwrap_or_else(|| self.snapshot());
        }
        self.grid = self.initial_grid.clone();
        self.level += 1;
        self.outcome = Outcome::InProgress;
        self.frozen = None;
        self.events.clear();
        self.reset_positions();
        self.events.push(RoundEvent::LevelStarted { level: self.level });
        self.snapshot()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            tick: self.tick_counter,
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.tiles(),
            player: self.player.view(),
            adversaries: self.adversaries.iter().map(AdversaryInternal::view).collect(),
            score: self.score,
            combo: self.power.combo(),
            power_timer: self.power.timer(),
            remaining_pickups: self.grid.remaining_pickup_count(),
            lives: self.lives,
            level: self.level,
            outcome: self.outcome,
            events: self.events.clone(),
        }
    }

    fn update_power(&mut self) {
        if self.power.tick() == Some(PowerChange::Expired) {
            for adversary in &mut self.adversaries {
                adversary.vulnerability = adversary.vulnerability.expired();
            }
            self.events.push(RoundEvent::PowerEnded);
        }
    }

    fn update_player(&mut self, input: Direction) {
        if input != Direction::None {
            self.player.queued_dir = input;
        }
        let step = self.player.motion.advance(
            &self.grid,
            Mover::Player,
            self.player.queued_dir,
            self.tuning.player_speed,
        );
        if step.honored {
            self.player.queued_dir = Direction::None;
        }
        if step.arrived {
            self.apply_pickup(self.player.motion.pos);
        }
    }

    fn apply_pickup(&mut self, pos: Vec2) {
        match self.grid.consume_pickup(pos) {
            Consumed::None => return,
            Consumed::Score => {
                self.score = self.score.saturating_add(self.tuning.pickup_score);
                self.events.push(RoundEvent::PickupEaten {
                    x: pos.x,
                    y: pos.y,
                    points: self.tuning.pickup_score,
                });
            }
            Consumed::PowerScore => {
                self.score = self.score.saturating_add(self.tuning.power_pickup_score);
                let change = self.power.activate();
                for adversary in &mut self.adversaries {
                    adversary.vulnerability = adversary.vulnerability.empowered();
                }
                let (x, y) = (pos.x, pos.y);
                let points = self.tuning.power_pickup_score;
                let ticks = self.power.timer();
                self.events.push(match change {
                    PowerChange::Refreshed => RoundEvent::PowerRefreshed {
                        x,
                        y,
                        points,
                        ticks,
                    },
                    _ => RoundEvent::PowerStarted {
                        x,
                        y,
                        points,
                        ticks,
                    },
                });
            }
        }

        if self.grid.remaining_pickup_count() == 0 {
            self.outcome = Outcome::Won;
            self.events.push(RoundEvent::RoundWon);
        }
    }

    fn update_adversaries(&mut self) {
        let outlook = Outlook {
            grid: &self.grid,
            player: self.player.motion.pos,
            flee_when_vulnerable: self.tuning.pursuer_flees_when_vulnerable,
        };

        for adversary in &mut self.adversaries {
            if adversary.vulnerability == Vulnerability::Eaten && adversary.is_home() {
                adversary.vulnerability = Vulnerability::Normal;
                self.events.push(RoundEvent::AdversaryHome { id: adversary.id });
            }

            let speed = if adversary.vulnerability == Vulnerability::Vulnerable {
                self.tuning.vulnerable_speed
            } else {
                self.tuning.adversary_speed
            };
            let requested = if adversary.motion.is_aligned() {
                adversary.behavior.decide(
                    adversary.vulnerability,
                    &adversary.motion,
                    &adversary.home_field,
                    &outlook,
                    &mut self.rng,
                )
            } else {
                adversary.motion.dir
            };
            adversary
                .motion
                .advance(outlook.grid, Mover::Adversary, requested, speed);

            if adversary.vulnerability == Vulnerability::Eaten && adversary.is_home() {
                adversary.vulnerability = Vulnerability::Normal;
                self.events.push(RoundEvent::AdversaryHome { id: adversary.id });
            }
        }
    }

    fn reset_positions(&mut self) {
        self.player = PlayerInternal::new(self.player.spawn);
        for adversary in &mut self.adversaries {
            adversary.motion = Motion::at(adversary.home);
            adversary.vulnerability = Vulnerability::Normal;
        }
        self.power.reset();
    }
}
