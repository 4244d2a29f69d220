//! The top-level game session.
//!
//! A `GameSession` owns the one `Engine` of a table and is the only thing a
//! front end holds on to. Interactive front ends call `tick` from their
//! frame loop and forward player input through `submit`; headless runs use
//! `play_until_game_over` or `play_games`.

use crate::ai::DecisionPolicy;
use crate::cards::CardCatalog;
use crate::core::{DecisionRecord, GameConfig, PlayerId, Result};
use crate::decision::{DecisionId, DecisionKind, GameOption};
use crate::events::GameEvent;
use crate::rules::{Engine, GameResult};

/// Default cap on resolutions per headless game.
pub const DEFAULT_MAX_STEPS: usize = 20_000;

/// Summary of one headless game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    /// `None` if the step cap was hit first.
    pub result: Option<GameResult>,
    /// Decisions resolved during the game.
    pub steps: usize,
    /// Day of the siege clock when the game stopped.
    pub day: u32,
}

#[derive(Debug)]
pub struct GameSession {
    engine: Engine,
}

impl GameSession {
    /// A table with the standard catalog and the heuristic AI.
    pub fn new(config: GameConfig) -> Result<Self> {
        Ok(Self {
            engine: Engine::standard(config)?,
        })
    }

    /// A table with a custom catalog and policy.
    pub fn with_parts(
        config: GameConfig,
        catalog: Box<dyn CardCatalog>,
        policy: Box<dyn DecisionPolicy>,
    ) -> Result<Self> {
        Ok(Self {
            engine: Engine::new(config, catalog, policy)?,
        })
    }

    #[must_use]
    pub fn from_engine(engine: Engine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    #[must_use]
    pub fn into_engine(self) -> Engine {
        self.engine
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.engine.state().result.as_ref()
    }

    /// Advance the wall clock. See [`Engine::tick`].
    pub fn tick(&mut self, dt: f32) -> Result<Option<DecisionRecord>> {
        self.engine.tick(dt)
    }

    /// Forward a human choice for the presented decision.
    pub fn submit(&mut self, decision: DecisionId, option: GameOption, argument: i32) -> Result<DecisionRecord> {
        self.engine.submit_decision(decision, option, argument)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.engine.drain_events()
    }

    /// Resolve decisions until the current game ends or `max_steps`
    /// resolutions have happened. Human seats take their defaults.
    ///
    /// A game that is already over returns its result without resolving
    /// anything; the pending NewGame decision is left for the caller.
    pub fn play_until_game_over(&mut self, max_steps: usize) -> Result<GameOutcome> {
        let mut steps = 0;
        while !self.engine.state().is_game_over() && steps < max_steps {
            self.engine.step()?;
            steps += 1;
        }
        let state = self.engine.state();
        if state.result.is_none() {
            tracing::warn!("game stopped after {} steps without a result", steps);
        } else {
            tracing::info!("game over after {} steps on day {}", steps, state.clock.day);
        }
        Ok(GameOutcome {
            result: state.result.clone(),
            steps,
            day: state.clock.day,
        })
    }

    /// Play `count` games back to back on this table, accepting NewGame
    /// between them.
    pub fn play_games(&mut self, count: usize, max_steps: usize) -> Result<Vec<GameOutcome>> {
        let mut outcomes = Vec::with_capacity(count);
        for game in 0..count {
            if game > 0 {
                self.start_next_game()?;
            }
            let outcome = self.play_until_game_over(max_steps)?;
            let finished = outcome.result.is_some();
            outcomes.push(outcome);
            if !finished {
                break;
            }
        }
        Ok(outcomes)
    }

    /// Resolve the pending NewGame decision.
    fn start_next_game(&mut self) -> Result<()> {
        let decision = self.engine.present()?;
        if decision.kind != DecisionKind::NewGame {
            return Ok(());
        }
        let id = decision.id;
        self.engine.submit_decision(id, GameOption::NewGame, 0)?;
        Ok(())
    }

    /// Points of every seat, in seat order.
    #[must_use]
    pub fn scores(&self) -> Vec<(PlayerId, i32)> {
        self.engine
            .state()
            .players
            .iter()
            .map(|(id, player)| (id, player.points()))
            .collect()
    }
}
