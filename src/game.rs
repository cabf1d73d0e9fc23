//! Game session: lives, level progression and the running score

use crate::error::{LevelError, Result};
use crate::level::LevelConfig;
use crate::renderer::Canvas;
use crate::sim::{Clock, TickInput, World};

/// Builds the clock for each new level world
pub type ClockFactory = Box<dyn Fn() -> Box<dyn Clock> + Send>;

/// What the last step did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Moved on to the next level
    LevelComplete,
    /// The astronaut died; the level restarts
    LifeLost,
    /// Last level completed
    Won,
    GameOver,
}

impl GameStatus {
    /// The session has ended, one way or the other
    pub fn is_final(&self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::GameOver)
    }
}

/// A full game across the configured levels
pub struct Game {
    levels: Vec<LevelConfig>,
    level_index: usize,
    world: World,
    lives: u32,
    start_lives: u32,
    score: u64,
    seed: u64,
    make_clock: ClockFactory,
    ended: Option<GameStatus>,
}

impl Game {
    pub fn new(levels: Vec<LevelConfig>, lives: u32, seed: u64, make_clock: ClockFactory) -> Result<Self> {
        let first = levels.first().ok_or(LevelError::NoLevels)?;
        let world = Self::build(first, 0, seed, &make_clock);
        let mut game = Self {
            levels,
            level_index: 0,
            world,
            lives,
            start_lives: lives,
            score: 0,
            seed,
            make_clock,
            ended: None,
        };
        game.world.play();
        Ok(game)
    }

    fn build(level: &LevelConfig, index: usize, seed: u64, make_clock: &ClockFactory) -> World {
        // Each level gets its own stream so levels replay independently
        let level_seed = seed.wrapping_add(index as u64);
        level.build_world(level_seed, make_clock())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// 1-based level number
    pub fn level(&self) -> usize {
        self.level_index + 1
    }

    pub fn level_name(&self) -> &str {
        &self.levels[self.level_index].name
    }

    /// Advance the session one tick
    pub fn step(&mut self, input: &TickInput) -> GameStatus {
        if let Some(ended) = self.ended {
            return ended;
        }

        self.world.apply_input(input);
        let delta = self.world.update();
        if delta > 0 {
            self.score += delta as u64;
        }

        if self.world.is_completed() {
            return self.next_level();
        }
        if self.world.is_over() {
            return self.lose_life();
        }
        GameStatus::Playing
    }

    fn next_level(&mut self) -> GameStatus {
        if self.level_index + 1 >= self.levels.len() {
            log::info!("final level complete, score {}", self.score);
            self.ended = Some(GameStatus::Won);
            return GameStatus::Won;
        }
        self.level_index += 1;
        self.world = Self::build(&self.levels[self.level_index], self.level_index, self.seed, &self.make_clock);
        self.world.play();
        log::info!("level {} '{}'", self.level(), self.level_name());
        GameStatus::LevelComplete
    }

    fn lose_life(&mut self) -> GameStatus {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            log::info!("game over, score {}", self.score);
            self.ended = Some(GameStatus::GameOver);
            return GameStatus::GameOver;
        }
        log::info!("life lost, {} left", self.lives);
        self.world.play();
        GameStatus::LifeLost
    }

    /// Back to the first level with a full set of lives
    pub fn restart(&mut self) {
        self.level_index = 0;
        self.lives = self.start_lives;
        self.score = 0;
        self.ended = None;
        self.world = Self::build(&self.levels[0], 0, self.seed, &self.make_clock);
        self.world.play();
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        self.world.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::tests::SAMPLE;
    use crate::sim::{FixedStepClock, WorldPhase};

    fn fixed_clock() -> ClockFactory {
        Box::new(|| Box::new(FixedStepClock::new(30)))
    }

    fn sample_levels(n: usize) -> Vec<LevelConfig> {
        (0..n)
            .map(|i| {
                let mut level = LevelConfig::from_json(SAMPLE).unwrap();
                level.name = format!("level {}", i + 1);
                level
            })
            .collect()
    }

    #[test]
    fn test_needs_levels() {
        assert!(matches!(
            Game::new(Vec::new(), 5, 1, fixed_clock()),
            Err(LevelError::NoLevels)
        ));
    }

    #[test]
    fn test_first_ticks_settle_the_level() {
        let mut game = Game::new(sample_levels(1), 5, 11, fixed_clock()).unwrap();
        assert_eq!(game.world().phase(), WorldPhase::Starting);
        for _ in 0..5 {
            assert_eq!(game.step(&TickInput::default()), GameStatus::Playing);
        }
        assert_eq!(game.world().phase(), WorldPhase::Playing);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_losing_every_life_ends_the_game() {
        let mut game = Game::new(sample_levels(1), 2, 11, fixed_clock()).unwrap();
        assert_eq!(game.lose_life(), GameStatus::LifeLost);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.world().phase(), WorldPhase::Starting);

        assert_eq!(game.lose_life(), GameStatus::GameOver);
        assert_eq!(game.lives(), 0);
        // Ended sessions stay ended
        assert_eq!(game.step(&TickInput::default()), GameStatus::GameOver);

        game.restart();
        assert_eq!(game.lives(), 2);
        assert_eq!(game.level(), 1);
        assert_eq!(game.step(&TickInput::default()), GameStatus::Playing);
    }

    #[test]
    fn test_level_progression_and_win() {
        let mut game = Game::new(sample_levels(2), 5, 3, fixed_clock()).unwrap();
        assert_eq!(game.level_name(), "level 1");

        assert_eq!(game.next_level(), GameStatus::LevelComplete);
        assert_eq!(game.level(), 2);
        assert_eq!(game.level_name(), "level 2");
        assert_eq!(game.world().phase(), WorldPhase::Starting);

        assert_eq!(game.next_level(), GameStatus::Won);
        assert!(GameStatus::Won.is_final());
        assert_eq!(game.step(&TickInput::default()), GameStatus::Won);
    }
}
