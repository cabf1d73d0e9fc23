//! Jetpac entry point
//!
//! Headless runner: loads settings and levels, drives the game at a fixed
//! rate on a scheduler thread and renders frames into a draw list on the
//! main thread. Both sides share the game behind one lock.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, MutexGuard, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use jetpac::game::ClockFactory;
use jetpac::renderer::DrawList;
use jetpac::sim::{Direction, FixedStepClock, SystemClock, TickInput, World};
use jetpac::{Game, GameStatus, LevelConfig, LevelError, Settings};

/// Default settings file, overridable by the first argument
const SETTINGS_FILE: &str = "jetpac.json";

fn lock(game: &Mutex<Game>) -> MutexGuard<'_, Game> {
    // A panicked tick leaves nothing half-written that drawing could trip on
    game.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Simple scripted player: fetch whatever the ship needs next, then board
fn autopilot(world: &World) -> TickInput {
    let astro = world.astronaut();
    let pos = astro.bounds().center();
    let ship = world.ship();

    let next_pickup = world
        .parts()
        .iter()
        .find(|p| p.payload().index == ship.next_part_due())
        .map(|p| p.bounds().center())
        .or_else(|| world.fuels().first().map(|f| f.bounds().center()))
        .or_else(|| world.treasures().first().map(|t| t.bounds().center()));
    let target = if astro.is_carrying() {
        ship.drop_zone(world.platforms()).center()
    } else {
        next_pickup.unwrap_or_else(|| ship.bounds().center())
    };

    let dx = target.x - pos.x;
    let walk = match dx {
        d if d < -4 => Some(Direction::Left),
        d if d > 4 => Some(Direction::Right),
        _ => None,
    };
    TickInput {
        rising: target.y < pos.y - 4,
        shooting: !world.enemies().is_empty(),
        walk,
        drop: false,
    }
}

/// Fixed-rate update loop; reports each finished tick to the renderer
fn schedule(game: Arc<Mutex<Game>>, interval: Duration, max_ticks: Option<u64>, frames: mpsc::Sender<u64>) -> GameStatus {
    let mut next = Instant::now() + interval;
    let mut tick = 0u64;
    loop {
        let status = {
            let mut game = lock(&game);
            let input = autopilot(game.world());
            game.step(&input)
        };
        tick += 1;

        match status {
            GameStatus::LevelComplete => log::info!("Level complete at tick {tick}"),
            GameStatus::LifeLost => log::info!("Life lost at tick {tick}"),
            _ => {}
        }
        if status.is_final() || max_ticks.is_some_and(|max| tick >= max) || frames.send(tick).is_err() {
            return status;
        }

        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        next += interval;
    }
}

fn run() -> Result<ExitCode, LevelError> {
    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
    let settings = Settings::load(&settings_path)?;
    let levels = settings
        .levels
        .iter()
        .map(|path| LevelConfig::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let seed = settings.effective_seed();
    log::info!("Game initialized with seed: {}", seed);

    // A fixed seed asks for a reproducible run, so time advances per tick too
    let make_clock: ClockFactory = match settings.seed {
        Some(_) => {
            let step = settings.tick_ms;
            Box::new(move || Box::new(FixedStepClock::new(step)))
        }
        None => Box::new(|| Box::new(SystemClock::default())),
    };
    let game = Arc::new(Mutex::new(Game::new(levels, settings.lives, seed, make_clock)?));

    let (frames_tx, frames_rx) = mpsc::channel();
    let scheduler = {
        let game = Arc::clone(&game);
        let interval = Duration::from_millis(settings.tick_ms);
        let max_ticks = settings.max_ticks;
        thread::spawn(move || schedule(game, interval, max_ticks, frames_tx))
    };

    let render_every = u64::from(settings.render_every.max(1));
    let mut canvas = DrawList::new();
    for tick in frames_rx {
        if tick % render_every != 0 {
            continue;
        }
        let game = lock(&game);
        canvas.clear();
        game.draw(&mut canvas);
        log::trace!(
            "frame {tick}: {} draw calls, {} beams, fuel {}%",
            canvas.len(),
            canvas.line_count(),
            game.world().fuel_percent()
        );
    }

    let Ok(status) = scheduler.join() else {
        log::error!("Scheduler thread panicked");
        return Ok(ExitCode::FAILURE);
    };
    let game = lock(&game);
    log::info!(
        "Finished ({:?}) on level {} '{}' with score {} and {} lives left",
        status,
        game.level(),
        game.level_name(),
        game.score(),
        game.lives()
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Jetpac (headless) starting...");
    match run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
