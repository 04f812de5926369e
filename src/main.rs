//! Fonda Party headless runner
//!
//! Plays a whole party with a random auto-player on the fixed timestep and
//! logs what happens. Usage: `fonda-party [seed] [config.json]`.
//! Set `RUST_LOG=info` (or `debug`) to see the session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use fonda_party::consts::SIM_DT;
use fonda_party::games::Collaborators;
use fonda_party::settings::{Channel, JsonFileStore, MemoryStore};
use fonda_party::sim::{
    ButtonState, Clock, Direction, DropAction, FixedTimestep, HeadlessSink, InputSnapshot,
};
use fonda_party::{
    CoordinatorEvent, CoordinatorPhase, MinigameCoordinator, PartyConfig, PreferenceStore,
    Settings,
};

/// Host frame rate of the simulated session
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this much real (unpaused or paused) time
const MAX_SESSION_SECS: f32 = 900.0;
const PREFERENCES_FILE: &str = "fonda_party_prefs.json";

/// Mashes buttons at random
struct AutoPlayer {
    rng: Pcg32,
    axis: Vec2,
    holding: bool,
}

impl AutoPlayer {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            axis: Vec2::ZERO,
            holding: false,
        }
    }

    fn next_input(&mut self) -> InputSnapshot {
        let rng = &mut self.rng;
        let mut input = InputSnapshot::default();

        // Wandering stick, pulled back toward center
        let nudge = Vec2::new(rng.random_range(-0.15..=0.15), rng.random_range(-0.15..=0.15));
        self.axis = ((self.axis - self.axis * 0.05) + nudge).clamp(Vec2::splat(-1.0), Vec2::ONE);
        input.axis = self.axis;

        if rng.random_bool(0.04) {
            input.direction = Some(Direction::from_index(rng.random_range(0..4)));
            input.any_pressed = true;
        }

        if rng.random_bool(0.02) {
            self.holding = !self.holding;
            input.confirm = if self.holding {
                ButtonState::press()
            } else {
                ButtonState::release()
            };
            input.any_pressed |= self.holding;
        } else if self.holding {
            input.confirm = ButtonState::hold();
        }

        if rng.random_bool(0.01) {
            input.choice = Some(rng.random_range(0..4));
        }
        if rng.random_bool(0.02) {
            input.drop = Some(DropAction {
                item: rng.random_range(0..5),
                bin: Some(rng.random_range(0..3)),
            });
        }
        input.pause = rng.random_bool(0.0005);
        input
    }
}

fn load_config(path: Option<&String>) -> PartyConfig {
    let Some(path) = path else {
        return PartyConfig::default();
    };
    match PartyConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default party config: {}", e);
            PartyConfig::default()
        }
    }
}

fn open_preferences() -> Box<dyn PreferenceStore> {
    match JsonFileStore::open(PREFERENCES_FILE) {
        Ok(store) => {
            log::info!("Preferences at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("Preferences unavailable ({}), keeping them in memory", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn log_event(event: &CoordinatorEvent) {
    match event {
        CoordinatorEvent::Won { name } => log::info!("WON {}", name),
        CoordinatorEvent::Lost { name, lives_left } => {
            log::info!("LOST {} ({} lives left)", name, lives_left)
        }
        CoordinatorEvent::GameOver => log::info!("GAME OVER"),
        CoordinatorEvent::InstructionsShown { text } => log::info!("\"{}\"", text),
        other => log::debug!("{:?}", other),
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Fonda Party (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let seed = args
        .get(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as u64)
        });
    log::info!("Session seed: {}", seed);

    let config = load_config(args.get(2));
    let store = open_preferences();
    let settings = Settings::load(store.as_ref());
    log::info!(
        "Mixer levels: music {:.1} dB, sound {:.1} dB",
        settings.decibels(Channel::Music),
        settings.decibels(Channel::Sound)
    );

    let sink = HeadlessSink::shared();
    let collaborators = Collaborators::with_sink(sink.clone());
    let mut coordinator = MinigameCoordinator::with_collaborators(config, collaborators, seed);
    let mut player = AutoPlayer::new(seed.wrapping_add(1));
    let mut clock = Clock::new();
    let mut timestep = FixedTimestep::new(SIM_DT);

    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut real_time = 0.0f32;
    while coordinator.phase() != CoordinatorPhase::GameOver && real_time < MAX_SESSION_SECS {
        real_time += FRAME_DT;
        let steps = timestep.accumulate(FRAME_DT);

        let mut input = player.next_input();
        for _ in 0..steps {
            if input.pause {
                coordinator.toggle_pause(&mut clock);
            }
            clock.advance(SIM_DT);
            coordinator.tick(&clock, &input);
            // One-shot inputs only count for the first substep
            input.clear_one_shots();
        }

        for event in coordinator.drain_events() {
            match event {
                CoordinatorEvent::Won { .. } => wins += 1,
                CoordinatorEvent::Lost { .. } => losses += 1,
                _ => {}
            }
            log_event(&event);
        }
    }

    log::info!(
        "Session over after {:.1}s of game time: {} won, {} lost, {} entities spawned",
        clock.now(),
        wins,
        losses,
        sink.borrow().spawned()
    );
}
