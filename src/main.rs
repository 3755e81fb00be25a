//! Nightmare Maze Headless Demo
//!
//! Plays one run with a scripted lever, exits to the menu halfway and
//! continues from a saved session, then verifies determinism by replaying
//! the recorded commands.
//!
//! ```text
//! nightmare-maze [seed words...]
//! NIGHTMARE_MAZE_CONFIG=tuning.json RUST_LOG=debug nightmare-maze red clown laugh
//! ```

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nightmare_maze::{
    random_seed_text, replay, EngineConfig, GameSessionStore, GraphicsQuality, LeverCommand,
    MazeGenerator, SavedSession, TraversalEventData, TraversalPhase, FRAME_RATE, VERSION,
};

/// Longest demo run (two minutes of frames).
const MAX_FRAMES: u32 = FRAME_RATE * 120;

/// Frame at which the demo exits to the menu and continues.
const EXIT_FRAME: u32 = FRAME_RATE * 5;

fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Nightmare Maze v{}", VERSION);

    let config = load_config()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed_text = if args.is_empty() {
        random_seed_text(&mut rand::thread_rng())
    } else {
        args.join(" ")
    };

    demo_run(config, &seed_text)
}

/// Read `NIGHTMARE_MAZE_CONFIG` if set, otherwise use defaults.
fn load_config() -> Result<EngineConfig> {
    match std::env::var("NIGHTMARE_MAZE_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            let config = EngineConfig::from_json_str(&json)
                .with_context(|| format!("loading config {}", path))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        Err(_) => Ok(EngineConfig::default()),
    }
}

/// Play a scripted run and check that it replays bit for bit.
fn demo_run(config: EngineConfig, seed_text: &str) -> Result<()> {
    info!("=== Starting Demo Run ===");

    let mut store = GameSessionStore::new(config.clone())?;
    store.set_graphics_quality(GraphicsQuality::Low);
    store.start_new_game(seed_text)?;

    let seed = store.seed().context("seed missing after new game")?.clone();
    info!("Seed: \"{}\" ({:016x})", seed, seed.to_numeric().value());

    let mut commands = Vec::new();
    let dt = 1.0 / FRAME_RATE as f64;

    for frame in 0..MAX_FRAMES {
        if store.is_game_over() {
            break;
        }

        if frame == EXIT_FRAME {
            // Exit, persist, reload, continue
            store.exit_to_menu();
            let bytes = store
                .saved_session()
                .context("nothing to save after exit")?
                .to_bytes()?;
            info!("Saved session: {} bytes", bytes.len());

            store.restore_saved(SavedSession::from_bytes(&bytes)?)?;
            store.continue_game()?;
        }

        if store.phase() == Some(TraversalPhase::AtFork) {
            let choices = store.fork_choices();
            let pick = store
                .engine()
                .and_then(|engine| engine.next_passable_choice(frame as usize))
                .context("every corridor at the fork is blockaded")?;
            info!(
                "Fork with {} options, taking {}",
                choices.len(),
                choices[pick].heading.label()
            );
            let event = store.choose_fork(pick)?;
            if let TraversalEventData::ForkChosen { item_spent: true, .. } = event.data {
                info!("Blockade passed, {} items left", store.items_held());
            }
            commands.push(LeverCommand::Choose(pick));
        }

        // Ease off the lever for a moment every three seconds
        let held = if frame % (FRAME_RATE * 3) < 20 { 0.3 } else { 1.0 };
        let result = store.integrate_lever(held, dt)?;
        commands.push(LeverCommand::Lever { held, elapsed: dt });

        for event in &result.events {
            match &event.data {
                TraversalEventData::CollectibleFound { cell } => {
                    info!("Collectible at {} (fear {:.0})", cell, store.fear());
                }
                TraversalEventData::VillainEncountered { cell } => {
                    info!("Villain at {} (fear {:.0})", cell, store.fear());
                }
                TraversalEventData::Won { depth, distance } => {
                    info!("Escaped at depth {} after {:.1} units", depth, distance);
                }
                TraversalEventData::Lost { reason } => {
                    info!("Lost: {:?}", reason);
                }
                _ => {}
            }
        }
    }

    // Print final results
    info!("=== Run Results ===");
    let engine = store.engine().context("run detached at end of demo")?;
    info!("Phase: {}", engine.phase().tag());
    info!("Cells visited: {}", store.cells_visited());
    info!("Items collected: {}", store.items_collected());
    info!("Distance: {:.1}", store.total_distance());
    info!("Commands recorded: {}", commands.len());

    let hash = engine.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let maze = MazeGenerator::from_seed(&seed, config.maze.clone());
    let (replayed, _) = replay(maze, config.traversal, &commands)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
