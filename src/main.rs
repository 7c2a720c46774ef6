//! Helm minigames headless driver
//!
//! Plays each minigame with a scripted bot on a synthetic 60 Hz clock and
//! reports the outcome. Useful for balance checks on new tuning files.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use glam::{Vec2, Vec3};
use serde::Serialize;

use helm_minigames::sim::{
    BilgeSimulation, CargoSimulation, CargoState, Minigame, TorpedoSimulation, TorpedoState,
};
use helm_minigames::tuning::Tuning;

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameChoice {
    Bilge,
    Cargo,
    Torpedo,
    All,
}

#[derive(Debug, Parser)]
#[command(name = "helm-autoplay", about = "Run the helm minigames with scripted input")]
struct Args {
    /// Which minigame to play
    #[arg(long, value_enum, default_value_t = GameChoice::All)]
    game: GameChoice,
    /// Seed for projectile spawns and field layout (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON tuning file; missing fields keep their defaults
    #[arg(long)]
    tuning: Option<PathBuf>,
    #[arg(long, default_value_t = 400.0)]
    width: f32,
    #[arg(long, default_value_t = 800.0)]
    height: f32,
    /// Give up after this many frames
    #[arg(long, default_value_t = 3600)]
    max_frames: u32,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    let tuning = Tuning::from_json(&text)
        .with_context(|| format!("parsing tuning file {}", path.display()))?;
    Ok(tuning.sanitized())
}

/// Drive a minigame until it ends or the frame budget runs out
fn drive<G, F>(game: &mut G, args: &Args, mut bot: F) -> Result<(G::State, u32)>
where
    G: Minigame,
    F: FnMut(&G::State) -> G::Input,
{
    game.initialize(args.width, args.height, 0.0);
    if !game.status().is_running() {
        bail!("viewport {}x{} rejected", args.width, args.height);
    }
    let mut frame = 0;
    while game.status().is_running() && frame < args.max_frames {
        frame += 1;
        let input = bot(game.state());
        game.step(input, frame as f64 * FRAME_MS);
    }
    Ok((game.state().clone(), frame))
}

fn report<S: Serialize>(
    name: &str,
    status: impl std::fmt::Debug,
    frames: u32,
    state: &S,
    json: bool,
) -> Result<()> {
    log::info!("{}: {:?} after {} frames", name, status, frames);
    if json {
        println!("{}", serde_json::to_string_pretty(state).context("serializing snapshot")?);
    }
    Ok(())
}

/// Shake every ninth frame (150 ms, just past the pump cooldown)
fn play_bilge(args: &Args, tuning: &Tuning) -> Result<()> {
    const RESTING: Vec3 = Vec3::new(0.0, 0.0, 9.81);
    const SHAKE: Vec3 = Vec3::new(18.0, 6.0, 9.81);

    let mut game = BilgeSimulation::new(tuning.bilge.clone());
    let mut frame = 0u32;
    let (state, frames) = drive(&mut game, args, |_| {
        frame += 1;
        if frame % 9 == 0 { SHAKE } else { RESTING }
    })?;
    report("bilge", state.status, frames, &state, args.json)
}

/// Lean back toward the center and away from the closest incoming projectile
fn cargo_bot(state: &CargoState) -> Vec2 {
    let mut tilt = (state.screen_center - state.cargo_position) * 0.01;
    if let Some(threat) = state
        .projectiles
        .iter()
        .min_by(|a, b| {
            let da = a.position.distance_squared(state.cargo_position);
            let db = b.position.distance_squared(state.cargo_position);
            da.total_cmp(&db)
        })
        .filter(|p| p.position.distance(state.cargo_position) < 160.0)
    {
        // Sidestep perpendicular to its flight path
        let side = threat.velocity.perp().normalize_or_zero();
        let away = state.cargo_position - threat.position;
        let dodge = if side.dot(away) >= 0.0 { side } else { -side };
        tilt += dodge * 2.0;
    }
    tilt.clamp_length_max(3.0)
}

fn play_cargo(args: &Args, tuning: &Tuning) -> Result<()> {
    let mut game = match args.seed {
        Some(seed) => CargoSimulation::with_seed(tuning.cargo.clone(), seed),
        None => CargoSimulation::new(tuning.cargo.clone()),
    };
    let (state, frames) = drive(&mut game, args, cargo_bot)?;
    report("cargo", (state.status, state.loss), frames, &state, args.json)
}

/// Aim for the gap in the next band above, then for the target
fn torpedo_bot(state: &TorpedoState, width: f32) -> f32 {
    let position = state.torpedo_position;
    let band_y = state
        .walls
        .iter()
        .filter(|w| w.min.y < position.y)
        .map(|w| w.min.y)
        .fold(f32::NEG_INFINITY, f32::max);

    let aim_x = if band_y.is_finite() {
        let mut gap_start = 0.0f32;
        let mut gap_end = width;
        for wall in state.walls.iter().filter(|w| w.min.y == band_y) {
            if wall.min.x <= 0.0 {
                gap_start = gap_start.max(wall.max.x);
            } else {
                gap_end = gap_end.min(wall.min.x);
            }
        }
        (gap_start + gap_end) / 2.0
    } else {
        state.target_position.x
    };
    ((aim_x - position.x) * 0.1).clamp(-1.5, 1.5)
}

fn play_torpedo(args: &Args, tuning: &Tuning) -> Result<()> {
    let mut game = match args.seed {
        Some(seed) => TorpedoSimulation::with_seed(tuning.torpedo.clone(), seed),
        None => TorpedoSimulation::new(tuning.torpedo.clone()),
    };
    let width = args.width;
    let (state, frames) = drive(&mut game, args, |s| torpedo_bot(s, width))?;
    report("torpedo", (state.status, state.loss), frames, &state, args.json)
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let tuning = load_tuning(args.tuning.as_ref())?;
    log::info!(
        "helm-autoplay: {:?} on {}x{}, seed {:?}",
        args.game,
        args.width,
        args.height,
        args.seed
    );

    if matches!(args.game, GameChoice::Bilge | GameChoice::All) {
        play_bilge(&args, &tuning)?;
    }
    if matches!(args.game, GameChoice::Cargo | GameChoice::All) {
        play_cargo(&args, &tuning)?;
    }
    if matches!(args.game, GameChoice::Torpedo | GameChoice::All) {
        play_torpedo(&args, &tuning)?;
    }
    Ok(())
}
