//! Sparkfield headless driver
//!
//! Loads a scene (or the built-in demo), steps it frame by frame and logs
//! particle counts. Rendering is left to whatever consumes the buffers.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use sparkfield::Scene;
#[cfg(not(target_arch = "wasm32"))]
use sparkfield::consts::{MAX_SUBSTEPS, SIM_DT};
#[cfg(not(target_arch = "wasm32"))]
use sparkfield::sim::{FrameClock, Simulation, TickStats};

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "sparkfield")]
#[command(about = "Run a particle emitter scene headlessly and log particle counts", long_about = None)]
#[command(version)]
struct Cli {
    /// Scene JSON file; runs the built-in demo when omitted
    scene: Option<PathBuf>,

    /// Pace frames against the wall clock using fixed simulation ticks
    #[arg(long)]
    realtime: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sparkfield (native) starting...");

    let scene = match &cli.scene {
        Some(path) => match Scene::load(path) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No scene given, running built-in demo");
            Scene::demo()
        }
    };

    let mut sim = scene.build();
    let started = Instant::now();
    let totals = if cli.realtime {
        run_realtime(&scene, &mut sim)
    } else {
        run_fixed(&scene, &mut sim)
    };

    log::info!(
        "Finished {} frames ({} ticks) in {:.2?}: {} spawned, {} expired, {} dropped, {} active",
        scene.frames,
        sim.time_ticks,
        started.elapsed(),
        totals.spawned,
        totals.expired,
        totals.dropped,
        sim.registry.active_count()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn apply_scheduled(scene: &Scene, sim: &mut Simulation, frame: u32) {
    for command in scene.commands_at(frame) {
        if !sim.apply(command) {
            log::warn!("Frame {}: command {:?} had no target", frame, command);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn report(sim: &Simulation, frame: u32) {
    let counts = sim.registry.map(|e| e.active_count());
    log::info!(
        "Frame {:>5}: {} active {:?}",
        frame,
        sim.registry.active_count(),
        counts
    );
}

/// One tick of `scene.dt` per frame, as fast as possible
#[cfg(not(target_arch = "wasm32"))]
fn run_fixed(scene: &Scene, sim: &mut Simulation) -> TickStats {
    let frames_per_report = ((1.0 / scene.dt).round() as u32).max(1);
    let mut totals = TickStats::default();
    for frame in 0..scene.frames {
        apply_scheduled(scene, sim, frame);
        totals += sim.step(scene.dt);
        if (frame + 1) % frames_per_report == 0 {
            report(sim, frame + 1);
        }
    }
    totals
}

/// Frames paced by the wall clock; ticks are fixed `SIM_DT` steps
#[cfg(not(target_arch = "wasm32"))]
fn run_realtime(scene: &Scene, sim: &mut Simulation) -> TickStats {
    let frame_time = Duration::try_from_secs_f32(scene.dt).unwrap_or(Duration::ZERO);
    let frames_per_report = ((1.0 / scene.dt).round() as u32).max(1);
    let mut clock = FrameClock::new(SIM_DT, MAX_SUBSTEPS);
    let mut totals = TickStats::default();
    let mut last = Instant::now();

    for frame in 0..scene.frames {
        apply_scheduled(scene, sim, frame);

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f32();
        last = now;
        for _ in 0..clock.advance(elapsed) {
            totals += sim.step(clock.step());
        }

        if (frame + 1) % frames_per_report == 0 {
            report(sim, frame + 1);
        }

        let spent = now.elapsed();
        if spent < frame_time {
            std::thread::sleep(frame_time - spent);
        }
    }
    totals
}


#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm; nothing to run here
}
