//! Rondo entry point
//!
//! Headless demo driver: seeds a simulation, registers a few example rules,
//! advances it in wall-clock-sized slices, then rewinds and replays a
//! stretch to show the snapshot history at work.

use std::process::ExitCode;

use log::{error, info};

use rondo::consts::SIM_DT;
use rondo::{Arena, Settings, SettingsError, SpawnOptions, Stepper};

fn main() -> ExitCode {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);

    match run(seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("configuration rejected: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(seed: u64) -> Result<(), SettingsError> {
    let settings = Settings::default();
    let arena = Arena::default();
    let mut stepper = Stepper::new(seed, settings, arena)?;
    info!("seed {}, engine {}", seed, stepper.state().engine.as_str());

    // Example rules: tag escapees red on the way out, slow both parties of
    // every collision slightly
    stepper.handlers_mut().set_on_exit(|ball| {
        ball.set_color("red");
        Ok(())
    });
    stepper.handlers_mut().set_on_ball_collision(|a, b| {
        a.scale_speed(0.99);
        b.scale_speed(0.99);
        Ok(())
    });

    stepper.spawn(12, &SpawnOptions::default());

    // Ten simulated seconds in 60 Hz slices
    let slice = 1.0 / 60.0;
    for _ in 0..600 {
        stepper.advance(slice);
    }
    info!(
        "frame {}: {} balls live, score {}",
        stepper.frame(),
        stepper.state().live_count(),
        stepper.state().score
    );

    // Rewind halfway and replay; the run is deterministic, so the replayed
    // half lands in exactly the same place
    let end_frame = stepper.frame();
    let target = end_frame / 2;
    let frame = match stepper.restore_state(target) {
        Some(frame) => frame,
        None => {
            // Evicted; fall back to the nearest stored frame, explicitly
            let nearest = stepper
                .closest_available_frame(target)
                .expect("history is never empty after a run");
            info!("frame {} evicted, restoring {} instead", target, nearest);
            stepper
                .restore_state(nearest)
                .expect("closest frame restores")
        }
    };
    info!("rewound to frame {}", frame);

    while stepper.frame() < end_frame {
        stepper.advance(SIM_DT);
    }

    let stats = stepper.history_stats();
    info!(
        "replayed to frame {}: score {}, history holds {} frames ({:?})",
        stepper.frame(),
        stepper.state().score,
        stats.total_frames,
        stats.frame_range
    );

    Ok(())
}
