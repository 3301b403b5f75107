//! Terminal demo: a live microphone driving a ring of voice-reactive torches
//! while a simulated player walks the circle collecting crystals.

use emberwake::audio::meter_line;
use emberwake::prelude::*;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const LAYOUT_PATH: &str = "demo/assets/scene.json";
const TICK: Duration = Duration::from_millis(16);
const REPORT_INTERVAL: Duration = Duration::from_millis(500);
const GRAB_REACH: f32 = 0.75;

fn main() {
    emberwake::init_logging();
    info!("starting emberwake demo");

    // A missing microphone is non-fatal: the sensor just never goes ready
    // and the torches stay at baseline.
    let capture = match MicCapture::open(&CaptureConfig::default()) {
        Ok(capture) => {
            info!(device = capture.device_name(), "microphone open");
            Some(capture)
        }
        Err(err) => {
            warn!(error = %err, "no microphone, torches will stay dark");
            None
        }
    };

    let mut sensor =
        LoudnessSensor::new(SensorConfig::default()).expect("default sensor config is valid");

    let mut world = World::new();
    let layout = SceneLayout::load(LAYOUT_PATH).unwrap_or_else(|err| {
        warn!(error = %err, "falling back to built-in layout");
        built_in_layout()
    });
    let spawned = layout
        .spawn_into(&mut world)
        .expect("demo layout is valid");
    info!(spawned, "scene ready");

    let target: i32 = layout
        .crystals
        .iter()
        .filter(|c| !c.wrong)
        .map(|c| c.value)
        .sum();
    let mut tally = CollectionTally::new(target);
    let mut feedback: Vec<CollectFeedback> = Vec::new();

    let start = Instant::now();
    let mut last = start;
    let mut last_report = start;

    loop {
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        if let Some(capture) = &capture {
            sensor.tick(capture);
        }

        // Walk the player in a slow circle through the torch ring
        let angle = start.elapsed().as_secs_f32() * 0.25;
        let listener = Vec3::new(angle.cos() * 2.0, 0.0, angle.sin() * 2.0);

        flame_update_system(&mut world, &sensor, listener, dt);

        // Pretend the player grabs any crystal within reach
        let mut grabs: Vec<GrabEvent> = Vec::new();
        for (entity, (transform, collectible)) in
            world.query::<(&Transform, &Collectible)>().iter()
        {
            if !collectible.collected && transform.position.distance(listener) < GRAB_REACH {
                grabs.push(GrabEvent { entity });
            }
        }
        collect_grab_system(&mut world, &mut tally, &grabs, &mut feedback);
        for event in feedback.drain(..) {
            info!(
                delta = event.delta,
                wrong = event.wrong,
                tally = %tally.summary(),
                "crystal grabbed"
            );
        }

        despawn_timer_system(&mut world, dt);

        if now - last_report >= REPORT_INTERVAL {
            last_report = now;
            println!(
                "mic {}  crystals {}",
                meter_line(sensor.level01(), sensor.current_db(), 30),
                tally.summary()
            );
            for (_entity, (flame, transform)) in
                world.query::<(&TorchFlame, &Transform)>().iter()
            {
                println!(
                    "  torch at ({:+.1}, {:+.1}): intensity {:.2}  particles {:>4.1}/s{}",
                    transform.position.x,
                    transform.position.z,
                    flame.light_intensity,
                    flame.particle_rate,
                    if flame.particles_playing { "" } else { " (stopped)" },
                );
            }
        }

        let remaining = world
            .query::<&Collectible>()
            .iter()
            .filter(|(_, c)| !c.collected)
            .count();
        if remaining == 0 {
            if tally.is_complete() {
                info!("all crystals collected");
            } else {
                info!(tally = %tally.summary(), "run over, some points lost to wrong crystals");
            }
            break;
        }

        std::thread::sleep(TICK);
    }
}

/// Default scene used when no layout file is present: four torches on the
/// player's path and six crystals, one of them wrong.
fn built_in_layout() -> SceneLayout {
    let mut layout = SceneLayout::default();
    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
        layout.torches.push(TorchSpec {
            position: [angle.cos() * 2.0, 0.0, angle.sin() * 2.0],
            ..Default::default()
        });
    }
    for i in 0..6 {
        let angle = (i as f32 + 0.5) * std::f32::consts::FRAC_PI_3;
        layout.crystals.push(CrystalSpec {
            position: [angle.cos() * 2.0, 0.0, angle.sin() * 2.0],
            value: 1,
            wrong: i == 3,
        });
    }
    layout
}
