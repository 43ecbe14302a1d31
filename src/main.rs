//! Jiggle Sim headless entry point
//!
//! Drives a few scripted entities through the fixed-timestep loop at an uneven
//! frame rate and logs the interpolated output.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::sync::Arc;

    use jiggle_sim::sim::{ArmorStats, ChestItem, CustomData, EntityConfig, EntityTick, GearPayload, PhysicsDriver};
    use jiggle_sim::{EntityCache, PlayerRegistry, Settings};
    use uuid::Uuid;

    env_logger::init();
    log::info!("Jiggle Sim (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    let players = Arc::new(PlayerRegistry::new());
    let player_id = Uuid::new_v4();
    players.insert(EntityConfig::new_player(player_id, &settings));

    // The player stamps their look onto a chestplate and puts it on a stand
    let mut chest_data = CustomData::empty();
    let stamped = {
        let source = EntityConfig::new_player(player_id, &settings);
        GearPayload::from_config(&source)
    };
    if let Err(e) = stamped.write_to(&mut chest_data) {
        log::error!("Failed to stamp gear data: {}", e);
        return;
    }

    let cache = Arc::new(EntityCache::new(settings, players));
    let mut driver = PhysicsDriver::new(cache);
    let stand_id = Uuid::new_v4();
    let baby_id = Uuid::new_v4();

    let snapshots = |tick: u64| {
        // Hop every 12 ticks: rise, then fall
        let phase = tick % 12;
        let vertical_impulse = match phase {
            0..=2 => 0.4,
            3..=5 => -0.4,
            _ => 0.0,
        };
        vec![
            EntityTick {
                id: player_id,
                is_player: true,
                vertical_impulse,
                tick_count: tick,
                ..Default::default()
            },
            EntityTick {
                id: stand_id,
                chest: ChestItem::with_data(chest_data.clone()),
                armor: ArmorStats::chestplate(0.3),
                tick_count: tick,
                ..Default::default()
            },
            EntityTick {
                id: baby_id,
                is_juvenile: true,
                tick_count: tick,
                ..Default::default()
            },
        ]
    };

    let player_view = EntityTick {
        id: player_id,
        is_player: true,
        ..Default::default()
    };

    let mut failures = 0;
    for frame in 0..240u32 {
        // Alternate 144 Hz and 30 Hz frames
        let frame_dt = if frame % 5 == 0 { 1.0 / 30.0 } else { 1.0 / 144.0 };
        for report in driver.update(frame_dt, &snapshots) {
            failures += report.failures.len();
        }

        if frame % 20 == 0 {
            match driver.sample(&player_view, &ArmorStats::EMPTY) {
                Ok(Some(params)) => log::info!(
                    "frame {:3} tick {:3} phase {:.2}: y={:+.3} x={:+.3} rot={:+.2} breath={:.2}",
                    frame,
                    driver.ticks(),
                    driver.render_phase(),
                    params.left.position.y,
                    params.left.position.x,
                    params.left.rotation,
                    params.left.breathing,
                ),
                Ok(None) => log::info!("frame {:3}: player not rendered", frame),
                Err(e) => log::error!("frame {:3}: {}", frame, e),
            }
        }
    }

    log::info!(
        "Done: {} ticks, {} cached entities, {} failures",
        driver.ticks(),
        driver.cache().len(),
        failures
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host on wasm; nothing to run here
}
