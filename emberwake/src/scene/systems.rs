//! Per-tick prop systems

use crate::audio::LoudnessSensor;
use crate::scene::components::{
    Collectible, DespawnTimer, ProximityState, TorchFlame, Transform, ZoneEdge,
};
use crate::scene::tally::CollectionTally;
use crate::scene::world::{Entity, World};
use glam::Vec3;
use tracing::{debug, warn};

/// Seconds a collected crystal lingers before despawning.
pub const DESPAWN_DELAY_SECONDS: f32 = 3.0;

/// Grab/select notification delivered by the host's interaction layer
#[derive(Debug, Clone, Copy)]
pub struct GrabEvent {
    pub entity: Entity,
}

/// Emitted when a grab was counted; the host maps these to sounds, VFX, and
/// haptics
#[derive(Debug, Clone, Copy)]
pub struct CollectFeedback {
    pub entity: Entity,
    pub position: Vec3,
    pub delta: i32,
    pub wrong: bool,
}

/// Drive every torch flame from the shared loudness sensor.
///
/// The gate for each torch is proximity (when required) AND sensor
/// readiness; a torch with no player nearby decays smoothly to its baseline.
pub fn flame_update_system(
    world: &mut World,
    sensor: &LoudnessSensor,
    listener_position: Vec3,
    dt: f32,
) {
    for (_entity, (flame, transform, proximity)) in
        world.query_mut::<(&mut TorchFlame, &Transform, &mut ProximityState)>()
    {
        let inside = !flame.require_proximity
            || transform.position.distance(listener_position) <= flame.trigger_radius;

        match proximity.update(inside) {
            Some(ZoneEdge::Entered) => debug!(torch = ?transform.position, "player entered torch zone"),
            Some(ZoneEdge::Exited) => debug!(torch = ?transform.position, "player left torch zone"),
            None => {}
        }

        let active = inside && sensor.ready();
        let level01 = if active { sensor.level01() } else { 0.0 };
        flame.last_level01 = level01;
        flame.responder.tick(dt, level01, active);
        flame.refresh_outputs();
    }
}

/// Resolve grab events against collectibles, scoring each prop once and
/// scheduling its despawn.
pub fn collect_grab_system(
    world: &mut World,
    tally: &mut CollectionTally,
    grabs: &[GrabEvent],
    feedback: &mut Vec<CollectFeedback>,
) {
    for grab in grabs {
        let (delta, wrong, position) =
            match world.query_one_mut::<(&mut Collectible, &Transform)>(grab.entity) {
                Ok((collectible, transform)) => {
                    if collectible.collected {
                        continue;
                    }
                    collectible.collected = true;
                    (
                        collectible.signed_delta(),
                        collectible.wrong,
                        transform.position,
                    )
                }
                Err(_) => {
                    warn!(entity = ?grab.entity, "grab event for a non-collectible entity");
                    continue;
                }
            };

        let total = tally.add(delta);
        debug!(delta, total, wrong, "crystal collected");

        if world
            .insert_one(grab.entity, DespawnTimer::new(DESPAWN_DELAY_SECONDS))
            .is_err()
        {
            warn!(entity = ?grab.entity, "collected entity vanished before despawn scheduling");
        }

        feedback.push(CollectFeedback {
            entity: grab.entity,
            position,
            delta,
            wrong,
        });
    }
}

/// Count down despawn timers and remove expired props.
pub fn despawn_timer_system(world: &mut World, dt: f32) {
    let mut expired = Vec::new();
    for (entity, timer) in world.query_mut::<&mut DespawnTimer>() {
        timer.remaining -= dt;
        if timer.remaining <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        if world.despawn(entity).is_ok() {
            debug!(entity = ?entity, "despawned expired prop");
        }
    }
}
