// Framework bootstrap for a local interaction session.

use crate::domain::{
    BodyId, ColliderId, ConfigError, Constrained, EntityDesc, EntityId, GrabDesc, HandDesc,
    HandId, HandSide, InputEvent, InputHand, ParticipantId, Pose, PressKind, RotationLimits,
    SnapzoneDesc, TriggerContact, ZoneId,
};
use crate::frameworks::config;
use crate::interface_adapters::bridge::{ChannelBridge, replication_serializer};
use crate::interface_adapters::physics::InMemoryPhysics;
use crate::use_cases::{
    InteractionWorld, SessionEvent, SessionHandle, SessionSettings, WorldSettings, spawn_session,
};

use glam::Vec3;
use std::io::Result;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Colliders and bodies for the demo scene.
const HAND_TRIGGER: ColliderId = ColliderId(1);
const HAND_BODY: ColliderId = ColliderId(2);
const CRATE_TRIGGER: ColliderId = ColliderId(10);
const CRATE_COLLIDER: ColliderId = ColliderId(11);
const CRATE_BODY: BodyId = BodyId(10);
const SHELF_TRIGGER: ColliderId = ColliderId(20);
const LEFT_TRIGGER: ColliderId = ColliderId(3);
const LEFT_BODY: ColliderId = ColliderId(4);
const LEVER_TRIGGER: ColliderId = ColliderId(12);
const VALVE_TRIGGER: ColliderId = ColliderId(13);
const VALVE_COLLIDER: ColliderId = ColliderId(14);
const VALVE_BODY: BodyId = BodyId(13);

struct DemoScene {
    world: InteractionWorld<InMemoryPhysics, ChannelBridge>,
    hand: HandId,
    crate_id: EntityId,
    shelf: ZoneId,
}

fn build_demo_scene(
    local: ParticipantId,
    bridge: ChannelBridge,
) -> std::result::Result<DemoScene, ConfigError> {
    let mut settings = WorldSettings::new(local);
    settings.vr_active = config::vr_active();

    let mut physics = InMemoryPhysics::new();
    physics.insert_body(CRATE_BODY, Pose::from_position(Vec3::new(0.0, 1.0, 0.0)));
    let valve_zero = Pose::from_position(Vec3::new(-1.0, 1.2, 0.0));
    physics.insert_body(VALVE_BODY, valve_zero);
    // The crate starts inside the hand volume.
    physics.set_overlap(HAND_TRIGGER, CRATE_TRIGGER, true);

    let mut world = InteractionWorld::new(settings, physics, bridge);
    let hand = world.spawn_hand(
        HandDesc::new(HandSide::Right, local, HAND_TRIGGER).with_body_collider(HAND_BODY),
    )?;
    world.spawn_hand(
        HandDesc::new(HandSide::Left, local, LEFT_TRIGGER).with_body_collider(LEFT_BODY),
    )?;
    let crate_id = world.spawn_entity(
        EntityDesc::new("crate", CRATE_TRIGGER)
            .grabbable(GrabDesc::default())
            .with_body(CRATE_BODY, CRATE_COLLIDER)
            .snappable()
            .throwable(),
    )?;
    let lever = world.spawn_entity(EntityDesc::new("lever", LEVER_TRIGGER))?;
    // Quarter turn either way.
    let valve = world.spawn_entity(
        EntityDesc::new("valve", VALVE_TRIGGER)
            .grabbable(GrabDesc::default())
            .with_body(VALVE_BODY, VALVE_COLLIDER)
            .constrained(Constrained::new(
                valve_zero,
                RotationLimits::hinge(Vec3::Z, -std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2),
            )),
    )?;
    world.initialize(crate_id);
    world.initialize(lever);
    world.initialize(valve);
    let shelf = world.spawn_zone(
        SnapzoneDesc::new("shelf", SHELF_TRIGGER, Pose::IDENTITY)
            .target(Pose::from_position(Vec3::new(2.0, 1.0, 0.0))),
    )?;

    Ok(DemoScene {
        world,
        hand,
        crate_id,
        shelf,
    })
}

// Touch, grab, hover over the shelf, release into it.
async fn run_demo_script(handle: &SessionHandle, hand: HandId, entity: EntityId, zone: ZoneId) {
    let hold = Duration::from_millis(500);
    let script = [
        SessionEvent::HandTrigger {
            hand,
            entity,
            entered: true,
        },
        SessionEvent::Input(InputEvent::grab(PressKind::Down, InputHand::Right)),
        SessionEvent::ZoneTrigger {
            zone,
            contact: TriggerContact::Hand(hand),
            entered: true,
        },
        SessionEvent::Input(InputEvent::grab(PressKind::Up, InputHand::Right)),
    ];

    for event in script {
        debug!(?event, "demo input");
        if handle.event_tx.send(event).await.is_err() {
            warn!("session closed before demo finished");
            return;
        }
        tokio::time::sleep(hold).await;
    }
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let local = config::local_participant();
    let (replication_tx, _replication_rx) =
        broadcast::channel(config::REPLICATION_BROADCAST_CAPACITY);
    let bridge = ChannelBridge::new(replication_tx);
    let replication_rx = bridge.subscribe();

    let DemoScene {
        world,
        hand,
        crate_id,
        shelf,
    } = build_demo_scene(local, bridge).map_err(|e| {
        std::io::Error::other(format!("failed to build interaction scene: {e}"))
    })?;

    let (handle, session) = spawn_session(
        world,
        &SessionSettings {
            event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
            update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
            frame_interval: config::frame_interval(),
            physics_interval: config::physics_interval(),
        },
    );
    info!(participant = %local, "session started");

    // Serialize replication once; this process has no transport so the text is only logged.
    let (text_tx, mut text_rx) =
        broadcast::channel::<String>(config::REPLICATION_BROADCAST_CAPACITY);
    tokio::spawn(replication_serializer(replication_rx, text_tx));
    tokio::spawn(async move {
        while let Ok(text) = text_rx.recv().await {
            debug!(message = %text, "replication out");
        }
    });

    let mut updates = handle.update_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    for event in update.events {
                        info!(tick = update.tick, ?event, "interaction");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "interaction log lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    run_demo_script(&handle, hand, crate_id, shelf).await;

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    if handle.event_tx.send(SessionEvent::Teardown).await.is_err() {
        handle.shutdown.notify_one();
    }

    let world = session
        .await
        .map_err(|e| std::io::Error::other(format!("session task failed: {e}")))?;
    info!(torn_down = world.is_torn_down(), "session finished");
    Ok(())
}
