// Session loop: owns the interaction world inside a single task.

use super::types::{SessionEvent, SessionUpdate};
use super::world::InteractionWorld;
use crate::domain::{PhysicsHost, ReplicationBridge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared configuration for spawning a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Capacity for inbound session events.
    pub event_channel_capacity: usize,
    /// Capacity for broadcast session updates.
    pub update_broadcast_capacity: usize,
    /// Frame tick: input, timers, lerps, repair.
    pub frame_interval: Duration,
    /// Physics tick: joint creation and sweeping.
    pub physics_interval: Duration,
}

/// Channels into and out of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    /// Sender for events into the session task.
    pub event_tx: mpsc::Sender<SessionEvent>,
    /// Broadcast sender for per-frame interaction events.
    pub update_tx: broadcast::Sender<SessionUpdate>,
    /// Stops the loop without tearing the scene down.
    pub shutdown: Arc<Notify>,
}

/// Spawns the session task. The join handle yields the world back when the loop ends.
pub fn spawn_session<P, B>(
    world: InteractionWorld<P, B>,
    settings: &SessionSettings,
) -> (SessionHandle, JoinHandle<InteractionWorld<P, B>>)
where
    P: PhysicsHost + 'static,
    B: ReplicationBridge + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(settings.event_channel_capacity);
    let (update_tx, _update_rx) = broadcast::channel(settings.update_broadcast_capacity);
    let shutdown = Arc::new(Notify::new());

    let task = tokio::spawn(session_task(
        world,
        event_rx,
        update_tx.clone(),
        settings.frame_interval,
        settings.physics_interval,
        shutdown.clone(),
    ));

    (
        SessionHandle {
            event_tx,
            update_tx,
            shutdown,
        },
        task,
    )
}

pub async fn session_task<P, B>(
    mut world: InteractionWorld<P, B>,
    mut event_rx: mpsc::Receiver<SessionEvent>,
    update_tx: broadcast::Sender<SessionUpdate>,
    frame_interval: Duration,
    physics_interval: Duration,
    shutdown: Arc<Notify>,
) -> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    let mut tick: u64 = 0;
    let mut frame = tokio::time::interval(frame_interval);
    let mut physics = tokio::time::interval(physics_interval);
    let dt = frame_interval.as_secs_f32();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "session shut down");
                break;
            }
            _ = physics.tick() => {
                world.physics_tick();
            }
            _ = frame.tick() => {
                let mut teardown = false;
                while let Ok(event) = event_rx.try_recv() {
                    if matches!(event, SessionEvent::Teardown) {
                        teardown = true;
                        break;
                    }
                    world.apply_session_event(event);
                }

                if teardown {
                    world.teardown();
                    publish(&update_tx, tick + 1, &mut world);
                    info!(tick, "session torn down");
                    break;
                }

                world.frame_tick(dt);
                tick += 1;
                publish(&update_tx, tick, &mut world);
            }
        }
    }

    world
}

fn publish<P, B>(
    update_tx: &broadcast::Sender<SessionUpdate>,
    tick: u64,
    world: &mut InteractionWorld<P, B>,
) where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    let events = world.drain_events();
    if events.is_empty() {
        return;
    }
    // No subscribers is fine; the events are only informational.
    let _ = update_tx.send(SessionUpdate { tick, events });
}

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Applies one queued event. `Teardown` is handled by the loop itself.
    pub fn apply_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input(input) => {
                self.handle_input(input);
            }
            SessionEvent::HandTrigger {
                hand,
                entity,
                entered,
            } => {
                if entered {
                    self.hand_trigger_enter(hand, entity);
                } else {
                    self.hand_trigger_exit(hand, entity);
                }
            }
            SessionEvent::ZoneTrigger {
                zone,
                contact,
                entered,
            } => {
                if entered {
                    self.zone_trigger_enter(zone, contact);
                } else {
                    self.zone_trigger_exit(zone, contact);
                }
            }
            SessionEvent::Collision { entity } => {
                self.on_collision(entity);
            }
            SessionEvent::JointBroken { joint } => {
                self.on_joint_broken(joint);
            }
            SessionEvent::Tracking { hand, pose, motion } => {
                self.update_hand_tracking(hand, pose, motion);
            }
            SessionEvent::Remote(update) => {
                // Already logged; a dropped update has nothing left to do.
                let _ = self.apply_remote_update(update);
            }
            SessionEvent::ParticipantJoined(participant) => {
                self.sync_late_joiner(participant);
            }
            SessionEvent::ParticipantLeft(participant) => {
                self.participant_left(participant);
            }
            SessionEvent::Teardown => {
                debug!("teardown reached apply_session_event; tearing down directly");
                self.teardown();
            }
        }
    }
}
