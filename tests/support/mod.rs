// Shared scene setup for integration tests, built only through the public API.
#![allow(dead_code)]

use glam::Vec3;
use grab_core::domain::{
    BodyId, ColliderId, EntityDesc, EntityId, GrabDesc, HandDesc, HandId, HandSide, ParticipantId,
    Pose, SnapzoneDesc, ZoneId,
};
use grab_core::interface_adapters::bridge::LocalBridge;
use grab_core::interface_adapters::physics::InMemoryPhysics;
use grab_core::use_cases::{InteractionWorld, WorldSettings};

pub const LOCAL: ParticipantId = ParticipantId(1);
pub const REMOTE: ParticipantId = ParticipantId(2);
pub const FRAME: f32 = 1.0 / 60.0;

pub type World = InteractionWorld<InMemoryPhysics, LocalBridge>;

const BOX_BODY: BodyId = BodyId(10);

// One local right hand, one remote right hand, a box and a shelf.
pub struct Scene {
    pub world: World,
    pub hand: HandId,
    pub remote_hand: HandId,
    pub item: EntityId,
    pub shelf: ZoneId,
}

pub fn scene(hold_seconds: f32, vr: bool) -> Scene {
    let mut settings = WorldSettings::new(LOCAL);
    settings.vr_active = vr;
    let mut physics = InMemoryPhysics::new();
    physics.insert_body(BOX_BODY, Pose::from_position(Vec3::ZERO));
    let mut world = InteractionWorld::new(settings, physics, LocalBridge::new());

    let hand = world
        .spawn_hand(
            HandDesc::new(HandSide::Right, LOCAL, ColliderId(1)).with_body_collider(ColliderId(2)),
        )
        .expect("local hand");
    let remote_hand = world
        .spawn_hand(
            HandDesc::new(HandSide::Right, REMOTE, ColliderId(5))
                .with_body_collider(ColliderId(6)),
        )
        .expect("remote hand");
    let item = world
        .spawn_entity(
            EntityDesc::new("box", ColliderId(10))
                .grabbable(GrabDesc::hold(hold_seconds))
                .with_body(BOX_BODY, ColliderId(11))
                .snappable()
                .throwable(),
        )
        .expect("box");
    world.initialize(item);
    let shelf = world
        .spawn_zone(
            SnapzoneDesc::new("shelf", ColliderId(20), Pose::IDENTITY)
                .target(Pose::from_position(Vec3::new(0.0, 2.0, 0.0))),
        )
        .expect("shelf");

    world.drain_events();
    world.bridge_mut().drain();

    Scene {
        world,
        hand,
        remote_hand,
        item,
        shelf,
    }
}

impl Scene {
    /// Puts the box in the local hand volume and reports the contact.
    pub fn touch(&mut self) {
        let hand_trigger = self.world.hand(self.hand).expect("hand").trigger;
        let item_trigger = self.world.entity(self.item).expect("box").trigger;
        self.world
            .physics_mut()
            .set_overlap(hand_trigger, item_trigger, true);
        self.world.hand_trigger_enter(self.hand, self.item);
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.world.frame_tick(FRAME);
            self.world.physics_tick();
        }
    }

    pub fn seconds(&mut self, seconds: f32) {
        let count = (seconds / FRAME).ceil() as usize;
        self.frames(count);
    }

    pub fn assert_consistent(&self) {
        if let Err(violation) = self.world.check_invariants() {
            panic!("invariant violated: {violation}");
        }
    }
}
