use crate::domain::{
    BodyId, ColliderId, EntityDesc, EntityId, GrabDesc, HandDesc, HandId, HandSide,
    ParticipantId, Pose, PressKind, SnapzoneDesc, ZoneId,
};
use crate::interface_adapters::bridge::LocalBridge;
use crate::interface_adapters::physics::InMemoryPhysics;
use crate::use_cases::{InteractionWorld, WorldSettings};
use glam::Vec3;

pub(crate) const LOCAL: ParticipantId = ParticipantId(1);
pub(crate) const REMOTE: ParticipantId = ParticipantId(2);

pub(crate) type TestWorld = InteractionWorld<InMemoryPhysics, LocalBridge>;

const CRATE_BODY: BodyId = BodyId(10);

// Shared scene for use-case tests: two local hands, a carryable crate, a one-shot lever, a zone.
pub(crate) struct Scene {
    pub world: TestWorld,
    pub right: HandId,
    pub left: HandId,
    pub crate_id: EntityId,
    pub lever_id: EntityId,
    pub zone: ZoneId,
}

#[derive(Clone, Copy, Default)]
pub(crate) struct SceneBuilder {
    hold: f32,
    vr: bool,
}

impl SceneBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn hold(mut self, seconds: f32) -> Self {
        self.hold = seconds;
        self
    }

    pub(crate) fn vr(mut self) -> Self {
        self.vr = true;
        self
    }

    pub(crate) fn build(self) -> Scene {
        let mut settings = WorldSettings::new(LOCAL);
        settings.vr_active = self.vr;
        let mut physics = InMemoryPhysics::new();
        physics.insert_body(CRATE_BODY, Pose::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let mut world = InteractionWorld::new(settings, physics, LocalBridge::new());

        let right = world
            .spawn_hand(
                HandDesc::new(HandSide::Right, LOCAL, ColliderId(1))
                    .with_body_collider(ColliderId(2)),
            )
            .expect("right hand");
        let left = world
            .spawn_hand(
                HandDesc::new(HandSide::Left, LOCAL, ColliderId(3))
                    .with_body_collider(ColliderId(4)),
            )
            .expect("left hand");

        let crate_id = world
            .spawn_entity(
                EntityDesc::new("crate", ColliderId(10))
                    .grabbable(GrabDesc::hold(self.hold))
                    .with_body(CRATE_BODY, ColliderId(11))
                    .snappable()
                    .throwable()
                    .useable(),
            )
            .expect("crate");
        let lever_id = world
            .spawn_entity(EntityDesc::new("lever", ColliderId(12)))
            .expect("lever");
        world.initialize(crate_id);
        world.initialize(lever_id);

        let zone = world
            .spawn_zone(
                SnapzoneDesc::new("shelf", ColliderId(20), Pose::IDENTITY)
                    .target(Pose::from_position(Vec3::new(2.0, 1.0, 0.0))),
            )
            .expect("zone");

        world.drain_events();
        world.bridge_mut().drain();

        Scene {
            world,
            right,
            left,
            crate_id,
            lever_id,
            zone,
        }
    }
}

impl Scene {
    pub(crate) fn set_overlap(&mut self, hand: HandId, entity: EntityId, overlapping: bool) {
        let hand_trigger = self.world.hand(hand).expect("hand").trigger;
        let entity_trigger = self.world.entity(entity).expect("entity").trigger;
        self.world
            .physics_mut()
            .set_overlap(hand_trigger, entity_trigger, overlapping);
    }

    /// Moves the entity into the hand volume and delivers the trigger notification.
    pub(crate) fn touch(&mut self, hand: HandId, entity: EntityId) {
        self.set_overlap(hand, entity, true);
        self.world.hand_trigger_enter(hand, entity);
    }

    pub(crate) fn grab(&mut self, hand: HandId, entity: EntityId) {
        self.touch(hand, entity);
        assert!(
            self.world.grab_query(hand, PressKind::Down),
            "grab should succeed"
        );
        assert_eq!(
            self.world.entity(entity).expect("entity").grab_parent(),
            Some(hand)
        );
    }

    pub(crate) fn snap_directly(&mut self, entity: EntityId, zone: ZoneId) {
        assert!(self.world.commit_snap(None, entity, zone, true));
    }

    /// (entity body collider, hand body collider)
    pub(crate) fn colliders(&self, hand: HandId, entity: EntityId) -> (ColliderId, ColliderId) {
        let body = self
            .world
            .entity(entity)
            .and_then(|e| e.physics)
            .expect("entity body")
            .collider;
        let hand_body = self
            .world
            .hand(hand)
            .and_then(|h| h.body_collider)
            .expect("hand body collider");
        (body, hand_body)
    }

    pub(crate) fn crate_body(&self) -> BodyId {
        CRATE_BODY
    }
}
