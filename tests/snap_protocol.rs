mod support;

use grab_core::domain::{
    ColliderId, ConfigError, EntityDesc, EntityState, InteractionEvent, JointAnchor, NetId, Pose,
    PressKind, ReplicatedField, ReplicationUpdate, SnapzoneDesc, TriggerContact, ZoneId,
};
use support::{LOCAL, REMOTE, Scene, scene};

fn hold_over_shelf(scene: &mut Scene) {
    scene.touch();
    assert!(scene.world.grab_query(scene.hand, PressKind::Down));
    assert!(
        scene
            .world
            .zone_trigger_enter(scene.shelf, TriggerContact::Hand(scene.hand))
    );
}

fn position(events: &[InteractionEvent], wanted: InteractionEvent) -> usize {
    events
        .iter()
        .position(|event| *event == wanted)
        .unwrap_or_else(|| panic!("missing {wanted:?} in {events:?}"))
}

#[test]
fn when_released_inside_zone_then_box_snaps_and_settles_on_zone_joint() {
    let mut scene = scene(0.0, false);
    hold_over_shelf(&mut scene);
    assert_eq!(
        scene.world.entity(scene.item).expect("box").state(),
        EntityState::SnapPending
    );

    assert!(scene.world.grab_query(scene.hand, PressKind::Up));

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.snap_parent(), Some(scene.shelf));
    assert!(!entity.is_grabbed());
    assert_eq!(
        scene.world.zone(scene.shelf).expect("shelf").snapped_object,
        Some(scene.item)
    );
    scene.assert_consistent();

    scene.seconds(2.1);

    let joint = scene
        .world
        .entity(scene.item)
        .and_then(|e| e.joint)
        .expect("zone joint");
    assert_eq!(joint.anchor, JointAnchor::Zone(scene.shelf));
    let spec = scene.world.physics().last_joint_spec().expect("spec");
    assert!(spec.break_force.is_none());
    assert_eq!(scene.world.physics().joint_count(), 1);
    scene.assert_consistent();
}

#[test]
fn when_snapped_box_is_regrabbed_then_zone_joint_goes_before_grab_begins() {
    let mut scene = scene(0.0, false);
    hold_over_shelf(&mut scene);
    scene.world.grab_query(scene.hand, PressKind::Up);
    scene.seconds(2.1);
    scene.world.drain_events();
    assert_eq!(scene.world.physics().joint_count(), 1);

    // The hand never left the box, so it can pick it straight back out.
    scene.world.hand_trigger_enter(scene.hand, scene.item);
    assert!(scene.world.grab_query(scene.hand, PressKind::Down));

    assert_eq!(scene.world.physics().joint_count(), 0);
    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.grab_parent(), Some(scene.hand));
    assert!(!entity.is_snapped());
    assert!(scene.world.zone(scene.shelf).expect("shelf").snapped_object.is_none());

    let events = scene.world.drain_events();
    let released = position(
        &events,
        InteractionEvent::JointReleased {
            entity: scene.item,
            anchor: JointAnchor::Zone(scene.shelf),
        },
    );
    let unsnapped = position(
        &events,
        InteractionEvent::SnapEnd {
            entity: scene.item,
            zone: scene.shelf,
        },
    );
    let grabbed = position(
        &events,
        InteractionEvent::GrabBegin {
            entity: scene.item,
            hand: scene.hand,
        },
    );
    assert!(released < grabbed);
    assert!(unsnapped < grabbed);
    scene.assert_consistent();
}

#[test]
fn when_released_outside_any_zone_then_box_stays_loose() {
    let mut scene = scene(0.0, false);
    hold_over_shelf(&mut scene);
    assert!(
        scene
            .world
            .zone_trigger_exit(scene.shelf, TriggerContact::Hand(scene.hand))
    );

    scene.world.grab_query(scene.hand, PressKind::Up);

    let entity = scene.world.entity(scene.item).expect("box");
    assert!(!entity.is_snapped());
    assert!(entity.snap_target().is_none());
    assert!(scene.world.zone(scene.shelf).expect("shelf").is_idle());
}

#[test]
fn when_thrown_box_enters_idle_zone_then_it_snaps_without_a_hand() {
    let mut scene = scene(0.0, true);
    scene.touch();
    scene.world.grab_query(scene.hand, PressKind::Down);
    scene.world.grab_query(scene.hand, PressKind::Up);
    assert!(scene.world.entity(scene.item).expect("box").thrown().is_some());

    assert!(
        scene
            .world
            .zone_trigger_enter(scene.shelf, TriggerContact::Entity(scene.item))
    );

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.snap_parent(), Some(scene.shelf));
    assert!(entity.thrown().is_none());
    scene.assert_consistent();
}

#[test]
fn when_remote_peer_snaps_box_then_local_replica_follows_and_makes_its_own_joint() {
    let mut scene = scene(0.0, false);
    let updates = [
        ReplicationUpdate::entity(scene.item, ReplicatedField::Owner(Some(REMOTE))),
        ReplicationUpdate::entity(scene.item, ReplicatedField::SnapParent(Some(scene.shelf))),
        ReplicationUpdate::zone(scene.shelf, ReplicatedField::ZoneSnapped(Some(scene.item))),
    ];

    for update in updates {
        scene
            .world
            .apply_remote_update(update)
            .expect("remote update applies");
    }
    scene.seconds(2.1);

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.snap_parent(), Some(scene.shelf));
    assert_eq!(
        entity.joint.map(|j| j.anchor),
        Some(JointAnchor::Zone(scene.shelf))
    );
    assert!(scene.world.bridge_mut().drain().is_empty());
    scene.assert_consistent();
}

#[test]
fn when_remote_update_names_unknown_zone_then_it_is_rejected() {
    let mut scene = scene(0.0, false);
    let stale = ReplicationUpdate::zone(
        ZoneId::from_u64(0xdead_0000_0001),
        ReplicatedField::ZoneSnapped(Some(scene.item)),
    );

    assert!(scene.world.apply_remote_update(stale).is_err());
    assert!(!scene.world.entity(scene.item).expect("box").is_snapped());
}

#[test]
fn when_late_joiner_syncs_then_full_state_names_every_record() {
    let mut scene = scene(0.0, false);
    hold_over_shelf(&mut scene);
    scene.world.grab_query(scene.hand, PressKind::Up);
    scene.world.bridge_mut().drain();

    let sent = scene.world.sync_late_joiner(REMOTE);

    let updates = scene.world.bridge_mut().drain();
    assert_eq!(sent, updates.len());
    assert!(updates.contains(&ReplicationUpdate::entity(
        scene.item,
        ReplicatedField::SnapParent(Some(scene.shelf))
    )));
    assert!(updates.contains(&ReplicationUpdate::zone(
        scene.shelf,
        ReplicatedField::ZoneSnapped(Some(scene.item))
    )));
    assert!(updates.iter().any(|u| u.target == NetId::Hand(scene.hand)));
}

#[test]
fn when_owner_leaves_mid_grab_then_their_box_is_released() {
    let mut scene = scene(0.0, false);
    let updates = [
        ReplicationUpdate::entity(scene.item, ReplicatedField::Owner(Some(REMOTE))),
        ReplicationUpdate::entity(
            scene.item,
            ReplicatedField::GrabParent(Some(scene.remote_hand)),
        ),
        ReplicationUpdate::hand(
            scene.remote_hand,
            ReplicatedField::HandGrabbed(Some(scene.item)),
        ),
    ];
    for update in updates {
        scene.world.apply_remote_update(update).expect("applies");
    }
    assert_eq!(
        scene.world.entity(scene.item).expect("box").grab_parent(),
        Some(scene.remote_hand)
    );

    scene.world.participant_left(REMOTE);

    let entity = scene.world.entity(scene.item).expect("box");
    assert!(!entity.is_grabbed());
    assert!(entity.owner.is_none());
    assert!(scene.world.hand(scene.remote_hand).expect("remote hand").disabled);
    scene.assert_consistent();

    // Free again for the local participant.
    scene.touch();
    assert!(scene.world.grab_query(scene.hand, PressKind::Down));
    assert_eq!(
        scene.world.entity(scene.item).expect("box").owner,
        Some(LOCAL)
    );
}

#[test]
fn when_presnap_names_entity_without_snap_capability_then_zone_is_rejected() {
    let mut scene = scene(0.0, false);
    let lamp = scene
        .world
        .spawn_entity(EntityDesc::new("lamp", ColliderId(40)))
        .expect("lamp");

    let result = scene.world.spawn_zone(
        SnapzoneDesc::new("lamp hook", ColliderId(41), Pose::IDENTITY).presnap(lamp),
    );

    assert!(matches!(
        result,
        Err(ConfigError::InvalidPresnapTarget { .. })
    ));
}
