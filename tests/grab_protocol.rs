mod support;

use grab_core::domain::{
    InteractionEvent, JointAnchor, NetId, PressKind, ReplicatedField, ReplicationUpdate, Timer,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{LOCAL, REMOTE, scene};

fn owner_updates(updates: &[ReplicationUpdate]) -> Vec<ReplicatedField> {
    updates
        .iter()
        .filter(|u| matches!(u.field, ReplicatedField::Owner(_)))
        .map(|u| u.field)
        .collect()
}

#[test]
fn when_timer_runs_at_common_frame_rates_then_it_completes_once_at_full_progress() {
    for dt in [1.0 / 60.0, 1.0 / 10.0] {
        let completions = Arc::new(AtomicUsize::new(0));
        let mut timer = Timer::new(0.3);
        {
            let completions = Arc::clone(&completions);
            timer.on_complete(move |progress| {
                assert_eq!(progress, 1.0);
                completions.fetch_add(1, Ordering::SeqCst);
            });
        }
        timer.start();

        let mut last = None;
        for _ in 0..100 {
            if let Some(step) = timer.tick(dt) {
                last = Some(step);
            }
        }

        let last = last.expect("timer ticked");
        assert!(last.finished);
        assert_eq!(last.progress, 1.0);
        assert_eq!(timer.progress(), 1.0);
        assert_eq!(completions.load(Ordering::SeqCst), 1, "dt = {dt}");
    }
}

#[test]
fn when_hold_is_zero_then_down_grabs_immediately_and_claims_ownership() {
    let mut scene = scene(0.0, false);
    scene.touch();
    scene.world.bridge_mut().drain();

    assert!(scene.world.grab_query(scene.hand, PressKind::Down));

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.grab_parent(), Some(scene.hand));
    assert_eq!(entity.owner, Some(LOCAL));
    assert!(!entity.is_highlighted());
    let hand = scene.world.hand(scene.hand).expect("hand");
    assert!(hand.grabbing);
    assert_eq!(hand.grabbed_object, Some(scene.item));
    assert_eq!(
        owner_updates(&scene.world.bridge_mut().drain()),
        vec![ReplicatedField::Owner(Some(LOCAL))]
    );
    assert!(
        scene
            .world
            .drain_events()
            .contains(&InteractionEvent::GrabBegin {
                entity: scene.item,
                hand: scene.hand
            })
    );
    scene.assert_consistent();
}

#[test]
fn when_hold_is_released_early_then_nothing_is_grabbed() {
    let mut scene = scene(0.3, false);
    scene.touch();

    assert!(scene.world.grab_query(scene.hand, PressKind::Down));
    scene.seconds(0.1);
    assert!(scene.world.grab_query(scene.hand, PressKind::Up));
    scene.seconds(0.5);

    let entity = scene.world.entity(scene.item).expect("box");
    assert!(!entity.is_grabbed());
    assert!(entity.owner.is_none());
    let hand = scene.world.hand(scene.hand).expect("hand");
    assert!(!hand.grabbing);
    assert!(!hand.hold_grab);
    assert!(!hand.hold_timer.is_running());
    scene.assert_consistent();
}

#[test]
fn when_hold_elapses_then_grab_completes() {
    let mut scene = scene(0.3, false);
    scene.touch();

    scene.world.grab_query(scene.hand, PressKind::Down);
    scene.seconds(0.2);
    assert!(!scene.world.entity(scene.item).expect("box").is_grabbed());
    scene.seconds(0.2);

    assert_eq!(
        scene.world.entity(scene.item).expect("box").grab_parent(),
        Some(scene.hand)
    );
    scene.assert_consistent();
}

#[test]
fn when_held_then_other_participant_cannot_grab() {
    let mut scene = scene(0.0, false);
    scene.touch();
    scene.world.grab_query(scene.hand, PressKind::Down);

    assert!(!scene.world.request_grab(scene.item, scene.remote_hand, true, false));

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.grab_parent(), Some(scene.hand));
    assert_eq!(entity.owner, Some(LOCAL));
    assert!(!scene.world.hand(scene.remote_hand).expect("remote").grabbing);
    scene.assert_consistent();
}

#[test]
fn when_remote_owns_entity_then_local_grab_is_refused() {
    let mut scene = scene(0.0, false);
    scene
        .world
        .apply_remote_update(ReplicationUpdate::entity(
            scene.item,
            ReplicatedField::Owner(Some(REMOTE)),
        ))
        .expect("owner applies");
    scene.touch();

    assert!(!scene.world.grab_query(scene.hand, PressKind::Down));
    assert_eq!(
        scene.world.entity(scene.item).expect("box").owner,
        Some(REMOTE)
    );
}

#[test]
fn when_highlighted_entity_is_disabled_then_down_is_ignored() {
    let mut scene = scene(0.0, false);
    scene.touch();
    assert!(scene.world.entity(scene.item).expect("box").is_highlighted());

    scene.world.set_interactable(scene.item, false);

    assert!(!scene.world.grab_query(scene.hand, PressKind::Down));
    assert!(!scene.world.entity(scene.item).expect("box").is_grabbed());
    assert!(!scene.world.hand(scene.hand).expect("hand").grabbing);
}

#[test]
fn when_hand_lerp_finishes_then_breakable_hand_joint_is_created() {
    let mut scene = scene(0.0, false);
    scene.touch();
    scene.world.grab_query(scene.hand, PressKind::Down);

    scene.seconds(0.5);

    let joint = scene
        .world
        .entity(scene.item)
        .and_then(|e| e.joint)
        .expect("hand joint");
    assert_eq!(joint.anchor, JointAnchor::Hand(scene.hand));
    let spec = scene.world.physics().last_joint_spec().expect("joint spec");
    assert_eq!(spec.break_force, Some(10_000.0));
    assert_eq!(scene.world.physics().joint_count(), 1);
    scene.assert_consistent();
}

#[test]
fn when_released_then_ownership_is_given_back_and_joint_removed() {
    let mut scene = scene(0.0, false);
    scene.touch();
    scene.world.grab_query(scene.hand, PressKind::Down);
    scene.seconds(0.5);
    scene.world.bridge_mut().drain();

    assert!(scene.world.grab_query(scene.hand, PressKind::Up));

    let entity = scene.world.entity(scene.item).expect("box");
    assert!(!entity.is_grabbed());
    assert!(entity.owner.is_none());
    assert!(entity.joint.is_none());
    assert_eq!(scene.world.physics().joint_count(), 0);
    let updates = scene.world.bridge_mut().drain();
    assert_eq!(owner_updates(&updates), vec![ReplicatedField::Owner(None)]);
    assert!(
        updates
            .iter()
            .any(|u| u.target == NetId::Entity(scene.item)
                && u.field == ReplicatedField::GrabParent(None))
    );
    scene.assert_consistent();
}

#[test]
fn when_released_in_vr_then_box_is_thrown() {
    let mut scene = scene(0.0, true);
    scene.touch();
    scene.world.grab_query(scene.hand, PressKind::Down);
    scene.world.drain_events();

    scene.world.grab_query(scene.hand, PressKind::Up);

    let entity = scene.world.entity(scene.item).expect("box");
    assert_eq!(entity.thrown().map(|t| t.hand), Some(scene.hand));
    assert!(
        scene
            .world
            .drain_events()
            .contains(&InteractionEvent::Thrown {
                entity: scene.item,
                hand: scene.hand
            })
    );

    assert!(scene.world.on_collision(scene.item));
    assert!(scene.world.entity(scene.item).expect("box").thrown().is_none());
}
