//! Property tests for collision queries and the robot state machine.
//!
//! Coordinates are drawn from small integer grids so the float comparisons
//! below are exact.

use glam::Vec2;
use proptest::prelude::*;
use rock_rover::protocol::Command;
use rock_rover::sim::{
    Aabb, Collider, ColliderId, ColliderKind, CompositeSet, IdSource, MoveResult, Robot, RobotState,
};
use rock_rover::{MoveError, ProtocolError, SimConfig, Simulation};

fn aabb_strategy() -> impl Strategy<Value = Aabb> {
    (-40i32..40, -40i32..40, 1u32..30, 1u32..30).prop_map(|(x, y, w, h)| {
        Aabb::new(Vec2::new(x as f32, y as f32), w as f32, h as f32)
    })
}

#[derive(Debug, Clone, Copy)]
enum MoveOp {
    Forward(i32),
    Turn(i32),
}

fn move_strategy() -> impl Strategy<Value = MoveOp> {
    prop_oneof![
        (-30i32..30).prop_filter("long enough", |d| d.abs() >= 5).prop_map(MoveOp::Forward),
        (-6i32..6).prop_filter("nonzero", |a| *a != 0).prop_map(MoveOp::Turn),
    ]
}

fn begin(robot: &mut Robot, op: MoveOp) -> Result<(), MoveError> {
    match op {
        MoveOp::Forward(d) => robot.begin_forward(d as f32),
        MoveOp::Turn(a) => robot.begin_turn(a as f32 * 0.25),
    }
}

fn pose(robot: &Robot) -> (Vec2, f32, f32) {
    let state = robot.state();
    (state.last_turn, state.dist, state.heading)
}

proptest! {
    #[test]
    fn overlap_matches_open_interval_formula(a in aabb_strategy(), b in aabb_strategy()) {
        let expected = a.right() > b.left()
            && a.left() < b.right()
            && a.top() > b.bottom()
            && a.bottom() < b.top();
        prop_assert_eq!(a.overlaps(&b), expected);

        // Shared edges never count
        let flush = Aabb::new(Vec2::new(a.right() + b.width / 2.0, b.center.y), b.width, b.height);
        prop_assert!(!a.overlaps(&flush));
    }

    #[test]
    fn collider_test_names_the_receiver(
        a in aabb_strategy(),
        b in aabb_strategy(),
        half in 1i32..60,
    ) {
        let mut ids = IdSource::new();
        let rock = Collider::rock(&mut ids, a);
        let barrier = Collider::barrier(&mut ids, b);

        if let Some(hit) = rock.test(&b) {
            prop_assert_eq!(hit.id, rock.id());
            prop_assert_eq!(hit.kind, ColliderKind::Rock);
        }
        if let Some(hit) = barrier.test(&a) {
            prop_assert_eq!(hit.id, barrier.id());
            prop_assert_eq!(hit.kind, ColliderKind::Barrier);
        }

        // The boundary hits what leaves it, a box hits what enters it
        let side = (2 * half) as f32;
        let field = Aabb::new(Vec2::ZERO, side, side);
        let screen = Collider::screen(&mut ids, side, side);
        let walled = Collider::barrier(&mut ids, field);
        let inside = a.left() > field.left()
            && a.right() < field.right()
            && a.bottom() > field.bottom()
            && a.top() < field.top();
        if inside {
            prop_assert!(screen.test(&a).is_none());
            prop_assert!(walled.test(&a).is_some());
        }
        if !field.overlaps(&a) {
            prop_assert!(screen.test(&a).is_some());
            prop_assert!(walled.test(&a).is_none());
        }
    }

    #[test]
    fn composite_reports_first_inserted_match(
        boxes in prop::collection::vec(aabb_strategy(), 0..12),
        probe in aabb_strategy(),
    ) {
        let mut source = IdSource::new();
        let mut set = CompositeSet::new(&mut source);
        let ids: Vec<ColliderId> = boxes
            .iter()
            .map(|aabb| set.insert(Collider::rock(&mut source, *aabb)))
            .collect();

        let expected = boxes
            .iter()
            .zip(&ids)
            .find(|(aabb, _)| aabb.overlaps(&probe))
            .map(|(_, id)| *id);

        prop_assert_eq!(set.test(&probe).map(|hit| hit.id), expected);
        for id in &ids {
            prop_assert_eq!(set.get(*id).and_then(|c| c.parent()), Some(set.id()));
        }
    }

    #[test]
    fn removed_collider_no_longer_hits(
        boxes in prop::collection::vec(aabb_strategy(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut source = IdSource::new();
        let mut set = CompositeSet::new(&mut source);
        let ids: Vec<ColliderId> = boxes
            .iter()
            .map(|aabb| set.insert(Collider::rock(&mut source, *aabb)))
            .collect();
        let index = pick.index(ids.len());

        let removed = set.remove(ids[index]).unwrap();
        prop_assert_eq!(removed.parent(), None);
        prop_assert_eq!(set.len(), ids.len() - 1);
        if let Some(hit) = set.test(&boxes[index]) {
            prop_assert_ne!(hit.id, ids[index]);
        }
    }

    #[test]
    fn second_command_leaves_robot_untouched(
        first in move_strategy(),
        second in move_strategy(),
        ticks in 0u32..5,
    ) {
        let world = CompositeSet::new(&mut IdSource::new());
        let mut robot = Robot::new(RobotState::new(1.0, 12.0, 12.0));
        begin(&mut robot, first).unwrap();
        for _ in 0..ticks {
            prop_assert!(robot.advance(&world).is_none());
        }

        let before = (pose(&robot), robot.pending().copied());
        prop_assert_eq!(begin(&mut robot, second), Err(MoveError::AlreadyMoving));
        prop_assert_eq!((pose(&robot), robot.pending().copied()), before);
    }

    #[test]
    fn forward_on_open_field_takes_distance_over_speed_ticks(dist in -30i32..30) {
        prop_assume!(dist != 0);
        let world = CompositeSet::new(&mut IdSource::new());
        let mut robot = Robot::new(RobotState::new(1.0, 12.0, 12.0));
        robot.begin_forward(dist as f32).unwrap();

        let expected_ticks = dist.unsigned_abs();
        for _ in 1..expected_ticks {
            prop_assert!(robot.advance(&world).is_none());
        }
        let result = robot.advance(&world);
        prop_assert_eq!(
            result,
            Some(MoveResult::Forward { distance_moved: dist as f32, collision: None })
        );
        prop_assert!(robot.is_idle());
        prop_assert_eq!(robot.position(), Vec2::new(dist as f32, 0.0));
    }

    #[test]
    fn pick_twice_removes_nothing_more(seed in any::<u64>()) {
        let config = SimConfig { rock_count: 12, seed, ..Default::default() };
        let mut sim = Simulation::new(config).unwrap();
        let before = sim.rocks().len();

        let first = sim.pick().unwrap();
        prop_assert_eq!(sim.rocks().len(), before - first);
        prop_assert_eq!(sim.pick().unwrap(), 0);
        prop_assert_eq!(sim.collision().len(), sim.rocks().len() + 1 + sim.barriers().len());
    }

    #[test]
    fn unknown_tags_are_rejected(tag in "[a-z]{1,8}") {
        prop_assume!(!matches!(tag.as_str(), "fwd" | "turn" | "pick"));
        let result = Command::from_wire(&tag, &serde_json::json!({}));
        prop_assert!(matches!(result, Err(ProtocolError::InvalidCommand(t)) if t == tag));
    }
}
