//! End-to-end tests of the flock.

use aloft::{Obstacle, Vec3, VectorExt};

use crate::config::{ContainmentMode, RunFlags};
use crate::flock::Flock;
use crate::render::RecordingRenderer;

use super::helpers::{boid_at, flock_of, run, test_config, TIME_STEP};

// =============================================================================
// Invariants over long runs
// =============================================================================

#[test]
fn agent_invariants_hold_every_step() {
    let mut flock = Flock::new(test_config(3, 120)).unwrap();
    for _ in 0..300 {
        flock.step(TIME_STEP);
        for boid in flock.boids() {
            assert!(boid.frame().is_orthonormal());
            assert!(boid.speed() >= 0.0 && boid.speed() <= boid.params().max_speed);
            assert_eq!(boid.velocity(), boid.forward() * boid.speed());
        }
    }
}

#[test]
fn avoid_mode_keeps_flock_near_sphere() {
    let mut flock = Flock::new(test_config(8, 150)).unwrap();
    let limit = 50.0 * flock.config().avoid_wrap_margin;
    for _ in 0..600 {
        flock.step(TIME_STEP);
        for boid in flock.boids() {
            assert!(boid.position().length() <= limit + 1e-9);
        }
    }
}

#[test]
fn wrap_mode_keeps_flock_inside_sphere() {
    let mut config = test_config(4, 100);
    config.containment = ContainmentMode::Wrap;
    let mut flock = Flock::new(config).unwrap();
    for _ in 0..600 {
        flock.step(TIME_STEP);
        for boid in flock.boids() {
            assert!(boid.position().length() <= 50.0 + 1e-9);
        }
    }
    assert_eq!(flock.stats().containment_failures, 0);
}

// =============================================================================
// Behaviors
// =============================================================================

#[test]
fn pair_separates_along_offset() {
    let a = Vec3::new(-0.5, 0.0, 0.0);
    let b = Vec3::new(0.5, 0.0, 0.0);
    let mut flock = flock_of(test_config(0, 0), vec![boid_at(0, a, Vec3::Z), boid_at(1, b, Vec3::Z)]);
    flock.step(TIME_STEP);

    let first = &flock.boids()[0];
    let second = &flock.boids()[1];
    let away = first.annotation().separation;
    assert!(away.normalize_or_0().is_equal_within_epsilon(-Vec3::X));
    assert!(second.annotation().separation.normalize_or_0().is_equal_within_epsilon(Vec3::X));
    assert!(first.position().distance(second.position()) > 1.0);
}

#[test]
fn boid_dodges_cylinder_in_path() {
    let mut flock = flock_of(test_config(0, 0), vec![boid_at(0, Vec3::new(0.0, 0.0, -20.0), Vec3::Z)]);
    flock.add_obstacle(Obstacle::cylinder(2.0, Vec3::new(-30.0, 0.0, 0.0), Vec3::new(30.0, 0.0, 0.0)).unwrap());

    let mut strongest = 0.0_f64;
    let mut lateral = 0.0_f64;
    for _ in 0..300 {
        flock.step(TIME_STEP);
        let boid = &flock.boids()[0];
        strongest = strongest.max(boid.annotation().avoid_weight);
        lateral = lateral.max(boid.position().y.abs());
    }
    assert!(strongest > 0.5);
    assert!(lateral > 1.0);
}

// =============================================================================
// Statistics and drawing
// =============================================================================

#[test]
fn statistics_track_the_run() {
    let mut flock = Flock::new(test_config(12, 40)).unwrap();
    run(&mut flock, 30);
    let stats = flock.stats();
    assert_eq!(stats.steps, 30);
    assert!((stats.simulated_time - 0.5).abs() < 1e-12);
    assert!(stats.mean_speed > 0.0 && stats.mean_speed <= 20.0);
    assert_eq!(stats.nearest_neighbor.sample_count, 40);
    assert!(stats.nearest_neighbor.min <= stats.nearest_neighbor.mean);
    assert!(stats.nearest_neighbor.mean <= stats.nearest_neighbor.max);
}

#[test]
fn annotated_frames_draw_selected_neighborhood() {
    let mut config = test_config(6, 30);
    config.flags = RunFlags::ANNOTATE;
    let mut flock = Flock::new(config).unwrap();
    let mut renderer = RecordingRenderer::new(TIME_STEP);
    for _ in 0..5 {
        renderer.clear();
        assert!(flock.run_frame(&mut renderer));
    }
    assert_eq!(renderer.triangle_count(), 120);
    let selected = flock.selected_boid().unwrap();
    assert_eq!(selected.neighbors().len(), 7);
    // Up to five force lines and one avoidance ray per annotated boid.
    assert!(renderer.line_count() <= 6 * 8);
    assert!(renderer.line_count() >= 8);
}

#[test]
fn paused_frames_still_draw() {
    let mut flock = Flock::new(test_config(6, 10)).unwrap();
    flock.toggle_paused();
    let mut renderer = RecordingRenderer::new(TIME_STEP);
    assert!(!flock.run_frame(&mut renderer));
    assert_eq!(renderer.triangle_count(), 40);
    assert_eq!(flock.stats().steps, 0);
}
