//! Tests for edge-zone auto-scrolling.

use super::*;
use crate::engine::surface::SharedScrollOffset;

fn config() -> AutoScrollConfig {
    AutoScrollConfig {
        threshold: 80.0,
        speed: 10.0,
        min_speed: 1.0,
        tick: Duration::from_millis(1),
    }
}

fn surface_at(offset: f32) -> (Arc<SharedScrollOffset>, Arc<dyn ScrollSurface>) {
    let shared = Arc::new(SharedScrollOffset::new(10_000.0));
    shared.scroll_to(offset);
    let dyn_surface: Arc<dyn ScrollSurface> = shared.clone();
    (shared, dyn_surface)
}

// ===== Pure zone math =====

#[test]
fn zone_top_bottom_and_dead() {
    assert_eq!(zone_for(10.0, 600.0, 80.0), Some(ScrollDirection::Up));
    assert_eq!(zone_for(590.0, 600.0, 80.0), Some(ScrollDirection::Down));
    assert_eq!(zone_for(300.0, 600.0, 80.0), None);
}

#[test]
fn zone_boundaries_belong_to_dead_zone() {
    assert_eq!(zone_for(80.0, 600.0, 80.0), None);
    assert_eq!(zone_for(520.0, 600.0, 80.0), None);
    assert_eq!(zone_for(79.9, 600.0, 80.0), Some(ScrollDirection::Up));
    assert_eq!(zone_for(520.1, 600.0, 80.0), Some(ScrollDirection::Down));
}

#[test]
fn zone_outside_viewport_keeps_scrolling() {
    assert_eq!(zone_for(-30.0, 600.0, 80.0), Some(ScrollDirection::Up));
    assert_eq!(zone_for(900.0, 600.0, 80.0), Some(ScrollDirection::Down));
}

#[test]
fn zone_rejects_nan() {
    assert_eq!(zone_for(f32::NAN, 600.0, 80.0), None);
}

#[test]
fn speed_is_proportional_to_depth() {
    let cfg = config();
    assert_eq!(scroll_speed(ScrollDirection::Up, 40.0, 600.0, &cfg), 5.0);
    assert_eq!(scroll_speed(ScrollDirection::Up, 0.0, 600.0, &cfg), 10.0);
    assert_eq!(scroll_speed(ScrollDirection::Down, 580.0, 600.0, &cfg), 7.5);
}

#[test]
fn speed_never_drops_below_minimum() {
    let cfg = config();
    assert_eq!(scroll_speed(ScrollDirection::Up, 79.99, 600.0, &cfg), 1.0);
    assert_eq!(scroll_speed(ScrollDirection::Down, 520.01, 600.0, &cfg), 1.0);
}

#[test]
fn speed_caps_at_full_rate_beyond_viewport() {
    let cfg = config();
    assert_eq!(scroll_speed(ScrollDirection::Up, -500.0, 600.0, &cfg), 10.0);
}

#[test]
fn step_up_clamps_at_zero() {
    assert_eq!(scroll_step(ScrollDirection::Up, 4.0, 10.0), 0.0);
    assert_eq!(scroll_step(ScrollDirection::Up, 40.0, 10.0), 30.0);
    assert_eq!(scroll_step(ScrollDirection::Down, 40.0, 10.0), 50.0);
}

// ===== Controller with a live timer =====

#[test]
fn pointer_in_top_zone_scrolls_up() {
    let (shared, surface) = surface_at(500.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(40.0);

    assert_eq!(controller.direction(), Some(ScrollDirection::Up));
    assert!(controller.current_speed() >= config().min_speed);
    thread::sleep(Duration::from_millis(50));
    controller.stop();
    assert!(shared.scroll_offset() < 500.0);
}

#[test]
fn pointer_in_bottom_zone_scrolls_down() {
    let (shared, surface) = surface_at(0.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(590.0);
    thread::sleep(Duration::from_millis(50));
    controller.stop();

    assert!(shared.scroll_offset() > 0.0);
}

#[test]
fn dead_zone_stops_scrolling() {
    let (shared, surface) = surface_at(5_000.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(10.0);
    thread::sleep(Duration::from_millis(20));
    controller.on_pointer_moved(300.0);

    assert_eq!(controller.direction(), None);
    let frozen = shared.scroll_offset();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(shared.scroll_offset(), frozen);
}

#[test]
fn upward_scroll_stops_at_zero() {
    let (shared, surface) = surface_at(15.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(0.0);
    thread::sleep(Duration::from_millis(50));
    controller.stop();

    assert_eq!(shared.scroll_offset(), 0.0);
}

#[test]
fn switching_direction_replaces_timer() {
    let (_shared, surface) = surface_at(500.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(10.0);
    controller.on_pointer_moved(590.0);

    assert_eq!(controller.direction(), Some(ScrollDirection::Down));
    controller.stop();
    assert_eq!(controller.direction(), None);
}

#[test]
fn moving_within_zone_updates_speed() {
    let (_shared, surface) = surface_at(500.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);

    controller.on_pointer_moved(60.0);
    let shallow = controller.current_speed();
    controller.on_pointer_moved(5.0);
    let deep = controller.current_speed();
    controller.stop();

    assert!(deep > shallow);
}

#[test]
fn dropped_surface_makes_ticks_silent() {
    let (shared, surface) = surface_at(500.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);
    drop(shared);
    drop(surface);

    controller.on_pointer_moved(10.0);
    thread::sleep(Duration::from_millis(10));
    // Timer already exited on its own; stop must still return promptly
    controller.stop();
    assert_eq!(controller.direction(), None);
}

#[test]
fn stop_is_idempotent() {
    let (_shared, surface) = surface_at(0.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);
    controller.stop();
    controller.stop();
    assert_eq!(controller.direction(), None);
}

#[test]
fn viewport_resize_moves_bottom_zone() {
    let (_shared, surface) = surface_at(0.0);
    let controller = AutoScrollController::new(config(), &surface, 600.0);
    controller.set_viewport_height(300.0);

    controller.on_pointer_moved(290.0);

    assert_eq!(controller.direction(), Some(ScrollDirection::Down));
    controller.stop();
}
