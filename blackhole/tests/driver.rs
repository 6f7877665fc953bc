mod support;

use std::time::Instant;

use blackhole::prelude::*;
use glam::Vec2;

use support::{
    RecordingCompositor, ScriptedScheduler, approx, approx_vec2, document,
    mount_recording, ms,
};

#[test]
fn missing_container_mounts_nothing() {
    let document = StaticDocument {
        container: None,
        viewport_width: 1280.0,
        reduced_motion: false,
        device_pixel_ratio: 1.0,
    };

    let mut built = false;
    let mounted = BlackHole::mount(
        &document,
        &SceneConfig::default(),
        Instant::now(),
        |_| {
            built = true;
            Ok(RecordingCompositor::default())
        },
    )
    .expect("missing container is not an error");

    assert!(mounted.is_none());
    assert!(!built);
}

#[test]
fn compositor_failure_is_an_error() {
    let result = BlackHole::<RecordingCompositor>::mount(
        &document(800.0, 600.0),
        &SceneConfig::default(),
        Instant::now(),
        |_| Err("disk.wgsl: unknown identifier".to_string()),
    );

    let err = result.err().expect("mount must fail");
    assert!(err.contains("disk.wgsl"));
}

#[test]
fn tier_boundary_is_inclusive() {
    let start = Instant::now();

    let compact = mount_recording(&document(980.0, 600.0), start);
    assert_eq!(compact.profile().tier, Tier::Compact);
    assert_eq!(compact.profile().frame_cap_hz, 30.0);

    let full = mount_recording(&document(981.0, 600.0), start);
    assert_eq!(full.profile().tier, Tier::Full);
    assert_eq!(full.profile().frame_cap_hz, 60.0);
}

#[test]
fn reduced_motion_forces_compact() {
    let document = StaticDocument::with_mount(
        ContainerSize::new(1920.0, 1080.0),
        true,
        2.0,
    );
    let black_hole = mount_recording(&document, Instant::now());

    assert_eq!(*black_hole.profile(), RenderProfile::COMPACT);
    assert_eq!(
        black_hole.viewport().layout().map(|layout| layout.buffer),
        Some([1920, 1080])
    );
}

#[test]
fn mount_sizes_the_compositor_once() {
    let black_hole = mount_recording(&document(1000.0, 500.0), Instant::now());

    let layouts = &black_hole.compositor().layouts;
    assert_eq!(layouts.len(), 1);
    assert_eq!(layouts[0].display, [1200, 600]);
    assert_eq!(layouts[0].buffer, [1200, 600]);
}

#[test]
fn thirty_hz_cap_drops_fast_ticks() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    let outcomes = (0..10)
        .map(|step| black_hole.tick(start + ms(10 * step)).expect("tick"))
        .collect::<Vec<_>>();

    let rendered = outcomes
        .iter()
        .filter(|outcome| **outcome == FrameOutcome::Rendered)
        .count();

    assert_eq!(rendered, 3);
    assert_eq!(outcomes[1], FrameOutcome::Throttled);
    assert_eq!(black_hole.compositor().renders.len(), 3);
}

#[test]
fn sixty_hz_cap_on_full_tier() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(1280.0, 720.0), start);

    for step in 0..10 {
        black_hole.tick(start + ms(10 * step)).expect("tick");
    }

    assert_eq!(black_hole.frame_count(), 5);
}

#[test]
fn gated_ticks_never_render_or_consume_frames() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.on_visibility_change(true);
    for step in 0..10 {
        assert_eq!(
            black_hole.tick(start + ms(100 * step)).expect("tick"),
            FrameOutcome::Gated
        );
    }
    assert_eq!(black_hole.frame_count(), 0);

    black_hole.on_visibility_change(false);
    black_hole.on_intersection_change(false);
    assert_eq!(
        black_hole.tick(start + ms(2000)).expect("tick"),
        FrameOutcome::Gated
    );

    black_hole.on_intersection_change(true);
    assert_eq!(
        black_hole.tick(start + ms(2001)).expect("tick"),
        FrameOutcome::Rendered
    );
    assert_eq!(black_hole.compositor().renders.len(), 1);
}

#[test]
fn slivers_of_the_container_do_not_render() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.on_visible_fraction(0.01);
    assert_eq!(black_hole.tick(start).expect("tick"), FrameOutcome::Gated);

    black_hole.on_visible_fraction(0.05);
    assert_eq!(
        black_hole.tick(start + ms(100)).expect("tick"),
        FrameOutcome::Rendered
    );
    assert_eq!(black_hole.frame_count(), 1);
}

#[test]
fn scene_time_keeps_running_while_gated() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.tick(start).expect("tick");
    black_hole.on_visibility_change(true);
    black_hole.tick(start + ms(5000)).expect("tick");
    black_hole.on_visibility_change(false);
    black_hole.tick(start + ms(6000)).expect("tick");

    let renders = &black_hole.compositor().renders;
    assert_eq!(renders.len(), 2);
    assert!(approx(renders[0].disk_time, 0.0));
    assert!(approx(renders[1].disk_time, 6.0));
}

#[test]
fn draws_glow_and_core_before_disk() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.tick(start).expect("tick");

    assert_eq!(
        black_hole.compositor().renders[0].draw_order,
        vec![MeshRole::GlowShell, MeshRole::Core, MeshRole::Disk]
    );
}

#[test]
fn aspect_follows_the_container() {
    let start = Instant::now();
    let document = StaticDocument::with_mount(
        ContainerSize::new(1600.0, 800.0),
        false,
        2.0,
    );
    let mut black_hole = mount_recording(&document, start);

    black_hole.tick(start).expect("tick");

    let record = &black_hole.compositor().renders[0];
    assert!(approx(record.camera_aspect, 2.0));
    assert!(approx(record.lensing.aspect_ratio, 2.0));

    black_hole.handle_event(HostEvent::Resized(ContainerSize::new(
        600.0, 900.0,
    )));
    black_hole.tick(start + ms(100)).expect("tick");

    let record = &black_hole.compositor().renders[1];
    assert!(approx(record.camera_aspect, 600.0 / 900.0));
    assert_eq!(black_hole.compositor().layouts.len(), 2);
}

#[test]
fn lensing_centre_tracks_the_core() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(1280.0, 720.0), start);

    black_hole.tick(start).expect("tick");

    let lensing = &black_hole.compositor().renders[0].lensing;
    assert!(approx_vec2(lensing.center, Vec2::splat(0.5)));
}

#[test]
fn zero_sized_container_is_clamped() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.on_resize(ContainerSize::new(0.0, 0.0));

    let layout = black_hole.compositor().layouts.last().copied();
    let layout = layout.expect("resize reaches the compositor");
    assert_eq!(layout.buffer, [1, 1]);

    black_hole.tick(start).expect("tick");
    let record = &black_hole.compositor().renders[0];
    assert!(approx(record.camera_aspect, 1.0));
    assert!(record.lensing.aspect_ratio.is_finite());
}

#[test]
fn dispose_is_idempotent_and_gates_ticks() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    black_hole.dispose();
    black_hole.dispose();

    assert!(black_hole.is_disposed());
    assert_eq!(black_hole.compositor().dispose_calls, 1);
    assert_eq!(black_hole.tick(start).expect("tick"), FrameOutcome::Gated);

    black_hole.on_resize(ContainerSize::new(400.0, 400.0));
    assert_eq!(black_hole.compositor().layouts.len(), 1);
}

#[test]
fn run_applies_events_before_their_tick() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    let token = CancellationToken::new();
    let mut scheduler = ScriptedScheduler::new(token.clone())
        .tick(start)
        .tick_with(
            start + ms(100),
            vec![HostEvent::VisibilityChanged { hidden: true }],
        )
        .tick_with(
            start + ms(200),
            vec![
                HostEvent::VisibilityChanged { hidden: false },
                HostEvent::Resized(ContainerSize::new(500.0, 250.0)),
            ],
        );

    black_hole.run(&mut scheduler, &token).expect("run");

    let renders = &black_hole.compositor().renders;
    assert_eq!(renders.len(), 2);
    assert!(approx(renders[1].camera_aspect, 2.0));
    assert!(token.is_cancelled());
}

#[test]
fn run_stops_when_already_cancelled() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);

    let token = CancellationToken::new();
    token.cancel();

    let mut scheduler = ScriptedScheduler::new(token.clone());
    black_hole.run(&mut scheduler, &token).expect("run");

    assert_eq!(black_hole.frame_count(), 0);
}

#[test]
fn run_surfaces_render_errors() {
    let start = Instant::now();
    let mut black_hole = mount_recording(&document(800.0, 600.0), start);
    black_hole.compositor_mut().fail_renders = true;

    let token = CancellationToken::new();
    let mut scheduler = ScriptedScheduler::new(token.clone())
        .every(start, ms(50), 4);

    let err = black_hole
        .run(&mut scheduler, &token)
        .expect_err("render failure stops the loop");
    assert!(err.contains("out of memory"));
}

#[test]
fn instances_do_not_share_state() {
    let start = Instant::now();
    let mut first = mount_recording(&document(800.0, 600.0), start);
    let mut second = mount_recording(&document(1280.0, 720.0), start);

    first.on_visibility_change(true);
    first.tick(start).expect("tick");
    second.tick(start).expect("tick");

    assert_eq!(first.frame_count(), 0);
    assert_eq!(second.frame_count(), 1);
}
