#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use blackhole::prelude::*;
use blackhole::scene::mesh::Material;
use glam::Vec2;

pub fn gpu_tests_enabled() -> bool {
    std::env::var("BLACKHOLE_RUN_GPU_TESTS")
        .map(|value| value == "1")
        .unwrap_or(false)
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn document(width: f32, height: f32) -> StaticDocument {
    StaticDocument::with_mount(ContainerSize::new(width, height), false, 1.0)
}

#[derive(Clone, Debug)]
pub struct RenderRecord {
    pub draw_order: Vec<MeshRole>,
    pub disk_time: f32,
    pub camera_aspect: f32,
    pub lensing: LensingState,
}

/// Records what the driver hands it instead of drawing.
#[derive(Default)]
pub struct RecordingCompositor {
    pub layouts: Vec<BufferLayout>,
    pub renders: Vec<RenderRecord>,
    pub dispose_calls: usize,
    pub fail_renders: bool,
}

impl Compositor for RecordingCompositor {
    fn set_size(&mut self, layout: &BufferLayout) {
        self.layouts.push(*layout);
    }

    fn render(
        &mut self,
        scene: &Scene,
        lensing: &LensingState,
    ) -> Result<(), String> {
        if self.fail_renders {
            return Err("surface out of memory".to_string());
        }

        let disk_time = scene
            .meshes()
            .iter()
            .find_map(|mesh| match &mesh.material {
                Material::Disk(disk) => Some(disk.time),
                _ => None,
            })
            .unwrap_or(f32::NAN);

        self.renders.push(RenderRecord {
            draw_order: scene
                .draw_order()
                .iter()
                .map(|mesh| mesh.role)
                .collect(),
            disk_time,
            camera_aspect: scene.camera.aspect(),
            lensing: lensing.clone(),
        });

        Ok(())
    }

    fn dispose(&mut self) {
        self.dispose_calls += 1;
    }
}

pub fn mount_recording(
    document: &StaticDocument,
    start: Instant,
) -> BlackHole<RecordingCompositor> {
    BlackHole::mount(document, &SceneConfig::default(), start, |_| {
        Ok(RecordingCompositor::default())
    })
    .expect("mount")
    .expect("container present")
}

/// Hands out pre-planned ticks, then cancels the loop.
pub struct ScriptedScheduler {
    ticks: VecDeque<(Instant, Vec<HostEvent>)>,
    pending: Vec<HostEvent>,
    token: CancellationToken,
}

impl ScriptedScheduler {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            ticks: VecDeque::new(),
            pending: Vec::new(),
            token,
        }
    }

    pub fn tick(mut self, at: Instant) -> Self {
        self.ticks.push_back((at, vec![]));
        self
    }

    pub fn tick_with(mut self, at: Instant, events: Vec<HostEvent>) -> Self {
        self.ticks.push_back((at, events));
        self
    }

    pub fn every(mut self, start: Instant, step: Duration, count: u32) -> Self {
        for index in 0..count {
            self.ticks.push_back((start + step * index, vec![]));
        }
        self
    }
}

impl FrameScheduler for ScriptedScheduler {
    fn await_next_tick(&mut self) -> Instant {
        let (at, events) = self
            .ticks
            .pop_front()
            .expect("scheduler polled after its last tick");

        self.pending = events;

        if self.ticks.is_empty() {
            self.token.cancel();
        }

        at
    }

    fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.pending)
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

pub fn approx_vec2(a: Vec2, b: Vec2) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}
