use std::sync::Arc;

use log::{debug, error, warn};

use super::Compositor;
use super::bloom::BloomPass;
use super::frame::Frame;
use super::mesh_pass::GpuMesh;
use super::passes::{FullscreenPass, HDR_FORMAT, RenderTexture, TRANSPARENT};
use super::shaders;
use super::uniforms::{LensingUniforms, UniformBlock};
use crate::config::SceneConfig;
use crate::runtime::viewport::BufferLayout;
use crate::scene::Scene;
use crate::shading::lensing::LensingState;

/// Format of the headless presentation target. Output values are written
/// raw, so it is deliberately not an sRGB format.
pub const OFFSCREEN_PRESENT_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba8Unorm;

#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub async fn request(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
        force_fallback_adapter: bool,
    ) -> Result<(wgpu::Adapter, Self), String> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter,
                compatible_surface: surface,
            })
            .await
            .map_err(|err| format!("no suitable adapter: {}", err))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("blackhole-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .map_err(|err| format!("failed to create device: {}", err))?;

        debug!("using adapter: {:?}", adapter.get_info());

        Ok((
            adapter,
            Self {
                device: Arc::new(device),
                queue: Arc::new(queue),
            },
        ))
    }

    /// Device without a window, for headless rendering and GPU tests.
    pub fn headless(force_fallback_adapter: bool) -> Result<Self, String> {
        let instance =
            wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        pollster::block_on(Self::request(
            &instance,
            None,
            force_fallback_adapter,
        ))
        .map(|(_, context)| context)
    }
}

pub enum PresentTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen(RenderTexture),
}

impl PresentTarget {
    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            Self::Surface { config, .. } => config.format,
            Self::Offscreen(texture) => texture.texture().format(),
        }
    }
}

/// Prefers a non-sRGB format: the lensing pass writes display values
/// directly.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Prefers an alpha mode that lets the desktop show through transparent
/// pixels.
pub fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PostMultiplied,
        wgpu::CompositeAlphaMode::PreMultiplied,
    ]
    .into_iter()
    .find(|mode| modes.contains(mode))
    .or_else(|| modes.first().copied())
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Clamps each side to `max_side`, the device's 2D texture limit.
pub fn clamp_extent(size: [u32; 2], max_side: u32) -> [u32; 2] {
    size.map(|side| side.min(max_side))
}

pub struct GpuCompositor {
    gpu: GpuContext,
    target: PresentTarget,
    scene_target: Option<RenderTexture>,
    meshes: Vec<GpuMesh>,
    bloom: BloomPass,
    lensing: FullscreenPass,
    lensing_uniforms: UniformBlock<LensingUniforms>,
    disposed: bool,
}

impl GpuCompositor {
    /// Builds every pipeline for `scene`. Fails when a shader asset does
    /// not validate or the device rejects a pipeline.
    pub fn new(
        gpu: GpuContext,
        target: PresentTarget,
        scene: &Scene,
        config: &SceneConfig,
    ) -> Result<Self, String> {
        let device = gpu.device.clone();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = Self::build(gpu, target, scene, config);
        let scope_error = pollster::block_on(device.pop_error_scope());

        let compositor = built?;

        match scope_error {
            Some(err) => {
                Err(format!("failed to build render pipelines: {}", err))
            }
            None => Ok(compositor),
        }
    }

    fn build(
        gpu: GpuContext,
        target: PresentTarget,
        scene: &Scene,
        config: &SceneConfig,
    ) -> Result<Self, String> {
        let device = gpu.device.as_ref();

        let meshes = scene
            .meshes()
            .iter()
            .map(|mesh| GpuMesh::new(device, mesh, &scene.camera))
            .collect::<Result<Vec<_>, _>>()?;

        let bloom = BloomPass::new(device, &config.bloom)?;

        let lensing_uniforms = UniformBlock::new(
            device,
            "blackhole-lensing-uniforms",
            LensingUniforms::from(&LensingState::from_config(&config.lensing)),
        );

        let lensing = FullscreenPass::new(
            device,
            shaders::LENSING,
            lensing_uniforms.bind_group_layout(),
            1,
            target.format(),
            wgpu::BlendState::REPLACE,
        )?;

        Ok(Self {
            gpu,
            target,
            scene_target: None,
            meshes,
            bloom,
            lensing,
            lensing_uniforms,
            disposed: false,
        })
    }

    /// Offscreen compositor whose presentation target follows the buffer
    /// size.
    pub fn offscreen(
        gpu: GpuContext,
        scene: &Scene,
        config: &SceneConfig,
    ) -> Result<Self, String> {
        let target = PresentTarget::Offscreen(RenderTexture::new(
            gpu.device.as_ref(),
            "blackhole-present",
            OFFSCREEN_PRESENT_FORMAT,
            [1, 1],
        ));

        Self::new(gpu, target, scene, config)
    }

    pub fn present_target(&self) -> &PresentTarget {
        &self.target
    }

    /// Surface size follows the window, independent of the scene buffer.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let max_side = self.gpu.device.limits().max_texture_dimension_2d;
        let [width, height] = clamp_extent([width, height], max_side);

        if let PresentTarget::Surface { surface, config } = &mut self.target {
            config.width = width;
            config.height = height;
            surface.configure(self.gpu.device.as_ref(), config);
        }
    }

    fn begin_frame(&mut self) -> Result<Option<Frame>, String> {
        let device = self.gpu.device.as_ref();

        match &mut self.target {
            PresentTarget::Offscreen(texture) => Ok(Some(Frame::for_texture(
                device,
                self.gpu.queue.clone(),
                texture.view.clone(),
            ))),
            PresentTarget::Surface { surface, config } => {
                match surface.get_current_texture() {
                    Ok(output) => Ok(Some(Frame::for_surface(
                        device,
                        self.gpu.queue.clone(),
                        output,
                    ))),
                    Err(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    ) => {
                        surface.configure(device, config);
                        Ok(None)
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout while acquiring frame");
                        Ok(None)
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        Err("surface out of memory".to_string())
                    }
                    Err(wgpu::SurfaceError::Other) => {
                        warn!("surface error while acquiring frame");
                        Ok(None)
                    }
                }
            }
        }
    }

    fn encode_geometry(
        &self,
        frame: &mut Frame,
        scene: &Scene,
        target: &RenderTexture,
    ) {
        let mut pass =
            frame.encoder().begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blackhole-geometry"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

        for mesh in scene.draw_order() {
            match self.meshes.iter().find(|gpu_mesh| gpu_mesh.role == mesh.role)
            {
                Some(gpu_mesh) => gpu_mesh.draw(&mut pass),
                None => crate::warn_once!(
                    "no GPU mesh for {:?}; skipping",
                    mesh.role
                ),
            }
        }
    }
}

impl Compositor for GpuCompositor {
    fn set_size(&mut self, layout: &BufferLayout) {
        if self.disposed {
            return;
        }

        let device = self.gpu.device.as_ref();
        let max_side = device.limits().max_texture_dimension_2d;
        let size = clamp_extent(layout.buffer_size(), max_side);

        if size != layout.buffer_size() {
            crate::warn_once!(
                "buffer {:?} exceeds the {} px texture limit; clamping",
                layout.buffer_size(),
                max_side
            );
        }

        let stale = self
            .scene_target
            .as_ref()
            .is_none_or(|target| target.size != size);

        if stale {
            if let Some(old) = self.scene_target.take() {
                old.destroy();
            }
            self.scene_target = Some(RenderTexture::new(
                device,
                "blackhole-scene",
                HDR_FORMAT,
                size,
            ));
        }

        self.bloom.resize(device, size);

        if let PresentTarget::Offscreen(texture) = &mut self.target {
            if texture.size != size {
                let format = texture.texture().format();
                texture.destroy();
                *texture = RenderTexture::new(
                    device,
                    "blackhole-present",
                    format,
                    size,
                );
            }
        }
    }

    fn render(
        &mut self,
        scene: &Scene,
        lensing: &LensingState,
    ) -> Result<(), String> {
        if self.disposed {
            return Ok(());
        }

        for mesh in scene.meshes() {
            if let Some(gpu_mesh) = self
                .meshes
                .iter_mut()
                .find(|gpu_mesh| gpu_mesh.role == mesh.role)
            {
                gpu_mesh.write(&self.gpu.queue, mesh, &scene.camera)?;
            }
        }

        self.lensing_uniforms.set(LensingUniforms::from(lensing));
        self.lensing_uniforms.upload(&self.gpu.queue);

        let Some(mut frame) = self.begin_frame()? else {
            return Ok(());
        };

        let scene_target = self
            .scene_target
            .as_ref()
            .ok_or_else(|| "render called before set_size".to_string())?;

        self.encode_geometry(&mut frame, scene, scene_target);

        let device = self.gpu.device.as_ref();

        self.bloom.encode(
            device,
            &self.gpu.queue,
            frame.encoder(),
            scene_target,
        )?;

        let textures =
            self.lensing.bind_textures(device, &[&scene_target.view]);
        let target_view = frame.target_view.clone();

        self.lensing.draw(
            frame.encoder(),
            &target_view,
            wgpu::LoadOp::Clear(TRANSPARENT),
            self.lensing_uniforms.bind_group(),
            &textures,
        );

        frame.submit();
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.disposed = true;

        for mesh in self.meshes.drain(..) {
            mesh.destroy();
        }

        if let Some(target) = self.scene_target.take() {
            target.destroy();
        }

        self.bloom.destroy();

        if let PresentTarget::Offscreen(texture) = &self.target {
            texture.destroy();
        }

        if let Err(err) = self.gpu.device.poll(wgpu::PollType::Wait) {
            error!("device poll failed during dispose: {:?}", err);
        }
    }
}

impl Drop for GpuCompositor {
    fn drop(&mut self) {
        self.dispose();
    }
}
