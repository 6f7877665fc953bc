use std::sync::Arc;

/// One frame's command stream and the view it finally lands on. Surface
/// frames present on submit; offscreen frames only submit.
pub struct Frame {
    pub target_view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    output: Option<wgpu::SurfaceTexture>,
    queue: Arc<wgpu::Queue>,
}

impl Frame {
    pub fn for_surface(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        output: wgpu::SurfaceTexture,
    ) -> Self {
        let target_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            target_view,
            encoder: create_encoder(device),
            output: Some(output),
            queue,
        }
    }

    pub fn for_texture(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        target_view: wgpu::TextureView,
    ) -> Self {
        Self {
            target_view,
            encoder: create_encoder(device),
            output: None,
            queue,
        }
    }

    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    pub fn submit(self) {
        self.queue.submit(Some(self.encoder.finish()));

        if let Some(output) = self.output {
            output.present();
        }
    }
}

fn create_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("blackhole-frame-encoder"),
    })
}
