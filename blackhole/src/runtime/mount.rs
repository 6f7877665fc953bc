use super::viewport::ContainerSize;

/// Id of the element the scene attaches to.
pub const MOUNT_ID: &str = "blackholeWrap";

/// A host element the scene can render into.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub id: String,
    pub size: ContainerSize,
}

/// What the component needs from the page hosting it.
pub trait Document {
    fn container(&self, id: &str) -> Option<Container>;

    /// Viewport width in CSS pixels, for tier detection.
    fn viewport_width(&self) -> f32;

    fn prefers_reduced_motion(&self) -> bool;

    fn device_pixel_ratio(&self) -> f32;
}

/// A document with at most one container and fixed media answers. Hosts
/// without a real page (the desktop viewer, headless runs) describe
/// themselves with this.
#[derive(Clone, Debug)]
pub struct StaticDocument {
    pub container: Option<Container>,
    pub viewport_width: f32,
    pub reduced_motion: bool,
    pub device_pixel_ratio: f32,
}

impl StaticDocument {
    pub fn with_mount(
        size: ContainerSize,
        reduced_motion: bool,
        device_pixel_ratio: f32,
    ) -> Self {
        Self {
            container: Some(Container {
                id: MOUNT_ID.to_string(),
                size,
            }),
            viewport_width: size.width,
            reduced_motion,
            device_pixel_ratio,
        }
    }
}

impl Document for StaticDocument {
    fn container(&self, id: &str) -> Option<Container> {
        self.container
            .as_ref()
            .filter(|container| container.id == id)
            .cloned()
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }
}
