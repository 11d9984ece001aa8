//! Scroll position reported by the host.

/// A scroll event, in the host's points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Vertical content offset.
    pub content_offset_y: f32,
    /// Height of the visible viewport.
    pub viewport_height: f32,
    /// Height of the whole content.
    pub content_height: f32,
    /// Bottom content inset.
    pub inset_bottom: f32,
}

impl ScrollMetrics {
    /// Create scroll metrics with no inset.
    pub fn new(content_offset_y: f32, viewport_height: f32, content_height: f32) -> Self {
        Self {
            content_offset_y,
            viewport_height,
            content_height,
            inset_bottom: 0.0,
        }
    }

    /// Set the bottom inset.
    pub fn with_inset_bottom(mut self, inset_bottom: f32) -> Self {
        self.inset_bottom = inset_bottom;
        self
    }

    /// The visible bottom edge, excluding the bottom inset.
    pub fn visible_bottom(&self) -> f32 {
        self.content_offset_y + self.viewport_height - self.inset_bottom
    }

    /// Returns `true` once the visible bottom edge is within one viewport
    /// of the end of the content.
    pub fn is_near_bottom(&self) -> bool {
        self.visible_bottom() > self.content_height - self.viewport_height
    }
}
