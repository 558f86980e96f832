use crate::paint::{BlendMode, Color};

use super::Attachment;

/// A named attachment point in the draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    /// Index into [`Skeleton::bones`](super::Skeleton::bones).
    pub bone: usize,
    pub color: Color,
    pub blend_mode: BlendMode,
    pub attachment: Option<Attachment>,
}

impl Slot {
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            color: Color::WHITE,
            blend_mode: BlendMode::Normal,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }
}
