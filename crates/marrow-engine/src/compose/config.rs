use crate::paint::{BlendFunc, Color, Rgb8};
use crate::scene::ZIndex;

/// Per-entity render settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderConfig {
    /// Textures carry premultiplied alpha; vertex RGB is scaled by alpha.
    pub premultiplied_alpha: bool,
    /// Overrides the default blend function derived from `premultiplied_alpha`.
    pub blend: Option<BlendFunc>,
    pub debug_slots: bool,
    pub debug_bones: bool,
    pub z: ZIndex,
    /// Skeleton-level tint, multiplied into every vertex.
    pub tint: Rgb8,
    pub opacity: u8,
}

impl RenderConfig {
    /// Blend function for normal slots.
    #[inline]
    pub fn blend_func(&self) -> BlendFunc {
        self.blend
            .unwrap_or_else(|| BlendFunc::for_alpha(self.premultiplied_alpha))
    }

    /// Skeleton color as used by the vertex coloring formula.
    #[inline]
    pub fn skeleton_color(&self) -> Color {
        Color::from_rgb8(self.tint, self.opacity)
    }

    #[inline]
    pub fn debug_enabled(&self) -> bool {
        self.debug_slots || self.debug_bones
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            premultiplied_alpha: true,
            blend: None,
            debug_slots: false,
            debug_bones: false,
            z: ZIndex::default(),
            tint: Rgb8::WHITE,
            opacity: 255,
        }
    }
}
