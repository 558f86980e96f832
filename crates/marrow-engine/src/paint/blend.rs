/// Per-slot blend mode from the skeleton data.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

/// Blend factor subset used by skeleton rendering.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusSrcColor,
}

/// Source/destination blend factors applied to a whole batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Blending for textures with premultiplied alpha.
    pub const PREMULTIPLIED: BlendFunc = BlendFunc::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha);
    /// Blending for straight-alpha textures.
    pub const STRAIGHT: BlendFunc = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

    #[inline]
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }

    /// Default function for the given alpha convention.
    #[inline]
    pub const fn for_alpha(premultiplied: bool) -> Self {
        if premultiplied { Self::PREMULTIPLIED } else { Self::STRAIGHT }
    }

    /// Effective function for a slot: additive slots keep the source factor
    /// and add onto the destination.
    #[inline]
    pub fn with_mode(self, mode: BlendMode) -> BlendFunc {
        match mode {
            BlendMode::Normal => self,
            BlendMode::Additive => BlendFunc::new(self.src, BlendFactor::One),
        }
    }
}
