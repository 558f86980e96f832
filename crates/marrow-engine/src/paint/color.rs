use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from straight RGB bytes plus an opacity byte.
    #[inline]
    pub fn from_rgb8(rgb: Rgb8, opacity: u8) -> Self {
        Self::new(
            rgb.r as f32 / 255.0,
            rgb.g as f32 / 255.0,
            rgb.b as f32 / 255.0,
            opacity as f32 / 255.0,
        )
    }

    /// Channel-wise product.
    #[inline]
    pub fn modulate(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b, self.a * other.a)
    }

    /// RGB scaled to bytes; alpha is dropped.
    ///
    /// Float-to-byte conversion truncates and saturates, like the vertex path.
    #[inline]
    pub fn to_rgb8(self) -> Rgb8 {
        Rgb8::new(
            (255.0 * self.r) as u8,
            (255.0 * self.g) as u8,
            (255.0 * self.b) as u8,
        )
    }

    /// Alpha scaled to a byte (truncating, saturating).
    #[inline]
    pub fn alpha8(self) -> u8 {
        (255.0 * self.a) as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Byte RGBA color, laid out for direct upload as a vertex attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color8 {
    pub const WHITE: Color8 = Color8::new(255, 255, 255, 255);
    pub const RED: Color8 = Color8::new(255, 0, 0, 255);
    pub const GREEN: Color8 = Color8::new(0, 255, 0, 255);
    pub const BLUE: Color8 = Color8::new(0, 0, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]` for shader uniforms and line vertices.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Byte RGB tint, as accepted by overlay nodes and entity tinting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulate_multiplies_channels() {
        let c = Color::new(0.5, 1.0, 0.25, 0.5).modulate(Color::new(0.5, 0.5, 1.0, 0.5));
        assert_eq!(c, Color::new(0.25, 0.5, 0.25, 0.25));
    }

    #[test]
    fn byte_conversions_truncate() {
        let c = Color::new(0.999, 0.5, 0.0, 0.5);
        assert_eq!(c.to_rgb8(), Rgb8::new(254, 127, 0));
        assert_eq!(c.alpha8(), 127);
    }

    #[test]
    fn byte_conversions_saturate() {
        let c = Color::new(2.0, -1.0, 1.0, 4.0);
        assert_eq!(c.to_rgb8(), Rgb8::new(255, 0, 255));
        assert_eq!(c.alpha8(), 255);
    }

    #[test]
    fn from_rgb8_round_trips_white() {
        assert_eq!(Color::from_rgb8(Rgb8::WHITE, 255), Color::WHITE);
    }
}
