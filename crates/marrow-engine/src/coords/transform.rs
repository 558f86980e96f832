use super::Vec2;

/// 2D affine transform.
///
/// Maps `p` to `(a * x + c * y + tx, b * x + d * y + ty)`, i.e. the columns are
/// `(a, b)`, `(c, d)` and the translation `(tx, ty)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self { tx, ty, ..Self::IDENTITY }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Counter-clockwise rotation in degrees (in a +Y up frame).
    #[inline]
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    /// Translation, then rotation, then scale applied to local points
    /// (`T * R * S`), the usual node transform.
    pub fn from_trs(position: Vec2, rotation_degrees: f32, scale: Vec2) -> Self {
        Self::translation(position.x, position.y)
            .then(&Self::rotation_degrees(rotation_degrees))
            .then(&Self::scale(scale.x, scale.y))
    }

    /// Returns `self * rhs`: `rhs` is applied first.
    #[inline]
    pub fn then(&self, rhs: &Affine2) -> Affine2 {
        Affine2 {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec2::new(3.0, -2.0);
        assert_eq!(Affine2::IDENTITY.apply(p), p);
    }

    #[test]
    fn then_applies_rhs_first() {
        // Scale by 2, then translate by (1, 0).
        let m = Affine2::translation(1.0, 0.0).then(&Affine2::scale(2.0, 2.0));
        assert_eq!(m.apply(Vec2::new(1.0, 1.0)), Vec2::new(3.0, 2.0));
    }

    #[test]
    fn rotation_quarter_turn() {
        let m = Affine2::rotation_degrees(90.0);
        assert!(close(m.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn trs_orders_scale_rotate_translate() {
        let m = Affine2::from_trs(Vec2::new(10.0, 0.0), 90.0, Vec2::new(2.0, 1.0));
        assert!(close(m.apply(Vec2::new(1.0, 0.0)), Vec2::new(10.0, 2.0)));
    }
}
