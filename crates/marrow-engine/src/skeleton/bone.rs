use crate::coords::Vec2;

/// A bone with its world transform already solved by the pose provider.
///
/// The 2×2 world matrix maps bone-local points to skeleton space:
/// `world = (x * m00 + y * m01 + world_x, x * m10 + y * m11 + world_y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    /// Bone length from the setup pose; only used for debug drawing.
    pub length: f32,

    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,

    pub world_x: f32,
    pub world_y: f32,
    /// Degrees, counter-clockwise.
    pub world_rotation: f32,
    pub world_scale_x: f32,
    pub world_scale_y: f32,
}

impl Bone {
    /// Creates a bone at the skeleton origin with an identity world transform.
    pub fn new(name: impl Into<String>, parent: Option<usize>, length: f32) -> Self {
        Self {
            name: name.into(),
            parent,
            length,
            m00: 1.0,
            m01: 0.0,
            m10: 0.0,
            m11: 1.0,
            world_x: 0.0,
            world_y: 0.0,
            world_rotation: 0.0,
            world_scale_x: 1.0,
            world_scale_y: 1.0,
        }
    }

    /// Writes a world transform and the matching matrix.
    ///
    /// Pose providers that solve the hierarchy themselves may set the fields
    /// directly instead.
    pub fn set_world_transform(&mut self, position: Vec2, rotation: f32, scale: Vec2) {
        let (sin, cos) = rotation.to_radians().sin_cos();
        self.world_x = position.x;
        self.world_y = position.y;
        self.world_rotation = rotation;
        self.world_scale_x = scale.x;
        self.world_scale_y = scale.y;
        self.m00 = cos * scale.x;
        self.m10 = sin * scale.x;
        self.m01 = -sin * scale.y;
        self.m11 = cos * scale.y;
    }

    #[inline]
    pub fn world_position(&self) -> Vec2 {
        Vec2::new(self.world_x, self.world_y)
    }

    /// Maps a bone-local point to skeleton space.
    #[inline]
    pub fn local_to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            x * self.m00 + y * self.m01 + self.world_x,
            x * self.m10 + y * self.m11 + self.world_y,
        )
    }

    /// World-space end point of the bone (origin + length along local X).
    #[inline]
    pub fn tip(&self) -> Vec2 {
        self.local_to_world(self.length, 0.0)
    }
}
