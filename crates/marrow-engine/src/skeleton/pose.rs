use super::Skeleton;

/// Animation state driving a [`Skeleton`].
///
/// Implementations advance their tracks by `dt` seconds, apply them and solve
/// bone world transforms, leaving the skeleton ready to draw.
pub trait PoseSource {
    fn update(&mut self, dt: f32, skeleton: &mut Skeleton);

    /// Whether an animation with this name exists in the underlying data.
    fn has_animation(&self, name: &str) -> bool {
        let _ = name;
        false
    }
}

/// Pose source that keeps the skeleton in whatever pose it was given.
///
/// Tracks accumulated time so hosts and tests can observe advancement.
#[derive(Debug, Default, Clone)]
pub struct StaticPose {
    elapsed: f32,
    animations: Vec<String>,
}

impl StaticPose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares animation names reported by `has_animation`.
    pub fn with_animations<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elapsed: 0.0,
            animations: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Total time passed to `update` so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl PoseSource for StaticPose {
    fn update(&mut self, dt: f32, _skeleton: &mut Skeleton) {
        self.elapsed += dt;
    }

    fn has_animation(&self, name: &str) -> bool {
        self.animations.iter().any(|a| a == name)
    }
}
