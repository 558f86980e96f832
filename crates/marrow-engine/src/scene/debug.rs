use crate::coords::{Affine2, Vec2};
use crate::paint::Color8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebugLine {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color8,
    /// Requested width in logical pixels. Backends without wide lines draw 1px.
    pub width: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebugPoint {
    pub at: Vec2,
    pub color: Color8,
    pub size: f32,
}

/// Immediate-mode debug geometry in skeleton space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugCmd {
    pub transform: Affine2,
    pub lines: Vec<DebugLine>,
    pub points: Vec<DebugPoint>,
}

impl DebugCmd {
    pub fn new(transform: Affine2) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty()
    }

    pub fn push_line(&mut self, from: Vec2, to: Vec2, color: Color8, width: f32) {
        self.lines.push(DebugLine { from, to, color, width });
    }

    /// Adds the edges of a closed polygon.
    pub fn push_polygon(&mut self, points: &[Vec2], color: Color8, width: f32) {
        if points.len() < 2 {
            return;
        }
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.push_line(from, to, color, width);
        }
    }

    pub fn push_point(&mut self, at: Vec2, color: Color8, size: f32) {
        self.points.push(DebugPoint { at, color, size });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_is_closed() {
        let mut d = DebugCmd::default();
        let quad = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        d.push_polygon(&quad, Color8::BLUE, 1.0);

        assert_eq!(d.lines.len(), 4);
        assert_eq!(d.lines[3].from, quad[3]);
        assert_eq!(d.lines[3].to, quad[0]);
    }

    #[test]
    fn degenerate_polygon_adds_nothing() {
        let mut d = DebugCmd::default();
        d.push_polygon(&[Vec2::zero()], Color8::BLUE, 1.0);
        assert!(d.is_empty());
    }
}
