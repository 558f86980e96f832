use crate::coords::{Affine2, Vec2};
use crate::paint::Color8;
use crate::scene::DebugCmd;
use crate::skeleton::{Attachment, Skeleton};

use super::RenderConfig;

const SLOT_LINE_WIDTH: f32 = 1.0;
const BONE_LINE_WIDTH: f32 = 2.0;
const BONE_POINT_SIZE: f32 = 4.0;

/// Builds the debug overlay for one skeleton.
///
/// Slot outlines cover region attachments only. Bones are drawn as lines
/// from origin to tip; the root origin is blue and every other origin green.
/// `scratch` is reused for world vertices.
pub fn build_debug(
    skeleton: &Skeleton,
    config: &RenderConfig,
    transform: &Affine2,
    scratch: &mut Vec<f32>,
) -> DebugCmd {
    let mut cmd = DebugCmd::new(*transform);

    if config.debug_slots {
        let mut corners = [Vec2::zero(); 4];
        for i in 0..skeleton.draw_order.len() {
            let Some(slot) = skeleton.slot_in_draw_order(i) else { continue };
            let Some(attachment @ Attachment::Region(_)) = &slot.attachment else { continue };
            let Some(bone) = skeleton.slot_bone(slot) else { continue };

            attachment.compute_world_vertices(skeleton.origin, bone, &skeleton.bones, scratch);
            for (corner, xy) in corners.iter_mut().zip(scratch.chunks_exact(2)) {
                *corner = Vec2::new(xy[0], xy[1]);
            }
            cmd.push_polygon(&corners, Color8::BLUE, SLOT_LINE_WIDTH);
        }
    }

    if config.debug_bones {
        let origin = skeleton.origin;
        for bone in &skeleton.bones {
            cmd.push_line(
                bone.world_position() + origin,
                bone.tip() + origin,
                Color8::RED,
                BONE_LINE_WIDTH,
            );
        }
        for (i, bone) in skeleton.bones.iter().enumerate() {
            let color = if i == 0 { Color8::BLUE } else { Color8::GREEN };
            cmd.push_point(bone.world_position() + origin, color, BONE_POINT_SIZE);
        }
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::skeleton::{Bone, MeshAttachment, RegionAttachment, Slot, TextureId};

    fn skeleton() -> Skeleton {
        let root = Bone::new("root", None, 10.0);
        let mut arm = Bone::new("arm", Some(0), 5.0);
        arm.set_world_transform(Vec2::new(10.0, 0.0), 90.0, Vec2::new(1.0, 1.0));

        let region = Attachment::Region(RegionAttachment {
            name: "body".to_string(),
            offset: [0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0],
            uvs: [0.0; 8],
            color: Color::WHITE,
            texture: Some(TextureId(1)),
        });
        let mesh = Attachment::Mesh(MeshAttachment {
            name: "cape".to_string(),
            vertices: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            uvs: vec![0.0; 6],
            triangles: vec![0, 1, 2],
            color: Color::WHITE,
            texture: Some(TextureId(1)),
        });

        Skeleton::new(
            vec![root, arm],
            vec![
                Slot::new("body", 0).with_attachment(region),
                Slot::new("cape", 1).with_attachment(mesh),
            ],
        )
    }

    #[test]
    fn slots_outline_regions_only() {
        let config = RenderConfig { debug_slots: true, ..RenderConfig::default() };
        let cmd = build_debug(&skeleton(), &config, &Affine2::IDENTITY, &mut Vec::new());

        assert_eq!(cmd.lines.len(), 4);
        assert!(cmd.lines.iter().all(|l| l.color == Color8::BLUE && l.width == 1.0));
        assert_eq!(cmd.lines[1].to, Vec2::new(2.0, 2.0));
        assert!(cmd.points.is_empty());
    }

    #[test]
    fn bones_draw_lines_and_colored_origins() {
        let config = RenderConfig { debug_bones: true, ..RenderConfig::default() };
        let cmd = build_debug(&skeleton(), &config, &Affine2::IDENTITY, &mut Vec::new());

        assert_eq!(cmd.lines.len(), 2);
        assert_eq!(cmd.lines[0].to, Vec2::new(10.0, 0.0));
        assert!(cmd.lines.iter().all(|l| l.color == Color8::RED && l.width == 2.0));

        let colors: Vec<Color8> = cmd.points.iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![Color8::BLUE, Color8::GREEN]);
        assert_eq!(cmd.points[1].at, Vec2::new(10.0, 0.0));
    }
}
