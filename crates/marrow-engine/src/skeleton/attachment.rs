use crate::coords::Vec2;
use crate::paint::Color;

use super::Bone;

/// Triangle list for a region quad (vertices in corner order).
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Opaque texture handle resolved by the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub u32);

/// Geometry attached to a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Region(RegionAttachment),
    Mesh(MeshAttachment),
    SkinnedMesh(SkinnedMeshAttachment),
}

/// Textured quad positioned relative to its slot's bone.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAttachment {
    pub name: String,
    /// Bone-local corners as `x, y` pairs.
    pub offset: [f32; 8],
    pub uvs: [f32; 8],
    pub color: Color,
    pub texture: Option<TextureId>,
}

/// Free-form triangle mesh whose vertices are local to the slot's bone.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttachment {
    pub name: String,
    /// Bone-local vertices as `x, y` pairs.
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub triangles: Vec<u16>,
    pub color: Color,
    pub texture: Option<TextureId>,
}

/// One bone's contribution to a skinned vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoneWeight {
    pub bone: usize,
    /// Vertex position in that bone's local space.
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

/// Triangle mesh whose vertices are weighted across several bones.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMeshAttachment {
    pub name: String,
    /// One entry per vertex.
    pub weights: Vec<Vec<BoneWeight>>,
    pub uvs: Vec<f32>,
    pub triangles: Vec<u16>,
    pub color: Color,
    pub texture: Option<TextureId>,
}

impl Attachment {
    pub fn name(&self) -> &str {
        match self {
            Attachment::Region(a) => &a.name,
            Attachment::Mesh(a) => &a.name,
            Attachment::SkinnedMesh(a) => &a.name,
        }
    }

    pub fn texture(&self) -> Option<TextureId> {
        match self {
            Attachment::Region(a) => a.texture,
            Attachment::Mesh(a) => a.texture,
            Attachment::SkinnedMesh(a) => a.texture,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Attachment::Region(a) => a.color,
            Attachment::Mesh(a) => a.color,
            Attachment::SkinnedMesh(a) => a.color,
        }
    }

    /// UVs as `u, v` pairs, one per vertex.
    pub fn uvs(&self) -> &[f32] {
        match self {
            Attachment::Region(a) => &a.uvs,
            Attachment::Mesh(a) => &a.uvs,
            Attachment::SkinnedMesh(a) => &a.uvs,
        }
    }

    pub fn triangles(&self) -> &[u16] {
        match self {
            Attachment::Region(_) => &QUAD_TRIANGLES,
            Attachment::Mesh(a) => &a.triangles,
            Attachment::SkinnedMesh(a) => &a.triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Attachment::Region(_) => 4,
            Attachment::Mesh(a) => a.vertices.len() / 2,
            Attachment::SkinnedMesh(a) => a.weights.len(),
        }
    }

    /// Writes skeleton-space vertices as `x, y` pairs into `out` (cleared first).
    ///
    /// `origin` is the skeleton position; `slot_bone` is the bone owning the
    /// slot. Skinned meshes ignore `slot_bone` and read their weighted bones
    /// from `bones`; weights referencing unknown bones contribute nothing.
    pub fn compute_world_vertices(
        &self,
        origin: Vec2,
        slot_bone: &Bone,
        bones: &[Bone],
        out: &mut Vec<f32>,
    ) {
        out.clear();
        match self {
            Attachment::Region(a) => push_bone_local(&a.offset, origin, slot_bone, out),
            Attachment::Mesh(a) => push_bone_local(&a.vertices, origin, slot_bone, out),
            Attachment::SkinnedMesh(a) => {
                out.reserve(a.weights.len() * 2);
                for influences in &a.weights {
                    let mut world = Vec2::zero();
                    for w in influences {
                        let Some(bone) = bones.get(w.bone) else { continue };
                        world = world + bone.local_to_world(w.x, w.y) * w.weight;
                    }
                    out.push(world.x + origin.x);
                    out.push(world.y + origin.y);
                }
            }
        }
    }
}

fn push_bone_local(local: &[f32], origin: Vec2, bone: &Bone, out: &mut Vec<f32>) {
    out.reserve(local.len());
    for xy in local.chunks_exact(2) {
        let p = bone.local_to_world(xy[0], xy[1]);
        out.push(p.x + origin.x);
        out.push(p.y + origin.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(offset: [f32; 8]) -> Attachment {
        Attachment::Region(RegionAttachment {
            name: "r".to_string(),
            offset,
            uvs: [0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            color: Color::WHITE,
            texture: Some(TextureId(1)),
        })
    }

    #[test]
    fn region_uses_bone_matrix_and_origin() {
        let mut bone = Bone::new("root", None, 0.0);
        bone.set_world_transform(Vec2::new(10.0, 0.0), 0.0, Vec2::new(2.0, 2.0));

        let mut out = Vec::new();
        region([0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
            .compute_world_vertices(Vec2::new(0.0, 5.0), &bone, &[], &mut out);

        assert_eq!(out, vec![10.0, 5.0, 12.0, 5.0, 12.0, 7.0, 10.0, 7.0]);
    }

    #[test]
    fn region_reports_quad_topology() {
        let a = region([0.0; 8]);
        assert_eq!(a.vertex_count(), 4);
        assert_eq!(a.triangles(), &QUAD_TRIANGLES);
    }

    #[test]
    fn mesh_maps_own_vertices_through_slot_bone() {
        let mut bone = Bone::new("arm", None, 0.0);
        bone.set_world_transform(Vec2::new(1.0, 2.0), 0.0, Vec2::new(2.0, 1.0));

        let mesh = Attachment::Mesh(MeshAttachment {
            name: "fan".to_string(),
            vertices: vec![0.0, 0.0, 1.0, 0.0, 0.0, 3.0],
            uvs: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            triangles: vec![0, 1, 2],
            color: Color::WHITE,
            texture: Some(TextureId(2)),
        });

        let mut out = vec![99.0; 10];
        mesh.compute_world_vertices(Vec2::new(10.0, 0.0), &bone, &[], &mut out);
        assert_eq!(out, vec![11.0, 2.0, 13.0, 2.0, 11.0, 5.0]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles(), &[0, 1, 2]);
    }

    #[test]
    fn skinned_mesh_blends_weighted_bones() {
        let mut left = Bone::new("left", None, 0.0);
        left.set_world_transform(Vec2::new(0.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        let mut right = Bone::new("right", None, 0.0);
        right.set_world_transform(Vec2::new(10.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        let bones = [left, right];

        let mesh = Attachment::SkinnedMesh(SkinnedMeshAttachment {
            name: "m".to_string(),
            weights: vec![vec![
                BoneWeight { bone: 0, x: 0.0, y: 2.0, weight: 0.5 },
                BoneWeight { bone: 1, x: 0.0, y: 2.0, weight: 0.5 },
            ]],
            uvs: vec![0.0, 0.0],
            triangles: vec![],
            color: Color::WHITE,
            texture: None,
        });

        let mut out = Vec::new();
        mesh.compute_world_vertices(Vec2::zero(), &bones[0], &bones, &mut out);
        assert_eq!(out, vec![5.0, 2.0]);
    }

    #[test]
    fn skinned_mesh_ignores_unknown_bones() {
        let bone = Bone::new("root", None, 0.0);
        let mesh = Attachment::SkinnedMesh(SkinnedMeshAttachment {
            name: "m".to_string(),
            weights: vec![vec![BoneWeight { bone: 7, x: 1.0, y: 1.0, weight: 1.0 }]],
            uvs: vec![0.0, 0.0],
            triangles: vec![],
            color: Color::WHITE,
            texture: None,
        });
        let mut out = vec![99.0];
        mesh.compute_world_vertices(Vec2::zero(), &bone, std::slice::from_ref(&bone), &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }
}
