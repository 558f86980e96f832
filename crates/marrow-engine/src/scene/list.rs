use super::{DebugCmd, DrawCmd, MeshCmd, SortKey, ZIndex};

/// Sink for draw commands emitted during a draw pass.
///
/// The compositor and overlay nodes submit through this trait so that overlay
/// subtrees land in the stream exactly where the skeleton's draw order puts
/// them.
pub trait RenderQueue {
    fn push(&mut self, z: ZIndex, cmd: DrawCmd);
}

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
}

/// Recorded draw stream for a frame.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame allocation once warmed
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
    }

    /// Returns items in submission order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn push_mesh(&mut self, z: ZIndex, mesh: MeshCmd) {
        self.push_cmd(z, DrawCmd::Mesh(mesh));
    }

    #[inline]
    pub fn push_debug(&mut self, z: ZIndex, debug: DebugCmd) {
        self.push_cmd(z, DrawCmd::Debug(debug));
    }

    fn push_cmd(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items in paint order (back to front) without cloning commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    /// Mesh commands in paint order.
    pub fn meshes_in_paint_order(&mut self) -> impl Iterator<Item = &MeshCmd> {
        self.iter_in_paint_order().filter_map(|item| match &item.cmd {
            DrawCmd::Mesh(mesh) => Some(mesh),
            DrawCmd::Debug(_) => None,
        })
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        let items = &self.items;
        self.sorted_indices.sort_by(|&a, &b| items[a].key.cmp(&items[b].key));

        self.sorted_dirty = false;
    }
}

impl RenderQueue for DrawList {
    #[inline]
    fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        self.push_cmd(z, cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color8;

    fn marker(x: f32) -> DebugCmd {
        let mut d = DebugCmd::default();
        d.push_point(Vec2::new(x, 0.0), Color8::WHITE, 1.0);
        d
    }

    fn marker_x(item: &DrawItem) -> f32 {
        match &item.cmd {
            DrawCmd::Debug(d) => d.points[0].at.x,
            DrawCmd::Mesh(_) => panic!("expected debug marker"),
        }
    }

    #[test]
    fn paint_order_sorts_by_z_then_submission() {
        let mut list = DrawList::new();
        list.push_debug(ZIndex(1), marker(0.0));
        list.push_debug(ZIndex(0), marker(1.0));
        list.push(ZIndex(1), DrawCmd::Debug(marker(2.0)));
        list.push_debug(ZIndex(0), marker(3.0));

        let order: Vec<f32> = list.iter_in_paint_order().map(marker_x).collect();
        assert_eq!(order, vec![1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn clear_resets_submission_counter() {
        let mut list = DrawList::new();
        list.push_debug(ZIndex(0), marker(0.0));
        list.clear();
        assert!(list.is_empty());

        list.push_debug(ZIndex(0), marker(5.0));
        assert_eq!(list.items()[0].key.order, 0);
        assert_eq!(list.iter_in_paint_order().count(), 1);
    }

    #[test]
    fn meshes_filter_skips_debug() {
        let mut list = DrawList::new();
        list.push_debug(ZIndex(0), marker(0.0));
        assert_eq!(list.meshes_in_paint_order().count(), 0);
    }
}
