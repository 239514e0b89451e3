// ABOUTME: View hierarchy with frames relative to each view's parent.
// ABOUTME: Scroll views add a content size and offset that shift their subviews.

use carousel_core::{Color, Point, Rect, Size};

use crate::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    pub content_offset: Point,
    pub content_size: Size,
    /// When false, offsets are hard-clamped to the scrollable range
    pub bounces: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            content_offset: Point::ZERO,
            content_size: Size::ZERO,
            bounces: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewKind {
    Root,
    Plain,
    Label {
        text: String,
        font_size: f32,
        color: Color,
    },
    Scroll(ScrollState),
}

#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,
    /// Frame in the parent's coordinate space (content space for scroll parents)
    pub frame: Rect,
    pub background: Color,
    /// Natural size used when constraints leave width or height open
    pub intrinsic_size: Option<Size>,
}

impl View {
    pub fn scroll(&self) -> Option<&ScrollState> {
        match &self.kind {
            ViewKind::Scroll(state) => Some(state),
            _ => None,
        }
    }

    pub fn is_scroll(&self) -> bool {
        matches!(self.kind, ViewKind::Scroll(_))
    }
}

#[derive(Debug, Clone)]
pub struct ViewTree {
    views: Vec<View>,
}

impl ViewTree {
    pub fn new(root_size: Size) -> Self {
        Self {
            views: vec![View {
                id: ViewId(0),
                kind: ViewKind::Root,
                parent: None,
                children: Vec::new(),
                frame: Rect::from_size(root_size),
                background: Color::TRANSPARENT,
                intrinsic_size: None,
            }],
        }
    }

    pub fn root(&self) -> ViewId {
        ViewId(0)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.0)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(id.0)
    }

    fn view_mut(&mut self, id: ViewId) -> Result<&mut View, LayoutError> {
        self.get_mut(id).ok_or(LayoutError::UnknownView(id))
    }

    pub fn contains(&self, id: ViewId) -> bool {
        id.0 < self.views.len()
    }

    /// Append a new subview; it starts with a zero frame
    pub fn add_child(
        &mut self,
        parent: ViewId,
        kind: ViewKind,
        background: Color,
    ) -> Result<ViewId, LayoutError> {
        let id = ViewId(self.views.len());
        self.view_mut(parent)?.children.push(id);
        self.views.push(View {
            id,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            frame: Rect::ZERO,
            background,
            intrinsic_size: None,
        });
        Ok(id)
    }

    pub fn set_intrinsic_size(&mut self, id: ViewId, size: Option<Size>) -> Result<(), LayoutError> {
        self.view_mut(id)?.intrinsic_size = size;
        Ok(())
    }

    pub fn frame(&self, id: ViewId) -> Option<Rect> {
        self.get(id).map(|v| v.frame)
    }

    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> Result<(), LayoutError> {
        self.view_mut(id)?.frame = frame;
        Ok(())
    }

    /// Move a view so its center is at `center` (parent coordinates), size unchanged
    pub fn set_center(&mut self, id: ViewId, center: Point) -> Result<(), LayoutError> {
        let view = self.view_mut(id)?;
        view.frame = view.frame.with_center(center);
        Ok(())
    }

    /// Chain from `id` up to the root, starting with `id` itself
    pub fn ancestors(&self, id: ViewId) -> Vec<ViewId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).map(|v| v.id);
        while let Some(view_id) = current {
            chain.push(view_id);
            current = self.get(view_id).and_then(|v| v.parent);
        }
        chain
    }

    /// Nearest view that is an ancestor of (or equal to) both `a` and `b`
    pub fn common_ancestor(&self, a: ViewId, b: ViewId) -> Option<ViewId> {
        let a_chain = self.ancestors(a);
        self.ancestors(b)
            .into_iter()
            .find(|candidate| a_chain.contains(candidate))
    }

    pub fn depth(&self, id: ViewId) -> usize {
        self.ancestors(id).len().saturating_sub(1)
    }

    pub fn set_background(&mut self, id: ViewId, color: Color) -> Result<(), LayoutError> {
        self.view_mut(id)?.background = color;
        Ok(())
    }

    pub fn scroll_state(&self, id: ViewId) -> Option<&ScrollState> {
        self.get(id).and_then(View::scroll)
    }

    fn scroll_state_mut(&mut self, id: ViewId) -> Option<&mut ScrollState> {
        match &mut self.get_mut(id)?.kind {
            ViewKind::Scroll(state) => Some(state),
            _ => None,
        }
    }

    pub fn set_bounces(&mut self, id: ViewId, bounces: bool) -> Result<(), LayoutError> {
        let state = self
            .scroll_state_mut(id)
            .ok_or(LayoutError::NotAScrollView(id))?;
        state.bounces = bounces;
        Ok(())
    }

    pub fn set_content_size(&mut self, id: ViewId, size: Size) -> Result<(), LayoutError> {
        let state = self
            .scroll_state_mut(id)
            .ok_or(LayoutError::NotAScrollView(id))?;
        state.content_size = size;
        Ok(())
    }

    /// Offset `offset` would settle at; unchanged for bouncing scroll views
    pub fn clamped_content_offset(&self, id: ViewId, offset: Point) -> Option<Point> {
        let view = self.get(id)?;
        Some(clamp_offset(view.scroll()?, view.frame, offset))
    }

    /// Set the scroll position, clamping it when bouncing is off. Returns the applied offset.
    pub fn set_content_offset(&mut self, id: ViewId, offset: Point) -> Result<Point, LayoutError> {
        let applied = self
            .clamped_content_offset(id, offset)
            .ok_or(LayoutError::NotAScrollView(id))?;
        if let Some(state) = self.scroll_state_mut(id) {
            state.content_offset = applied;
        }
        Ok(applied)
    }

    /// Store a solved frame, plus the content size for scroll views. The
    /// content offset is re-clamped since the scrollable range may have shrunk.
    pub(crate) fn apply_solution(&mut self, id: ViewId, frame: Rect, content_size: Size) {
        let Some(view) = self.get_mut(id) else {
            return;
        };
        view.frame = frame;
        if let ViewKind::Scroll(state) = &mut view.kind {
            state.content_size = content_size;
            state.content_offset = clamp_offset(state, frame, state.content_offset);
        }
    }
}

/// Largest offset that still keeps the viewport inside the content
fn max_offset(state: &ScrollState, frame: Rect) -> Point {
    Point::new(
        (state.content_size.width - frame.width).max(0.0),
        (state.content_size.height - frame.height).max(0.0),
    )
}

fn clamp_offset(state: &ScrollState, frame: Rect, offset: Point) -> Point {
    if state.bounces {
        return offset;
    }
    let max = max_offset(state, frame);
    Point::new(offset.x.clamp(0.0, max.x), offset.y.clamp(0.0, max.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_scroll() -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new(Size::new(400.0, 800.0));
        let scroll = tree
            .add_child(tree.root(), ViewKind::Scroll(ScrollState::default()), Color::BROWN)
            .unwrap();
        let content = tree.add_child(scroll, ViewKind::Plain, Color::CYAN).unwrap();
        (tree, scroll, content)
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = ViewTree::new(Size::new(375.0, 667.0));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.frame(tree.root()), Some(Rect::new(0.0, 0.0, 375.0, 667.0)));
    }

    #[test]
    fn add_child_links_parent() {
        let (tree, scroll, content) = tree_with_scroll();
        assert_eq!(tree.get(content).unwrap().parent, Some(scroll));
        assert_eq!(tree.get(scroll).unwrap().children, vec![content]);
        assert_eq!(tree.depth(content), 2);
        assert_eq!(tree.frame(content), Some(Rect::ZERO));
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let mut tree = ViewTree::new(Size::new(10.0, 10.0));
        let err = tree.add_child(ViewId(9), ViewKind::Plain, Color::BLUE).unwrap_err();
        assert_eq!(err, LayoutError::UnknownView(ViewId(9)));
    }

    #[test]
    fn common_ancestor_of_nested_views() {
        let (mut tree, scroll, content) = tree_with_scroll();
        let sibling = tree.add_child(tree.root(), ViewKind::Plain, Color::BLUE).unwrap();
        assert_eq!(tree.common_ancestor(content, scroll), Some(scroll));
        assert_eq!(tree.common_ancestor(content, sibling), Some(tree.root()));
        assert_eq!(tree.common_ancestor(content, content), Some(content));
    }

    #[test]
    fn content_offset_clamps_without_bounce() {
        let (mut tree, scroll, _) = tree_with_scroll();
        tree.set_frame(scroll, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        tree.set_content_size(scroll, Size::new(150.0, 50.0)).unwrap();

        // Bouncing views accept any offset
        assert_eq!(
            tree.set_content_offset(scroll, Point::new(400.0, 0.0)).unwrap(),
            Point::new(400.0, 0.0)
        );

        tree.set_bounces(scroll, false).unwrap();
        assert_eq!(
            tree.set_content_offset(scroll, Point::new(400.0, -3.0)).unwrap(),
            Point::new(50.0, 0.0)
        );
    }

    #[test]
    fn applied_solution_reclamps_offset() {
        let (mut tree, scroll, _) = tree_with_scroll();
        tree.set_bounces(scroll, false).unwrap();
        tree.set_frame(scroll, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        tree.set_content_size(scroll, Size::new(300.0, 50.0)).unwrap();
        tree.set_content_offset(scroll, Point::new(160.0, 0.0)).unwrap();

        tree.apply_solution(scroll, Rect::new(0.0, 0.0, 60.0, 50.0), Size::new(180.0, 50.0));
        let state = tree.scroll_state(scroll).unwrap();
        assert_eq!(state.content_size, Size::new(180.0, 50.0));
        assert_eq!(state.content_offset, Point::new(120.0, 0.0));
        assert_eq!(tree.frame(scroll), Some(Rect::new(0.0, 0.0, 60.0, 50.0)));
    }

    #[test]
    fn applied_solution_ignores_content_size_for_plain_views() {
        let (mut tree, _, content) = tree_with_scroll();
        tree.apply_solution(content, Rect::new(1.0, 2.0, 3.0, 4.0), Size::new(9.0, 9.0));
        assert_eq!(tree.frame(content), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert!(tree.scroll_state(content).is_none());
    }

    #[test]
    fn set_center_moves_zero_sized_view() {
        let (mut tree, scroll, _) = tree_with_scroll();
        tree.set_center(scroll, Point::new(200.0, 100.0)).unwrap();
        assert_eq!(tree.frame(scroll), Some(Rect::new(200.0, 100.0, 0.0, 0.0)));
    }
}
