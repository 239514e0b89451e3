// ABOUTME: Flattens the view tree into window-space draw commands.
// ABOUTME: Uses in-flight animation values and clips scroll content to its viewport.

use carousel_core::{DrawCommand, Point, Rect, TextAlign};
use carousel_layout::{ViewId, ViewKind, ViewTree};

use crate::Animator;

/// Draw commands for the whole tree, back to front
pub fn display_list(tree: &ViewTree, animator: &Animator) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    emit(tree, animator, tree.root(), Point::ZERO, None, &mut commands);
    commands
}

fn emit(
    tree: &ViewTree,
    animator: &Animator,
    id: ViewId,
    origin: Point,
    clip: Option<Rect>,
    out: &mut Vec<DrawCommand>,
) {
    let Some(view) = tree.get(id) else {
        return;
    };
    let frame = animator.presentation_frame(id).unwrap_or(view.frame);
    let window = frame.translate(origin.x, origin.y);
    let visible = match clip {
        Some(clip) => window.intersect(&clip),
        None => Some(window),
    };

    if let Some(rect) = visible {
        if view.background.is_visible() {
            out.push(DrawCommand::Fill {
                rect,
                color: view.background,
            });
        }
        if let ViewKind::Label {
            text,
            font_size,
            color,
        } = &view.kind
        {
            out.push(DrawCommand::Text {
                frame: window,
                text: text.clone(),
                color: *color,
                font_size: *font_size,
                align: TextAlign::Center,
            });
        }
    }

    let (child_origin, child_clip) = match view.scroll() {
        Some(state) => {
            let offset = animator
                .presentation_offset(id)
                .unwrap_or(state.content_offset);
            // Nothing inside a scroll view draws outside its viewport
            (
                Point::new(window.x - offset.x, window.y - offset.y),
                Some(visible.unwrap_or(Rect::ZERO)),
            )
        }
        None => (Point::new(window.x, window.y), clip),
    };

    for &child in &view.children {
        emit(tree, animator, child, child_origin, child_clip, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::{Color, Size};
    use carousel_layout::ScrollState;

    fn scrolled_tree() -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new(Size::new(200.0, 200.0));
        let scroll = tree
            .add_child(tree.root(), ViewKind::Scroll(ScrollState::default()), Color::BROWN)
            .unwrap();
        let panel = tree.add_child(scroll, ViewKind::Plain, Color::BLUE).unwrap();
        tree.set_frame(scroll, Rect::new(50.0, 50.0, 100.0, 40.0)).unwrap();
        tree.set_frame(panel, Rect::new(0.0, 0.0, 150.0, 40.0)).unwrap();
        tree.set_content_size(scroll, Size::new(150.0, 40.0)).unwrap();
        (tree, scroll, panel)
    }

    fn fills(commands: &[DrawCommand]) -> Vec<(Rect, Color)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn transparent_root_draws_nothing_itself() {
        let (tree, _, _) = scrolled_tree();
        let commands = display_list(&tree, &Animator::new());
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn scroll_content_is_clipped_to_viewport() {
        let (tree, _, _) = scrolled_tree();
        let list = fills(&display_list(&tree, &Animator::new()));
        assert_eq!(list[0], (Rect::new(50.0, 50.0, 100.0, 40.0), Color::BROWN));
        assert_eq!(list[1], (Rect::new(50.0, 50.0, 100.0, 40.0), Color::BLUE));
    }

    #[test]
    fn content_offset_shifts_children() {
        let (mut tree, scroll, _) = scrolled_tree();
        tree.set_frame(ViewId(2), Rect::new(0.0, 0.0, 60.0, 40.0)).unwrap();
        tree.set_content_offset(scroll, Point::new(30.0, 0.0)).unwrap();
        let list = fills(&display_list(&tree, &Animator::new()));
        // Panel spans window x 20..80, visible part is 50..80
        assert_eq!(list[1], (Rect::new(50.0, 50.0, 30.0, 40.0), Color::BLUE));
    }

    #[test]
    fn fully_scrolled_out_child_is_skipped() {
        let (mut tree, scroll, _) = scrolled_tree();
        tree.set_frame(ViewId(2), Rect::new(0.0, 0.0, 20.0, 40.0)).unwrap();
        tree.set_content_offset(scroll, Point::new(50.0, 0.0)).unwrap();
        let list = fills(&display_list(&tree, &Animator::new()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn label_emits_text_command() {
        let mut tree = ViewTree::new(Size::new(100.0, 100.0));
        let label = tree
            .add_child(
                tree.root(),
                ViewKind::Label {
                    text: "Hi".into(),
                    font_size: 12.0,
                    color: Color::DARK_GRAY,
                },
                Color::TRANSPARENT,
            )
            .unwrap();
        tree.set_frame(label, Rect::new(0.0, 10.0, 100.0, 20.0)).unwrap();

        let commands = display_list(&tree, &Animator::new());
        assert!(matches!(
            &commands[..],
            [DrawCommand::Text { frame, text, .. }]
                if *frame == Rect::new(0.0, 10.0, 100.0, 20.0) && text == "Hi"
        ));
    }
}
