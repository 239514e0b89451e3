// ABOUTME: Constraint batches that describe the scroll panel screen.
// ABOUTME: Pure functions of view ids and proportions, so every install is reproducible.

use carousel_layout::{Attribute, Constraint, ConstraintBatch, ViewId};

/// Ids of every view on the screen, available once it has appeared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenViews {
    pub root: ViewId,
    pub label: ViewId,
    pub scroll: ViewId,
    pub content: ViewId,
    pub left: ViewId,
    pub middle: ViewId,
    pub right: ViewId,
}

impl ScreenViews {
    pub fn panels(&self) -> [ViewId; 3] {
        [self.left, self.middle, self.right]
    }
}

/// Label hugs the root's top edge (plus `top_offset`) and spans its width.
/// Height comes from the label's intrinsic size.
pub fn title_label(root: ViewId, label: ViewId, top_offset: f64) -> ConstraintBatch {
    ConstraintBatch::new("title label")
        .with(Constraint::align(label, root, Attribute::Top).offset_by(top_offset))
        .with(Constraint::align(label, root, Attribute::Leading))
        .with(Constraint::align(label, root, Attribute::Trailing))
}

/// Content fills the scroll view's content area and is `width_ratio` times
/// as wide as the scroll view, which makes it scroll horizontally.
pub fn content_container(scroll: ViewId, content: ViewId, width_ratio: f64) -> ConstraintBatch {
    ConstraintBatch::new("content container")
        .pin_edges(content, scroll)
        .with(Constraint::align(content, scroll, Attribute::Width).multiplied_by(width_ratio))
        .with(Constraint::align(content, scroll, Attribute::Height))
}

/// Three full-height panels edge to edge across the content. The outer
/// panels are `seam_multiplier` times the middle one's width.
pub fn panels(content: ViewId, [left, middle, right]: [ViewId; 3], seam_multiplier: f64) -> ConstraintBatch {
    let full_height = |panel: ViewId| {
        [
            Constraint::align(panel, content, Attribute::Top),
            Constraint::align(panel, content, Attribute::Bottom),
        ]
    };

    ConstraintBatch::new("panels")
        .extend(full_height(left))
        .with(Constraint::align(left, content, Attribute::Leading))
        .with(Constraint::equal(left, Attribute::Trailing, middle, Attribute::Leading))
        .extend(full_height(middle))
        .with(Constraint::equal(middle, Attribute::Trailing, right, Attribute::Leading))
        .extend(full_height(right))
        .with(Constraint::align(right, content, Attribute::Trailing))
        .with(Constraint::align(left, middle, Attribute::Width).multiplied_by(seam_multiplier))
        .with(Constraint::align(right, middle, Attribute::Width).multiplied_by(seam_multiplier))
}

/// Final scroll view size as fractions of the root view
pub fn scroll_size(
    root: ViewId,
    scroll: ViewId,
    height_fraction: f64,
    width_fraction: f64,
) -> ConstraintBatch {
    ConstraintBatch::new("scroll size")
        .with(Constraint::align(scroll, root, Attribute::Height).multiplied_by(height_fraction))
        .with(Constraint::align(scroll, root, Attribute::Width).multiplied_by(width_fraction))
}

pub fn scroll_centering(root: ViewId, scroll: ViewId) -> ConstraintBatch {
    ConstraintBatch::new("scroll centering")
        .with(Constraint::align(scroll, root, Attribute::CenterX))
        .with(Constraint::align(scroll, root, Attribute::CenterY))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANELS: [ViewId; 3] = [ViewId(4), ViewId(5), ViewId(6)];

    #[test]
    fn panels_chain_edges_left_to_right() {
        let batch = panels(ViewId(3), PANELS, 0.99);
        assert_eq!(batch.len(), 12);

        let chain: Vec<_> = batch
            .constraints
            .iter()
            .filter(|c| c.attribute == Attribute::Trailing)
            .map(|c| (c.item, c.target, c.target_attribute))
            .collect();
        assert_eq!(
            chain,
            vec![
                (ViewId(4), Some(ViewId(5)), Attribute::Leading),
                (ViewId(5), Some(ViewId(6)), Attribute::Leading),
                (ViewId(6), Some(ViewId(3)), Attribute::Trailing),
            ]
        );
    }

    #[test]
    fn outer_panels_scale_off_middle() {
        let batch = panels(ViewId(3), PANELS, 0.99);
        let widths: Vec<_> = batch
            .constraints
            .iter()
            .filter(|c| c.attribute == Attribute::Width)
            .collect();
        assert_eq!(widths.len(), 2);
        assert!(widths
            .iter()
            .all(|c| c.target == Some(ViewId(5)) && c.multiplier == 0.99));
    }

    #[test]
    fn label_has_no_size_constraints() {
        let batch = title_label(ViewId(0), ViewId(1), 64.0);
        assert!(batch.constraints.iter().all(|c| !c.attribute.is_size()));
        assert_eq!(batch.constraints[0].constant, 64.0);
    }

    #[test]
    fn content_container_is_wider_than_viewport() {
        let batch = content_container(ViewId(2), ViewId(3), 1.5);
        assert_eq!(batch.len(), 6);
        let width = batch
            .constraints
            .iter()
            .find(|c| c.attribute == Attribute::Width)
            .unwrap();
        assert_eq!(width.multiplier, 1.5);
        assert_eq!(width.target, Some(ViewId(2)));
    }
}
