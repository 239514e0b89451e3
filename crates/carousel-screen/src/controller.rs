// ABOUTME: Builds the scroll panel screen and drives its entrance animation.
// ABOUTME: Grow-into-place runs first; the content scroll starts once it reports completion.

use std::time::{Duration, Instant};

use carousel_core::{Color, Config, DrawCommand, Point, Rect, Size};
use carousel_layout::{ConstraintBatch, LayoutEngine, LayoutError, ScrollState, ViewId, ViewKind};

use crate::constraints::{self, ScreenViews};
use crate::display;
use crate::{AnimationId, Animator, Track};

/// Where the entrance sequence is. Each animated step carries the id of the
/// animation whose completion moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrancePhase {
    Idle,
    /// Scroll container growing from its start point into its final frame
    Animating(AnimationId),
    /// Content scrolling to the end of the left panel
    Scrolling(AnimationId),
    ScrollSettled,
}

pub struct LayoutController {
    config: Config,
    engine: LayoutEngine,
    animator: Animator,
    title_size: Size,
    appeared: bool,
    views: Option<ScreenViews>,
    phase: EntrancePhase,
    installed: Vec<ConstraintBatch>,
}

impl LayoutController {
    /// `title_size` is the measured size of the title text; it becomes the
    /// label's intrinsic size.
    pub fn new(config: Config, root_size: Size, title_size: Size) -> Self {
        Self {
            config,
            engine: LayoutEngine::new(root_size),
            animator: Animator::new(),
            title_size,
            appeared: false,
            views: None,
            phase: EntrancePhase::Idle,
            installed: Vec::new(),
        }
    }

    /// The screen became visible: build every view, install constraints and
    /// start the entrance animation. Only the first call does anything.
    pub fn on_appear(&mut self, now: Instant) -> Result<(), LayoutError> {
        if self.appeared {
            tracing::debug!("Screen already appeared, ignoring");
            return Ok(());
        }
        self.appeared = true;

        let root = self.engine.root();
        self.engine
            .tree_mut()
            .set_background(root, self.config.colors.background)?;

        let label = self.install_title_label()?;
        let scroll = self.install_scroll_container_unconstrained()?;
        let content = self.install_content_container(scroll)?;
        let [left, middle, right] = self.install_panels(content)?;

        let views = ScreenViews {
            root,
            label,
            scroll,
            content,
            left,
            middle,
            right,
        };
        self.views = Some(views);
        tracing::info!("Screen built with {} views", self.engine.tree().len());

        self.run_entrance_animation(views, now)
    }

    fn install(&mut self, batch: ConstraintBatch) -> Result<(), LayoutError> {
        self.engine.add_constraints(&batch)?;
        self.installed.push(batch);
        Ok(())
    }

    fn install_title_label(&mut self) -> Result<ViewId, LayoutError> {
        let root = self.engine.root();
        let kind = ViewKind::Label {
            text: self.config.title.text.clone(),
            font_size: self.config.title.font_size,
            color: self.config.colors.title,
        };
        let label = self.engine.add_view(root, kind, Color::TRANSPARENT)?;
        self.engine
            .tree_mut()
            .set_intrinsic_size(label, Some(self.title_size))?;

        self.install(constraints::title_label(
            root,
            label,
            self.config.title.top_offset,
        ))?;
        Ok(label)
    }

    /// Added with no constraints at all; its frame stays zero until the
    /// entrance animation places it.
    fn install_scroll_container_unconstrained(&mut self) -> Result<ViewId, LayoutError> {
        let root = self.engine.root();
        let scroll = self.engine.add_view(
            root,
            ViewKind::Scroll(ScrollState::default()),
            self.config.colors.scroll,
        )?;
        self.engine.tree_mut().set_bounces(scroll, false)?;
        Ok(scroll)
    }

    fn install_content_container(&mut self, scroll: ViewId) -> Result<ViewId, LayoutError> {
        let content = self
            .engine
            .add_view(scroll, ViewKind::Plain, self.config.colors.content)?;
        self.install(constraints::content_container(
            scroll,
            content,
            self.config.layout.content_width_ratio,
        ))?;
        Ok(content)
    }

    fn install_panels(&mut self, content: ViewId) -> Result<[ViewId; 3], LayoutError> {
        let colors = &self.config.colors;
        let fills = [colors.left, colors.middle, colors.right];

        let mut panels = [ViewId(0); 3];
        for (panel, color) in panels.iter_mut().zip(fills) {
            *panel = self.engine.add_view(content, ViewKind::Plain, color)?;
        }

        self.install(constraints::panels(
            content,
            panels,
            self.config.layout.panel_seam_multiplier,
        ))?;
        Ok(panels)
    }

    fn run_entrance_animation(&mut self, views: ScreenViews, now: Instant) -> Result<(), LayoutError> {
        // Phase 0: nothing sizes the scroll container yet, so this pass leaves it zero-sized
        self.engine.layout_if_needed();
        let root_frame = self.root_frame();
        let divisor = self.config.layout.start_center_divisor;
        let start_y = if divisor > 0.0 {
            root_frame.height / divisor
        } else {
            tracing::warn!("Ignoring start_center_divisor {}, starting at the root center", divisor);
            root_frame.mid_y()
        };
        self.engine
            .tree_mut()
            .set_center(views.scroll, Point::new(root_frame.mid_x(), start_y))?;

        // Phase 1: final constraints, laid out immediately and interpolated from the Phase 0 frames
        let before = self.frames();
        let layout = &self.config.layout;
        let size = constraints::scroll_size(
            views.root,
            views.scroll,
            layout.scroll_height_fraction,
            layout.scroll_width_fraction,
        );
        self.install(size)?;
        self.install(constraints::scroll_centering(views.root, views.scroll))?;
        self.engine.layout_if_needed();

        let tracks = self.frame_tracks(&before);
        let id = self.animator.animate(
            now,
            seconds(self.config.animation.entrance_duration_secs),
            self.config.animation.easing,
            tracks,
        );
        self.phase = EntrancePhase::Animating(id);
        tracing::info!("Entrance animation started");
        Ok(())
    }

    /// Phase 2: scroll the content so the left panel's trailing edge sits at the viewport's leading edge
    fn start_content_scroll(&mut self, now: Instant) -> Result<(), LayoutError> {
        let Some(views) = self.views else {
            return Ok(());
        };
        let tree = self.engine.tree();
        let target = Point::new(tree.frame(views.left).map_or(0.0, |f| f.max_x()), 0.0);
        let from = tree
            .scroll_state(views.scroll)
            .map_or(Point::ZERO, |s| s.content_offset);

        let to = self.engine.tree_mut().set_content_offset(views.scroll, target)?;
        let id = self.animator.animate(
            now,
            seconds(self.config.animation.scroll_duration_secs),
            self.config.animation.easing,
            vec![Track::ContentOffset {
                view: views.scroll,
                from,
                to,
            }],
        );
        self.phase = EntrancePhase::Scrolling(id);
        tracing::info!("Scrolling content to x={:.2}", to.x);
        Ok(())
    }

    /// Advance animations to `now` and run any completion continuations.
    /// Returns true while something is still moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        for finished in self.animator.tick(now) {
            self.animation_finished(finished, now);
        }
        self.animator.is_animating()
    }

    fn animation_finished(&mut self, id: AnimationId, now: Instant) {
        match self.phase {
            EntrancePhase::Animating(current) if current == id => {
                if let Err(err) = self.start_content_scroll(now) {
                    tracing::warn!("Could not scroll content: {}", err);
                    self.phase = EntrancePhase::ScrollSettled;
                }
            }
            EntrancePhase::Scrolling(current) if current == id => {
                self.phase = EntrancePhase::ScrollSettled;
                tracing::info!("Entrance finished");
            }
            _ => {}
        }
    }

    /// Re-layout for a new root size without animating. In-flight animations
    /// head for the new frames instead of the old ones.
    pub fn resize(&mut self, root_size: Size) {
        self.engine.set_root_size(root_size);
        if !self.engine.layout_if_needed() {
            return;
        }
        tracing::info!("Root resized to {}x{}", root_size.width, root_size.height);

        let tree = self.engine.tree();
        self.animator.retarget(
            |view| tree.frame(view),
            |view| tree.scroll_state(view).map(|s| s.content_offset),
        );
    }

    pub fn display_list(&self) -> Vec<DrawCommand> {
        display::display_list(self.engine.tree(), &self.animator)
    }

    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    pub fn views(&self) -> Option<ScreenViews> {
        self.views
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Constraint batches in the order they were installed
    pub fn installed(&self) -> &[ConstraintBatch] {
        &self.installed
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Frame as currently drawn: the in-flight value while animating, else the resolved one
    pub fn presentation_frame(&self, view: ViewId) -> Option<Rect> {
        self.animator
            .presentation_frame(view)
            .or_else(|| self.engine.tree().frame(view))
    }

    pub fn presentation_offset(&self, view: ViewId) -> Option<Point> {
        self.animator.presentation_offset(view).or_else(|| {
            self.engine
                .tree()
                .scroll_state(view)
                .map(|s| s.content_offset)
        })
    }

    fn root_frame(&self) -> Rect {
        self.engine
            .tree()
            .frame(self.engine.root())
            .unwrap_or(Rect::ZERO)
    }

    fn frames(&self) -> Vec<(ViewId, Rect)> {
        self.engine.tree().views().map(|v| (v.id, v.frame)).collect()
    }

    fn frame_tracks(&self, before: &[(ViewId, Rect)]) -> Vec<Track> {
        let tree = self.engine.tree();
        before
            .iter()
            .filter_map(|&(view, from)| {
                let to = tree.frame(view)?;
                (to != from).then_some(Track::Frame { view, from, to })
            })
            .collect()
    }
}

/// Config durations are plain seconds; negative or NaN means "instant"
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: Size = Size::new(375.0, 667.0);
    const TITLE: Size = Size::new(180.0, 31.0);

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn appeared(config: Config, start: Instant) -> LayoutController {
        let mut controller = LayoutController::new(config, PHONE, TITLE);
        controller.on_appear(start).unwrap();
        controller
    }

    fn frame(controller: &LayoutController, view: ViewId) -> Rect {
        controller.engine().tree().frame(view).unwrap()
    }

    fn after(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn final_layout_for_phone_sized_root() {
        let controller = appeared(Config::default(), Instant::now());
        let views = controller.views().unwrap();

        let scroll = frame(&controller, views.scroll);
        assert_close(scroll.width, 318.75);
        assert_close(scroll.height, 240.12);
        assert_close(scroll.mid_x(), 187.5);
        assert_close(scroll.mid_y(), 333.5);

        let content = frame(&controller, views.content);
        assert_close(content.width, 478.125);
        assert_close(content.height, 240.12);

        assert_eq!(frame(&controller, views.label), Rect::new(0.0, 64.0, 375.0, 31.0));
        let report = controller.engine().last_report();
        assert!(report.is_clean() && report.redundant.is_empty(), "{report:?}");
    }

    #[test]
    fn panels_tile_the_content() {
        let controller = appeared(Config::default(), Instant::now());
        let views = controller.views().unwrap();
        let [left, middle, right] = views.panels().map(|p| frame(&controller, p));
        let content = frame(&controller, views.content);

        assert_close(left.width, 0.99 * middle.width);
        assert_close(right.width, 0.99 * middle.width);
        assert_close(left.min_x(), 0.0);
        assert_close(left.max_x(), middle.min_x());
        assert_close(middle.max_x(), right.min_x());
        assert_close(right.max_x(), content.width);
        assert_close(left.width + middle.width + right.width, content.width);
        for panel in [left, middle, right] {
            assert_close(panel.min_y(), 0.0);
            assert_close(panel.height, content.height);
        }
    }

    #[test]
    fn unit_seam_multiplier_gives_equal_thirds() {
        let mut config = Config::default();
        config.layout.panel_seam_multiplier = 1.0;
        let controller = appeared(config, Instant::now());
        for panel in controller.views().unwrap().panels() {
            assert_close(frame(&controller, panel).width, 478.125 / 3.0);
        }
    }

    #[test]
    fn entrance_starts_zero_sized_near_the_top() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        let scroll = controller.views().unwrap().scroll;

        let expected = Rect::new(187.5, 83.375, 0.0, 0.0);
        assert_eq!(controller.presentation_frame(scroll), Some(expected));
        assert!(controller.tick(start));
        assert_eq!(controller.presentation_frame(scroll), Some(expected));
    }

    #[test]
    fn mid_animation_frame_lies_between_start_and_end() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        let scroll = controller.views().unwrap().scroll;
        let end = frame(&controller, scroll);

        controller.tick(after(start, 875));
        let mid = controller.presentation_frame(scroll).unwrap();
        assert!(mid.width > 0.0 && mid.width < end.width);
        assert!(mid.height > 0.0 && mid.height < end.height);
        assert!(mid.mid_y() > 83.375 && mid.mid_y() < end.mid_y());
    }

    #[test]
    fn content_scroll_waits_for_entrance_to_finish() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        let views = controller.views().unwrap();
        assert!(matches!(controller.phase(), EntrancePhase::Animating(_)));

        controller.tick(after(start, 1000));
        assert!(matches!(controller.phase(), EntrancePhase::Animating(_)));
        assert_eq!(controller.presentation_offset(views.scroll), Some(Point::ZERO));

        assert!(controller.tick(after(start, 1750)));
        assert!(matches!(controller.phase(), EntrancePhase::Scrolling(_)));
        assert_eq!(controller.presentation_offset(views.scroll), Some(Point::ZERO));
        assert_eq!(
            controller.presentation_frame(views.scroll),
            Some(frame(&controller, views.scroll))
        );

        assert!(!controller.tick(after(start, 2050)));
        assert_eq!(controller.phase(), EntrancePhase::ScrollSettled);
        let left = frame(&controller, views.left);
        let offset = controller.presentation_offset(views.scroll).unwrap();
        assert_close(offset.x, left.max_x());
        assert_close(offset.y, 0.0);
    }

    #[test]
    fn install_sequence_is_reproducible() {
        let first = appeared(Config::default(), Instant::now());
        let second = appeared(Config::default(), Instant::now());
        assert_eq!(first.installed(), second.installed());
        assert_eq!(first.engine().constraints(), second.engine().constraints());

        let names: Vec<_> = first.installed().iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec![
                "title label",
                "content container",
                "panels",
                "scroll size",
                "scroll centering"
            ]
        );
    }

    #[test]
    fn second_appearance_is_ignored() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        let phase = controller.phase();
        let views = controller.engine().tree().len();

        controller.on_appear(after(start, 10)).unwrap();
        assert_eq!(controller.phase(), phase);
        assert_eq!(controller.engine().tree().len(), views);
        assert_eq!(controller.installed().len(), 5);
    }

    #[test]
    fn resize_rederives_frames_and_clamps_offset() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        controller.tick(after(start, 1750));
        controller.tick(after(start, 2050));
        let views = controller.views().unwrap();

        controller.resize(Size::new(200.0, 400.0));
        let scroll = frame(&controller, views.scroll);
        assert_close(scroll.width, 170.0);
        assert_close(scroll.height, 144.0);
        assert_close(scroll.mid_x(), 100.0);
        assert_close(scroll.mid_y(), 200.0);
        assert_close(frame(&controller, views.content).width, 255.0);

        // Left panel now ends past the scrollable range
        let offset = controller.presentation_offset(views.scroll).unwrap();
        assert_close(offset.x, 85.0);
        assert!(!controller.is_animating());
        let report = controller.engine().last_report();
        assert!(report.is_clean() && report.redundant.is_empty(), "{report:?}");
    }

    #[test]
    fn resize_mid_animation_retargets() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        let scroll = controller.views().unwrap().scroll;
        controller.tick(after(start, 500));

        controller.resize(Size::new(200.0, 400.0));
        controller.tick(after(start, 1749));
        let nearly = controller.presentation_frame(scroll).unwrap();
        assert!((nearly.width - 170.0).abs() < 1.0);
    }

    #[test]
    fn nothing_happens_before_appearing() {
        let mut controller = LayoutController::new(Config::default(), PHONE, TITLE);
        assert!(!controller.tick(Instant::now()));
        assert_eq!(controller.phase(), EntrancePhase::Idle);
        assert!(controller.views().is_none());
        assert!(controller.display_list().is_empty());
    }

    #[test]
    fn settled_display_list_keeps_panels_inside_viewport() {
        let start = Instant::now();
        let mut controller = appeared(Config::default(), start);
        controller.tick(after(start, 1750));
        controller.tick(after(start, 2050));
        let scroll = frame(&controller, controller.views().unwrap().scroll);

        let commands = controller.display_list();
        let fills: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect();

        // Background first, then scroll container
        assert_eq!(fills[0], (Rect::new(0.0, 0.0, 375.0, 667.0), Color::WHITE));
        assert_eq!(fills[1].1, Color::BROWN);
        for (rect, _) in &fills[1..] {
            assert!(rect.min_x() >= scroll.min_x() - 1e-9);
            assert!(rect.max_x() <= scroll.max_x() + 1e-9);
        }
        // Scrolled past the left panel, so blue is barely visible
        assert!(fills
            .iter()
            .filter(|(_, c)| *c == Color::BLUE)
            .all(|(rect, _)| rect.width < 1.0));
        assert!(commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "aGupieWare")));
    }
}
