// ABOUTME: The scroll panel screen: view construction, constraints and animation.
// ABOUTME: Hosts call on_appear once, then tick/resize/display_list from their event loop.

mod animator;
pub mod constraints;
mod controller;
mod display;

pub use animator::{AnimationId, Animator, Track};
pub use controller::{EntrancePhase, LayoutController};
pub use constraints::ScreenViews;
pub use display::display_list;
