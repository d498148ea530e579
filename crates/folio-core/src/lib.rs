//! # folio-core
//!
//! Headless engine behind the scroll-stacked project showcase.
//!
//! `ShowcaseView` lays a `Deck` out on a `Stage`; `ScrollStackAnimator`
//! builds the stacking and reveal timelines against it and keeps them in sync
//! with a `ScrollDriver` through a `FrameLoop` callback.

pub mod animation;
pub mod card;
pub mod config;
pub mod error;
pub mod frame;
pub mod marquee;
pub mod reveal;
pub mod scripting;
pub mod scroll;
pub mod stack;
pub mod stage;
pub mod timeline;
pub mod trigger;
pub mod tween;
pub mod view;

pub use card::{Card, Deck};
pub use config::ShowcaseConfig;
pub use error::{Result, StackError};
pub use frame::{FrameHandle, FrameLoop};
pub use scroll::{ScrollDriver, SmoothScroll};
pub use stack::ScrollStackAnimator;
pub use stage::{NodeId, Stage, Viewport};
pub use timeline::{Timeline, TimelineOutline, TweenEngine};
pub use view::ShowcaseView;
