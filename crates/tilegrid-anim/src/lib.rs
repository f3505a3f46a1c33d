//! Frame-ticked property animation.
//!
//! An [`Animation`] interpolates one numeric [`Property`] of an
//! [`Animatable`] target from its current value to a target value over a
//! duration, shaped by an [`Easing`] curve. The [`Scheduler`] advances all
//! running animations on each [`tick`](Scheduler::tick) and runs completion
//! callbacks, which may chain further animations.

pub mod easing;
pub mod property;
pub mod scheduler;

pub use easing::Easing;
pub use property::{Animatable, Property, Visual, channel_value, with_channel_value};
pub use scheduler::{
    Animation, AnimationHandle, AnimationState, Callback, Finished, Scheduler, TargetRef,
};
