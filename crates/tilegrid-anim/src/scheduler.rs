//! The animation scheduler.
//!
//! Each animation moves through `Pending → Running → {Completed, Cancelled}`.
//! The scheduler holds weak references to targets: an animation never keeps
//! its target alive, and animations whose target has been dropped are
//! cancelled on the next tick.
//!
//! At most one animation runs per `(target, property)` pair. Starting a new
//! one cancels the previous one without running its callback.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use tilegrid_core::{Error, Result};

use crate::easing::Easing;
use crate::property::{Animatable, Property};

/// Shared handle to an animation target.
pub type TargetRef = Rc<RefCell<dyn Animatable>>;

/// Completion callback. Runs inside [`Scheduler::tick`] and may start
/// further animations through the scheduler it receives.
pub type Callback = Box<dyn FnOnce(&mut Scheduler, &Finished)>;

/// Lifecycle state of an animation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Pending,
    Running,
    Completed,
    Cancelled,
}

/// Handle returned by [`Scheduler::start`]. Cheap to clone; reports the
/// live state of its animation.
#[derive(Clone)]
pub struct AnimationHandle {
    id: u64,
    state: Rc<Cell<AnimationState>>,
}

impl AnimationHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> AnimationState {
        self.state.get()
    }
}

impl PartialEq for AnimationHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnimationHandle {}

impl Hash for AnimationHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .finish()
    }
}

/// Record passed to a completion callback.
pub struct Finished {
    pub handle: AnimationHandle,
    pub property: Property,
    pub target: TargetRef,
    /// Final value written to the target.
    pub value: f32,
}

/// A pending animation, configured builder-style and handed to
/// [`Scheduler::start`].
pub struct Animation {
    property: Property,
    target_value: f32,
    duration: f32,
    easing: Easing,
    callback: Option<Callback>,
    state: Rc<Cell<AnimationState>>,
}

impl Animation {
    /// Animate `property` to `target_value` over `duration` seconds.
    pub fn new(property: Property, target_value: f32, duration: f32) -> Self {
        Self {
            property,
            target_value,
            duration,
            easing: Easing::Linear,
            callback: None,
            state: Rc::new(Cell::new(AnimationState::Pending)),
        }
    }

    /// Like [`new`](Animation::new), resolving the property by name.
    pub fn named(property: &str, target_value: f32, duration: f32) -> Result<Self> {
        Ok(Self::new(property.parse()?, target_value, duration))
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&mut Scheduler, &Finished) + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn state(&self) -> AnimationState {
        self.state.get()
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("property", &self.property)
            .field("target_value", &self.target_value)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("callback", &self.callback.is_some())
            .field("state", &self.state.get())
            .finish()
    }
}

struct Active {
    handle: AnimationHandle,
    key: usize,
    target: Weak<RefCell<dyn Animatable>>,
    property: Property,
    origin: f32,
    target_value: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    callback: Option<Callback>,
}

impl Active {
    fn finish(&self, state: AnimationState) {
        self.handle.state.set(state);
    }
}

/// Identity of a target allocation, stable while any weak reference to it
/// is alive.
fn target_key<T: ?Sized>(target: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(target) as *const () as usize
}

/// Advances running animations once per frame.
#[derive(Default)]
pub struct Scheduler {
    active: Vec<Active>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `animation` on `target`.
    ///
    /// Captures the target's current value as the interpolation origin and
    /// cancels any running animation on the same `(target, property)`.
    pub fn start<T: Animatable + 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        animation: Animation,
    ) -> Result<AnimationHandle> {
        let target: TargetRef = target.clone();
        self.start_on(&target, animation)
    }

    /// [`start`](Scheduler::start) for an already type-erased target, as
    /// handed to completion callbacks.
    pub fn start_on(&mut self, target: &TargetRef, animation: Animation) -> Result<AnimationHandle> {
        if !(animation.duration.is_finite() && animation.duration > 0.0) {
            return Err(Error::invalid(format!(
                "animation duration must be positive, got {}",
                animation.duration
            )));
        }
        if !animation.target_value.is_finite() {
            return Err(Error::invalid(format!(
                "animation target value must be finite, got {}",
                animation.target_value
            )));
        }
        let origin = {
            let t = target
                .try_borrow()
                .map_err(|_| Error::invalid("animation target is mutably borrowed"))?;
            let origin = t
                .get(animation.property)
                .ok_or(Error::UnsupportedProperty(animation.property.name()))?;
            if !t.accepts(animation.property, animation.target_value) {
                return Err(Error::invalid(format!(
                    "target rejects `{}` = {}",
                    animation.property, animation.target_value
                )));
            }
            origin
        };

        let key = target_key(target);
        if let Some(i) = self
            .active
            .iter()
            .position(|a| a.key == key && a.property == animation.property)
        {
            let prev = self.active.remove(i);
            prev.finish(AnimationState::Cancelled);
            log::trace!(
                "animation {} on `{}` superseded",
                prev.handle.id,
                prev.property
            );
        }

        self.next_id += 1;
        animation.state.set(AnimationState::Running);
        let handle = AnimationHandle {
            id: self.next_id,
            state: animation.state,
        };
        log::trace!(
            "animation {} started: `{}` {} -> {} over {}s",
            handle.id,
            animation.property,
            origin,
            animation.target_value,
            animation.duration
        );
        self.active.push(Active {
            handle: handle.clone(),
            key,
            target: Rc::downgrade(target),
            property: animation.property,
            origin,
            target_value: animation.target_value,
            duration: animation.duration,
            elapsed: 0.0,
            easing: animation.easing,
            callback: animation.callback,
        });
        Ok(handle)
    }

    /// Shorthand for starting an animation without a callback.
    pub fn animate<T: Animatable + 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        property: Property,
        target_value: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationHandle> {
        self.start(
            target,
            Animation::new(property, target_value, duration).easing(easing),
        )
    }

    /// Advance every running animation by `dt` seconds.
    ///
    /// Non-positive or non-finite deltas advance nothing. Animations that
    /// reach their duration are set to exactly their target value, marked
    /// completed and removed; their callbacks then run in start order.
    /// Returns the number of animations completed by this tick.
    pub fn tick(&mut self, dt: f32) -> usize {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut done: Vec<(Active, TargetRef, f32)> = Vec::new();

        let mut i = 0;
        while i < self.active.len() {
            let Some(target) = self.active[i].target.upgrade() else {
                let a = self.active.remove(i);
                a.finish(AnimationState::Cancelled);
                log::warn!(
                    "animation {} on `{}` cancelled: target dropped",
                    a.handle.id,
                    a.property
                );
                continue;
            };

            let a = &mut self.active[i];
            let value = {
                let Ok(mut t) = target.try_borrow_mut() else {
                    log::warn!("animation {} skipped a frame: target borrowed", a.handle.id);
                    i += 1;
                    continue;
                };
                a.elapsed += dt;
                let p = (a.elapsed / a.duration).min(1.0);
                let value = if p >= 1.0 {
                    a.target_value
                } else {
                    a.origin + (a.target_value - a.origin) * a.easing.apply(p)
                };
                t.set(a.property, value);
                value
            };

            if a.elapsed >= a.duration {
                let a = self.active.remove(i);
                a.finish(AnimationState::Completed);
                done.push((a, target, value));
            } else {
                i += 1;
            }
        }

        let completed = done.len();
        for (mut a, target, value) in done {
            log::trace!("animation {} on `{}` completed", a.handle.id, a.property);
            if let Some(callback) = a.callback.take() {
                let finished = Finished {
                    handle: a.handle.clone(),
                    property: a.property,
                    target,
                    value,
                };
                callback(self, &finished);
            }
        }
        completed
    }

    /// Cancel a running animation without running its callback. Returns
    /// `false` if it was not running.
    pub fn cancel(&mut self, handle: &AnimationHandle) -> bool {
        let Some(i) = self.active.iter().position(|a| a.handle == *handle) else {
            return false;
        };
        let a = self.active.remove(i);
        a.finish(AnimationState::Cancelled);
        log::trace!("animation {} cancelled", a.handle.id);
        true
    }

    /// Cancel every animation running on `target`. Returns how many were
    /// cancelled.
    pub fn cancel_target<T: ?Sized>(&mut self, target: &Rc<RefCell<T>>) -> usize {
        let key = target_key(target);
        let before = self.active.len();
        self.active.retain(|a| {
            if a.key == key {
                a.finish(AnimationState::Cancelled);
                false
            } else {
                true
            }
        });
        before - self.active.len()
    }

    /// The animation currently running on `(target, property)`, if any.
    pub fn running_on<T: ?Sized>(
        &self,
        target: &Rc<RefCell<T>>,
        property: Property,
    ) -> Option<AnimationHandle> {
        let key = target_key(target);
        self.active
            .iter()
            .find(|a| a.key == key && a.property == property)
            .map(|a| a.handle.clone())
    }

    pub fn is_running(&self, handle: &AnimationHandle) -> bool {
        handle.state() == AnimationState::Running
    }

    /// Number of running animations.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
