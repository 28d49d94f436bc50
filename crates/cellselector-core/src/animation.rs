//! Opacity handles, fade descriptions and easing for cell transitions.
//!
//! The engine never ticks animations itself. An animated cell hands a
//! [`Fade`] to the view collaborator, which drives the shared [`Opacity`]
//! handle and resolves the returned completion when the fade is done.

use std::cell::Cell as SharedValue;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Fade duration used when the host does not configure one.
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(250);

// =============================================================================
// Opacity
// =============================================================================

/// Shared handle to the current opacity of an animated cell.
///
/// Clones observe and update the same value; the view reads it while
/// painting and the animation driver writes it while ticking.
#[derive(Clone, Default)]
pub struct Opacity(Rc<SharedValue<f64>>);

impl Opacity {
    /// Create a handle with an initial value, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(Rc::new(SharedValue::new(value.clamp(0.0, 1.0))))
    }

    /// Fully visible.
    #[must_use]
    pub fn visible() -> Self {
        Self::new(1.0)
    }

    /// Fully transparent.
    #[must_use]
    pub fn hidden() -> Self {
        Self::new(0.0)
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Overwrite the current value.
    pub fn set(&self, value: f64) {
        self.0.set(value.clamp(0.0, 1.0));
    }

    /// Whether two handles share the same value.
    #[must_use]
    pub fn same_handle(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opacity").field(&self.get()).finish()
    }
}

// =============================================================================
// Fade
// =============================================================================

/// One opacity tween for the view collaborator to drive.
#[derive(Debug, Clone)]
pub struct Fade {
    /// Handle the driver writes to
    pub opacity: Opacity,
    /// Start value, read when the fade was created
    pub from: f64,
    /// Target value
    pub to: f64,
    /// Total duration
    pub duration: Duration,
}

impl Fade {
    /// Fade `opacity` from its current value to `to`.
    #[must_use]
    pub fn to(opacity: &Opacity, to: f64, duration: Duration) -> Self {
        Self {
            from: opacity.get(),
            opacity: opacity.clone(),
            to: to.clamp(0.0, 1.0),
            duration,
        }
    }

    /// Whether this fade ends fully visible.
    #[must_use]
    pub fn is_fade_in(&self) -> bool {
        self.to > self.from
    }

    /// Build the tween that drives this fade.
    #[must_use]
    pub fn tween(&self, easing: Easing) -> EasedValue {
        EasedValue::new(self.from, self.to, self.duration.as_secs_f64()).with_easing(easing)
    }
}

// =============================================================================
// Easing
// =============================================================================

/// Easing curves available to fade drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation (no easing)
    #[default]
    Linear,
    /// Ease in (slow start)
    EaseIn,
    /// Ease out (slow end)
    EaseOut,
    /// Ease in and out (slow start and end)
    EaseInOut,
    /// Cubic ease in and out
    CubicInOut,
}

impl Easing {
    /// Apply easing function to a normalized time value (0.0 to 1.0).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => (1.0 - t).mul_add(-(1.0 - t), 1.0),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0f64).mul_add(t, 2.0).powi(2) / 2.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0f64).mul_add(t, 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// An easing-based animated value.
#[derive(Debug, Clone)]
pub struct EasedValue {
    /// Start value
    pub from: f64,
    /// End value
    pub to: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// Elapsed time
    pub elapsed: f64,
    /// Easing function
    pub easing: Easing,
}

impl EasedValue {
    /// Create new eased animation.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing: Easing::EaseInOut,
        }
    }

    /// Set easing function.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Get current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        let eased = self.easing.apply(self.progress());
        (self.to - self.from).mul_add(eased, self.from)
    }

    /// Whether animation is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Update animation.
    pub fn update(&mut self, dt: f64) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// Progress from 0.0 to 1.0.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}
