//! Frame-ticked driver for the engine's view collaborators.
//!
//! [`FrameScheduler`] keeps every pending repaint and fade in a queue and
//! resolves them from [`FrameScheduler::frame`], which the host calls once
//! per rendered frame. Nothing advances between frames.

use cellselector_core::{
    layout_of, Cell, CellKind, Completion, EasedValue, Easing, Fade, Opacity, View,
    WidgetVisibility, DEFAULT_FADE_DURATION,
};
use futures::channel::oneshot;
use futures::FutureExt;
use std::cell::RefCell;
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// One running fade.
struct Tween {
    opacity: Opacity,
    value: EasedValue,
    done: oneshot::Sender<()>,
}

#[derive(Default)]
struct Queue {
    tweens: Vec<Tween>,
    repaints: Vec<oneshot::Sender<()>>,
    committed: Vec<Vec<Cell>>,
    frames: u64,
}

/// View and widget-visibility driver advanced by explicit frame ticks.
pub struct FrameScheduler {
    queue: RefCell<Queue>,
    widget_opacity: Opacity,
    widget_fade: Duration,
    easing: Easing,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("FrameScheduler")
            .field("tweens", &queue.tweens.len())
            .field("repaints", &queue.repaints.len())
            .field("frames", &queue.frames)
            .field("widget_opacity", &self.widget_opacity)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Create a scheduler with ease-in-out fades and a visible widget.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(Queue::default()),
            widget_opacity: Opacity::visible(),
            widget_fade: DEFAULT_FADE_DURATION,
            easing: Easing::EaseInOut,
        }
    }

    /// Set the easing curve for every fade.
    #[must_use]
    pub const fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the duration of the whole-widget fades.
    #[must_use]
    pub const fn with_widget_fade(mut self, duration: Duration) -> Self {
        self.widget_fade = duration;
        self
    }

    /// Advance every fade by `dt` and release the completions that are due.
    ///
    /// Repaints requested before this call resolve now. Returns the number
    /// of fades still running.
    pub fn frame(&self, dt: Duration) -> usize {
        let mut queue = self.queue.borrow_mut();
        queue.frames += 1;

        for done in queue.repaints.drain(..) {
            let _ = done.send(());
        }

        let dt = dt.as_secs_f64();
        let mut running = Vec::with_capacity(queue.tweens.len());
        for mut tween in queue.tweens.drain(..) {
            tween.value.update(dt);
            if tween.value.is_complete() {
                tween.opacity.set(tween.value.to);
                let _ = tween.done.send(());
            } else {
                tween.opacity.set(tween.value.value());
                running.push(tween);
            }
        }
        queue.tweens = running;

        trace!(frame = queue.frames, active = queue.tweens.len(), "frame");
        queue.tweens.len()
    }

    /// Fades still running.
    #[must_use]
    pub fn active_tweens(&self) -> usize {
        self.queue.borrow().tweens.len()
    }

    /// Repaints waiting for the next frame.
    #[must_use]
    pub fn pending_repaints(&self) -> usize {
        self.queue.borrow().repaints.len()
    }

    /// Whether nothing is waiting on a frame.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let queue = self.queue.borrow();
        queue.tweens.is_empty() && queue.repaints.is_empty()
    }

    /// Frames ticked so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.queue.borrow().frames
    }

    /// Last grid committed by a repaint. Animated cells share their
    /// opacity handles with the live grid.
    #[must_use]
    pub fn committed_grid(&self) -> Vec<Vec<Cell>> {
        self.queue.borrow().committed.clone()
    }

    /// Cell kinds of the last committed grid.
    #[must_use]
    pub fn committed_layout(&self) -> Vec<Vec<CellKind>> {
        layout_of(&self.queue.borrow().committed)
    }

    /// Current opacity of the whole widget.
    #[must_use]
    pub fn widget_opacity(&self) -> f64 {
        self.widget_opacity.get()
    }

    fn schedule(&self, fade: Fade) -> Completion {
        if fade.duration.is_zero() {
            fade.opacity.set(fade.to);
            return futures::future::ready(()).boxed_local();
        }
        let (done, rx) = oneshot::channel();
        let tween = Tween {
            value: fade.tween(self.easing),
            opacity: fade.opacity,
            done,
        };
        self.queue.borrow_mut().tweens.push(tween);
        rx.map(drop).boxed_local()
    }
}

impl View for FrameScheduler {
    fn request_repaint(&self, grid: &[Vec<Cell>]) -> Completion {
        let (done, rx) = oneshot::channel();
        let mut queue = self.queue.borrow_mut();
        queue.committed = grid.to_vec();
        queue.repaints.push(done);
        rx.map(drop).boxed_local()
    }

    fn animate(&self, fade: Fade) -> Completion {
        self.schedule(fade)
    }
}

impl WidgetVisibility for FrameScheduler {
    fn hide_widget(&self) -> Completion {
        self.schedule(Fade::to(&self.widget_opacity, 0.0, self.widget_fade))
    }

    fn show_widget(&self) -> Completion {
        self.schedule(Fade::to(&self.widget_opacity, 1.0, self.widget_fade))
    }
}
