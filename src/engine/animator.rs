use std::f64::consts::PI;
use std::time::Duration;

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::book::Book;
use crate::surface::Surface;

use super::navigation::{Direction, NavigationState};
use super::spread::{Face, SpreadRenderer};

/// Length and cadence of a page turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnTiming {
    pub frame_count: u32,
    pub frame_interval_ms: u64,
}

impl Default for TurnTiming {
    fn default() -> Self {
        TurnTiming {
            frame_count: 20,
            frame_interval_ms: 20,
        }
    }
}

impl TurnTiming {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Outcome of one call to [`PageTurnAnimator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No turn is running; nothing was drawn.
    Idle,
    /// A turning frame was drawn; call again after one frame interval.
    Continue,
    /// The turn was committed and the resulting spread drawn.
    Done { page: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Idle,
    Running { direction: Direction, frame: u32 },
}

/// Drives a page turn frame by frame.
///
/// The animator owns no clock. An external scheduler calls `step` once per
/// frame interval until it reports `Done`: `frame_count` rotated frames,
/// then one final step that commits the new page index.
#[derive(Debug, Clone)]
pub struct PageTurnAnimator {
    timing: TurnTiming,
    state: TurnState,
}

impl PageTurnAnimator {
    pub fn new(timing: TurnTiming) -> Self {
        PageTurnAnimator {
            timing,
            state: TurnState::Idle,
        }
    }

    pub fn timing(&self) -> &TurnTiming {
        &self.timing
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TurnState::Running { .. })
    }

    /// Enter the running state if `nav` accepts a turn in `direction`.
    ///
    /// Returns `false`, changing nothing, for a turn past either end of the
    /// book or while a turn is already running.
    pub fn start(&mut self, direction: Direction, nav: &mut NavigationState) -> bool {
        if self.is_running() || nav.request(direction).is_none() {
            return false;
        }
        nav.begin_turn();
        self.state = TurnState::Running {
            direction,
            frame: 0,
        };
        debug!(?direction, from = nav.current_page(), "page turn started");
        true
    }

    pub fn step<S: Surface + ?Sized>(
        &mut self,
        book: &Book,
        renderer: &SpreadRenderer,
        nav: &mut NavigationState,
        surface: &mut S,
    ) -> Step {
        let (direction, frame) = match &mut self.state {
            TurnState::Idle => return Step::Idle,
            TurnState::Running { direction, frame } => {
                *frame += 1;
                (*direction, *frame)
            }
        };

        if frame > self.timing.frame_count {
            nav.finish_turn(direction);
            self.state = TurnState::Idle;
            renderer.render(book, nav.current_page(), surface);
            debug!(?direction, page = nav.current_page(), "page turn committed");
            return Step::Done {
                page: nav.current_page(),
            };
        }

        let page = nav.current_page();
        renderer.render(book, page, surface);

        let angle = turn_angle(direction, frame, self.timing.frame_count);
        let transform = turn_transform(renderer.geometry().spine_pivot(), angle);
        let face = match direction {
            Direction::Next => Face::Right,
            Direction::Prev => Face::Left,
        };
        renderer.render_face(book, page, face, transform, surface);

        Step::Continue
    }
}

/// Rotation of the turning face at `frame` of `frame_count`.
///
/// Linear in progress: a forward turn sweeps 0 → π, a backward one π → 0.
pub fn turn_angle(direction: Direction, frame: u32, frame_count: u32) -> f64 {
    let progress = f64::from(frame) / f64::from(frame_count);
    match direction {
        Direction::Next => PI * progress,
        Direction::Prev => PI * (1.0 - progress),
    }
}

pub fn turn_transform(pivot: Point, angle: f64) -> Affine {
    Affine::translate(pivot.to_vec2())
        * Affine::rotate(angle)
        * Affine::translate(-pivot.to_vec2())
}
