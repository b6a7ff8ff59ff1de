//! Engine — the page-turning core.
//!
//! Owns the book and its navigation state, turns intents into page turns,
//! and resolves every frame into draw calls on a `Surface`.
//!
//! The engine understands pages, layout and animation. It never deals with
//! terminals, cells or clocks: an outside scheduler calls [`Reader::step`]
//! once per frame interval while a turn is running.

pub mod animator;
pub mod layout;
pub mod navigation;
pub mod spread;

use std::time::Duration;

use tracing::debug;

use crate::book::Book;
use crate::surface::Surface;

use animator::{PageTurnAnimator, Step, TurnTiming};
use navigation::{Direction, NavigationState};
use spread::{BookGeometry, SpreadRenderer};

/// A user request to turn the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TurnNext,
    TurnPrev,
}

impl Intent {
    fn direction(self) -> Direction {
        match self {
            Intent::TurnNext => Direction::Next,
            Intent::TurnPrev => Direction::Prev,
        }
    }
}

/// What the reader currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub page: usize,
    pub last_page: usize,
    pub animating: bool,
}

/// A reading session over one book.
///
/// The reader is the single owner of navigation state. Intents that arrive
/// while a turn is running are dropped, not queued.
#[derive(Debug, Clone)]
pub struct Reader {
    book: Book,
    renderer: SpreadRenderer,
    nav: NavigationState,
    animator: PageTurnAnimator,
}

impl Reader {
    /// Open `book` on its cover.
    pub fn new(book: Book, geometry: BookGeometry, timing: TurnTiming) -> Self {
        let nav = NavigationState::new(book.last_page());
        Reader {
            book,
            renderer: SpreadRenderer::new(geometry),
            nav,
            animator: PageTurnAnimator::new(timing),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn geometry(&self) -> &BookGeometry {
        self.renderer.geometry()
    }

    pub fn frame_interval(&self) -> Duration {
        self.animator.timing().frame_interval()
    }

    pub fn current_view(&self) -> View {
        View {
            page: self.nav.current_page(),
            last_page: self.nav.last_page(),
            animating: self.nav.is_animating(),
        }
    }

    /// Start a page turn if the navigation guard allows it. Returns whether
    /// the intent was accepted.
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        let accepted = self.animator.start(intent.direction(), &mut self.nav);
        if !accepted {
            debug!(
                ?intent,
                page = self.nav.current_page(),
                animating = self.nav.is_animating(),
                "intent dropped"
            );
        }
        accepted
    }

    /// Advance a running turn by one frame, drawing it onto `surface`.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Step {
        self.animator
            .step(&self.book, &self.renderer, &mut self.nav, surface)
    }

    /// Draw the static spread for the current page index.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.renderer
            .render(&self.book, self.nav.current_page(), surface);
    }
}
