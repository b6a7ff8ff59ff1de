use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn apply(self, page: usize) -> usize {
        match self {
            Direction::Next => page + 1,
            Direction::Prev => page - 1,
        }
    }
}

/// Current page index and whether a turn is in flight.
///
/// The request methods are pure guards. Only the page-turn animator writes
/// to this state, through the crate-private `begin_turn`/`finish_turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    current_page: usize,
    last_page: usize,
    animating: bool,
}

impl NavigationState {
    /// Start closed, on the cover, for a book with `last_page` spreads.
    pub fn new(last_page: usize) -> Self {
        NavigationState {
            current_page: 0,
            last_page,
            animating: false,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn last_page(&self) -> usize {
        self.last_page
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// `Some(Next)` if a forward turn may start now.
    pub fn request_next(&self) -> Option<Direction> {
        (!self.animating && self.current_page < self.last_page).then_some(Direction::Next)
    }

    /// `Some(Prev)` if a backward turn may start now.
    pub fn request_prev(&self) -> Option<Direction> {
        (!self.animating && self.current_page > 0).then_some(Direction::Prev)
    }

    pub fn request(&self, direction: Direction) -> Option<Direction> {
        match direction {
            Direction::Next => self.request_next(),
            Direction::Prev => self.request_prev(),
        }
    }

    pub(crate) fn begin_turn(&mut self) {
        debug_assert!(!self.animating, "turn started while another is running");
        self.animating = true;
    }

    pub(crate) fn finish_turn(&mut self, direction: Direction) {
        debug_assert!(self.animating, "turn finished without being started");
        self.current_page = direction.apply(self.current_page);
        self.animating = false;
        debug_assert!(self.current_page <= self.last_page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_only_allows_next() {
        let nav = NavigationState::new(2);
        assert_eq!(nav.request_next(), Some(Direction::Next));
        assert_eq!(nav.request_prev(), None);
    }

    #[test]
    fn last_page_only_allows_prev() {
        let mut nav = NavigationState::new(1);
        nav.begin_turn();
        nav.finish_turn(Direction::Next);
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.request_next(), None);
        assert_eq!(nav.request_prev(), Some(Direction::Prev));
    }

    #[test]
    fn empty_book_rejects_everything() {
        let nav = NavigationState::new(0);
        assert_eq!(nav.request_next(), None);
        assert_eq!(nav.request_prev(), None);
    }

    #[test]
    fn requests_are_rejected_while_animating() {
        for start in 0..=3 {
            let mut nav = NavigationState::new(3);
            for _ in 0..start {
                nav.begin_turn();
                nav.finish_turn(Direction::Next);
            }
            nav.begin_turn();
            let before = nav;
            assert_eq!(nav.request_next(), None);
            assert_eq!(nav.request_prev(), None);
            assert_eq!(nav, before);
        }
    }

    #[test]
    fn finishing_a_turn_clears_animating() {
        let mut nav = NavigationState::new(3);
        nav.begin_turn();
        assert!(nav.is_animating());
        nav.finish_turn(Direction::Next);
        assert!(!nav.is_animating());
        assert_eq!(nav.current_page(), 1);
    }
}
