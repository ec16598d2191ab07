//! Bounded queue of heading changes awaiting upcoming ticks.

use std::collections::VecDeque;

use gridsnake_core::Direction;

/// Maximum number of heading changes buffered ahead of the ticks.
pub const PENDING_DIRECTION_CAPACITY: usize = 2;

/// FIFO of requested headings that decouples input latency from tick latency.
#[derive(Clone, Debug, Default)]
pub(crate) struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    /// Most recently queued heading, or `heading` when nothing is queued.
    pub(crate) fn effective_last(&self, heading: Direction) -> Direction {
        self.pending.back().copied().unwrap_or(heading)
    }

    /// Queues `requested` unless the queue is full or the request repeats or
    /// reverses the effective last heading.
    pub(crate) fn try_push(&mut self, requested: Direction, heading: Direction) -> bool {
        if self.pending.len() >= PENDING_DIRECTION_CAPACITY {
            return false;
        }

        let last = self.effective_last(heading);
        if requested == last || requested == last.opposite() {
            return false;
        }

        self.pending.push_back(requested);
        true
    }

    pub(crate) fn pop_front(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_repeat_and_reverse_of_current_heading() {
        let mut queue = DirectionQueue::default();
        assert!(!queue.try_push(Direction::RIGHT, Direction::RIGHT));
        assert!(!queue.try_push(Direction::LEFT, Direction::RIGHT));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn compares_against_last_queued_heading() {
        let mut queue = DirectionQueue::default();
        assert!(queue.try_push(Direction::UP, Direction::RIGHT));
        assert!(!queue.try_push(Direction::DOWN, Direction::RIGHT));
        assert!(!queue.try_push(Direction::UP, Direction::RIGHT));
        assert!(queue.try_push(Direction::LEFT, Direction::RIGHT));
        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![Direction::UP, Direction::LEFT]
        );
    }

    #[test]
    fn holds_at_most_two_entries() {
        let mut queue = DirectionQueue::default();
        assert!(queue.try_push(Direction::UP, Direction::RIGHT));
        assert!(queue.try_push(Direction::LEFT, Direction::RIGHT));
        assert!(!queue.try_push(Direction::DOWN, Direction::RIGHT));
        assert_eq!(queue.len(), PENDING_DIRECTION_CAPACITY);

        assert_eq!(queue.pop_front(), Some(Direction::UP));
        assert!(queue.try_push(Direction::DOWN, Direction::UP));
        assert_eq!(queue.effective_last(Direction::UP), Direction::DOWN);
    }

    #[test]
    fn diagonal_requests_follow_the_same_rules() {
        let mut queue = DirectionQueue::default();
        assert!(queue.try_push(Direction::UP_LEFT, Direction::RIGHT));
        assert!(!queue.try_push(Direction::DOWN_RIGHT, Direction::RIGHT));
        assert!(queue.try_push(Direction::DOWN_LEFT, Direction::RIGHT));
    }
}
