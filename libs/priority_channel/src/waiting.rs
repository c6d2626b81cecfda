use std::collections::BinaryHeap;

/// The active priorities that are not currently being served, ordered so that
/// the next level to serve is always the highest one remaining.
///
/// Each active priority is parked at most once, so equal priorities never
/// meet inside the heap and no tie-breaking rule is needed.
#[derive(Debug, Default)]
pub(crate) struct WaitingLevels {
    heap: BinaryHeap<i64>,
}

impl WaitingLevels {
    pub(crate) fn park(&mut self, priority: i64) {
        self.heap.push(priority);
    }

    /// Removes and returns the highest parked priority, if any.
    pub(crate) fn next_highest(&mut self) -> Option<i64> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::WaitingLevels;

    #[test]
    fn extracts_in_descending_order() {
        let mut levels = WaitingLevels::default();
        for priority in [3, 11, -4, 7, 0] {
            levels.park(priority);
        }
        assert_eq!(levels.len(), 5);

        let mut drained = vec![];
        while let Some(priority) = levels.next_highest() {
            drained.push(priority);
        }

        assert_eq!(drained, vec![11, 7, 3, 0, -4]);
        assert_eq!(levels.len(), 0);
    }

    #[test]
    fn empty_set_yields_nothing() {
        let mut levels = WaitingLevels::default();
        assert_eq!(levels.next_highest(), None);
        assert_eq!(levels.len(), 0);
    }
}
