use std::sync::Mutex;

use crossbeam::channel::{Receiver, Sender, bounded};

/// One active priority level: an unbuffered handoff slot plus the count of
/// senders committed to deliver through it.
///
/// The slot is a zero-capacity channel, so a transfer on reserved handles
/// only completes while a send and a receive are in progress simultaneously.
/// `outstanding` bridges the gap between "a sender has committed" and "the
/// slot has a value ready": it lets a receiver tell "nobody is sending here"
/// (skip the level) apart from "someone is mid-handoff here" (wait on the
/// slot).
#[derive(Debug)]
pub(crate) struct Node<T> {
    priority: i64,
    outstanding: Mutex<usize>,
    slot_tx: Sender<T>,
    slot_rx: Receiver<T>,
}

impl<T> Node<T> {
    pub(crate) fn new(priority: i64) -> Self {
        let (slot_tx, slot_rx) = bounded(0);
        Self {
            priority,
            outstanding: Mutex::new(0),
            slot_tx,
            slot_rx,
        }
    }

    pub(crate) fn priority(&self) -> i64 {
        self.priority
    }

    /// Commits one sender to deliver through this level and hands back the
    /// slot end to perform the blocking transfer on. Never blocks itself.
    pub(crate) fn reserve_send(&self) -> Sender<T> {
        let mut outstanding = self.outstanding.lock().unwrap();
        *outstanding += 1;
        self.slot_tx.clone()
    }

    /// Claims one committed delivery for the calling receiver, yielding the
    /// slot end to receive on, or `None` when no sender is outstanding at
    /// this level. The count is only decremented by the receiver that will
    /// consume the matching delivery, so it can never go negative.
    pub(crate) fn try_reserve_recv(&self) -> Option<Receiver<T>> {
        let mut outstanding = self.outstanding.lock().unwrap();
        if *outstanding == 0 {
            return None;
        }
        *outstanding -= 1;
        Some(self.slot_rx.clone())
    }

    pub(crate) fn outstanding(&self) -> usize {
        *self.outstanding.lock().unwrap()
    }
}
