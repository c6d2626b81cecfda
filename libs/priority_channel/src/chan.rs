use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam::channel::{Receiver, Sender, bounded};

use crate::node::Node;
use crate::waiting::WaitingLevels;

/// A rendezvous channel that steers receivers toward the highest priority
/// level with a sender in flight.
///
/// Nothing is buffered: every transfer is a direct handoff between one
/// blocked sender and one receiver, and capacity is effectively the number
/// of concurrently blocked senders. Priority only decides which of several
/// *already blocked* senders a receiver is paired with; a lone sender and
/// receiver behave exactly like an unbuffered channel.
///
/// Both [`send`](Self::send) and [`recv`](Self::recv) block indefinitely
/// until a matching counterpart arrives. That is backpressure, not an error,
/// and neither operation can fail.
#[derive(Debug)]
pub struct PriorityChannel<T> {
    state: Mutex<State<T>>,

    /// Direct-delivery slot for receivers that arrived before any sender.
    /// Also zero-capacity: a pending receiver is unblocked by the handoff
    /// itself, never by an intermediate buffer.
    pending_tx: Sender<T>,
    pending_rx: Receiver<T>,
}

/// The structural state of the channel. All cross-field invariants live
/// here, guarded by one lock: at most one current node, every other active
/// priority parked exactly once, `index` holding exactly the active nodes,
/// and no node existing while receivers are pending.
#[derive(Debug)]
struct State<T> {
    /// The node holding the highest priority among all active levels.
    current: Option<Arc<Node<T>>>,
    /// Every active priority except the current one.
    waiting: WaitingLevels,
    /// Resolves a priority parked in `waiting` back to its node.
    index: HashMap<i64, Arc<Node<T>>>,
    /// Receivers blocked because no level is active anywhere.
    pending_receivers: usize,
}

impl<T> PriorityChannel<T> {
    /// Creates an empty channel: no active levels, no pending receivers.
    pub fn new() -> Self {
        let (pending_tx, pending_rx) = bounded(0);
        Self {
            state: Mutex::new(State {
                current: None,
                waiting: WaitingLevels::default(),
                index: HashMap::new(),
                pending_receivers: 0,
            }),
            pending_tx,
            pending_rx,
        }
    }

    /// Delivers `value` to exactly one receiver, blocking until that
    /// receiver consumes it.
    ///
    /// A receiver that parked before any sender arrived is served directly,
    /// bypassing priority selection. Otherwise the value is registered under
    /// the node for `priority` (created lazily) and handed off through that
    /// level's slot once a receiver is steered to it.
    pub fn send(&self, priority: i64, value: T) {
        let mut state = self.state.lock().unwrap();

        if state.pending_receivers > 0 {
            debug_assert!(
                state.index.is_empty(),
                "no level may be active while receivers are pending"
            );
            state.pending_receivers -= 1;
            drop(state);
            self.pending_tx
                .send(value)
                .expect("the channel owns the pending slot for its whole lifetime");
            return;
        }

        let node = match state.index.get(&priority) {
            Some(node) => Arc::clone(node),
            None => state.link_new_level(priority),
        };
        let slot = node.reserve_send();
        // The structural lock is released before the rendezvous so unrelated
        // send/receive pairs are not serialized behind this transfer.
        drop(state);
        slot.send(value)
            .expect("a reserved delivery keeps its slot connected until a receiver consumes it");
    }

    /// Takes the next value, blocking until one is delivered.
    ///
    /// Values are drawn from the highest active priority level first; a
    /// drained level is dropped out of rotation and the next highest takes
    /// its place. The originating priority is not observable from the
    /// returned value. If no level is active at all, the caller parks as a
    /// pending receiver and is unblocked directly by the next send.
    pub fn recv(&self) -> T {
        let mut state = self.state.lock().unwrap();
        loop {
            let Some(node) = state.current.clone() else {
                debug_assert!(
                    state.index.is_empty(),
                    "receivers park only while no level is active"
                );
                state.pending_receivers += 1;
                drop(state);
                return self
                    .pending_rx
                    .recv()
                    .expect("the channel owns the pending slot for its whole lifetime");
            };

            if let Some(slot) = node.try_reserve_recv() {
                drop(state);
                return slot
                    .recv()
                    .expect("a reserved sender holds its slot handle until the handoff completes");
            }

            // The level denied the reservation, so no sender is outstanding
            // there right now. Re-read the count before unlinking; a send
            // that lands in the meantime is picked up by the next pass.
            // This re-check loops while still holding the structural lock,
            // stalling unrelated senders and receivers until the current
            // level is resolved.
            if node.outstanding() == 0 {
                state.unlink_current(&node);
            }
        }
    }
}

impl<T> Default for PriorityChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> State<T> {
    /// Creates the node for a previously unseen priority and slots it into
    /// rotation. The current node always keeps the highest active priority,
    /// so either the newcomer parks or it displaces the current one.
    fn link_new_level(&mut self, priority: i64) -> Arc<Node<T>> {
        let node = Arc::new(Node::new(priority));
        self.index.insert(priority, Arc::clone(&node));

        match &self.current {
            None => self.current = Some(Arc::clone(&node)),
            Some(current) if priority > current.priority() => {
                self.waiting.park(current.priority());
                self.current = Some(Arc::clone(&node));
            }
            Some(_) => self.waiting.park(priority),
        }

        node
    }

    /// Drops the drained current level out of rotation and promotes the
    /// highest parked priority, if any. The caller must have confirmed the
    /// node has no outstanding senders. The node's slot is dropped with it
    /// and never reused; a later send at the same priority gets a fresh
    /// level.
    fn unlink_current(&mut self, node: &Node<T>) {
        let removed = self.index.remove(&node.priority());
        debug_assert!(removed.is_some(), "the current level is always indexed");

        self.current = self.waiting.next_highest().map(|priority| {
            Arc::clone(
                self.index
                    .get(&priority)
                    .expect("every parked priority maps to a live node"),
            )
        });
    }
}

#[cfg(test)]
impl<T> PriorityChannel<T> {
    fn pending_receivers(&self) -> usize {
        self.state.lock().unwrap().pending_receivers
    }

    fn waiting_len(&self) -> usize {
        self.state.lock().unwrap().waiting.len()
    }

    fn active_levels(&self) -> usize {
        self.state.lock().unwrap().index.len()
    }

    /// Sends that have reserved a delivery and not yet been claimed by a
    /// receiver, summed over all active levels.
    fn registered_sends(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.index.values().map(|node| node.outstanding()).sum()
    }
}
