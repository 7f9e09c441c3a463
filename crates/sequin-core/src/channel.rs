//! Rendezvous channel pair for producer/consumer handshaking.
//!
//! Two zero-capacity channels connect exactly two threads: the data channel
//! carries messages from the producer, the flow channel grants the producer
//! permission to compute the next value. Together they enforce a strict
//! ping-pong in which at most one value is ever in flight, so the two OS
//! threads behave, from the caller's view, like one suspendable thread.
//!
//! This is the sole synchronization primitive in the core; no other locks
//! exist. Disconnection (dropping either half) wakes a blocked peer, which is
//! how a generator is interrupted.

use std::any::Any;

use crossbeam::channel::{bounded, Receiver, Sender};

/// Payload of the data channel.
pub(crate) enum Message<T> {
    /// One produced value.
    Value(T),
    /// Terminal: the routine finished or was broken out of. Irreversible.
    Completed,
    /// Terminal: the routine panicked; the payload is re-raised on the
    /// consumer thread.
    Fault(Box<dyn Any + Send>),
}

/// Unit permission token sent on the flow channel.
pub(crate) struct FlowToken;

/// Producer half: publishes messages, waits for flow tokens.
pub(crate) struct ProducerEnd<T> {
    data: Sender<Message<T>>,
    flow: Receiver<FlowToken>,
}

/// Consumer half: requests values, receives messages.
pub(crate) struct ConsumerEnd<T> {
    data: Receiver<Message<T>>,
    flow: Sender<FlowToken>,
}

/// Creates a connected rendezvous pair.
pub(crate) fn handshake<T>() -> (ProducerEnd<T>, ConsumerEnd<T>) {
    let (data_tx, data_rx) = bounded(0);
    let (flow_tx, flow_rx) = bounded(0);
    (
        ProducerEnd {
            data: data_tx,
            flow: flow_rx,
        },
        ConsumerEnd {
            data: data_rx,
            flow: flow_tx,
        },
    )
}

impl<T> ProducerEnd<T> {
    /// Publishes one message, blocking until the consumer receives it.
    /// Fails if the consumer has closed.
    pub(crate) fn publish(&self, message: Message<T>) -> std::result::Result<(), ()> {
        self.data.send(message).map_err(|_| ())
    }

    /// Blocks until the consumer grants permission to compute the next value.
    /// Fails if the consumer has closed.
    pub(crate) fn await_token(&self) -> std::result::Result<(), ()> {
        self.flow.recv().map(|_| ()).map_err(|_| ())
    }
}

impl<T> ConsumerEnd<T> {
    /// Grants the producer permission to compute the next value.
    pub(crate) fn request(&self) -> bool {
        self.flow.send(FlowToken).is_ok()
    }

    /// Blocks for the producer's next message. `None` means the producer end
    /// is gone without a terminal message, which only happens on teardown.
    pub(crate) fn receive(&self) -> Option<Message<T>> {
        self.data.recv().ok()
    }
}
