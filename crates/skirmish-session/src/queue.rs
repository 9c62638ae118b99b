//! The per-connection outbound FIFO.
//!
//! Producers (the game's listener callbacks and the receive loop) push
//! without ever blocking. The send loop is the single consumer and waits
//! in [`OutboundReceiver::pop`].
//!
//! [`OutboundQueue::stop`] drops the only sender, so the consumer drains
//! whatever was already queued and then sees `None`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use skirmish_protocol::Message;
use tokio::sync::mpsc;

/// The producer side. Share it behind an `Arc`.
#[derive(Debug)]
pub struct OutboundQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

/// The consumer side, owned by the send loop.
#[derive(Debug)]
pub struct OutboundReceiver {
    receiver: mpsc::UnboundedReceiver<Message>,
}

/// Creates a connected queue/receiver pair.
pub fn outbound_queue() -> (OutboundQueue, OutboundReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        OutboundQueue {
            sender: Mutex::new(Some(tx)),
        },
        OutboundReceiver { receiver: rx },
    )
}

impl OutboundQueue {
    fn sender(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<Message>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `message`. Returns `false` if the queue has been stopped
    /// or the receiver is gone.
    pub fn push(&self, message: Message) -> bool {
        match self.sender().as_ref() {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }

    /// Refuses further pushes. Messages already queued are still
    /// delivered, then the receiver reports end of stream.
    pub fn stop(&self) {
        self.sender().take();
    }

    pub fn is_stopped(&self) -> bool {
        self.sender().is_none()
    }
}

impl OutboundReceiver {
    /// Waits for the next message. `None` once the queue is stopped and
    /// drained.
    pub async fn pop(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use skirmish_protocol::{MessageKind, PlayerNumber};

    use super::*;

    fn msg(n: i32) -> Message {
        Message::to(
            PlayerNumber(n),
            MessageKind::TurnEnded {
                next: PlayerNumber(n),
            },
        )
    }

    #[tokio::test]
    async fn test_queue_is_fifo() {
        let (queue, mut rx) = outbound_queue();
        for n in 0..5 {
            assert!(queue.push(msg(n)));
        }
        for n in 0..5 {
            assert_eq!(rx.pop().await, Some(msg(n)));
        }
    }

    #[tokio::test]
    async fn test_stop_drains_then_ends() {
        let (queue, mut rx) = outbound_queue();
        queue.push(msg(1));
        queue.push(msg(2));
        queue.stop();

        assert!(queue.is_stopped());
        assert!(!queue.push(msg(3)));
        assert_eq!(rx.pop().await, Some(msg(1)));
        assert_eq!(rx.pop().await, Some(msg(2)));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_later_push() {
        let (queue, mut rx) = outbound_queue();
        let queue = Arc::new(queue);
        let waiter = tokio::spawn(async move { rx.pop().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(msg(7));

        let got = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("pop should wake up")
            .unwrap();
        assert_eq!(got, Some(msg(7)));
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped_is_refused() {
        let (queue, rx) = outbound_queue();
        drop(rx);
        assert!(!queue.push(msg(1)));
    }
}
