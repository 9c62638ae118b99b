//! In-process connection pair.
//!
//! [`memory_pair`] returns two connections wired back to back: whatever
//! one side sends, the other receives. Closing either side ends the
//! peer's stream with a clean close. Used by the session, game and client
//! tests to exercise the real receive/send loops without sockets.

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, TransportError};

/// One end of an in-memory connection pair.
pub struct MemoryConnection {
    id: ConnectionId,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    incoming: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

/// Creates two connected [`MemoryConnection`]s.
pub fn memory_pair() -> (MemoryConnection, MemoryConnection) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    let a = MemoryConnection {
        id: ConnectionId::next(),
        outgoing: Mutex::new(Some(a_tx)),
        incoming: Mutex::new(b_rx),
    };
    let b = MemoryConnection {
        id: ConnectionId::next(),
        outgoing: Mutex::new(Some(b_tx)),
        incoming: Mutex::new(a_rx),
    };
    (a, b)
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let outgoing = self.outgoing.lock().await;
        let Some(tx) = outgoing.as_ref() else {
            return Err(TransportError::ConnectionClosed("closed locally".into()));
        };
        tx.send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.incoming.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.outgoing.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pair_delivers_both_ways() {
        let (a, b) = memory_pair();
        a.send(b"ping").await.unwrap();
        b.send(b"pong").await.unwrap();
        assert_eq!(b.recv().await.unwrap(), Some(b"ping".to_vec()));
        assert_eq!(a.recv().await.unwrap(), Some(b"pong".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_close_ends_peer_stream() {
        let (a, b) = memory_pair();
        a.send(b"last").await.unwrap();
        a.close().await.unwrap();

        assert_eq!(b.recv().await.unwrap(), Some(b"last".to_vec()));
        assert_eq!(b.recv().await.unwrap(), None);
        assert!(a.send(b"more").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_send_to_dropped_peer_fails() {
        let (a, b) = memory_pair();
        drop(b);
        assert!(matches!(
            a.send(b"hello").await,
            Err(TransportError::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_pair_ids_differ() {
        let (a, b) = memory_pair();
        assert_ne!(a.id(), b.id());
    }
}
