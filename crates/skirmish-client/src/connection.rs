//! Drives a [`ClientMirror`] over a live connection.
//!
//! Two tasks per connection, like the server's sessions: a reader that
//! decodes frames, applies them to the mirror and queues the mirror's
//! replies, and a writer that sends queued messages in order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skirmish_protocol::{Codec, Message};
use skirmish_transport::{Connection, ConnectionId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{ClientError, ClientMirror};

/// A running client.
///
/// Every server message is applied to the mirror first and then handed
/// to the application through [`next_event`](Self::next_event).
pub struct ClientConnection<C: Connection> {
    conn: Arc<C>,
    mirror: Arc<Mutex<ClientMirror>>,
    outgoing: Option<mpsc::UnboundedSender<Message>>,
    events: mpsc::UnboundedReceiver<Message>,
    reader: JoinHandle<Result<(), ClientError>>,
    writer: JoinHandle<Result<(), ClientError>>,
}

impl<C: Connection> ClientConnection<C> {
    /// Starts the reader and writer tasks and sends the mirror's opening
    /// player-number request.
    pub fn start<K: Codec + Clone>(conn: C, codec: K, mirror: ClientMirror) -> Self {
        let conn = Arc::new(conn);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        // Queued before the writer starts, so it is always the first frame.
        let _ = out_tx.send(mirror.start());
        let mirror = Arc::new(Mutex::new(mirror));

        let writer = tokio::spawn(write_loop(Arc::clone(&conn), codec.clone(), out_rx));
        let reader = tokio::spawn(read_loop(
            Arc::clone(&conn),
            codec,
            Arc::clone(&mirror),
            out_tx.clone(),
            event_tx,
        ));

        Self {
            conn,
            mirror,
            outgoing: Some(out_tx),
            events: event_rx,
            reader,
            writer,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Locks the mirror for inspection or local changes such as orders.
    pub fn mirror(&self) -> MutexGuard<'_, ClientMirror> {
        lock(&self.mirror)
    }

    /// Queues `message` for sending.
    pub fn send(&self, message: Message) -> Result<(), ClientError> {
        let tx = self.outgoing.as_ref().ok_or(ClientError::Closed)?;
        tx.send(message).map_err(|_| ClientError::Closed)
    }

    /// Runs `act` against the mirror and sends whatever it returns, e.g.
    /// `conn.act(|m| m.transmit_orders())`.
    pub fn act<I>(&self, act: impl FnOnce(&mut ClientMirror) -> I) -> Result<(), ClientError>
    where
        I: IntoIterator<Item = Message>,
    {
        let messages: Vec<Message> = act(&mut self.mirror()).into_iter().collect();
        for message in messages {
            self.send(message)?;
        }
        Ok(())
    }

    /// The next server message, after it has been applied to the mirror.
    /// `None` once the server side has closed.
    pub async fn next_event(&mut self) -> Option<Message> {
        self.events.recv().await
    }

    /// Sends `Quit`, flushes everything queued, and closes the
    /// connection.
    pub async fn quit(mut self) -> Result<(), ClientError> {
        let quit = self.mirror().quit();
        self.send(quit)?;
        self.outgoing.take();
        // The reader holds a sender too; stop it so the writer can drain.
        self.reader.abort();

        match self.writer.await {
            Ok(result) => result?,
            Err(e) => tracing::warn!(error = %e, "client writer panicked"),
        }
        // The server usually hangs up on Quit first.
        if let Err(e) = self.conn.close().await {
            tracing::debug!(conn_id = %self.conn.id(), error = %e, "close after quit");
        }
        Ok(())
    }
}

fn lock(mirror: &Mutex<ClientMirror>) -> MutexGuard<'_, ClientMirror> {
    mirror.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn read_loop<C: Connection, K: Codec>(
    conn: Arc<C>,
    codec: K,
    mirror: Arc<Mutex<ClientMirror>>,
    outgoing: mpsc::UnboundedSender<Message>,
    events: mpsc::UnboundedSender<Message>,
) -> Result<(), ClientError> {
    let conn_id = conn.id();
    while let Some(frame) = conn.recv().await.map_err(ClientError::transport)? {
        let message: Message = match codec.decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "undecodable frame from server");
                continue;
            }
        };
        tracing::trace!(%conn_id, %message, "received");

        let replies = lock(&mirror).handle(message.clone());
        for reply in replies {
            if outgoing.send(reply).is_err() {
                return Err(ClientError::Closed);
            }
        }
        // The application may not be listening; that's fine.
        let _ = events.send(message);
    }
    tracing::debug!(%conn_id, "server closed the connection");
    Ok(())
}

async fn write_loop<C: Connection, K: Codec>(
    conn: Arc<C>,
    codec: K,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
) -> Result<(), ClientError> {
    while let Some(message) = outgoing.recv().await {
        for part in message.flatten() {
            let bytes = codec.encode(&part)?;
            conn.send(&bytes).await.map_err(ClientError::transport)?;
        }
    }
    Ok(())
}
