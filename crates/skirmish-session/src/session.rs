//! One connection's lifetime: handshake, receive loop, send loop,
//! teardown.

use std::fmt;
use std::sync::Arc;

use skirmish_game::{GameError, GameHandle, ListenerId};
use skirmish_map::PlayerNumber;
use skirmish_protocol::{Codec, Message, MessageContext, MessageKind};
use skirmish_transport::{Connection, ConnectionId};
use tokio::task::JoinHandle;

use crate::{OutboundQueue, OutboundReceiver, SessionConfig, SessionError, SessionListener, outbound_queue};

// ---------------------------------------------------------------------------
// HandshakeState
// ---------------------------------------------------------------------------

/// Whether a connection has a player number yet.
///
/// ```text
///   Pending ──(PlayerNumberRequest, number free)──→ Confirmed(n)
///      ↑  │
///      └──┘ (number taken: PlayerNumberTaken, try again)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Pending,
    Confirmed(PlayerNumber),
}

impl HandshakeState {
    pub fn player(self) -> Option<PlayerNumber> {
        match self {
            Self::Pending => None,
            Self::Confirmed(n) => Some(n),
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The server side of one client connection.
///
/// Build it with [`Session::new`] and drive it to completion with
/// [`Session::run`], normally inside its own Tokio task.
pub struct Session<C: Connection, K: Codec + Clone> {
    conn: Arc<C>,
    game: GameHandle,
    codec: K,
    config: SessionConfig,
    state: HandshakeState,
    listener: Option<ListenerId>,
    queue: Arc<OutboundQueue>,
    outbound: Option<OutboundReceiver>,
}

impl<C: Connection, K: Codec + Clone> Session<C, K> {
    pub fn new(conn: C, game: GameHandle, codec: K, config: SessionConfig) -> Self {
        let (queue, outbound) = outbound_queue();
        Self {
            conn: Arc::new(conn),
            game,
            codec,
            config,
            state: HandshakeState::Pending,
            listener: None,
            queue: Arc::new(queue),
            outbound: Some(outbound),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn.id()
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Runs the session until the client quits, the connection drops or
    /// the game goes away. Always tears down before returning: the
    /// player's slot and listener are released, queued messages are
    /// flushed, and the connection is closed.
    pub async fn run(mut self) -> Result<(), SessionError> {
        let conn_id = self.conn.id();
        tracing::debug!(%conn_id, "session started");

        let writer = self.outbound.take().map(|outbound| {
            tokio::spawn(send_loop(
                Arc::clone(&self.conn),
                self.codec.clone(),
                outbound,
                Arc::clone(&self.queue),
            ))
        });

        let result = self.receive_loop().await;
        self.teardown(writer).await;

        match &result {
            Ok(()) => tracing::info!(%conn_id, player = %self.state, "session ended"),
            Err(e) => tracing::info!(%conn_id, player = %self.state, error = %e, "session ended with error"),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Receive loop
    // -----------------------------------------------------------------------

    async fn receive_loop(&mut self) -> Result<(), SessionError> {
        let conn_id = self.conn.id();
        while let Some(frame) = self.next_frame().await? {
            let message: Message = match self.codec.decode(&frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "undecodable frame");
                    self.queue.push(Message::error(self.reply_context(), e.to_string()));
                    continue;
                }
            };
            tracing::trace!(%conn_id, %message, "received");

            if matches!(message.kind, MessageKind::Quit) {
                tracing::debug!(%conn_id, player = %self.state, "client quit");
                break;
            }

            match (self.state, self.listener) {
                // The reply comes back through our listener, in order
                // with the events.
                (HandshakeState::Confirmed(player), Some(listener)) => {
                    self.game.dispatch_to(player, listener, message).await?;
                }
                _ => self.handshake(message).await?,
            }
        }
        Ok(())
    }

    async fn next_frame(&self) -> Result<Option<Vec<u8>>, SessionError> {
        let recv = self.conn.recv();
        let result = match self.config.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, recv)
                .await
                .map_err(|_| SessionError::IdleTimeout(limit))?,
            None => recv.await,
        };
        result.map_err(SessionError::transport)
    }

    /// Handles one message while no player number is confirmed.
    async fn handshake(&mut self, message: Message) -> Result<(), SessionError> {
        let MessageKind::PlayerNumberRequest { number } = message.kind else {
            self.queue.push(Message::error(
                MessageContext::Broadcast,
                self.config.handshake_required_reason.clone(),
            ));
            return Ok(());
        };

        let listener = Arc::new(SessionListener::new(number, Arc::clone(&self.queue)));
        match self.game.join(number, listener).await {
            Ok(id) => {
                self.state = HandshakeState::Confirmed(number);
                self.listener = Some(id);
                tracing::info!(conn_id = %self.conn.id(), player = %number, "player number confirmed");
            }
            Err(GameError::PlayerPresent(_)) => {
                tracing::debug!(conn_id = %self.conn.id(), player = %number, "player number taken");
                self.queue
                    .push(Message::to(number, MessageKind::PlayerNumberTaken { number }));
            }
            Err(e @ GameError::InvalidPlayer(_)) => {
                tracing::debug!(conn_id = %self.conn.id(), player = %number, "player number refused");
                self.queue
                    .push(Message::error(MessageContext::Broadcast, e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn reply_context(&self) -> MessageContext {
        match self.state {
            HandshakeState::Pending => MessageContext::Broadcast,
            HandshakeState::Confirmed(n) => MessageContext::Player(n),
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    async fn teardown(&mut self, writer: Option<JoinHandle<Result<(), SessionError>>>) {
        let conn_id = self.conn.id();

        if let (HandshakeState::Confirmed(player), Some(listener)) = (self.state, self.listener.take()) {
            if let Err(e) = self.game.leave(player, listener).await {
                tracing::debug!(%conn_id, %player, error = %e, "leave failed");
            }
        }

        self.queue.stop();
        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(%conn_id, error = %e, "send loop failed"),
                Err(e) => tracing::warn!(%conn_id, error = %e, "send loop panicked"),
            }
        }

        if let Err(e) = self.conn.close().await {
            tracing::trace!(%conn_id, error = %e, "close failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Send loop
// ---------------------------------------------------------------------------

/// Pops one message per wakeup, expands batches and writes each part as
/// its own frame. Stops the queue if the connection fails so producers
/// stop piling up messages nobody will send.
async fn send_loop<C: Connection, K: Codec>(
    conn: Arc<C>,
    codec: K,
    mut outbound: OutboundReceiver,
    queue: Arc<OutboundQueue>,
) -> Result<(), SessionError> {
    while let Some(message) = outbound.pop().await {
        for part in message.flatten() {
            let sent = match codec.encode(&part) {
                Ok(bytes) => conn.send(&bytes).await.map_err(SessionError::transport),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = sent {
                queue.stop();
                return Err(e);
            }
        }
    }
    Ok(())
}
