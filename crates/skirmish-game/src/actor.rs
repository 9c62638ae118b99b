//! Game actor: a Tokio task that owns the [`GameServer`].
//!
//! Connection tasks never touch the game directly. They send a
//! `GameCommand` through a [`GameHandle`] and, when they need an
//! answer, wait for it on a oneshot channel. This is the actor model:
//! the game state has exactly one owner, so there is no lock around it
//! and every operation (including listener registration) is applied one
//! at a time, in arrival order.
//!
//! ## Ordering toward a connection
//!
//! A connection hears from the game two ways: listener events caused by
//! anyone's command, and replies to its own commands. Both are delivered
//! from inside the actor through the connection's listener
//! ([`MapUpdateListener::reply`] for replies), so each connection sees
//! them in exactly the order the game applied them. Returning a reply
//! through the oneshot instead would let another command's event slip in
//! ahead of it while the reply is in flight.

use std::sync::Arc;

use skirmish_map::{Board, PlayerNumber, Point, TileType};
use skirmish_protocol::{Message, MessageKind};
use tokio::sync::{mpsc, oneshot};

use crate::{GameConfig, GameError, GameServer, ListenerId, MapUpdateListener, dispatch};

/// Commands sent to the game actor through its channel.
///
/// Variants with a `reply` field carry a oneshot "reply channel": the
/// caller sends the command and waits on the other end.
enum GameCommand {
    /// Take a turn-queue slot and register the player's listener, both or
    /// neither. On success the listener's first message is the
    /// `Acknowledged`.
    Join {
        player: PlayerNumber,
        listener: Arc<dyn MapUpdateListener>,
        reply: oneshot::Sender<Result<ListenerId, GameError>>,
    },

    /// Drop the listener and the turn-queue slot.
    Leave {
        player: PlayerNumber,
        listener: ListenerId,
        reply: oneshot::Sender<()>,
    },

    /// Run a command and return the reply to the caller.
    Dispatch {
        player: PlayerNumber,
        message: Message,
        reply: oneshot::Sender<Message>,
    },

    /// Run a command and hand the reply to `listener`, in order with its
    /// events. `done` fires once the reply has been delivered.
    DispatchTo {
        player: PlayerNumber,
        listener: ListenerId,
        message: Message,
        done: oneshot::Sender<()>,
    },

    CurrentPlayer {
        reply: oneshot::Sender<Option<PlayerNumber>>,
    },

    View {
        player: PlayerNumber,
        reply: oneshot::Sender<Board>,
    },

    SetTerrain {
        point: Point,
        tile: TileType,
        reply: oneshot::Sender<()>,
    },

    Shutdown,
}

/// Handle to a running game actor.
///
/// Cloning is cheap (it clones an `mpsc::Sender`); every connection task
/// holds one. All methods fail with `GameError::Unavailable` once the
/// actor has stopped.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> GameCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)
    }

    /// Adds `player` to the turn order and registers `listener` for them
    /// in one step. The listener receives `Acknowledged` through
    /// [`MapUpdateListener::reply`] before any event.
    ///
    /// # Errors
    /// `GameError::InvalidPlayer` for a negative number,
    /// `GameError::PlayerPresent` if the number is taken (nothing is
    /// registered in either case), `GameError::Unavailable` if the actor
    /// has stopped.
    pub async fn join(
        &self,
        player: PlayerNumber,
        listener: Arc<dyn MapUpdateListener>,
    ) -> Result<ListenerId, GameError> {
        self.request(|reply| GameCommand::Join {
            player,
            listener,
            reply,
        })
        .await?
    }

    /// Removes `listener` and `player`'s turn-queue slot.
    pub async fn leave(&self, player: PlayerNumber, listener: ListenerId) -> Result<(), GameError> {
        self.request(|reply| GameCommand::Leave {
            player,
            listener,
            reply,
        })
        .await
    }

    /// Runs `message` through the dispatcher as `player` and returns the
    /// reply to the caller.
    ///
    /// Connections should use [`dispatch_to`](Self::dispatch_to) so the
    /// reply stays in order with their events.
    pub async fn dispatch(&self, player: PlayerNumber, message: Message) -> Result<Message, GameError> {
        self.request(|reply| GameCommand::Dispatch {
            player,
            message,
            reply,
        })
        .await
    }

    /// Runs `message` through the dispatcher as `player` and delivers the
    /// reply to `listener` from inside the actor, before any later event.
    /// Returns once the reply has been handed over.
    pub async fn dispatch_to(
        &self,
        player: PlayerNumber,
        listener: ListenerId,
        message: Message,
    ) -> Result<(), GameError> {
        self.request(|done| GameCommand::DispatchTo {
            player,
            listener,
            message,
            done,
        })
        .await
    }

    pub async fn current_player(&self) -> Result<Option<PlayerNumber>, GameError> {
        self.request(|reply| GameCommand::CurrentPlayer { reply }).await
    }

    /// The board as `player` may see it.
    pub async fn view(&self, player: PlayerNumber) -> Result<Board, GameError> {
        self.request(|reply| GameCommand::View { player, reply }).await
    }

    pub async fn set_terrain(&self, point: Point, tile: TileType) -> Result<(), GameError> {
        self.request(|reply| GameCommand::SetTerrain { point, tile, reply })
            .await
    }

    /// Tells the actor to stop. Commands already queued ahead of this one
    /// are still processed.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

/// The actor side: owns the game and drains the command channel.
///
/// `run` is the whole event loop. It ends on `Shutdown` or when every
/// `GameHandle` has been dropped (the channel closes).
struct GameActor {
    game: GameServer,
    receiver: mpsc::Receiver<GameCommand>,
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(points = self.game.board().len(), "game actor started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                GameCommand::Join {
                    player,
                    listener,
                    reply,
                } => {
                    let result = self.game.join(player).map(|()| {
                        listener.reply(Message::to(player, MessageKind::Acknowledged));
                        self.game.add_listener(listener)
                    });
                    let _ = reply.send(result);
                }
                GameCommand::Leave {
                    player,
                    listener,
                    reply,
                } => {
                    self.game.remove_listener(listener);
                    self.game.leave(player);
                    let _ = reply.send(());
                }
                GameCommand::Dispatch {
                    player,
                    message,
                    reply,
                } => {
                    let _ = reply.send(dispatch(&mut self.game, player, message));
                }
                GameCommand::DispatchTo {
                    player,
                    listener,
                    message,
                    done,
                } => {
                    let reply = dispatch(&mut self.game, player, message);
                    if !self.game.reply_to(listener, reply) {
                        tracing::warn!(%player, %listener, "reply for unknown listener dropped");
                    }
                    let _ = done.send(());
                }
                GameCommand::CurrentPlayer { reply } => {
                    let _ = reply.send(self.game.current_player());
                }
                GameCommand::View { player, reply } => {
                    let _ = reply.send(self.game.derive_view(player));
                }
                GameCommand::SetTerrain { point, tile, reply } => {
                    self.game.set_terrain(point, tile);
                    let _ = reply.send(());
                }
                GameCommand::Shutdown => {
                    tracing::info!("game shutting down");
                    break;
                }
            }
        }

        tracing::info!("game actor stopped");
    }
}

/// Spawns the game actor and returns a handle to it.
///
/// `config.command_channel_size` bounds the command queue; when it is
/// full, callers wait.
pub fn spawn_game(game: GameServer, config: &GameConfig) -> GameHandle {
    let (tx, rx) = mpsc::channel(config.command_channel_size.max(1));
    let actor = GameActor { game, receiver: rx };
    tokio::spawn(actor.run());
    GameHandle { sender: tx }
}
