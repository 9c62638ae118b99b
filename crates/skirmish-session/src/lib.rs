//! Connection sessions for Skirmish.
//!
//! One [`Session`] runs per accepted connection. It owns:
//!
//! 1. **Handshake state**: a connection starts [`HandshakeState::Pending`]
//!    and becomes `Confirmed(n)` once it has claimed a free player number.
//! 2. **A receive loop**: decodes frames and hands commands to the game
//!    under the confirmed number.
//! 3. **A send loop**: drains the connection's [`OutboundQueue`],
//!    expanding batches, and writes each message as one frame.
//!
//! ```text
//! Game (above)      ← commands in, listener events out
//!     ↕
//! Session (this)    ← player identity per connection
//!     ↕
//! Transport (below) ← frames
//! ```

mod config;
mod error;
mod listener;
mod queue;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use listener::SessionListener;
pub use queue::{OutboundQueue, OutboundReceiver, outbound_queue};
pub use session::{HandshakeState, Session};
