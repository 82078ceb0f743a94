//! aegis-ws: Client-facing WebSocket layer for Aegis Gateway
//!
//! Accepts emergency-session WebSocket connections, classifies client
//! frames into per-modality input channels, relays upstream events back
//! in order, and guarantees a fallback package reaches the client
//! whenever the upstream session cannot serve.

pub mod bridge;
pub mod controller;
pub mod error;
pub mod handler;
pub mod message;
pub mod relay;
pub mod server;

pub use bridge::ClientBridge;
pub use controller::{FailoverController, SessionState};
pub use error::{Result, WsError};
pub use handler::websocket_handler;
pub use message::{ClientEvent, Outbound};
pub use relay::{OutputRelay, SessionNotice};
pub use server::{start_ws_server, WsServerBuilder, WsState};
