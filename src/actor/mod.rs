//! Actor System for Watch and Live Reload
//!
//! ```text
//! FsActor ──► Coordinator ──► pipeline tasks ──► WsActor
//! (notify)    (dispatch)      (transpile/inject)  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `coordinator` - Turns watch events into pipeline tasks
//! - `ws` - WebSocket client set and broadcast

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
