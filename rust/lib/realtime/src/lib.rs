//! Realtime order notifications for the storefront.
//!
//! - [`stomp`]: STOMP 1.2 frame codec.
//! - [`channel`]: WebSocket session with topic subscriptions, heart-beats
//!   and reconnection.
//! - [`feed`]: paged notification list that also absorbs pushed events.

pub mod api;
pub mod channel;
pub mod feed;
pub mod model;
pub mod stomp;

pub use api::NotificationApi;
pub use channel::{ChannelConfig, ChannelError, NotificationChannel};
pub use feed::{NotificationFeed, NotificationSource, PageCursor};
pub use model::Notification;
pub use stomp::{Command, Frame, FrameDecoder, HeartBeat, Inbound, StompError};
