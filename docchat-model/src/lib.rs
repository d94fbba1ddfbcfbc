//! # docchat-model
//!
//! Generation-service clients for docchat.
//!
//! ## Overview
//!
//! - [`CohereChatModel`] — Cohere v1 chat with streamed, grounded,
//!   citation-capable responses (feature `cohere`, on by default)
//! - [`MockChatModel`] — scripted model for tests; records every request
//!
//! Both implement [`docchat_core::ChatModel`] and produce the typed
//! [`docchat_core::ChatEvent`] stream consumed by `docchat-session`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docchat_model::CohereChatModel;
//!
//! let model = CohereChatModel::from_env()?;
//! let stream = model.stream_chat(request).await?;
//! ```

#[cfg(feature = "cohere")]
pub mod cohere;
pub mod mock;

#[cfg(feature = "cohere")]
pub use cohere::CohereChatModel;
pub use mock::MockChatModel;
