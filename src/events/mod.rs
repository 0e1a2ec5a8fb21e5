//! Status events and the publishing seam.
//!
//! Executors report progress through a [`NodeEmitter`], which stamps each
//! [`ExecutionEvent`] with node/job/channel metadata and forwards it to an
//! injected [`Publisher`]. The engine depends only on the `Publisher` trait,
//! never on a concrete transport, so an in-memory publisher for tests and a
//! channel-backed publisher feeding a live relay are interchangeable.

pub mod emitter;
pub mod event;
pub mod publisher;

pub use emitter::NodeEmitter;
pub use event::{EventStatus, ExecutionEvent};
pub use publisher::{ChannelPublisher, MemoryPublisher, PublishError, Publisher, StdOutPublisher};
