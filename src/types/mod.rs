//! Core types for promptgraph.

pub mod attachment;
pub mod content;
pub mod message;

pub use attachment::*;
pub use content::*;
pub use message::*;
