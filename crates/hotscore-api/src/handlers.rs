//! Request handlers.

pub mod health;
pub mod page;
pub mod predict;

pub use health::*;
pub use page::*;
pub use predict::*;
