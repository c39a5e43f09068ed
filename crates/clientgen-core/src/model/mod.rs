pub mod client;
pub mod definitions;
pub mod operations;
pub mod types;

pub use client::*;
pub use definitions::*;
pub use operations::*;
pub use types::*;
