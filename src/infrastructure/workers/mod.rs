pub mod consumer;
pub mod retry;

pub use consumer::*;
pub use retry::*;
