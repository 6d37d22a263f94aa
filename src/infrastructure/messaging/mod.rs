pub mod memory;
pub mod sql_broker;

pub use memory::*;
pub use sql_broker::*;
