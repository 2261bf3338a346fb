pub mod memory;
pub mod noop;
