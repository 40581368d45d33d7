pub mod dispatch;
pub mod keys;
pub mod process;
pub mod rollup;
pub mod types;
