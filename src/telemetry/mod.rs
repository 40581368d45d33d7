pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn process() -> LogCtx<ops::process::Process> { LogCtx::new(config::logs_are_json()) }
pub fn rollup() -> LogCtx<ops::rollup::Rollup> { LogCtx::new(config::logs_are_json()) }
pub fn dispatch() -> LogCtx<ops::dispatch::Dispatch> { LogCtx::new(config::logs_are_json()) }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx::new(config::logs_are_json()) }
