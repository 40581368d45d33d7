pub mod process;
pub mod rollup;
pub mod dispatch;
pub mod init;
