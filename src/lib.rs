pub mod bot;
pub mod config;
pub mod dispatch;
pub mod log;
pub mod report;
pub mod session;
pub mod weather;
