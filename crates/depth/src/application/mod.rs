mod buffer;
mod coordinator;
mod dispatch;
mod watchdog;

pub use buffer::DepthBuffer;
