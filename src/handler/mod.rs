pub mod config;
pub mod core;

pub use self::config::HandlerConfig;
pub use self::core::CausallyOrderedMsgHandler;
