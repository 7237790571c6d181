//! Synchronous HTTP dispatch engine library

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod interceptor;
pub mod routing;
pub mod server;
pub mod session;
pub mod template;

pub use config::EngineConfig;
pub use error::{DispatchError, DispatchResult};
pub use gateway::{Gateway, GatewayBuilder, RequestContext};
pub use server::DevServer;
