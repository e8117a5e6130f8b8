//! HTTP gateway for the read-aloud synthesis core.

mod routes;
mod server;
mod state;

pub use server::start_gateway;
pub use state::GatewayState;
