pub mod server;
pub mod handlers;
pub mod models;

pub use server::{configure_routes, start_server, ApiConfig};
pub use handlers::*;
pub use models::*;
