//! # Control Server
//!
//! HTTP control connection for test drivers, and the coordination service
//! for segments in other processes. The server owns the one registry;
//! workers reach it through `remote::RemoteRegistry`.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/faults` - Status report for every armed fault
//! - `/faults/inject` - Arm, reset, resume, wait on or query a fault
//! - `/faults/{name}` - Current kind of one fault
//! - `/faults/{name}/completed` - Completion check, removes finished entries
//! - `/segments/trigger` - Match and count one call-site evaluation

pub mod config;
pub mod fault_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
