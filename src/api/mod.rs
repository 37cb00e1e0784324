/// API error types and handling
pub mod errors;
/// Request body extractors
pub mod extract;
/// API module containing HTTP handlers, routes, server setup and error handling
pub mod handlers;
/// Routes configuration and setup
pub mod routes;
/// HTTP server implementation
pub mod server;
