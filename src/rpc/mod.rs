/// JSON-RPC front end
///
/// This module turns request lines on stdin into session events and
/// writes one response line per request to stdout.

pub mod protocol;
pub mod server;

// Re-export main types
pub use server::RpcServer;
