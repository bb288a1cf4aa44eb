//! Wiremock tests need a loopback listener; sandboxes without one skip them.

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a mock server, or returns `None` (with a note on stderr) when
/// loopback sockets cannot be bound.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl Future<Output = Option<MockServer>> {
    let caller = std::panic::Location::caller();
    let loopback_available = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if loopback_available {
            Some(MockServer::start().await)
        } else {
            eprintln!("skipping {caller}: cannot bind a loopback socket for wiremock");
            None
        }
    }
}
