//! Shared setup for the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;

use mock_server::Credentials;

/// Start the mock server on a random port and return its address.
pub fn start_server(credentials: Credentials) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, credentials).await
        })
        .unwrap();
    });

    addr
}

/// Route `tracing` output through the test harness. `RUST_LOG` controls
/// verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
