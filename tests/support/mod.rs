// One-time server bootstrap shared by all integration tests in a binary.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

/// Ensure the test server is running and return its base `ws://` URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);

        // A dedicated OS thread with its own runtime so the server outlives
        // individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // An ephemeral port avoids collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                arena_server::run(listener).await.expect("server failed");
            });
        });

        wait_for_readiness(published_addr);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(format!("ws://{addr}"));

    // Retry briefly to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
