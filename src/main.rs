use arena_server::frameworks::server;

#[tokio::main]
async fn main() {
    if let Err(e) = server::run_with_config().await {
        eprintln!("server failed: {e}");
        std::process::exit(1);
    }
}
