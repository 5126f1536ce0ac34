//! The elementary arithmetic provider, served over stdio.

use std::process::exit;

use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Stdout carries the wire protocol, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opset = abacus_providers::elementary::ops();
    if let Err(err) = abacus_rpc::serve_stdio(&opset).await {
        eprintln!("channel failure: {err}");
        exit(1);
    }
}
