//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the given default level applies with
//! the HTTP/WS transport crates held at `info`.

use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn setup_logging(default_level: &str, json_format: bool) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|spec| EnvFilter::from_str(&spec).ok())
        .unwrap_or_else(|| {
            let spec = format!(
                "{},hyper=info,hyper_util=info,reqwest=info,tokio_tungstenite=info,alloy_transport_ws=info,alloy_pubsub=info",
                default_level.trim()
            );
            EnvFilter::from_str(&spec).unwrap_or_else(|_| EnvFilter::new("info"))
        });
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        subscriber
            .with(fmt::layer().json().with_target(false).with_current_span(false))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(false).compact()).init();
    }
}
