#![allow(dead_code)]

use ats_client::{config::Config, AppState};
use axum::Router;
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{}/api", addr)
}

pub fn app_state(base_url: &str, token: Option<&str>) -> AppState {
    let mut config = Config::for_base_url(base_url).expect("config");
    config.api_token = token.map(str::to_string);
    AppState::new(&config).expect("app state")
}
