use axum::Router;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_fake_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake server listener");
    let addr = listener.local_addr().expect("fake server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}
