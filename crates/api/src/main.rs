#[tokio::main]
async fn main() {
    ledgerbook_observability::init();

    let app = ledgerbook_api::app::build_app()
        .await
        .expect("failed to build application");

    let addr = std::env::var("LEDGERBOOK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
