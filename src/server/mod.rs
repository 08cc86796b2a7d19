use std::sync::Arc;

use tracing::info;

use crate::dashboard::Dashboard;

pub mod api;
pub mod page;
pub mod routes;

/// Serve the dashboard until the process is stopped. Blocks the calling thread.
pub fn run_server(bind_addr: &str, dashboard: Arc<Dashboard>) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        info!("covid-tracker listening on http://{}", listener.local_addr()?);
        axum::serve(listener, routes::router(dashboard)).await
    })
}
