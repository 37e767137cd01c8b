pub mod app_state;
pub mod config;
pub mod upstream;
pub mod video_id;

mod middleware;
mod routes;

use axum::Router;
use axum::extract::Extension;
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

//
// Re-export
//
pub use app_state::AppState;
pub use config::Config;
pub use upstream::{Conversion, ScrapedPage, UpstreamClient, UpstreamError};
pub use video_id::{VIDEO_ID_LEN, VideoId, extract as extract_video_id};

/// Owned gateway server with an explicit bind/serve lifecycle.
///
/// Binding and serving are split so callers (tests included) can learn
/// the bound address before any request is accepted.
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Assemble the router and bind the listening socket.
    pub async fn bind(config: &Config) -> anyhow::Result<Self> {
        let state = AppState::new(config);

        // CORS layer
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = Router::new()
            .route("/api/download", get(routes::download))
            .layer(axum::middleware::from_fn(middleware::log_request_outcome))
            .layer(cors)
            .layer(Extension(state));

        let addr = format!("0.0.0.0:{}", config.listen_on_port);
        let listener = TcpListener::bind(&addr).await?;

        Ok(Self { listener, router })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the surrounding task is stopped.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.listener.local_addr()?;
        info!("Gateway listening on http://{addr}");
        info!("Usage: http://{addr}/api/download?url=<YOUTUBE_VIDEO_URL>");

        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
