//! HTML front end serving random verses over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use randverse_core::VersePicker;
use tracing::info;

pub mod error;
pub mod html;
pub mod routes;

pub use error::WebError;
pub use routes::build_router;

/// Shared, read-only request state plus the seed source for per-request
/// generators.
pub struct AppState {
    pub picker: VersePicker,
    pub rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(picker: VersePicker) -> Self {
        Self::with_rng(picker, StdRng::from_entropy())
    }

    pub fn with_rng(picker: VersePicker, rng: StdRng) -> Self {
        Self {
            picker,
            rng: Mutex::new(rng),
        }
    }
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(address = %local, "listening on http://localhost:{}/?narrow=nt", local.port());
    axum::serve(listener, app).await
}
