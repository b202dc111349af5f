pub mod lifecycle;
pub mod request_id;
pub mod router;
pub mod routes;

pub use lifecycle::{Acceptor, HttpServer, ServerHandle, ServerState};
pub use request_id::RequestId;
pub use router::{AppState, app_router};
