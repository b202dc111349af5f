use crate::server::request_id::assign_request_id;
use crate::server::routes::users;
use crate::service::UserService;

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
};
use std::{sync::Arc, time::Duration, time::Instant};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn method_not_allowed_handler() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

/// Access log: a start line before the handler and a completion line with the elapsed time
/// after it. Fallback answers (404, 405) are logged too.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    info!("Started {} {}", method.as_str(), path);
    let start = Instant::now();
    let resp = next.run(req).await;
    let elapsed = start.elapsed();

    let status = resp.status();
    if status.is_server_error() {
        error!(status = status.as_u16(), "Completed {} in {:?}", path, elapsed);
    } else if status.is_client_error() {
        warn!(status = status.as_u16(), "Completed {} in {:?}", path, elapsed);
    } else {
        info!(status = status.as_u16(), "Completed {} in {:?}", path, elapsed);
    }

    resp
}

/// Full application router.
///
/// Layer order, outermost first: request id, request deadline, access log, routing.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(users::router())
        .method_not_allowed_fallback(method_not_allowed_handler)
        .fallback(not_found_handler)
        .layer(middleware::from_fn(access_log))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(assign_request_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, User};
    use crate::error::StoreError;
    use async_trait::async_trait;
    use axum::body::Body;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    /// Routing-only tests never reach the service.
    struct NoService;

    #[async_trait]
    impl UserService for NoService {
        async fn get_users(&self, _offset: u32, _limit: u32) -> Result<Vec<User>, StoreError> {
            unreachable!("service must not be called")
        }

        async fn get_user_by_id(&self, _id: i64) -> Result<User, StoreError> {
            unreachable!("service must not be called")
        }

        async fn save_user(&self, _user: NewUser) -> Result<i64, StoreError> {
            unreachable!("service must not be called")
        }

        async fn update_user(&self, _user: User) -> Result<(), StoreError> {
            unreachable!("service must not be called")
        }

        async fn delete_user(&self, _id: i64) -> Result<(), StoreError> {
            unreachable!("service must not be called")
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("capture lock poisoned")).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("capture lock poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn fallback_answers_are_access_logged() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = app_router(AppState::new(Arc::new(NoService)), Duration::from_secs(5));
        for (method, uri, status) in [
            ("PUT", "/api/v1/users", StatusCode::METHOD_NOT_ALLOWED),
            ("GET", "/api/v1/nowhere", StatusCode::NOT_FOUND),
        ] {
            let resp = app
                .clone()
                .oneshot(
                    axum::http::Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .expect("failed to build request"),
                )
                .await
                .expect("request failed");
            assert_eq!(resp.status(), status);
        }

        let logs = captured.text();
        assert!(logs.contains("Started PUT /api/v1/users"), "{logs}");
        assert!(logs.contains("Completed /api/v1/users in"), "{logs}");
        assert!(logs.contains("Started GET /api/v1/nowhere"), "{logs}");
    }
}
