use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::middleware::require_auth;
use crate::{AppState, analytics, auth, complaints, notifications, users};

/// Room for 5 evidence files of 10 MB plus multipart framing.
const MAX_UPLOAD_BODY: usize = 64 * 1024 * 1024;

/// Assemble the application router: `/api` routes plus read-only static
/// serving of the upload directory. CORS and tracing layers are applied by
/// the binary.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Public route; the handler requires a token unless is_anonymous=true,
        // which is only known once the form is parsed.
        .route(
            "/complaints",
            post(complaints::create_complaint).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route("/analytics/track/{tracking_code}", get(analytics::track_complaint))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/users/{id}/profile", put(users::update_profile))
        .route("/complaints", get(complaints::get_all_complaints))
        .route(
            "/complaints/{id}",
            get(complaints::get_complaint)
                .put(complaints::update_complaint)
                .delete(complaints::delete_complaint),
        )
        .route("/complaints/{id}/status", put(complaints::update_status))
        .route("/complaints/user/{id}", get(complaints::get_user_complaints))
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/{id}/read", put(notifications::mark_read))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/{id}", delete(notifications::delete))
        .route("/analytics/stats", get(analytics::get_stats))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    Router::new()
        .nest("/api", public.merge(protected))
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
}
