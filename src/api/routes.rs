use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::require_admin;
use crate::content::Content;
use crate::storage::models::{
    Event, Feedback, GalleryItem, ParticularService, Partner, ProfessionalService, Sponsor,
};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_size();

    let public = Router::new()
        .merge(public_content::<Event>("/events"))
        .merge(public_content::<GalleryItem>("/gallery"))
        .merge(public_content::<Sponsor>("/sponsors"))
        .merge(public_content::<Partner>("/partners"))
        .merge(public_content::<ProfessionalService>("/professional-services"))
        .merge(public_content::<ParticularService>("/particular-services"))
        // Feedback
        .route(
            "/feedback",
            get(handlers::list_published::<Feedback>).post(handlers::submit_feedback),
        )
        .route("/feedback/:id", get(handlers::get_published::<Feedback>))
        // Contact form
        .route("/objects", get(handlers::list_subjects))
        .route("/contacts", post(handlers::submit_contact))
        // Sessions
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout));

    let admin = Router::new()
        .merge(admin_content::<Event>("/events"))
        .merge(admin_content::<GalleryItem>("/gallery"))
        .merge(admin_content::<Sponsor>("/sponsors"))
        .merge(admin_content::<Partner>("/partners"))
        .merge(admin_content::<ProfessionalService>("/professional-services"))
        .merge(admin_content::<ParticularService>("/particular-services"))
        .merge(admin_content::<Feedback>("/feedback"))
        // Contacts
        .route("/contacts", get(handlers::list_contacts))
        .route(
            "/contacts/:id",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .route(
            "/contacts/:id/toggle-status",
            patch(handlers::toggle_contact_status),
        )
        // Contact subjects
        .route(
            "/objects",
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route(
            "/objects/:id",
            get(handlers::get_subject)
                .put(handlers::update_subject)
                .delete(handlers::delete_subject),
        )
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/users/:id/change-password",
            patch(handlers::change_password),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_admin,
        ));

    Router::new()
        .nest("/api", public.nest("/admin", admin))
        // Uploaded images
        .route("/uploads/:category/:file", get(handlers::serve_upload))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config.server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET <base>` and `GET <base>/:id`, published records only.
fn public_content<T: Content>(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(base, get(handlers::list_published::<T>))
        .route(&format!("{base}/:id"), get(handlers::get_published::<T>))
}

/// Full CRUD plus the publish toggle.
fn admin_content<T: Content>(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            base,
            get(handlers::list_content::<T>).post(handlers::create_content::<T>),
        )
        .route(
            &format!("{base}/:id"),
            get(handlers::get_content::<T>)
                .put(handlers::update_content::<T>)
                .delete(handlers::delete_content::<T>),
        )
        .route(
            &format!("{base}/:id/toggle-publish"),
            patch(handlers::toggle_publish::<T>),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
