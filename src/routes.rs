use crate::{
    routes::{
        index::get_index_route,
        session::{get_auth_callback, post_sign_in, post_sign_out},
        students::{
            internal_post_delete_student, internal_post_edit_student, internal_post_new_student,
            internal_post_submit_student, internal_post_view_students,
        },
    },
    state::RosterState,
};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub mod index;
pub mod session;
pub mod students;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/sign_in", post(post_sign_in))
        .route("/sign_out", post(post_sign_out))
        .route("/auth/callback", get(get_auth_callback))
        .route("/internal/students/new", post(internal_post_new_student))
        .route("/internal/students/view", post(internal_post_view_students))
        .route("/internal/students/edit", post(internal_post_edit_student))
        .route(
            "/internal/students/delete",
            post(internal_post_delete_student),
        )
        .route(
            "/internal/students/submit",
            post(internal_post_submit_student),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
