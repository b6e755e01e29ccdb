use crate::{auth::gateway::SignInCallback, error::RosterResult, state::RosterState};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Redirect,
};

pub async fn post_sign_in(State(state): State<RosterState>) -> RosterResult<Redirect> {
    let callback = state.config().callback_url()?;
    let mut controller = state.controller().await;

    Ok(match controller.begin_sign_in(&callback) {
        Some(provider_url) => Redirect::to(provider_url.as_str()),
        None => Redirect::to("/"),
    })
}

/// Where the identity provider sends the browser back to. Anything other than a
/// well-formed success just lands back on the page, still signed out.
pub async fn get_auth_callback(
    State(state): State<RosterState>,
    callback: Result<Query<SignInCallback>, QueryRejection>,
) -> Redirect {
    match callback {
        Ok(Query(callback)) => state.controller().await.complete_sign_in(callback).await,
        Err(e) => warn!(?e, "Identity provider came back without a usable delegation"),
    }

    Redirect::to("/")
}

pub async fn post_sign_out(State(state): State<RosterState>) -> Redirect {
    state.controller().await.sign_out().await;
    Redirect::to("/")
}
