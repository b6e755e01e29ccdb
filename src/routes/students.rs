use crate::{
    data::{IdForm, StudentForm},
    routes::index::render_app,
    state::RosterState,
};
use axum::{Form, extract::State};
use maud::Markup;

pub async fn internal_post_new_student(State(state): State<RosterState>) -> Markup {
    let mut controller = state.controller().await;
    controller.request_add();
    render_app(&controller)
}

pub async fn internal_post_view_students(State(state): State<RosterState>) -> Markup {
    let mut controller = state.controller().await;
    controller.view_students().await;
    render_app(&controller)
}

pub async fn internal_post_edit_student(
    State(state): State<RosterState>,
    Form(IdForm { id }): Form<IdForm>,
) -> Markup {
    let mut controller = state.controller().await;
    controller.request_edit(id);
    render_app(&controller)
}

pub async fn internal_post_delete_student(
    State(state): State<RosterState>,
    Form(IdForm { id }): Form<IdForm>,
) -> Markup {
    let mut controller = state.controller().await;
    controller.delete(id).await;
    render_app(&controller)
}

pub async fn internal_post_submit_student(
    State(state): State<RosterState>,
    Form(form): Form<StudentForm>,
) -> Markup {
    let mut controller = state.controller().await;
    controller.submit(form.into()).await;
    render_app(&controller)
}
