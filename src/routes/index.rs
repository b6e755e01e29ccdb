use crate::{
    controller::ViewController,
    data::student::School,
    maud_conveniences::{
        alert, form_element, form_submit_button, simple_form_element, subtitle, title,
    },
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    let controller = state.controller().await;

    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-2xl w-full" id="app" {
            (render_app(&controller))
        }
    })
}

const BUTTON: &str = "bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded";

/// Everything inside `#app`. htmx actions swap this back in after each call.
pub fn render_app(controller: &ViewController) -> Markup {
    html! {
        (title("Student Roster"))

        @if let Some(notice) = controller.notice() {
            (alert("Something went wrong:", notice))
        }

        @if controller.is_signed_in() {
            p class="mb-4" {
                "Welcome back, "
                @match controller.principal() {
                    Some(principal) => (principal),
                    None => "User",
                }
                "!"
            }

            div class="flex flex-row space-x-4 mb-6" {
                form method="post" action="/sign_out" {
                    button type="submit" class=(BUTTON) {"Sign Out"}
                }
                button class=(BUTTON) hx-post="/internal/students/new" hx-target="#app" {
                    "Add New Student"
                }
                button class=(BUTTON) hx-post="/internal/students/view" hx-target="#app" {
                    "View Students"
                }
            }

            (subtitle("Student List"))
            ul class="mb-6 space-y-2" {
                @for student in controller.students() {
                    li class="flex flex-row items-center space-x-2" {
                        span class="grow" {(student)}
                        button class="bg-blue-600 hover:bg-blue-800 py-1 px-3 rounded" hx-post="/internal/students/edit" hx-vals={"{\"id\": " (student.id) "}"} hx-target="#app" {
                            "Edit"
                        }
                        button class="bg-red-600 hover:bg-red-800 py-1 px-3 rounded" hx-post="/internal/students/delete" hx-vals={"{\"id\": " (student.id) "}"} hx-target="#app" {
                            "Delete"
                        }
                    }
                }
            }

            @if controller.is_form_shown() {
                (render_student_form(controller))
            }
        } @else {
            form method="post" action="/sign_in" {
                button type="submit" class=(BUTTON) {"Sign In"}
            }
        }
    }
}

fn render_student_form(controller: &ViewController) -> Markup {
    let draft = controller.draft();
    let submit_text = if controller.editing_target().is_some() {
        "Update Student"
    } else {
        "Save Student"
    };

    html! {
        form hx-post="/internal/students/submit" hx-target="#app" class="p-4" {
            (simple_form_element("first_name", "First Name", true, Some(&draft.first_name)))
            (simple_form_element("last_name", "Last Name", true, Some(&draft.last_name)))
            (form_element("school", "School", html! {
                select required id="school" name="school" class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                    @for school in School::ALL {
                        option value=(school) selected[school == draft.school] {(school)}
                    }
                }
            }))
            (form_submit_button(submit_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::gateway::{
            SessionGateway,
            tests::{ScriptedProvider, live_identity},
        },
        data::student::{Student, StudentDraft},
        directory::memory::MemoryDirectory,
    };
    use std::sync::Arc;

    async fn controller(signed_in: bool) -> ViewController {
        let provider = ScriptedProvider::default();
        if signed_in {
            *provider.existing.lock().unwrap() = Some(live_identity("2vxsx-fae"));
        }
        let directory = Arc::new(MemoryDirectory::with_students([Student {
            id: 7,
            first_name: "Bob".into(),
            last_name: "K".into(),
            school: School::Ngoma,
        }]));
        let mut controller =
            ViewController::new(SessionGateway::new(Box::new(provider)), directory, false);
        controller.restore_session().await;
        controller
    }

    #[tokio::test]
    async fn signed_out_page_only_offers_sign_in() {
        let page = render_app(&controller(false).await).into_string();

        assert!(page.contains("Sign In"));
        assert!(!page.contains("Sign Out"));
        assert!(!page.contains("Student List"));
    }

    #[tokio::test]
    async fn signed_in_page_lists_students_with_actions() {
        let mut controller = controller(true).await;
        controller.view_students().await;
        let page = render_app(&controller).into_string();

        assert!(page.contains("Welcome back, 2vxsx-fae!"));
        assert!(page.contains("Bob K - IPRC-NGOMA"));
        assert!(page.contains(r#"hx-vals="{&quot;id&quot;: 7}""#));
        assert!(!page.contains("<form hx-post=\"/internal/students/submit\""));
    }

    #[tokio::test]
    async fn form_button_follows_the_edit_target() {
        let mut controller = controller(true).await;
        controller.view_students().await;

        controller.request_add();
        let composing = render_app(&controller).into_string();
        assert!(composing.contains("Save Student"));
        assert!(composing.contains(r#"<option value="IPRC-NGOMA" selected>"#));

        controller.request_edit(7);
        let editing = render_app(&controller).into_string();
        assert!(editing.contains("Update Student"));
        assert!(editing.contains(r#"value="Bob""#));
        assert_eq!(controller.draft(), &StudentDraft::from(&controller.students()[0]));
    }
}
