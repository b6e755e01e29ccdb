use crate::{
    auth::{gateway::SessionGateway, provider::InternetIdentityProvider},
    config::RuntimeConfiguration,
    controller::ViewController,
    directory::{DirectoryBackend, http::HttpDirectory, memory::MemoryDirectory},
};
use maud::{DOCTYPE, Markup, html};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Clone)]
pub struct RosterState {
    config: RuntimeConfiguration,
    controller: Arc<Mutex<ViewController>>,
}

impl RosterState {
    /// Wires the gateway and directory together and checks for an existing session.
    pub async fn new(config: RuntimeConfiguration) -> Self {
        let provider = InternetIdentityProvider::new(&config.identity_config());
        let gateway = SessionGateway::new(Box::new(provider));

        let backend: Arc<dyn DirectoryBackend> = match config.directory_url() {
            Some(url) => {
                info!(%url, "Using remote student directory");
                Arc::new(HttpDirectory::new(url))
            }
            None => {
                warn!("No ROSTER_DIRECTORY_URL set, students will only live in memory");
                Arc::new(MemoryDirectory::default())
            }
        };

        Self::with_controller(
            config.clone(),
            ViewController::new(gateway, backend, config.clear_on_sign_out()),
        )
        .await
    }

    pub async fn with_controller(
        config: RuntimeConfiguration,
        mut controller: ViewController,
    ) -> Self {
        controller.restore_session().await;

        Self {
            config,
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// Every action holds this for its whole duration, which keeps them one at a time.
    pub async fn controller(&self) -> MutexGuard<'_, ViewController> {
        self.controller.lock().await
    }

    #[allow(clippy::unused_self)]
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Roster" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center justify-center text-white" {
                    (markup)
                }
            }
        }
    }
}
