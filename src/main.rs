use dioxus::prelude::*;

mod api;
mod components;
mod db;
mod diagnostics;
mod upload;

use components::AppShell;

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

fn main() {
    diagnostics::init_logging();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        // Theme color for mobile browsers
        document::Meta { name: "theme-color", content: "#182952" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-status-bar-style", content: "default" }
        document::Meta { name: "apple-mobile-web-app-title", content: "SongDrop" }

        document::Script { src: TAILWIND_CDN }

        div { class: "bg-zinc-950 min-h-screen", AppShell {} }
    }
}
