use crate::api::ServerConfig;
use crate::components::{AppView, Icon, Navigation, SettingsReady};
use crate::db::{save_settings, UploadSettings};
use crate::upload::HoldTiming;
use dioxus::prelude::*;
use tracing::warn;

const SAVE_STATUS_CLEAR_MS: u64 = 2000;

#[cfg(not(target_arch = "wasm32"))]
async fn status_delay_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

#[cfg(target_arch = "wasm32")]
async fn status_delay_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms as u32).await;
}

fn resolve_server_name(name: &str, url: &str) -> String {
    let trimmed_name = name.trim();
    if trimmed_name.is_empty() {
        url.trim().to_string()
    } else {
        trimmed_name.to_string()
    }
}

fn hold_seconds_label(hold_ms: u64) -> String {
    format!("{:.1}s", hold_ms as f64 / 1000.0)
}

#[component]
pub fn HomeView() -> Element {
    let navigation = use_context::<Navigation>();
    let mut upload_settings = use_context::<Signal<UploadSettings>>();
    let settings_ready = use_context::<SettingsReady>().0;

    let mut server_name = use_signal(String::new);
    let mut server_url = use_signal(String::new);
    let mut server_token = use_signal(String::new);
    let mut save_status = use_signal(|| None::<String>);
    let mut prefilled = use_signal(|| false);

    // Prefill the server form once the stored settings arrive
    use_effect(move || {
        if !settings_ready() || prefilled() {
            return;
        }
        if let Some(server) = upload_settings.peek().server.clone() {
            server_name.set(server.name);
            server_url.set(server.url);
            server_token.set(server.token);
        }
        prefilled.set(true);
    });

    let mut persist = move |settings: UploadSettings| {
        upload_settings.set(settings.clone());
        spawn(async move {
            if let Err(err) = save_settings(settings).await {
                warn!(%err, "failed to save settings");
                return;
            }
            save_status.set(Some("Saved".to_string()));
            status_delay_ms(SAVE_STATUS_CLEAR_MS).await;
            save_status.set(None);
        });
    };

    let on_save_server = move |_| {
        let url = server_url().trim().to_string();
        if url.is_empty() {
            return;
        }
        let name = resolve_server_name(&server_name(), &url);
        let mut settings = upload_settings();
        let mut server = ServerConfig::new(name, url, server_token());
        if let Some(existing) = &settings.server {
            server.id = existing.id.clone();
        }
        server_url.set(server.url.clone());
        settings.server = Some(server);
        persist(settings);
    };

    let on_hold_change = move |evt: FormEvent| {
        if let Ok(hold_ms) = evt.value().parse::<u64>() {
            let mut settings = upload_settings();
            settings.hold_duration_ms = HoldTiming::from_millis(hold_ms, settings.feedback_interval_ms)
                .hold_duration
                .as_millis() as u64;
            persist(settings);
        }
    };

    let settings = upload_settings();
    let configured = settings
        .server
        .as_ref()
        .is_some_and(|server| !server.url.trim().is_empty());
    let last_upload = settings.last_upload.as_ref().map(|last| {
        (
            last.title.clone(),
            last.uploaded_at.format("%b %d, %Y %H:%M").to_string(),
        )
    });
    let hold_ms = settings.hold_duration_ms;

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "SongDrop" }
                p { class: "page-subtitle", "Share a track with your listeners" }
            }

            if let Some(status) = save_status() {
                div { class: "fixed top-4 right-4 px-4 py-2 bg-emerald-500/20 border border-emerald-500/50 rounded-lg text-emerald-400 text-sm",
                    "{status}"
                }
            }

            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6 space-y-4",
                button {
                    class: if configured { "w-full flex items-center justify-center gap-2 px-4 py-3 rounded-xl bg-emerald-500 hover:bg-emerald-400 text-white font-semibold transition-colors" } else { "w-full flex items-center justify-center gap-2 px-4 py-3 rounded-xl bg-zinc-700 text-zinc-400 font-semibold cursor-not-allowed" },
                    disabled: !configured,
                    onclick: move |_| navigation.navigate_to(AppView::Upload),
                    Icon {
                        name: "upload".to_string(),
                        class: "w-5 h-5".to_string(),
                    }
                    "Upload a Song"
                }
                if !configured {
                    p { class: "text-sm text-zinc-400 text-center",
                        "Add your upload server below to get started."
                    }
                }
                if let Some((last_title, last_when)) = last_upload {
                    div { class: "flex items-center gap-3 text-sm text-zinc-400",
                        Icon {
                            name: "clock".to_string(),
                            class: "w-4 h-4".to_string(),
                        }
                        span {
                            "Last upload: "
                            span { class: "text-white", "{last_title}" }
                            " on {last_when}"
                        }
                    }
                }
            }

            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                div { class: "flex items-center gap-3 mb-6",
                    Icon {
                        name: "server".to_string(),
                        class: "w-5 h-5 text-zinc-400".to_string(),
                    }
                    h2 { class: "text-lg font-semibold text-white", "Upload Server" }
                }
                div { class: "space-y-4",
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2", "Name" }
                        input {
                            class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50",
                            placeholder: "My Server",
                            value: server_name,
                            oninput: move |e| server_name.set(e.value()),
                        }
                    }
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2", "Server URL" }
                        input {
                            class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50",
                            placeholder: "https://songs.example.com",
                            value: server_url,
                            oninput: move |e| server_url.set(e.value()),
                        }
                    }
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2", "Access Token" }
                        input {
                            class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50",
                            r#type: "password",
                            placeholder: "Optional",
                            value: server_token,
                            oninput: move |e| server_token.set(e.value()),
                        }
                    }
                    button {
                        class: "px-4 py-2 rounded-xl bg-emerald-500/20 border border-emerald-500/50 text-emerald-300 hover:bg-emerald-500/30 transition-colors disabled:opacity-50",
                        disabled: server_url().trim().is_empty(),
                        onclick: on_save_server,
                        "Save Server"
                    }
                }
            }

            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                h2 { class: "text-lg font-semibold text-white mb-6", "Hold to Upload" }
                label { class: "block text-sm font-medium text-zinc-400 mb-3",
                    "Hold duration"
                }
                div { class: "flex items-center gap-4",
                    input {
                        r#type: "range",
                        min: "500",
                        max: "10000",
                        step: "500",
                        value: hold_ms as i64,
                        class: "flex-1 h-2 bg-zinc-700 rounded-lg appearance-none cursor-pointer accent-emerald-500",
                        onchange: on_hold_change,
                    }
                    span { class: "text-sm text-zinc-400 w-12 text-right", "{hold_seconds_label(hold_ms)}" }
                }
            }
        }
    }
}
