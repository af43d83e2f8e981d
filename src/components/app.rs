use crate::components::{view_label, AppView, HomeView, Icon, Navigation, UploadView};
use crate::db::{initialize_database, load_settings, UploadSettings};
use dioxus::prelude::*;
use tracing::{error, info};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoticeTone {
    Success,
    Error,
}

/// A dismissible alert shown above the current view.
#[derive(Clone, PartialEq, Debug)]
pub struct Notice {
    pub tone: NoticeTone,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: NoticeTone::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: NoticeTone::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct NoticeSignal(pub Signal<Option<Notice>>);

#[derive(Clone, Copy)]
pub struct SettingsReady(pub Signal<bool>);

#[component]
pub fn AppShell() -> Element {
    let mut upload_settings = use_signal(UploadSettings::default);
    let mut settings_ready = use_signal(|| false);
    let current_view = use_signal(|| AppView::Home);
    let navigation_stack = use_signal(Vec::<AppView>::new);
    let navigation = Navigation::new(current_view, navigation_stack);
    let mut notice = use_signal(|| None::<Notice>);

    use_context_provider(|| upload_settings);
    use_context_provider(|| navigation);
    use_context_provider(|| NoticeSignal(notice));
    use_context_provider(|| SettingsReady(settings_ready));

    // Initialize database and load saved settings on mount
    use_effect(move || {
        spawn(async move {
            if let Err(err) = initialize_database().await {
                error!(%err, "failed to initialize database");
                settings_ready.set(true);
                return;
            }

            match load_settings().await {
                Ok(settings) => {
                    info!(configured = settings.server.is_some(), "settings loaded");
                    upload_settings.set(settings);
                }
                Err(err) => error!(%err, "failed to load settings"),
            }
            settings_ready.set(true);
        });
    });

    let view = navigation.current();
    let can_go_back = navigation.can_go_back();

    rsx! {
        div { class: "app-container flex min-h-screen text-white overflow-hidden",
            div { class: "flex-1 flex flex-col overflow-hidden",
                header { class: "mobile-safe-top border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
                    div { class: "flex items-center justify-between px-4 py-3",
                        if can_go_back {
                            button {
                                class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60 transition-colors",
                                aria_label: "Go back",
                                onclick: move |_| {
                                    let _ = navigation.go_back();
                                },
                                Icon {
                                    name: "arrow-left".to_string(),
                                    class: "w-5 h-5".to_string(),
                                }
                            }
                        } else {
                            div { class: "p-2",
                                Icon {
                                    name: "home".to_string(),
                                    class: "w-5 h-5 text-zinc-500".to_string(),
                                }
                            }
                        }
                        div { class: "flex flex-col items-center text-center",
                            span { class: "text-xs uppercase tracking-widest text-zinc-500",
                                "SongDrop"
                            }
                            span { class: "text-sm font-semibold text-white", "{view_label(&view)}" }
                        }
                        div { class: "w-9" }
                    }
                }

                if let Some(current) = notice() {
                    div {
                        class: if current.tone == NoticeTone::Success { "mx-4 mt-4 flex items-center justify-between gap-3 px-4 py-3 rounded-xl bg-emerald-500/20 border border-emerald-500/50 text-emerald-300 text-sm" } else { "mx-4 mt-4 flex items-center justify-between gap-3 px-4 py-3 rounded-xl bg-red-500/20 border border-red-500/50 text-red-300 text-sm" },
                        role: "alert",
                        span { "{current.message}" }
                        button {
                            class: "p-1 rounded-lg hover:bg-white/10",
                            aria_label: "Dismiss",
                            onclick: move |_| notice.set(None),
                            Icon {
                                name: "x".to_string(),
                                class: "w-4 h-4".to_string(),
                            }
                        }
                    }
                }

                main { class: "flex-1 overflow-y-auto main-scroll",
                    div { class: "page-shell",
                        match view {
                            AppView::Home => rsx! {
                                HomeView {}
                            },
                            AppView::Upload => rsx! {
                                UploadView {}
                            },
                        }
                    }
                }
            }
        }
    }
}
