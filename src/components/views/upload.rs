use std::rc::Rc;

use crate::api::{transport_for, UploadAck};
use crate::components::file_picker::SelectedFiles;
use crate::components::hold_host::{DeviceHaptics, DioxusTimers};
use crate::components::{AppView, Icon, Navigation, Notice, NoticeSignal};
use crate::db::{save_settings, UploadSettings};
use crate::upload::assets::{pick_cover, pick_media, MEDIA_REQUEST};
use crate::upload::error::UPLOAD_SUCCESS_MESSAGE;
use crate::upload::{
    settle_upload, AccentColor, Asset, Genre, PickOutcome, PickerError, TimerId, UploadError,
    UploadForm, UploadListener, UploadSubmitter, ValidationError,
};
use base64::{engine::general_purpose, Engine as _};
use dioxus::prelude::*;
use tracing::{info, warn};

type FormSlot = Signal<Option<UploadForm>>;

/// Turns form signals into alerts and navigation.
struct ScreenListener {
    notice: Signal<Option<Notice>>,
    navigation: Navigation,
}

impl ScreenListener {
    fn show(&self, notice: Notice) {
        let mut current = self.notice;
        current.set(Some(notice));
    }
}

impl UploadListener for ScreenListener {
    fn on_upload_success(&self, ack: &UploadAck) {
        info!(id = ?ack.id, "song uploaded");
        self.show(Notice::success(UPLOAD_SUCCESS_MESSAGE));
        // The user may already have left the screen while the request ran.
        if self.navigation.current() == AppView::Upload && self.navigation.go_back().is_none() {
            self.navigation.navigate_to(AppView::Home);
        }
    }

    fn on_upload_failure(&self, reason: &UploadError) {
        self.show(Notice::error(reason.user_message()));
    }

    fn on_validation_error(&self, error: ValidationError) {
        self.show(Notice::error(error.user_message()));
    }

    fn on_picker_error(&self, error: &PickerError) {
        self.show(Notice::error(error.user_message()));
    }
}

fn with_form(mut slot: FormSlot, apply: impl FnOnce(&mut UploadForm)) {
    if let Some(form) = slot.write().as_mut() {
        apply(form);
    }
}

/// Routes a fired timer into the form and sends the upload a completed hold
/// hands back. The send runs on a root task so leaving the screen does not
/// abort a committed upload; the outcome reaches app-level signals either way.
fn deliver_timer(
    mut slot: FormSlot,
    mut settings: Signal<UploadSettings>,
    listener: Rc<ScreenListener>,
    id: TimerId,
) {
    let reserved = slot.write().as_mut().and_then(|form| form.on_timer(id));
    let Some(upload) = reserved else {
        return;
    };

    let title = upload.payload().title.clone();
    let _ = dioxus::core::spawn_forever(async move {
        let outcome = upload.send().await;
        let succeeded = outcome.is_ok();
        {
            let mut open_form = slot.try_write().ok();
            settle_upload(
                open_form.as_mut().and_then(|guard| (**guard).as_mut()),
                listener.as_ref(),
                outcome,
            );
        }

        if succeeded {
            let mut updated = settings.peek().clone();
            updated.record_upload(&title);
            settings.set(updated.clone());
            if let Err(err) = save_settings(updated).await {
                warn!(%err, "failed to record last upload");
            }
        }
    });
}

/// Inline `data:` URL for a cover whose bytes are already in memory.
fn cover_preview_url(cover: &Asset) -> Option<String> {
    let data = cover.data.as_ref()?;
    let mime = cover
        .mime_type
        .as_deref()
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or("image/jpeg");
    Some(format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(data)
    ))
}

fn hold_button_label(loading: bool) -> &'static str {
    if loading {
        "Uploading..."
    } else {
        "Hold to Upload"
    }
}

fn pick_label(selected: bool, picked: &'static str, empty: &'static str) -> &'static str {
    if selected {
        picked
    } else {
        empty
    }
}

/// What the view renders, copied out of the form so no borrow outlives the
/// render.
struct FormSnapshot {
    song_name: Option<String>,
    cover_name: Option<String>,
    title: String,
    artist_name: String,
    genre: Option<Genre>,
    loading: bool,
    accent: AccentColor,
}

impl FormSnapshot {
    fn of(form: &UploadForm) -> Self {
        let metadata = form.metadata();
        Self {
            song_name: form.media().map(|asset| asset.display_name().to_string()),
            cover_name: form.cover().map(|asset| asset.display_name().to_string()),
            title: metadata.title.clone(),
            artist_name: metadata.artist_name.clone().unwrap_or_default(),
            genre: metadata.genre,
            loading: form.is_loading(),
            accent: form.accent(),
        }
    }
}

#[component]
pub fn UploadView() -> Element {
    let navigation = use_context::<Navigation>();
    let upload_settings = use_context::<Signal<UploadSettings>>();
    let notice = use_context::<NoticeSignal>().0;
    let mut cover_preview = use_signal(|| None::<String>);

    let slot: FormSlot = use_hook(move || {
        let mut slot = Signal::new(None);
        let settings = upload_settings.peek().clone();
        let listener = Rc::new(ScreenListener { notice, navigation });
        let dispatch_listener = listener.clone();
        let timers = DioxusTimers::new(move |id| {
            deliver_timer(slot, upload_settings, dispatch_listener.clone(), id)
        });
        let submitter = UploadSubmitter::new(transport_for(
            settings.server.clone(),
            settings.request_timeout_secs,
        ));
        let form = UploadForm::new(
            submitter,
            Box::new(timers),
            Rc::new(DeviceHaptics),
            listener,
            settings.hold_timing(),
        );
        slot.set(Some(form));
        slot
    });

    let Some(snapshot) = slot.read().as_ref().map(FormSnapshot::of) else {
        return rsx! {};
    };
    let loading = snapshot.loading;
    let accent = snapshot.accent.as_css();
    let selected_genre = snapshot.genre.map(|genre| genre.label()).unwrap_or("");
    let title_value = snapshot.title.clone();
    let artist_value = snapshot.artist_name.clone();
    let song_label = pick_label(snapshot.song_name.is_some(), "Song Selected", "Select Song");
    let cover_label = pick_label(snapshot.cover_name.is_some(), "Cover Selected", "Select Cover");

    let on_song_change = move |evt: FormEvent| {
        let files = evt.files();
        spawn(async move {
            let picked = pick_media(&SelectedFiles(files)).await;
            with_form(slot, |form| {
                form.resolve_media_pick(picked);
            });
        });
    };

    let on_cover_change = move |evt: FormEvent| {
        let files = evt.files();
        spawn(async move {
            let picked = pick_cover(&SelectedFiles(files)).await;
            with_form(slot, |form| {
                if form.resolve_cover_pick(picked) == Some(PickOutcome::Selected) {
                    cover_preview.set(form.cover().and_then(cover_preview_url));
                }
            });
        });
    };

    let release = move |_| {
        with_form(slot, |form| {
            form.press_end();
        });
    };

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Upload a Song" }
                p { class: "page-subtitle", "Pick a track, name it, then hold to send" }
            }

            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6 space-y-4",
                div { class: "grid grid-cols-1 sm:grid-cols-2 gap-4",
                    div {
                        input {
                            id: "song-input",
                            r#type: "file",
                            class: "hidden",
                            accept: MEDIA_REQUEST.type_filter,
                            disabled: loading,
                            onchange: on_song_change,
                        }
                        label {
                            r#for: "song-input",
                            class: "flex items-center gap-3 px-4 py-3 rounded-xl border border-zinc-700/50 bg-zinc-900/50 text-white cursor-pointer hover:border-emerald-500/50 transition-colors",
                            Icon {
                                name: if snapshot.song_name.is_some() { "check".to_string() } else { "music".to_string() },
                                class: "w-5 h-5 text-zinc-400".to_string(),
                            }
                            div { class: "min-w-0",
                                p { class: "font-medium",
                                    "{song_label}"
                                }
                                if let Some(name) = snapshot.song_name.clone() {
                                    p { class: "text-xs text-zinc-400 truncate", "{name}" }
                                }
                            }
                        }
                    }
                    div {
                        input {
                            id: "cover-input",
                            r#type: "file",
                            class: "hidden",
                            accept: "image/*",
                            disabled: loading,
                            onchange: on_cover_change,
                        }
                        label {
                            r#for: "cover-input",
                            class: "flex items-center gap-3 px-4 py-3 rounded-xl border border-zinc-700/50 bg-zinc-900/50 text-white cursor-pointer hover:border-emerald-500/50 transition-colors",
                            Icon {
                                name: if snapshot.cover_name.is_some() { "check".to_string() } else { "image".to_string() },
                                class: "w-5 h-5 text-zinc-400".to_string(),
                            }
                            div { class: "min-w-0",
                                p { class: "font-medium",
                                    "{cover_label}"
                                }
                                if let Some(name) = snapshot.cover_name.clone() {
                                    p { class: "text-xs text-zinc-400 truncate", "{name}" }
                                }
                            }
                        }
                        if let Some(src) = cover_preview() {
                            img {
                                class: "mt-3 w-32 h-32 rounded-xl object-cover border border-zinc-700/50",
                                src: "{src}",
                                alt: "Cover preview",
                            }
                        }
                    }
                }

                div {
                    label { class: "block text-sm font-medium text-zinc-400 mb-2", "Title" }
                    input {
                        class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50",
                        placeholder: "Song title",
                        value: "{title_value}",
                        disabled: loading,
                        oninput: move |e| with_form(slot, |form| form.set_title(e.value())),
                    }
                }
                div {
                    label { class: "block text-sm font-medium text-zinc-400 mb-2", "Artist" }
                    input {
                        class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50",
                        placeholder: "Artist name (optional)",
                        value: "{artist_value}",
                        disabled: loading,
                        oninput: move |e| with_form(slot, |form| form.set_artist_name(&e.value())),
                    }
                }
                div {
                    label { class: "block text-sm font-medium text-zinc-400 mb-2", "Genre" }
                    select {
                        class: "w-full px-4 py-3 bg-zinc-900/50 border border-zinc-700/50 rounded-xl text-white focus:outline-none focus:border-emerald-500/50",
                        value: selected_genre,
                        disabled: loading,
                        onchange: move |e| with_form(slot, |form| form.set_genre(Genre::from_label(&e.value()))),
                        option { value: "", "Select a genre" }
                        for genre in Genre::ALL {
                            option {
                                key: "{genre.label()}",
                                value: genre.label(),
                                selected: snapshot.genre == Some(genre),
                                "{genre.label()}"
                            }
                        }
                    }
                }
            }

            section { class: "flex flex-col items-center gap-3",
                button {
                    class: "w-full select-none flex items-center justify-center gap-2 px-4 py-5 rounded-2xl text-white font-semibold transition-colors disabled:opacity-70",
                    style: "background-color: {accent}; touch-action: none;",
                    disabled: loading,
                    onpointerdown: move |_| {
                        with_form(slot, |form| {
                            form.press_begin();
                        });
                    },
                    onpointerup: release,
                    onpointerleave: release,
                    onpointercancel: release,
                    if loading {
                        Icon {
                            name: "loader".to_string(),
                            class: "w-5 h-5".to_string(),
                        }
                    } else {
                        Icon {
                            name: "upload".to_string(),
                            class: "w-5 h-5".to_string(),
                        }
                    }
                    "{hold_button_label(loading)}"
                }
                button {
                    class: "text-sm text-zinc-400 hover:text-white transition-colors disabled:opacity-50",
                    disabled: loading,
                    onclick: move |_| {
                        with_form(slot, |form| {
                            if form.reset() {
                                cover_preview.set(None);
                            }
                        });
                    },
                    "Clear"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_preview_needs_in_memory_bytes() {
        let on_disk = Asset::from_path("/tmp/cover.png");
        assert_eq!(cover_preview_url(&on_disk), None);

        let picked = Asset::from_bytes("c.png", Some("image/png".to_string()), vec![1, 2, 3]);
        assert_eq!(
            cover_preview_url(&picked).as_deref(),
            Some("data:image/png;base64,AQID")
        );
    }

    #[test]
    fn button_label_follows_loading() {
        assert_eq!(hold_button_label(false), "Hold to Upload");
        assert_eq!(hold_button_label(true), "Uploading...");
    }

    #[test]
    fn pick_labels_reflect_selection() {
        assert_eq!(pick_label(true, "Song Selected", "Select Song"), "Song Selected");
        assert_eq!(pick_label(false, "Cover Selected", "Select Cover"), "Select Cover");
    }
}
