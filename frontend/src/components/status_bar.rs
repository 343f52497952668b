//! Status indicator of the upload in progress.

use leptos::*;

use crate::config::I18n;
use crate::types::{CandidateFile, UploadEvent};

/// What the status bar shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusBarState {
    /// Operation that owns the bar
    pub seq: u32,
    pub file_name: String,
    pub size_label: String,
    pub progress: u8,
    /// Error label once the upload failed
    pub failure: Option<String>,
    pub finished: bool,
}

impl StatusBarState {
    pub fn new(seq: u32, file: &CandidateFile, i18n: &I18n) -> Self {
        Self {
            seq,
            file_name: file.name.clone(),
            size_label: format_file_size(file.size, i18n),
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Progress(percent) => self.progress = *percent,
            UploadEvent::Success(_) => {
                self.progress = 100;
                self.finished = true;
            }
            UploadEvent::Failure(failure) => {
                self.failure = Some(failure.message.clone());
                self.finished = true;
            }
            UploadEvent::Aborted => self.finished = true,
        }
    }

    /// The abort control disappears once everything is sent.
    pub fn abortable(&self) -> bool {
        !self.finished && self.progress < 100
    }

    pub fn progress_label(&self, i18n: &I18n) -> String {
        match &self.failure {
            Some(failure) => failure.clone(),
            None => format!("{}{}", self.progress, i18n.percent),
        }
    }
}

/// Human-readable size: kilobytes, or megabytes past 1024 whole KB.
pub fn format_file_size(bytes: u64, i18n: &I18n) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb.trunc() > 1024.0 {
        format!("{:.2}{}", kb / 1024.0, i18n.mb)
    } else {
        format!("{:.2}{}", kb, i18n.kb)
    }
}

#[component]
pub fn StatusBar(
    state: Signal<StatusBarState>,
    i18n: I18n,
    on_abort: Callback<()>,
) -> impl IntoView {
    let abort_label = i18n.abort.clone();
    let label = move || state.with(|s| s.progress_label(&i18n));

    view! {
        <div class=move || format!("statusbar statusbar-{}", state.with(|s| s.seq))>
            <div class="filename">{move || state.with(|s| s.file_name.clone())}</div>
            <div class="filesize">{move || state.with(|s| s.size_label.clone())}</div>
            <div
                class="progressbar"
                class:droparea-fail=move || state.with(|s| s.failure.is_some())
            >
                <div style:width=move || format!("{}%", state.with(|s| s.progress))>
                    {label}
                </div>
            </div>
            <Show when=move || state.with(StatusBarState::abortable) fallback=|| view! {}>
                <a
                    class="btn abort"
                    href="#"
                    on:click=move |ev| {
                        ev.prevent_default();
                        ev.stop_propagation();
                        on_abort.call(());
                    }
                >
                    {abort_label.clone()}
                </a>
            </Show>
        </div>
    }
}
