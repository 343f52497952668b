//! Drop target with drag & drop and manual selection.
//!
//! Dropped files go through admission ([`admit`]) and, when accepted, are
//! submitted right away with a status bar tracking the transfer. Files
//! chosen in the picker are previewed when they are images, and submitted
//! as well unless the widget was configured not to upload.
//!
//! The picker is the host page's element matched by `fileHolder` when there
//! is one, so the file can travel with the host's own form. Otherwise the
//! widget renders a hidden input carrying that id.

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, HtmlInputElement, MouseEvent};

use super::alert_block::{AlertBlock, AlertState};
use super::status_bar::{StatusBar, StatusBarState};
use crate::config::{element_id, DropAreaOptions};
use crate::services::{
    admit, element_exists, read_as_data_url, show_preview, start_upload, DocumentFields,
    DropAreaInstance, Reaction, UploadEvents, UploadHandle, UploadPayload,
};
use crate::types::{CandidateFile, UploadEvent, UploadFailure, UploadSuccess};

/// State and wiring shared by the event handlers of one drop area.
#[derive(Clone)]
struct Widget {
    instance: Rc<DropAreaInstance>,
    set_dropped: WriteSignal<bool>,
    status: RwSignal<Option<StatusBarState>>,
    alert: RwSignal<Option<AlertState>>,
    alert_ids: StoredValue<u32>,
    active: StoredValue<Option<(u32, UploadHandle)>>,
    on_success: Option<Callback<UploadSuccess>>,
    on_fail: Option<Callback<UploadFailure>>,
}

impl Widget {
    /// Entry point for a dropped or selected file.
    fn accept(&self, file: File) {
        let options = self.instance.options();
        let candidate = CandidateFile::from_file(file);

        match admit(&options, &candidate).reaction(&options.i18n) {
            Reaction::Submit => self.submit(candidate),
            Reaction::Notify {
                message,
                autohide,
                open_picker: redirect,
            } => {
                self.show_alert(message, autohide);
                if redirect {
                    open_picker(&options.file_holder);
                }
            }
        }
    }

    fn submit(&self, candidate: CandidateFile) {
        let options = self.instance.options();
        let payload = UploadPayload::build(&options, &DocumentFields);
        let seq = self.instance.begin_operation();

        self.status
            .set(Some(StatusBarState::new(seq, &candidate, &options.i18n)));

        match start_upload(&options, candidate, &payload) {
            Ok((handle, events)) => {
                self.active.set_value(Some((seq, handle)));
                let widget = self.clone();
                spawn_local(async move { widget.drive(seq, events).await });
            }
            Err(e) => {
                let failure = UploadFailure::new(e, None, &options.i18n);
                self.report(seq, UploadEvent::Failure(failure));
            }
        }
    }

    async fn drive(self, seq: u32, mut events: UploadEvents) {
        while let Some(event) = events.next().await {
            self.report(seq, event);
        }
    }

    fn report(&self, seq: u32, event: UploadEvent) {
        if self.instance.owns_indicator(seq) {
            self.status.update(|status| {
                if let Some(status) = status.as_mut().filter(|s| s.seq == seq) {
                    status.apply(&event);
                }
            });
        }

        match event {
            UploadEvent::Progress(_) | UploadEvent::Aborted => {}
            UploadEvent::Success(success) => {
                log::info!("Upload of '{}' complete", success.file.name);
                self.set_dropped.set(false);
                if let Some(on_success) = &self.on_success {
                    on_success.call(success);
                }
                self.complete(seq);
            }
            UploadEvent::Failure(failure) => {
                if let Some(on_fail) = &self.on_fail {
                    on_fail.call(failure);
                }
                self.complete(seq);
            }
        }
    }

    fn complete(&self, seq: u32) {
        let options = self.instance.options();
        clear_picker(&options.file_holder);

        let widget = self.clone();
        Timeout::new(options.notification_delay, move || widget.hide_status(seq)).forget();
    }

    fn abort(&self) {
        if let Some((seq, handle)) = self.active.get_value() {
            handle.abort();
            self.hide_status(seq);
        }
    }

    fn hide_status(&self, seq: u32) {
        if self.instance.release(seq) {
            self.status.set(None);
        }
        self.active.update_value(|active| {
            if matches!(active, Some((current, _)) if *current == seq) {
                *active = None;
            }
        });
    }

    fn show_alert(&self, message: String, autohide: bool) {
        let id = self.alert_ids.get_value() + 1;
        self.alert_ids.set_value(id);
        self.alert.set(Some(AlertState {
            id,
            message,
            dismissable: true,
            autohide,
        }));
    }

    fn dismiss_alert(&self, id: u32) {
        if self.alert.with_untracked(|a| a.as_ref().is_some_and(|a| a.id == id)) {
            self.alert.set(None);
        }
    }
}

/// The file input matched by `selector`, or by its bare id.
fn find_picker(selector: &str) -> Option<HtmlInputElement> {
    let document = gloo_utils::document();
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .or_else(|| document.get_element_by_id(element_id(selector)))
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

fn open_picker(selector: &str) {
    match find_picker(selector) {
        Some(picker) => picker.click(),
        None => log::warn!("File picker '{}' not found", selector),
    }
}

// Lets the user pick the same file again and still get a change event.
fn clear_picker(selector: &str) {
    if let Some(input) = find_picker(selector) {
        input.set_value("");
    }
}

fn listen_for_changes(picker: &HtmlInputElement, on_pick: impl FnMut(Event) + 'static) {
    let listener = Closure::<dyn FnMut(Event)>::wrap(Box::new(on_pick));
    if let Err(e) =
        picker.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
    {
        log::warn!("Failed to listen on file picker: {:?}", e);
    }
    listener.forget();
}

fn first_dropped_file(ev: &DragEvent) -> Option<File> {
    ev.data_transfer()?.files()?.get(0)
}

/// A drop target.
///
/// ```rust,ignore
/// view! {
///     <DropArea
///         options=DropAreaOptions { url: "/upload".into(), ..Default::default() }
///         on_success=Some(Callback::new(|s: UploadSuccess| log::info!("{:?}", s.file_name)))
///     >
///         "Drop your avatar here"
///     </DropArea>
/// }
/// ```
#[component]
pub fn DropArea(
    #[prop(optional)] options: DropAreaOptions,
    #[prop(default = None)] on_success: Option<Callback<UploadSuccess>>,
    #[prop(default = None)] on_fail: Option<Callback<UploadFailure>>,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let instance = Rc::new(DropAreaInstance::new(options));

    let options = instance.options();
    let (dragging, set_dragging) = create_signal(false);
    let (dropped, set_dropped) = create_signal(false);

    let widget = Widget {
        instance: instance.clone(),
        set_dropped,
        status: create_rw_signal(None),
        alert: create_rw_signal(None),
        alert_ids: store_value(0),
        active: store_value(None),
        on_success,
        on_fail,
    };

    let status = widget.status;
    let alert = widget.alert;
    let holder = options.file_holder.clone();
    let holder_id = options.file_holder_id().to_string();
    let preview_selector = options.file_preview.clone();
    let i18n = options.i18n.clone();
    let delay = options.notification_delay;
    let upload = options.upload;

    let on_click = {
        let holder = holder.clone();
        move |ev: MouseEvent| {
            ev.prevent_default();
            ev.stop_propagation();
            open_picker(&holder);
        }
    };

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_dragging.set(true);
    };

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_dragging.set(false);
    };

    let on_drop = {
        let widget = widget.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            ev.stop_propagation();
            set_dragging.set(false);
            set_dropped.set(true);

            match first_dropped_file(&ev) {
                Some(file) => widget.accept(file),
                None => log::debug!("Drop without files ignored"),
            }
        }
    };

    let on_pick = {
        let widget = widget.clone();
        move |ev: Event| {
            let input: HtmlInputElement = event_target(&ev);
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };

            if file.type_().starts_with("image/") && element_exists(&preview_selector) {
                let preview = file.clone();
                let selector = preview_selector.clone();
                spawn_local(async move {
                    match read_as_data_url(&preview).await {
                        Ok(url) => {
                            if show_preview(&selector, &url) {
                                alert.set(None);
                            }
                        }
                        Err(e) => log::warn!("Preview failed: {:?}", e),
                    }
                });
            }

            if upload {
                widget.accept(file);
            }
        }
    };

    let fallback_picker = match find_picker(&holder) {
        Some(picker) => {
            log::debug!("Using host file picker '{}'", holder);
            listen_for_changes(&picker, on_pick);
            None
        }
        None => Some(view! {
            <input
                type="file"
                id=holder_id.clone()
                name=holder_id
                style="display:none"
                on:change=on_pick
            />
        }),
    };

    let on_abort = {
        let widget = widget.clone();
        Callback::new(move |_: ()| widget.abort())
    };

    let on_dismiss = {
        let widget = widget.clone();
        Callback::new(move |id: u32| widget.dismiss_alert(id))
    };

    let status_state = Signal::derive(move || status.get().unwrap_or_default());
    let status_i18n = i18n.clone();
    let dismiss_label = i18n.dismiss.clone();

    view! {
        <div
            class="droparea"
            class:droparea-dragging=move || dragging.get()
            class:droparea-dropped=move || dropped.get()
            data-droparea=instance.id()
            on:click=on_click
            on:dragenter=on_drag_over
            on:dragover=on_drag_over
            on:dragleave=on_drag_leave
            on:drop=on_drop
        >
            {children.map(|children| children())}

            <Show when=move || status.with(Option::is_some) fallback=|| view! {}>
                <StatusBar state=status_state i18n=status_i18n.clone() on_abort=on_abort/>
            </Show>

            {move || alert.get().map(|current| view! {
                <AlertBlock
                    alert=current
                    dismiss_label=dismiss_label.clone()
                    delay=delay
                    on_dismiss=on_dismiss
                />
            })}
        </div>
        {fallback_picker}
    }
}
