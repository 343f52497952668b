//! Demo page for the drop area, served by `trunk serve`.
//!
//! Expects `droparea-server serve` on localhost:3000.

use droparea::{Accepted, DropArea, DropAreaOptions, UploadFailure, UploadSuccess};
use leptos::*;
use leptos_meta::*;

const DEMO_UPLOAD_URL: &str = "http://localhost:3000/upload";

pub fn main() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Droparea demo starting");

    mount_to_body(|| view! { <Demo/> })
}

#[component]
fn Demo() -> impl IntoView {
    provide_meta_context();

    let (last_upload, set_last_upload) = create_signal(None::<String>);
    let (last_error, set_last_error) = create_signal(None::<String>);

    let options = DropAreaOptions {
        url: DEMO_UPLOAD_URL.to_string(),
        accepted: Accepted::Extensions(".jpg|.jpeg|.png|.gif".to_string()),
        extra: vec!["#caption".to_string()],
        ..Default::default()
    };

    let on_success = Callback::new(move |success: UploadSuccess| {
        set_last_error.set(None);
        set_last_upload.set(Some(
            success
                .file_name
                .unwrap_or_else(|| success.file.name.clone()),
        ));
    });

    let on_fail = Callback::new(move |failure: UploadFailure| {
        set_last_error.set(Some(failure.payload().to_string()));
    });

    view! {
        <Title text="Droparea demo"/>
        <main class="container">
            <h1>"Droparea"</h1>

            <label for="caption">"Caption"</label>
            <input type="text" id="caption" placeholder="Sent with the file"/>

            <DropArea options=options on_success=Some(on_success) on_fail=Some(on_fail)>
                <img id="file_preview" alt="" src=""/>
                <div class="droparea-hint">"Drop an image here, or click to select one"</div>
            </DropArea>

            {move || last_upload.get().map(|name| view! {
                <p class="result">"Stored as " <code>{name}</code></p>
            })}
            {move || last_error.get().map(|error| view! {
                <p class="error-message">{error}</p>
            })}
        </main>
    }
}
