//! Validation and mode notices shown over the drop area.

use gloo_timers::callback::Timeout;
use leptos::*;

/// A notice on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertState {
    pub id: u32,
    /// HTML message
    pub message: String,
    pub dismissable: bool,
    pub autohide: bool,
}

#[component]
pub fn AlertBlock(
    alert: AlertState,
    dismiss_label: String,
    /// Delay before an auto-hiding alert goes away (milliseconds)
    delay: u32,
    /// Called with the alert id when it should disappear
    on_dismiss: Callback<u32>,
) -> impl IntoView {
    let id = alert.id;

    if alert.autohide {
        Timeout::new(delay, move || on_dismiss.call(id)).forget();
    }

    view! {
        <div class="statusbar alert-block">
            <div class="filename" inner_html=alert.message></div>
            {alert.dismissable.then(|| view! {
                <button
                    class="btn dismiss"
                    on:click=move |ev| {
                        ev.prevent_default();
                        ev.stop_propagation();
                        on_dismiss.call(id);
                    }
                >
                    {dismiss_label}
                </button>
            })}
        </div>
    }
}
