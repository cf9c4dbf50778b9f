/// Popup UI for Tab Sorter extension

use patternfly_yew::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::commands::Response;
use crate::operations::SortMethod;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendCommand(request: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
struct PopupRequest {
    action: &'static str,
    method: &'static str,
}

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Done(String),
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let method = use_state(SortMethod::default);

    // Sort method selector
    let on_method_change = {
        let method = method.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                method.set(SortMethod::resolve(Some(&select.value()), SortMethod::default()));
            }
        })
    };

    // One handler per command; they differ only in action name and busy text
    let command_handler = {
        let state = state.clone();
        let method = method.clone();
        move |action: &'static str, busy: &'static str| {
            let state = state.clone();
            let method = method.clone();
            Callback::from(move |_: MouseEvent| {
                let state = state.clone();
                let request = PopupRequest {
                    action,
                    method: (*method).name(),
                };

                state.set(AppState::Loading(busy.to_string()));

                spawn_local(async move {
                    match send_command(&request).await {
                        Ok(response) if response.success => {
                            state.set(AppState::Done(response.message.unwrap_or_default()));
                        }
                        Ok(response) => {
                            state.set(AppState::Error(
                                response.error.unwrap_or_else(|| "Unknown error".to_string()),
                            ));
                        }
                        Err(e) => {
                            state.set(AppState::Error(e));
                        }
                    }
                });
            })
        }
    };

    let on_sort = command_handler("sortTabs", "Sorting tabs into new windows...");
    let on_sort_move = command_handler("sortTabsMove", "Moving tabs...");
    let on_export = command_handler("exportCSV", "Exporting tabs...");

    let is_busy = matches!(*state, AppState::Loading(_));

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Sorter"}</h1>

            <div class="flex-column-gap">
                <label for="sort-method">{"Group by"}</label>
                <select id="sort-method" onchange={on_method_change} disabled={is_busy}>
                    {for SortMethod::ALL.iter().map(|m| html! {
                        <option value={m.name()} selected={*m == *method}>{m.name()}</option>
                    })}
                </select>

                <Button onclick={on_sort} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {"Sort into new windows"}
                </Button>
                <Button onclick={on_sort_move} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Sort by moving tabs"}
                </Button>
                <Button onclick={on_export} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Export to CSV"}
                </Button>
            </div>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Done(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <p class="footer-popup">
                {"Tab Sorter v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn send_command(request: &PopupRequest) -> Result<Response, String> {
    let request_js = serde_wasm_bindgen::to_value(request)
        .map_err(|e| format!("Failed to serialize: {:?}", e))?;

    let response_js = sendCommand(request_js)
        .await
        .map_err(|e| format!("Background unavailable: {:?}", e))?;

    serde_wasm_bindgen::from_value(response_js)
        .map_err(|e| format!("Failed to parse response: {:?}", e))
}
