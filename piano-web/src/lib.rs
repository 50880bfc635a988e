#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod audio;
pub mod controls;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod timers;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static APP: RefCell<Option<app::PianoApp>> = RefCell::new(None);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    logger::init(log::LevelFilter::Info);

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    if is_loaded(&document.ready_state()) {
        mount(&document);
    } else {
        let on_load = Closure::once_into_js(move || mount(&document));
        window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
    }
    Ok(())
}

/// True once `document.readyState` reports that the `load` event has fired.
pub fn is_loaded(ready_state: &str) -> bool {
    ready_state == "complete"
}

#[cfg(target_arch = "wasm32")]
fn mount(document: &web_sys::Document) {
    match app::PianoApp::mount(document) {
        Ok(app) => APP.with(|a| *a.borrow_mut() = Some(app)),
        Err(e) => log::error!("Could not build the keyboard: {e:?}"),
    }
}
