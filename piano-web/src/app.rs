use std::cell::RefCell;
use std::rc::Rc;

use piano_core::{FadeTick, KeyId, KeyboardWidget, PianoConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::audio::HtmlAudioEngine;
use crate::controls::VolumeControl;
use crate::timers::FadeTimers;

/// State shared by every event handler on the page.
struct PianoState {
    widget: KeyboardWidget<HtmlAudioEngine>,
    /// Rendered buttons, indexed like the widget's keys.
    buttons: Vec<HtmlElement>,
    timers: FadeTimers,
    volume: VolumeControl,
}

impl PianoState {
    /// Mirror a key's `pressed` flag onto its button.
    fn sync_key(&self, id: KeyId) {
        let (Some(button), Some(key)) = (self.buttons.get(id), self.widget.key(id)) else {
            return;
        };
        let pressed = if key.is_pressed() { "true" } else { "false" };
        if let Err(e) = button.set_attribute("pressed", pressed) {
            log::warn!("Could not update key {}: {e:?}", key.label());
        }
    }

    /// A press supersedes any fade still running on the key.
    fn pressed(&mut self, id: KeyId) {
        self.timers.stop(id);
        self.sync_key(id);
    }
}

type SharedState = Rc<RefCell<PianoState>>;

/// The mounted keyboard. Dropping it does not unmount: listeners keep the
/// state alive for the lifetime of the page.
pub struct PianoApp {
    _state: SharedState,
}

impl PianoApp {
    pub fn mount(document: &Document) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let mut config = PianoConfig::default();
        let container = document
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| format!("no element with id '{}'", config.container_id))?;

        for error in config.apply_attributes(|name| container.get_attribute(name)) {
            log::warn!("Ignoring container setting: {error}");
        }

        let engine = HtmlAudioEngine::new(config.sample_rate);
        let widget = KeyboardWidget::new(engine, config);

        let mut buttons = Vec::with_capacity(widget.keys().len());
        for key in widget.keys() {
            let button = document
                .create_element("button")?
                .dyn_into::<HtmlElement>()?;
            button.set_attribute("oct", &key.octave().to_string())?;
            button.set_attribute("tone", &key.tone().to_string())?;
            button.set_attribute("pressed", "false")?;
            button.set_text_content(Some(&key.label()));
            button.set_class_name(if key.is_sharp() { "key sharpFlat" } else { "key" });
            container.append_child(&button)?;
            buttons.push(button);
        }

        let state = Rc::new(RefCell::new(PianoState {
            widget,
            buttons,
            timers: FadeTimers::new(window.clone()),
            volume: VolumeControl::new(),
        }));

        let buttons = state.borrow().buttons.clone();
        for (id, button) in buttons.iter().enumerate() {
            bind_pointer(&state, button, id)?;
        }
        bind_keyboard(&state, &window)?;
        bind_volume(&state, document)?;

        Ok(Self { _state: state })
    }
}

fn press(state: &SharedState, id: KeyId) {
    let mut s = state.borrow_mut();
    s.timers.sweep();
    s.widget.press_key(id);
    s.pressed(id);
}

fn release(state: &SharedState, id: KeyId) {
    let begun = {
        let mut s = state.borrow_mut();
        s.timers.sweep();
        s.widget.release_key(id)
    };
    if begun {
        start_fade(state, id);
    }
}

fn start_fade(state: &SharedState, id: KeyId) {
    // Weak: the timer lives inside the state it ticks.
    let weak = Rc::downgrade(state);
    let callback = Closure::wrap(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            fade_tick(&state, id);
        }
    }) as Box<dyn FnMut()>);

    let mut s = state.borrow_mut();
    let interval = s.widget.config().fade_interval_ms;
    if let Err(e) = s.timers.start(id, interval, callback) {
        log::error!("Could not start fade timer: {e:?}");
    }
}

fn fade_tick(state: &SharedState, id: KeyId) {
    let mut s = state.borrow_mut();
    s.timers.sweep();
    if s.widget.fade_tick(id) == FadeTick::Done {
        s.timers.stop(id);
        s.sync_key(id);
    }
}

fn bind_pointer(state: &SharedState, button: &HtmlElement, id: KeyId) -> Result<(), JsValue> {
    let down_state = state.clone();
    let on_down = Closure::wrap(Box::new(move |_: web_sys::Event| {
        press(&down_state, id);
    }) as Box<dyn FnMut(web_sys::Event)>);
    button.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
    on_down.forget();

    let up_state = state.clone();
    let on_up = Closure::wrap(Box::new(move |_: web_sys::Event| {
        release(&up_state, id);
    }) as Box<dyn FnMut(web_sys::Event)>);
    button.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
    on_up.forget();
    Ok(())
}

fn bind_keyboard(state: &SharedState, window: &web_sys::Window) -> Result<(), JsValue> {
    let down_state = state.clone();
    let on_down = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        // Held keys auto-repeat; only the first keydown plays.
        if event.repeat() {
            return;
        }
        let mut s = down_state.borrow_mut();
        s.timers.sweep();
        if let Some(id) = s.widget.key_down(event.key_code()) {
            s.pressed(id);
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    window.add_event_listener_with_callback("keydown", on_down.as_ref().unchecked_ref())?;
    on_down.forget();

    let up_state = state.clone();
    let on_up = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let released = {
            let mut s = up_state.borrow_mut();
            s.timers.sweep();
            s.widget.key_up(event.key_code())
        };
        if let Some(id) = released {
            start_fade(&up_state, id);
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    window.add_event_listener_with_callback("keyup", on_up.as_ref().unchecked_ref())?;
    on_up.forget();
    Ok(())
}

fn bind_volume(state: &SharedState, document: &Document) -> Result<(), JsValue> {
    let s = state.borrow();
    let slider_id = s.widget.config().volume_slider_id.clone();
    let value_id = s.widget.config().volume_value_id.clone();
    drop(s);

    let Some(slider) = document.get_element_by_id(&slider_id) else {
        log::warn!("No volume slider '#{slider_id}', volume control disabled");
        return Ok(());
    };
    let slider = slider.dyn_into::<HtmlInputElement>()?;
    let readout = document.get_element_by_id(&value_id);
    match &readout {
        // The engine keeps full volume until the first change.
        Some(readout) => readout.set_text_content(Some(&slider.value())),
        None => log::warn!("No volume readout '#{value_id}'"),
    }

    let apply = {
        let state = state.clone();
        let slider = slider.clone();
        move || {
            let raw = slider.value();
            let mut s = state.borrow_mut();
            if let Some(value) = s.volume.update(&raw) {
                s.widget.set_volume(value);
            }
            if let Some(readout) = &readout {
                readout.set_text_content(Some(&s.volume.readout));
            }
        }
    };

    let on_change =
        Closure::wrap(Box::new(move |_: web_sys::Event| apply()) as Box<dyn FnMut(web_sys::Event)>);
    slider.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}
