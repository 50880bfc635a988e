use std::collections::HashMap;

use piano_core::KeyId;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

struct FadeTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

/// One `setInterval` per fading key.
///
/// A stopped timer's closure may be the one currently executing, so it is
/// parked in `retired` and only dropped by the next [`sweep`](Self::sweep).
pub struct FadeTimers {
    window: Window,
    active: HashMap<KeyId, FadeTimer>,
    retired: Vec<FadeTimer>,
}

impl FadeTimers {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            active: HashMap::new(),
            retired: Vec::new(),
        }
    }

    pub fn start(
        &mut self,
        id: KeyId,
        interval_ms: u32,
        callback: Closure<dyn FnMut()>,
    ) -> Result<(), JsValue> {
        self.stop(id);
        let handle = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                interval_ms as i32,
            )?;
        self.active.insert(
            id,
            FadeTimer {
                handle,
                _callback: callback,
            },
        );
        Ok(())
    }

    pub fn stop(&mut self, id: KeyId) {
        if let Some(timer) = self.active.remove(&id) {
            self.window.clear_interval_with_handle(timer.handle);
            self.retired.push(timer);
        }
    }

    /// Drop closures of timers stopped earlier. Never call from inside a
    /// callback that is itself retired.
    pub fn sweep(&mut self) {
        self.retired.clear();
    }
}
