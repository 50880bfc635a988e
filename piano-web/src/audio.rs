use std::rc::Rc;

use piano_core::engine::instrument_by_name;
use piano_core::{ClipStore, EngineError, PlaybackHandle, SynthEngine, Tone};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAudioElement, Url};

/// Plays rendered tone clips through `<audio>` elements.
///
/// Each clip is rendered once, wrapped in a WAV blob and kept as an object URL
/// until the master volume changes. Every `play` creates a fresh element so the
/// same tone can sound on several keys at once.
pub struct HtmlAudioEngine {
    clips: ClipStore<Rc<ObjectUrl>>,
}

impl HtmlAudioEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            clips: ClipStore::new(sample_rate),
        }
    }
}

impl SynthEngine for HtmlAudioEngine {
    type Handle = AudioHandle;

    fn set_volume(&mut self, volume: f32) {
        // Handles still playing a stale clip keep its URL alive.
        drop(self.clips.set_volume(volume));
    }

    fn play(
        &mut self,
        instrument: &str,
        tone: Tone,
        octave: u8,
        duration: f32,
    ) -> Result<AudioHandle, EngineError> {
        let instrument = instrument_by_name(instrument)?;
        let url = Rc::clone(self.clips.get_or_try_insert_with(
            instrument,
            tone,
            octave,
            duration,
            |wav| wav_object_url(wav).map(Rc::new),
        )?);
        let element = HtmlAudioElement::new_with_src(&url.0).map_err(host_error)?;
        let promise = element.play().map_err(host_error)?;

        // Autoplay policy rejects playback before the first user gesture.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Playback of {tone}{octave} rejected: {e:?}");
            }
        });

        Ok(AudioHandle {
            element,
            _url: url,
        })
    }
}

/// A playing `<audio>` element. Holds its clip's URL so the blob outlives a
/// volume change that happens mid-playback.
pub struct AudioHandle {
    element: HtmlAudioElement,
    _url: Rc<ObjectUrl>,
}

impl PlaybackHandle for AudioHandle {
    fn volume(&self) -> f32 {
        self.element.volume() as f32
    }

    fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(volume.clamp(0.0, 1.0) as f64);
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            log::warn!("Could not pause playback: {e:?}");
        }
    }

    fn ended(&self) -> bool {
        self.element.ended()
    }
}

/// A blob URL, revoked when the last owner lets go of it.
pub struct ObjectUrl(String);

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if let Err(e) = Url::revoke_object_url(&self.0) {
            log::warn!("Could not revoke {}: {e:?}", self.0);
        }
    }
}

fn wav_object_url(wav: &[u8]) -> Result<ObjectUrl, EngineError> {
    let bytes = js_sys::Uint8Array::from(wav);
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type("audio/wav");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(host_error)?;
    Url::create_object_url_with_blob(&blob)
        .map(ObjectUrl)
        .map_err(host_error)
}

fn host_error(e: JsValue) -> EngineError {
    EngineError::Host(format!("{e:?}"))
}
