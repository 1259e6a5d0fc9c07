//! `HTMLAudioElement` as a [`MediaElement`]

use crate::error::{PlaybackError, Result};
use crate::media::MediaElement;
use js_sys::Promise;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, HtmlAudioElement};

/// Browser audio element driven by the controller
///
/// `play()` in the browser returns a promise; a synchronous throw is reported
/// immediately, while the promise is parked here for the binding to await so
/// late rejections (autoplay policy, network) reach the controller too.
pub struct HtmlMediaElement {
    element: HtmlAudioElement,
    pending_play: Option<Promise>,
}

impl HtmlMediaElement {
    /// Create a detached audio element
    pub fn new() -> std::result::Result<Self, JsValue> {
        let element = HtmlAudioElement::new()?;
        element.set_preload("auto");
        Ok(Self::from_element(element))
    }

    /// Wrap an element that already lives in the page
    pub fn from_element(element: HtmlAudioElement) -> Self {
        Self {
            element,
            pending_play: None,
        }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Promise from the most recent `play()` call, if not yet collected
    pub fn take_pending_play(&mut self) -> Option<Promise> {
        self.pending_play.take()
    }
}

impl MediaElement for HtmlMediaElement {
    fn load(&mut self, src: &str) {
        self.element.set_src(src);
        self.element.load();
    }

    fn play(&mut self) -> Result<()> {
        match self.element.play() {
            Ok(promise) => {
                self.pending_play = Some(promise);
                Ok(())
            }
            Err(err) => Err(PlaybackError::MediaRejected(describe_js_error(&err))),
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.element.pause() {
            tracing::warn!("pause() failed: {}", describe_js_error(&err));
        }
    }

    fn seek(&mut self, position: f64) {
        self.element.set_current_time(position);
    }

    fn set_volume(&mut self, gain: f64) {
        self.element.set_volume(gain.clamp(0.0, 1.0));
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }
}

/// Human-readable text for a thrown JS value
pub fn describe_js_error(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }

    err.as_string()
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Whether a `play()` rejection only means a newer source superseded it
///
/// Loading a new source rejects the previous pending play promise with an
/// `AbortError`; that is not a failure of the current track.
pub fn is_superseded(err: &JsValue) -> bool {
    err.dyn_ref::<DomException>()
        .is_some_and(|exception| exception.name() == "AbortError")
}
