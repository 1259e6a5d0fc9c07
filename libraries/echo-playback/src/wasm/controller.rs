//! WASM-compatible PlaybackController wrapper

use super::media::{describe_js_error, is_superseded, HtmlMediaElement};
use crate::{MediaEvent, PlaybackConfig, PlaybackController, Track};
use js_sys::{Function, Promise};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// State shared between the JS-facing wrapper and element listeners
#[derive(Clone)]
struct Shared {
    controller: Rc<RefCell<PlaybackController<HtmlMediaElement>>>,

    /// Media notifications waiting for the controller to be free
    inbox: Rc<RefCell<VecDeque<MediaEvent>>>,

    on_event: Rc<RefCell<Option<Function>>>,
}

impl Shared {
    /// Queue a media notification and process it if nothing else holds the
    /// controller
    fn deliver(&self, event: MediaEvent) {
        self.inbox.borrow_mut().push_back(event);
        self.flush();
    }

    /// Replay parked notifications, then publish events and watch new play
    /// promises
    ///
    /// An element callback that fires while an intent holds the controller
    /// stays in the inbox; the intent flushes it on the way out.
    fn flush(&self) {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };

        loop {
            let next = self.inbox.borrow_mut().pop_front();
            match next {
                Some(event) => controller.handle_media_event(event),
                None => break,
            }
        }

        let events = controller.drain_events();
        let pending_play = controller.media_mut().take_pending_play();
        drop(controller);

        if let Some(callback) = self.on_event.borrow().as_ref() {
            for event in events {
                match serde_wasm_bindgen::to_value(&event) {
                    Ok(value) => {
                        callback.call1(&JsValue::NULL, &value).ok();
                    }
                    Err(e) => tracing::warn!("Failed to serialize {:?}: {}", event, e),
                }
            }
        }

        if let Some(promise) = pending_play {
            self.watch_play(promise);
        }
    }

    fn watch_play(&self, promise: Promise) {
        let shared = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                if is_superseded(&err) {
                    tracing::debug!("Play promise superseded by a newer source");
                } else {
                    shared.deliver(MediaEvent::PlayRejected {
                        reason: describe_js_error(&err),
                    });
                }
            }
        });
    }
}

/// WASM-compatible playback controller
///
/// The single playback store for a page. Create one and hand it to whatever
/// renders the transport bar.
#[wasm_bindgen]
pub struct WasmPlaybackController {
    shared: Shared,

    // Kept alive for as long as the element may fire
    _listeners: Vec<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl WasmPlaybackController {
    /// Create a controller with its own detached audio element
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlaybackController, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let media = HtmlMediaElement::new()?;
        let element = media.element().clone();

        let shared = Shared {
            controller: Rc::new(RefCell::new(PlaybackController::new(media, config))),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            on_event: Rc::new(RefCell::new(None)),
        };

        let mut listeners = Vec::new();

        let source = element.clone();
        listeners.push(listen(&element, "loadedmetadata", &shared, move || {
            MediaEvent::MetadataLoaded {
                duration: source.duration(),
            }
        })?);

        let source = element.clone();
        listeners.push(listen(&element, "timeupdate", &shared, move || {
            MediaEvent::TimeUpdate {
                current_time: source.current_time(),
            }
        })?);

        listeners.push(listen(&element, "playing", &shared, || MediaEvent::Playing)?);
        listeners.push(listen(&element, "pause", &shared, || MediaEvent::Paused)?);
        listeners.push(listen(&element, "ended", &shared, || MediaEvent::Ended)?);

        let source = element.clone();
        listeners.push(listen(&element, "error", &shared, move || {
            let reason = source
                .error()
                .map(|e| format!("MediaError code {}: {}", e.code(), e.message()))
                .unwrap_or_else(|| "Unknown media error".to_string());
            MediaEvent::PlayRejected { reason }
        })?);

        Ok(Self {
            shared,
            _listeners: listeners,
        })
    }

    // ===== Playback Control =====

    /// Replace the queue with `tracks` (array of track objects) and play
    #[wasm_bindgen(js_name = loadQueueAndPlay)]
    pub fn load_queue_and_play(&mut self, tracks: JsValue, start_index: usize) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;

        self.with(|c| c.load_queue_and_play(tracks, start_index));
        Ok(())
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) {
        self.with(|c| c.toggle_play_pause());
    }

    pub fn play(&mut self) {
        self.with(|c| c.play());
    }

    pub fn pause(&mut self) {
        self.with(|c| c.pause());
    }

    pub fn next(&mut self) {
        self.with(|c| c.next());
    }

    pub fn previous(&mut self) {
        self.with(|c| c.previous());
    }

    #[wasm_bindgen(js_name = playIndex)]
    pub fn play_index(&mut self, index: usize) -> Result<(), JsValue> {
        self.with(|c| c.play_index(index))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn close(&mut self) {
        self.with(|c| c.close());
    }

    pub fn show(&mut self) {
        self.with(|c| c.show());
    }

    // ===== Seeking =====

    /// Seek to position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        self.with(|c| c.seek(position_secs));
    }

    /// Seek by fraction of the duration (0.0 - 1.0)
    #[wasm_bindgen(js_name = seekToPercent)]
    pub fn seek_to_percent(&mut self, fraction: f64) -> Result<(), JsValue> {
        self.with(|c| c.seek_to_percent(fraction))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&mut self, delta_secs: f64) {
        self.with(|c| c.seek_by(delta_secs));
    }

    #[wasm_bindgen(js_name = skipForward)]
    pub fn skip_forward(&mut self) {
        self.with(|c| c.skip_forward());
    }

    #[wasm_bindgen(js_name = skipBackward)]
    pub fn skip_backward(&mut self) {
        self.with(|c| c.skip_backward());
    }

    // ===== Volume Control =====

    /// Set volume (0-100)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: u8) {
        self.with(|c| c.set_volume(level));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.with(|c| c.toggle_mute());
    }

    // ===== Shuffle & Repeat =====

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.with(|c| c.toggle_shuffle());
    }

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&mut self) {
        self.with(|c| c.toggle_repeat());
    }

    // ===== State Queries =====

    /// Full render snapshot as a plain object
    pub fn snapshot(&self) -> JsValue {
        let snapshot = self.shared.controller.borrow().snapshot();
        serde_wasm_bindgen::to_value(&snapshot).unwrap_or(JsValue::NULL)
    }

    /// Current track as a plain object, or `null`
    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        let controller = self.shared.controller.borrow();
        controller
            .current_track()
            .and_then(|track| serde_wasm_bindgen::to_value(track).ok())
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.controller.borrow().is_playing()
    }

    /// The audio element, for hosts that want to attach it to the DOM
    pub fn element(&self) -> web_sys::HtmlAudioElement {
        self.shared.controller.borrow().media().element().clone()
    }

    // ===== Event Listeners =====

    /// Register the playback event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        *self.shared.on_event.borrow_mut() = Some(callback);
    }

    // ===== Internal =====

    /// Run an intent, then replay anything the element raised meanwhile
    fn with<T>(&mut self, f: impl FnOnce(&mut PlaybackController<HtmlMediaElement>) -> T) -> T {
        let result = f(&mut self.shared.controller.borrow_mut());
        self.shared.flush();
        result
    }
}

/// Attach a listener that turns an element event into a [`MediaEvent`]
fn listen(
    element: &web_sys::HtmlAudioElement,
    name: &str,
    shared: &Shared,
    mut to_event: impl FnMut() -> MediaEvent + 'static,
) -> Result<Closure<dyn FnMut()>, JsValue> {
    let shared = shared.clone();
    let closure = Closure::<dyn FnMut()>::new(move || shared.deliver(to_event()));
    element.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}
