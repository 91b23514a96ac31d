//! JavaScript bindings
//!
//! Exposes the recorder to JavaScript as `CanvasRecorder`:
//!
//! ```js
//! const recorder = new CanvasRecorder(canvas, 8_000_000);
//! recorder.start();
//! await recorder.stopAndSave("clip.webm");
//! ```

use crate::capture::web::WebHost;
use crate::recorder::{CanvasRecorder, RecorderConfig};
use crate::utils::error::{ErrorResponse, RecorderError};
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

fn to_js_error(error: RecorderError) -> JsValue {
    let response = ErrorResponse::from(error);
    match serde_json::to_string(&response) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&response.message),
    }
}

#[wasm_bindgen(js_name = CanvasRecorder)]
pub struct JsCanvasRecorder {
    inner: CanvasRecorder<WebHost>,
}

#[wasm_bindgen(js_class = CanvasRecorder)]
impl JsCanvasRecorder {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, video_bits_per_second: Option<u32>) -> JsCanvasRecorder {
        Self {
            inner: CanvasRecorder::new(
                WebHost::new(canvas),
                RecorderConfig::with_video_bits_per_second(video_bits_per_second),
            ),
        }
    }

    /// Start recording; throws when no recording format is supported
    pub fn start(&mut self) -> Result<(), JsValue> {
        self.inner.start().map(|_| ()).map_err(to_js_error)
    }

    /// Stop recording; the promise resolves with the saved recording once the
    /// download was triggered
    #[wasm_bindgen(js_name = stopAndSave)]
    pub fn stop_and_save(&mut self, file_name: Option<String>) -> Result<Promise, JsValue> {
        let pending = self
            .inner
            .stop_and_save(file_name.as_deref())
            .map_err(to_js_error)?;

        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let saved = pending.finish().await.map_err(to_js_error)?;
            let json = serde_json::to_string(&saved)
                .map_err(|e| to_js_error(RecorderError::Serialization(e)))?;
            js_sys::JSON::parse(&json)
        }))
    }

    /// "idle" or "recording"
    pub fn state(&self) -> String {
        match self.inner.state() {
            crate::recorder::RecordingState::Idle => "idle".to_string(),
            crate::recorder::RecordingState::Recording => "recording".to_string(),
        }
    }
}
