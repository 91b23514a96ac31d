//! Browser host
//!
//! Captures an `HTMLCanvasElement` through `captureStream()`, encodes it with
//! `MediaRecorder`, and saves the result through an object URL bound to a
//! hidden anchor element.

use super::traits::{CaptureHandle, CaptureOptions, RecordedMedia, RecordingHost, RecordingSink};
use crate::utils::error::{RecorderError, RecorderResult};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Blob, BlobEvent, HtmlAnchorElement, HtmlCanvasElement, MediaRecorder, MediaRecorderOptions,
    MediaStream, Url,
};

impl RecordedMedia for Blob {
    fn size_bytes(&self) -> u64 {
        self.size() as u64
    }
}

fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Host backed by the browser's media APIs
#[derive(Debug, Clone)]
pub struct WebHost {
    canvas: HtmlCanvasElement,
}

impl WebHost {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    fn click_download_link(&self, url: &str, file_name: &str) -> RecorderResult<()> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| RecorderError::Download("no document available".into()))?;

        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| RecorderError::Download(js_message(&e)))?
            .dyn_into()
            .map_err(|_| RecorderError::Download("created element is not an anchor".into()))?;

        anchor.set_href(url);
        anchor.set_download(file_name);
        anchor.click();
        Ok(())
    }
}

impl RecordingHost for WebHost {
    type Recording = Blob;
    type Capture = WebCapture;

    fn is_type_supported(&self, mime_type: &str) -> bool {
        MediaRecorder::is_type_supported(mime_type)
    }

    fn open_capture(
        &self,
        options: &CaptureOptions,
        sink: RecordingSink<Blob>,
    ) -> RecorderResult<WebCapture> {
        let stream = self
            .canvas
            .capture_stream()
            .map_err(|e| RecorderError::Capture(js_message(&e)))?;

        let recorder_options = MediaRecorderOptions::new();
        recorder_options.set_mime_type(&options.mime_type);
        recorder_options.set_video_bits_per_second(options.video_bits_per_second);

        let recorder =
            MediaRecorder::new_with_media_stream_and_media_recorder_options(&stream, &recorder_options)
                .map_err(|e| RecorderError::Capture(js_message(&e)))?;

        // Without a timeslice the recorder emits a single chunk holding the whole recording.
        let mut sink = Some(sink);
        let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
            let Some(sink) = sink.take() else {
                tracing::warn!("Ignoring extra dataavailable event");
                return;
            };
            match event.data() {
                Some(blob) => sink.deliver(blob),
                None => tracing::warn!("dataavailable event carried no data"),
            }
        });
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

        Ok(WebCapture {
            recorder,
            _stream: stream,
            _on_data: on_data,
        })
    }

    fn trigger_download(&self, recording: &Blob, file_name: &str) -> RecorderResult<()> {
        let url = Url::create_object_url_with_blob(recording)
            .map_err(|e| RecorderError::Download(js_message(&e)))?;

        let result = self.click_download_link(&url, file_name);

        if let Err(e) = Url::revoke_object_url(&url) {
            tracing::warn!("Failed to revoke object URL: {}", js_message(&e));
        }
        result
    }
}

/// A live `MediaRecorder` on the canvas stream
pub struct WebCapture {
    recorder: MediaRecorder,
    _stream: MediaStream,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl CaptureHandle for WebCapture {
    fn start(&mut self) -> RecorderResult<()> {
        self.recorder
            .start()
            .map_err(|e| RecorderError::Capture(js_message(&e)))
    }

    fn stop(&mut self) -> RecorderResult<()> {
        self.recorder
            .stop()
            .map_err(|e| RecorderError::Capture(js_message(&e)))
    }
}

impl Drop for WebCapture {
    fn drop(&mut self) {
        // The closure is freed with us; the recorder must not call into it afterwards.
        self.recorder.set_ondataavailable(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        web_sys::window()
            .and_then(|window| window.document())
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_rejects_unknown_type() {
        let host = WebHost::new(canvas());
        assert!(!host.is_type_supported("video/not-a-format"));
    }

    #[wasm_bindgen_test]
    fn test_browser_supports_a_default_type() {
        let host = WebHost::new(canvas());
        let selected = crate::capture::select_mime_type(
            crate::capture::DEFAULT_MIME_TYPES,
            |m| host.is_type_supported(m),
        );
        assert!(selected.is_some());
    }

    #[wasm_bindgen_test]
    async fn test_record_and_save_with_default_name() {
        let host = WebHost::new(canvas());
        let mut recorder =
            crate::recorder::CanvasRecorder::new(host, crate::recorder::RecorderConfig::default());

        recorder.start().unwrap();
        let pending = recorder.stop_and_save(None).unwrap();
        assert_eq!(pending.file_name(), "recording.webm");

        let saved = pending.await.unwrap();
        assert_eq!(saved.file_name, "recording.webm");
    }
}
