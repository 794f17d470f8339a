//! Request → recognition → (transliteration) → translation → synthesis → broadcast.

use std::sync::Arc;

use metrics::counter;
use parley_core::{
    BroadcastMessage, EngineSet, PipelineError, Recognition, RecognitionError,
    TranslateRequestBody, TranslationRequest, TranslationResult,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::workers::{WorkerError, WorkerPool};
use crate::metrics::{PIPELINE_FAILURES_TOTAL, PIPELINE_NO_SPEECH_TOTAL};

/// Values stamped on every run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Broadcast topic.
    pub topic: String,
    /// Broadcast sender tag.
    pub sender: String,
    /// Target used when a request sends a blank one.
    pub default_target_language: String,
    /// Largest decoded audio accepted.
    pub max_audio_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: "global_topic".into(),
            sender: "web".into(),
            default_target_language: "en".into(),
            max_audio_bytes: 26_214_400,
        }
    }
}

/// Runs translation requests against an [`EngineSet`].
///
/// Engine calls go through the [`WorkerPool`]. A successful run is handed
/// to the broadcast channel before returning; delivery happens elsewhere.
pub struct Pipeline {
    engines: EngineSet,
    workers: WorkerPool,
    config: PipelineConfig,
    broadcasts: mpsc::UnboundedSender<BroadcastMessage>,
}

impl Pipeline {
    /// Create a pipeline publishing to `broadcasts`.
    pub fn new(
        engines: EngineSet,
        workers: WorkerPool,
        config: PipelineConfig,
        broadcasts: mpsc::UnboundedSender<BroadcastMessage>,
    ) -> Self {
        Self {
            engines,
            workers,
            config,
            broadcasts,
        }
    }

    /// Whether transliteration was available at startup.
    pub fn has_transliteration(&self) -> bool {
        self.engines.has_transliteration()
    }

    /// Run one request end to end.
    #[instrument(skip_all, fields(source = %body.input_language, target = %body.target_language))]
    pub async fn run(&self, body: TranslateRequestBody) -> Result<TranslationResult, PipelineError> {
        let outcome = self.execute(body).await;
        match &outcome {
            Ok(result) if result.is_empty() => {
                counter!(PIPELINE_NO_SPEECH_TOTAL).increment(1);
                info!("no speech recognized");
            }
            Ok(result) => info!(
                recognized_chars = result.recognized_text.chars().count(),
                audio_bytes = result.audio.len(),
                "pipeline completed"
            ),
            Err(err) => {
                counter!(PIPELINE_FAILURES_TOTAL, "kind" => err.error_kind()).increment(1);
                if err.is_client_error() {
                    info!(kind = err.error_kind(), error = %err, "request rejected");
                } else {
                    warn!(kind = err.error_kind(), error = %err, "pipeline failed");
                }
            }
        }
        outcome
    }

    async fn execute(
        &self,
        mut body: TranslateRequestBody,
    ) -> Result<TranslationResult, PipelineError> {
        if body.target_language.trim().is_empty() {
            body.target_language.clone_from(&self.config.default_target_language);
        }
        let request = TranslationRequest::from_body(body, self.config.max_audio_bytes)?;

        let Some(recognized) = self.recognize(&request).await? else {
            return Ok(TranslationResult::empty());
        };
        let source_text = self.transliterate(&request, &recognized).await;
        let translated = self.translate(&request, source_text).await?;
        let audio = self.synthesize(&request, translated.clone()).await?;

        let result = TranslationResult {
            recognized_text: recognized,
            translated_text: translated,
            audio,
            audio_mime: self.engines.synthesizer.mime_type().to_string(),
        };
        self.publish(&result);
        Ok(result)
    }

    async fn recognize(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<String>, PipelineError> {
        let recognizer = Arc::clone(&self.engines.recognizer);
        let audio = request.audio.clone();
        let source = request.source.clone();

        match self.workers.run(move || recognizer.recognize(&audio, &source)).await {
            Ok(Ok(Recognition::Speech(text))) if !text.trim().is_empty() => Ok(Some(text)),
            Ok(Ok(_)) => Ok(None),
            Ok(Err(RecognitionError::Service(msg))) => Err(PipelineError::RecognitionService(msg)),
            Ok(Err(RecognitionError::Internal(msg))) => {
                Err(PipelineError::RecognitionInternal(msg))
            }
            Err(err @ WorkerError::TimedOut(_)) => {
                Err(PipelineError::RecognitionService(err.to_string()))
            }
            Err(err) => Err(PipelineError::RecognitionInternal(err.to_string())),
        }
    }

    /// Falls back to `recognized` on any failure.
    async fn transliterate(&self, request: &TranslationRequest, recognized: &str) -> String {
        if !request.wants_transliteration() {
            return recognized.to_string();
        }
        let Some(transliterator) = self.engines.transliterator.clone() else {
            debug!("transliteration requested but unavailable");
            return recognized.to_string();
        };

        let text = recognized.to_string();
        let language = request.source.as_str().to_string();
        match self
            .workers
            .run(move || transliterator.transliterate(&text, &language))
            .await
        {
            Ok(Ok(converted)) if !converted.trim().is_empty() => converted,
            Ok(Ok(_)) => recognized.to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "transliteration failed, using recognized text");
                recognized.to_string()
            }
            Err(e) => {
                warn!(error = %e, "transliteration failed, using recognized text");
                recognized.to_string()
            }
        }
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
        text: String,
    ) -> Result<String, PipelineError> {
        let translator = Arc::clone(&self.engines.translator);
        let source = request.source.clone();
        let target = request.target.clone();

        match self
            .workers
            .run(move || translator.translate(&text, &source, &target))
            .await
        {
            Ok(Ok(translated)) => Ok(translated),
            Ok(Err(e)) => Err(PipelineError::Translation(e.to_string())),
            Err(e) => Err(PipelineError::Translation(e.to_string())),
        }
    }

    async fn synthesize(
        &self,
        request: &TranslationRequest,
        text: String,
    ) -> Result<Vec<u8>, PipelineError> {
        let synthesizer = Arc::clone(&self.engines.synthesizer);
        let language = request.target.clone();

        match self
            .workers
            .run(move || synthesizer.synthesize(&text, &language))
            .await
        {
            Ok(Ok(audio)) => Ok(audio),
            Ok(Err(e)) => Err(PipelineError::Synthesis(e.to_string())),
            Err(e) => Err(PipelineError::Synthesis(e.to_string())),
        }
    }

    fn publish(&self, result: &TranslationResult) {
        let message = result.to_broadcast(&self.config.topic, &self.config.sender);
        if self.broadcasts.send(message).is_err() {
            warn!("broadcast channel closed, result not published");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::mock;
    use parley_core::audio::encode_base64;
    use parley_core::{
        EngineError, SourceLanguage, SpeechRecognizer, SpeechSynthesizer, Translator,
        Transliterator,
    };

    use super::*;

    mock! {
        pub Recognizer {}
        impl SpeechRecognizer for Recognizer {
            fn recognize(
                &self,
                audio: &[u8],
                language: &SourceLanguage,
            ) -> Result<Recognition, RecognitionError>;
        }
    }

    mock! {
        pub Translate {}
        impl Translator for Translate {
            fn translate(
                &self,
                text: &str,
                source: &SourceLanguage,
                target: &str,
            ) -> Result<String, EngineError>;
        }
    }

    mock! {
        pub Synth {}
        impl SpeechSynthesizer for Synth {
            fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, EngineError>;
        }
    }

    mock! {
        pub Translit {}
        impl Transliterator for Translit {
            fn transliterate(&self, text: &str, language: &str) -> Result<String, EngineError>;
        }
    }

    struct Harness {
        pipeline: Pipeline,
        rx: mpsc::UnboundedReceiver<BroadcastMessage>,
    }

    fn harness_with(
        recognizer: MockRecognizer,
        translator: MockTranslate,
        synthesizer: MockSynth,
        transliterator: Option<MockTranslit>,
        timeout: Duration,
    ) -> Harness {
        let mut engines = EngineSet::new(
            Arc::new(recognizer),
            Arc::new(translator),
            Arc::new(synthesizer),
        );
        if let Some(t) = transliterator {
            engines = engines.with_transliterator(Arc::new(t));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = Pipeline::new(
            engines,
            WorkerPool::new(4, timeout),
            PipelineConfig::default(),
            tx,
        );
        Harness { pipeline, rx }
    }

    fn harness(
        recognizer: MockRecognizer,
        translator: MockTranslate,
        synthesizer: MockSynth,
    ) -> Harness {
        harness_with(recognizer, translator, synthesizer, None, Duration::from_secs(5))
    }

    fn recognizer_saying(text: &'static str) -> MockRecognizer {
        let mut m = MockRecognizer::new();
        let _ = m
            .expect_recognize()
            .returning(move |_, _| Ok(Recognition::from_text(text)));
        m
    }

    fn translator_upper() -> MockTranslate {
        let mut m = MockTranslate::new();
        let _ = m
            .expect_translate()
            .returning(|text, _, _| Ok(text.to_uppercase()));
        m
    }

    fn synth_ok() -> MockSynth {
        let mut m = MockSynth::new();
        let _ = m.expect_synthesize().returning(|_, _| Ok(b"ID3".to_vec()));
        m
    }

    fn body(input_language: &str, target: &str) -> TranslateRequestBody {
        TranslateRequestBody {
            input_language: input_language.into(),
            target_language: target.into(),
            audio_b64: encode_base64(b"RIFF....WAVEfmt "),
            audio_format: "wav".into(),
            transliterate: false,
        }
    }

    #[tokio::test]
    async fn full_run_returns_and_broadcasts() {
        let mut translator = MockTranslate::new();
        let _ = translator
            .expect_translate()
            .withf(|text, source, target| {
                text == "hola mundo" && *source == SourceLanguage::Code("es".into()) && target == "en"
            })
            .times(1)
            .returning(|_, _, _| Ok("hello world".into()));
        let mut synth = MockSynth::new();
        let _ = synth
            .expect_synthesize()
            .withf(|text, language| text == "hello world" && language == "en")
            .times(1)
            .returning(|_, _| Ok(vec![1, 2, 3]));

        let mut h = harness(recognizer_saying("hola mundo"), translator, synth);
        let result = h.pipeline.run(body("es", "en")).await.unwrap();

        assert_eq!(result.recognized_text, "hola mundo");
        assert_eq!(result.translated_text, "hello world");
        assert_eq!(result.audio, vec![1, 2, 3]);
        assert_eq!(result.audio_mime, "audio/mpeg");

        let message = h.rx.try_recv().unwrap();
        assert_eq!(message.topic, "global_topic");
        assert_eq!(message.sender, "web");
        assert_eq!(message.recognized_text, "hola mundo");
        assert_eq!(message.audio_b64, encode_base64(&[1, 2, 3]));
        assert!(h.rx.try_recv().is_err(), "exactly one broadcast");
    }

    #[tokio::test]
    async fn invalid_request_calls_no_engine() {
        let mut recognizer = MockRecognizer::new();
        let _ = recognizer.expect_recognize().never();
        let mut translator = MockTranslate::new();
        let _ = translator.expect_translate().never();
        let mut synth = MockSynth::new();
        let _ = synth.expect_synthesize().never();
        let mut h = harness(recognizer, translator, synth);

        let mut mp3 = body("auto", "en");
        mp3.audio_format = "mp3".into();
        let err = h.pipeline.run(mp3).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.hint().is_some());

        let mut missing = body("auto", "en");
        missing.audio_b64 = String::new();
        let err = h.pipeline.run(missing).await.unwrap_err();
        assert_eq!(err, PipelineError::invalid("audio_b64 missing"));

        let mut garbage = body("auto", "en");
        garbage.audio_b64 = "!!!not base64!!!".into();
        let err = h.pipeline.run(garbage).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid base64"));

        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn no_speech_is_empty_success_without_broadcast() {
        let mut translator = MockTranslate::new();
        let _ = translator.expect_translate().never();
        let mut synth = MockSynth::new();
        let _ = synth.expect_synthesize().never();
        let mut h = harness(recognizer_saying("   "), translator, synth);

        let result = h.pipeline.run(body("auto", "en")).await.unwrap();
        assert_eq!(result, TranslationResult::empty());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn whitespace_speech_counts_as_empty() {
        let mut recognizer = MockRecognizer::new();
        let _ = recognizer
            .expect_recognize()
            .returning(|_, _| Ok(Recognition::Speech(" \n ".into())));
        let mut translator = MockTranslate::new();
        let _ = translator.expect_translate().never();
        let mut h = harness(recognizer, translator, synth_ok());

        let result = h.pipeline.run(body("auto", "en")).await.unwrap();
        assert!(result.is_empty());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn recognition_failures_map_by_fault() {
        let mut service = MockRecognizer::new();
        let _ = service
            .expect_recognize()
            .returning(|_, _| Err(RecognitionError::Service("HTTP 503".into())));
        let mut h = harness(service, translator_upper(), synth_ok());
        let err = h.pipeline.run(body("auto", "en")).await.unwrap_err();
        assert_eq!(err.error_kind(), "recognition_service");
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "STT request failed: HTTP 503");
        assert!(h.rx.try_recv().is_err());

        let mut internal = MockRecognizer::new();
        let _ = internal
            .expect_recognize()
            .returning(|_, _| Err(RecognitionError::Internal("bad wav".into())));
        let mut h = harness(internal, translator_upper(), synth_ok());
        let err = h.pipeline.run(body("auto", "en")).await.unwrap_err();
        assert_eq!(err.error_kind(), "recognition_internal");
        assert_eq!(err.status_code(), 500);
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn recognition_timeout_is_service_failure() {
        let mut slow = MockRecognizer::new();
        let _ = slow.expect_recognize().returning(|_, _| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Recognition::from_text("late"))
        });
        let mut h = harness_with(
            slow,
            translator_upper(),
            synth_ok(),
            None,
            Duration::from_millis(30),
        );

        let err = h.pipeline.run(body("auto", "en")).await.unwrap_err();
        assert_eq!(err.error_kind(), "recognition_service");
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn recognizer_panic_is_internal_failure() {
        let mut broken = MockRecognizer::new();
        let _ = broken
            .expect_recognize()
            .returning(|_, _| panic!("decoder crashed"));
        let h = harness(broken, translator_upper(), synth_ok());

        let err = h.pipeline.run(body("auto", "en")).await.unwrap_err();
        assert_eq!(err.error_kind(), "recognition_internal");
    }

    #[tokio::test]
    async fn translation_failure_stops_before_synthesis() {
        let mut translator = MockTranslate::new();
        let _ = translator
            .expect_translate()
            .returning(|_, _, _| Err(EngineError::Unavailable("connect refused".into())));
        let mut synth = MockSynth::new();
        let _ = synth.expect_synthesize().never();
        let mut h = harness(recognizer_saying("hola"), translator, synth);

        let err = h.pipeline.run(body("es", "en")).await.unwrap_err();
        assert_eq!(err.error_kind(), "translation");
        assert_eq!(err.status_code(), 502);
        assert!(err.to_string().starts_with("Translation failed: "));
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn synthesis_failure_prevents_broadcast() {
        let mut synth = MockSynth::new();
        let _ = synth
            .expect_synthesize()
            .returning(|_, _| Err(EngineError::Rejected("HTTP 400".into())));
        let mut h = harness(recognizer_saying("hola"), translator_upper(), synth);

        let err = h.pipeline.run(body("es", "fr")).await.unwrap_err();
        assert_eq!(err.error_kind(), "synthesis");
        assert!(err.to_string().starts_with("TTS failed: "));
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn blank_target_uses_default_language() {
        let mut translator = MockTranslate::new();
        let _ = translator
            .expect_translate()
            .withf(|_, _, target| target == "en")
            .returning(|_, _, _| Ok("hi".into()));
        let mut synth = MockSynth::new();
        let _ = synth
            .expect_synthesize()
            .withf(|_, language| language == "en")
            .returning(|_, _| Ok(vec![0]));
        let h = harness(recognizer_saying("hola"), translator, synth);

        let result = h.pipeline.run(body("es", "  ")).await.unwrap();
        assert_eq!(result.translated_text, "hi");
    }

    #[tokio::test]
    async fn transliteration_feeds_translation_but_not_response() {
        let mut translit = MockTranslit::new();
        let _ = translit
            .expect_transliterate()
            .withf(|text, language| text == "namaste" && language == "hi")
            .times(1)
            .returning(|_, _| Ok("नमस्ते".into()));
        let mut translator = MockTranslate::new();
        let _ = translator
            .expect_translate()
            .withf(|text, _, _| text == "नमस्ते")
            .returning(|_, _, _| Ok("hello".into()));
        let h = harness_with(
            recognizer_saying("namaste"),
            translator,
            synth_ok(),
            Some(translit),
            Duration::from_secs(5),
        );

        let mut request = body("hi", "en");
        request.transliterate = true;
        let result = h.pipeline.run(request).await.unwrap();
        assert_eq!(result.recognized_text, "namaste");
        assert_eq!(result.translated_text, "hello");
    }

    #[tokio::test]
    async fn transliteration_failure_falls_back() {
        let mut translit = MockTranslit::new();
        let _ = translit
            .expect_transliterate()
            .returning(|_, _| Err(EngineError::Unavailable("timeout".into())));
        let mut translator = MockTranslate::new();
        let _ = translator
            .expect_translate()
            .withf(|text, _, _| text == "namaste")
            .times(1)
            .returning(|_, _, _| Ok("hello".into()));
        let h = harness_with(
            recognizer_saying("namaste"),
            translator,
            synth_ok(),
            Some(translit),
            Duration::from_secs(5),
        );

        let mut request = body("hi", "en");
        request.transliterate = true;
        let result = h.pipeline.run(request).await.unwrap();
        assert_eq!(result.translated_text, "hello");
    }

    #[tokio::test]
    async fn transliteration_skipped_for_auto_and_english() {
        let mut translit = MockTranslit::new();
        let _ = translit.expect_transliterate().never();
        let h = harness_with(
            recognizer_saying("hello"),
            translator_upper(),
            synth_ok(),
            Some(translit),
            Duration::from_secs(5),
        );

        for language in ["auto", "en", "EN"] {
            let mut request = body(language, "fr");
            request.transliterate = true;
            let result = h.pipeline.run(request).await.unwrap();
            assert_eq!(result.translated_text, "HELLO");
        }
    }

    #[tokio::test]
    async fn transliteration_requested_without_capability() {
        let h = harness(recognizer_saying("namaste"), translator_upper(), synth_ok());
        assert!(!h.pipeline.has_transliteration());

        let mut request = body("hi", "en");
        request.transliterate = true;
        let result = h.pipeline.run(request).await.unwrap();
        assert_eq!(result.translated_text, "NAMASTE");
    }

    #[tokio::test]
    async fn closed_broadcast_channel_still_returns_result() {
        let h = harness(recognizer_saying("hola"), translator_upper(), synth_ok());
        let Harness { pipeline, rx } = h;
        drop(rx);

        let result = pipeline.run(body("es", "en")).await.unwrap();
        assert_eq!(result.translated_text, "HOLA");
    }
}
