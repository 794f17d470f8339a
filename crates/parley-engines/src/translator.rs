//! Translation via the public `translate_a/single` endpoint.

use std::time::Duration;

use parley_core::{EngineError, SourceLanguage, Translator};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http;

/// Google web translation client (`client=gtx`).
pub struct GoogleTranslator {
    client: Client,
    url: String,
}

impl GoogleTranslator {
    /// Create a translator for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: http::endpoint(base_url, "translate_a/single"),
        })
    }
}

/// Concatenate the translated fragment of every segment.
///
/// The body looks like `[[["Hello ","Hola ",..],["world","mundo",..]],null,"es",..]`.
fn parse_translation(body: &Value) -> Result<String, EngineError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::InvalidResponse("missing translation segments".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(EngineError::InvalidResponse("empty translation".into()));
    }
    Ok(translated)
}

impl Translator for GoogleTranslator {
    fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> Result<String, EngineError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| http::transport_error(&e))?;

        let body: Value = http::check_status(response)?
            .json()
            .map_err(|e| EngineError::InvalidResponse(format!("translation body: {e}")))?;
        parse_translation(&body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn parse_concatenates_segments() {
        let body = json!([[["Hello ", "Hola ", null, null, 10], ["world", "mundo", null, null, 10]], null, "es"]);
        assert_eq!(parse_translation(&body).unwrap(), "Hello world");
    }

    #[test]
    fn parse_rejects_unexpected_shapes() {
        assert!(parse_translation(&json!({"error": "nope"})).is_err());
        assert!(parse_translation(&json!([null])).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn translates_with_auto_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "en"))
            .and(query_param("q", "hola mundo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["hello world", "hola mundo"]], null, "es"])),
            )
            .mount(&server)
            .await;

        let base = server.uri();
        let result = tokio::task::spawn_blocking(move || {
            let translator = GoogleTranslator::new(&base, Duration::from_secs(5)).unwrap();
            translator.translate("hola mundo", &SourceLanguage::Auto, "en")
        })
        .await
        .unwrap();

        assert_eq!(result.unwrap(), "hello world");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upstream_failure_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let base = server.uri();
        let err = tokio::task::spawn_blocking(move || {
            let translator = GoogleTranslator::new(&base, Duration::from_secs(5)).unwrap();
            translator.translate("hola", &SourceLanguage::Code("es".into()), "en")
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
