use crate::config::TranslationConfig;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

// Unicode block per language code, in the order the original consulted them.
const SCRIPT_RANGES: [(&str, std::ops::RangeInclusive<u32>); 7] = [
    ("te", 0x0C00..=0x0C7F), // Telugu
    ("hi", 0x0900..=0x097F), // Devanagari (Hindi, Marathi)
    ("ta", 0x0B80..=0x0BFF), // Tamil
    ("ml", 0x0D00..=0x0D7F), // Malayalam
    ("kn", 0x0C80..=0x0CFF), // Kannada
    ("bn", 0x0980..=0x09FF), // Bengali
    ("pa", 0x0A00..=0x0A7F), // Gurmukhi (Punjabi)
];

/// Guess the source language of a transcript from its script. Latin text
/// returns `None` so the caller can fall back to auto-detection.
pub fn detect_script_lang(text: &str) -> Option<&'static str> {
    for (code, range) in &SCRIPT_RANGES {
        if text.chars().any(|c| range.contains(&(c as u32))) {
            return Some(code);
        }
    }
    None
}

/// The machine-translation port: provider A, then provider B, then the
/// original text. A failure or timeout anywhere in the chain is logged and
/// swallowed; the caller always gets something to display.
pub struct Translator {
    client: reqwest::Client,
    libre_url: String,
    google_url: String,
    timeout: Duration,
}

impl Translator {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            libre_url: config.libre_url.clone(),
            google_url: config.google_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub async fn translate(&self, text: &str, source: &str, target: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        if let Some(translated) = self.via_libre(text, source, target).await {
            return translated;
        }
        if let Some(translated) = self.via_google(text, target).await {
            return translated;
        }
        warn!("all translation providers failed, showing the original text");
        text.to_string()
    }

    async fn via_libre(&self, text: &str, source: &str, target: &str) -> Option<String> {
        let body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        let request = self.client.post(&self.libre_url).json(&body).send();
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => response,
            Ok(Ok(response)) => {
                warn!(status = %response.status(), "primary translation provider refused");
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "primary translation provider unreachable");
                return None;
            }
            Err(_) => {
                warn!("primary translation provider timed out");
                return None;
            }
        };
        let value = tokio::time::timeout(self.timeout, response.json::<Value>())
            .await
            .ok()?
            .ok()?;
        parse_libre_response(&value)
    }

    async fn via_google(&self, text: &str, target: &str) -> Option<String> {
        let request = self
            .client
            .get(&self.google_url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send();
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => response,
            _ => {
                warn!("fallback translation provider failed");
                return None;
            }
        };
        let value = tokio::time::timeout(self.timeout, response.json::<Value>())
            .await
            .ok()?
            .ok()?;
        parse_google_response(&value)
    }
}

// {"translatedText": "..."} with a couple of historical field spellings.
fn parse_libre_response(value: &Value) -> Option<String> {
    let translated = value
        .get("translatedText")
        .or_else(|| value.get("translated"))
        .or_else(|| value.get("result").and_then(|r| r.get("translatedText")))
        .and_then(Value::as_str)?;
    if translated.is_empty() {
        None
    } else {
        Some(translated.to_string())
    }
}

// [[["chunk", ...], ["chunk", ...]], ...]: concatenate the first element of
// every part in the first array.
fn parse_google_response(value: &Value) -> Option<String> {
    let parts = value.get(0)?.as_array()?;
    let translated: String = parts
        .iter()
        .filter_map(|part| part.get(0).and_then(Value::as_str))
        .collect();
    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_indic_scripts() {
        assert_eq!(detect_script_lang("మట్టి కుండ"), Some("te"));
        assert_eq!(detect_script_lang("मिट्टी का बर्तन"), Some("hi"));
        assert_eq!(detect_script_lang("களிமண் பானை"), Some("ta"));
        assert_eq!(detect_script_lang("കളിമൺ പാത്രം"), Some("ml"));
        assert_eq!(detect_script_lang("ಮಣ್ಣಿನ ಮಡಕೆ"), Some("kn"));
        assert_eq!(detect_script_lang("মাটির পাত্র"), Some("bn"));
        assert_eq!(detect_script_lang("ਮਿੱਟੀ ਦਾ ਭਾਂਡਾ"), Some("pa"));
    }

    #[test]
    fn latin_text_is_left_to_auto_detection() {
        assert_eq!(detect_script_lang("a clay pot"), None);
        assert_eq!(detect_script_lang(""), None);
    }

    #[test]
    fn parses_primary_provider_shapes() {
        let value = json!({"translatedText": "clay pot"});
        assert_eq!(parse_libre_response(&value), Some("clay pot".to_string()));

        let value = json!({"result": {"translatedText": "clay pot"}});
        assert_eq!(parse_libre_response(&value), Some("clay pot".to_string()));

        // an empty or missing translation is a miss, not a hit
        assert_eq!(parse_libre_response(&json!({"translatedText": ""})), None);
        assert_eq!(parse_libre_response(&json!({"error": "quota"})), None);
    }

    #[test]
    fn parses_fallback_provider_shape() {
        let value = json!([[["clay ", "x"], ["pot", "y"]], null, "en"]);
        assert_eq!(parse_google_response(&value), Some("clay pot".to_string()));

        assert_eq!(parse_google_response(&json!({"weird": true})), None);
        assert_eq!(parse_google_response(&json!([[]])), None);
    }
}
