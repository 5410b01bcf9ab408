//! Console encoder that appends a record's key-value pairs after the message.
//!
//! `info!(method = "getSlot", retry_after = "Fri, 14 Mar 2025 12:00:30 GMT"; "Rate limited")`
//! renders as
//!
//! ```text
//! 2025-03-14 12:00:00.000 WARN  [main] Rate limited method=getSlot retry_after="Fri, 14 Mar 2025 12:00:30 GMT"
//! ```
//!
//! Values containing whitespace or quotes are quoted so the line stays splittable.

use std::fmt::Write as _;

use log::{
    Record,
    kv::{Error, Key, Value, VisitSource},
};
use log4rs::encode::{Color, Encode, Style, Write, pattern::PatternEncoder};
use serde::Deserialize;

const DEFAULT_PATTERN: &str = "{d} {l} {m}";

#[derive(Debug, Deserialize)]
pub struct StructuredConsoleEncoderConfig {
    pub pattern: Option<String>,
    /// Colour keys cyan. Defaults to `true`.
    pub highlight_keys: Option<bool>,
}

#[derive(Debug)]
pub struct StructuredConsoleEncoder {
    delegate: PatternEncoder,
    highlight_keys: bool,
}

impl StructuredConsoleEncoder {
    pub fn new(pattern: &str, highlight_keys: bool) -> Self {
        Self {
            delegate: PatternEncoder::new(pattern),
            highlight_keys,
        }
    }
}

/// Renders a value for the log line, quoting it when it would not survive splitting on spaces.
fn render_value(raw: &str) -> String {
    if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("{:?}", raw)
    } else {
        raw.to_string()
    }
}

#[derive(Default)]
struct PairCollector {
    pairs: Vec<(String, String)>,
}

impl<'kvs> VisitSource<'kvs> for PairCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), Error> {
        let mut rendered = String::new();
        write!(rendered, "{}", value).map_err(|_| Error::msg("failed to format value"))?;
        self.pairs.push((key.as_str().to_string(), render_value(&rendered)));
        Ok(())
    }
}

impl Encode for StructuredConsoleEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        self.delegate.encode(w, record)?;

        let mut collector = PairCollector::default();
        if let Err(kv_err) = record.key_values().visit(&mut collector) {
            write!(w, " [KV Error: {}]", kv_err)?;
        }

        for (key, value) in &collector.pairs {
            if self.highlight_keys {
                w.set_style(Style::new().text(Color::Cyan))?;
            }
            write!(w, " {}=", key)?;
            if self.highlight_keys {
                w.set_style(&Style::default())?;
            }
            write!(w, "{}", value)?;
        }

        w.write_all(b"\n")?;
        Ok(())
    }
}

pub struct StructuredConsoleEncoderDeserializer;

impl log4rs::config::Deserialize for StructuredConsoleEncoderDeserializer {
    type Trait = dyn Encode;
    type Config = StructuredConsoleEncoderConfig;

    fn deserialize(
        &self,
        config: StructuredConsoleEncoderConfig,
        _: &log4rs::config::Deserializers,
    ) -> anyhow::Result<Box<dyn Encode>> {
        let pattern = config.pattern.as_deref().unwrap_or(DEFAULT_PATTERN);
        let highlight_keys = config.highlight_keys.unwrap_or(true);
        Ok(Box::new(StructuredConsoleEncoder::new(pattern, highlight_keys)))
    }
}
