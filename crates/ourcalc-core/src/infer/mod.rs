//! Type inference for raw cell input
//!
//! [`TypeInference::infer`] tries a fixed list of conversions in order and
//! returns the first one that succeeds; text that matches nothing comes
//! back unchanged as [`ConcreteValue::Text`]:
//!
//! 1. boolean token
//! 2. integer
//! 3. float
//! 4. complex (`1+2j`)
//! 5. list `[..]`
//! 6. tuple `(..)`
//! 7. set `{a, b}`
//! 8. mapping `{k: v}`
//! 9. calendar text via the [`DateParser`]; midnight degrades to a date
//!
//! Every attempt returns an `Option`, so a failed attempt cannot leak into
//! the next one.

mod datetime;
pub(crate) mod literal;

pub use datetime::{current_date, current_datetime, ChronoDateParser, DateParser};

use crate::value::ConcreteValue;
use chrono::Timelike;
use std::fmt;
use std::sync::OnceLock;

/// Inference configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InferenceSettings {
    /// Tokens read as `True`, compared case-insensitively
    pub true_tokens: Vec<String>,
    /// Tokens read as `False`, compared case-insensitively
    pub false_tokens: Vec<String>,
    /// Whether list, tuple, set and mapping literals are recognised
    pub container_literals: bool,
    /// `chrono` formats tried for date-and-time text, in order
    pub datetime_formats: Vec<String>,
    /// `chrono` formats tried for date-only text, in order
    pub date_formats: Vec<String>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            true_tokens: strings(&["true"]),
            false_tokens: strings(&["false"]),
            container_literals: true,
            datetime_formats: strings(&[
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%Y/%m/%d %H:%M:%S",
                "%Y/%m/%d %H:%M",
            ]),
            date_formats: strings(&[
                "%Y-%m-%d",
                "%Y/%m/%d",
                "%Y%m%d",
                "%B %d, %Y",
                "%b %d, %Y",
                "%d %B %Y",
                "%d %b %Y",
            ]),
        }
    }
}

/// One step of the inference order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Boolean,
    Integer,
    Float,
    Complex,
    Sequence,
    Tuple,
    Set,
    Mapping,
    Calendar,
}

impl Conversion {
    /// The order conversions are attempted in
    pub const ORDER: [Conversion; 9] = [
        Conversion::Boolean,
        Conversion::Integer,
        Conversion::Float,
        Conversion::Complex,
        Conversion::Sequence,
        Conversion::Tuple,
        Conversion::Set,
        Conversion::Mapping,
        Conversion::Calendar,
    ];

    fn is_container(self) -> bool {
        matches!(
            self,
            Conversion::Sequence | Conversion::Tuple | Conversion::Set | Conversion::Mapping
        )
    }
}

/// Turns raw text into the most specific [`ConcreteValue`] it denotes
pub struct TypeInference {
    settings: InferenceSettings,
    parser: Box<dyn DateParser>,
}

impl TypeInference {
    /// Create an engine with default settings and the `chrono` parser
    pub fn new() -> Self {
        Self::with_settings(InferenceSettings::default())
    }

    /// Create an engine with custom settings and the `chrono` parser
    pub fn with_settings(settings: InferenceSettings) -> Self {
        let parser = Box::new(ChronoDateParser::new(&settings));
        Self { settings, parser }
    }

    /// Replace the calendar parser
    pub fn with_parser<P: DateParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// The active settings
    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    /// Infer a value from raw text
    pub fn infer(&self, raw: &str) -> ConcreteValue {
        for conversion in Conversion::ORDER {
            if conversion.is_container() && !self.settings.container_literals {
                continue;
            }
            if let Some(value) = self.attempt(conversion, raw) {
                log::trace!("inferred {:?} as {} via {:?}", raw, value.type_name(), conversion);
                return value;
            }
        }
        log::trace!("inferred {:?} as str", raw);
        ConcreteValue::Text(raw.to_string())
    }

    /// Run a single conversion
    pub fn attempt(&self, conversion: Conversion, raw: &str) -> Option<ConcreteValue> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        match conversion {
            Conversion::Boolean => self.boolean(text).map(ConcreteValue::Boolean),
            Conversion::Integer => text.parse::<i64>().ok().map(ConcreteValue::Integer),
            Conversion::Float => text.parse::<f64>().ok().map(ConcreteValue::Float),
            Conversion::Complex => literal::parse_complex(text).map(ConcreteValue::Complex),
            Conversion::Sequence => {
                container(text, '[', |v| matches!(v, ConcreteValue::Sequence(_)))
            }
            Conversion::Tuple => container(text, '(', |v| matches!(v, ConcreteValue::Tuple(_))),
            Conversion::Set => container(text, '{', |v| matches!(v, ConcreteValue::Set(_))),
            Conversion::Mapping => {
                container(text, '{', |v| matches!(v, ConcreteValue::Mapping(_)))
            }
            Conversion::Calendar => self.parser.parse_datetime(text).map(|dt| {
                if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                    ConcreteValue::Date(dt.date())
                } else {
                    ConcreteValue::DateTime(dt)
                }
            }),
        }
    }

    fn boolean(&self, text: &str) -> Option<bool> {
        let matches = |tokens: &[String]| tokens.iter().any(|t| t.eq_ignore_ascii_case(text));
        if matches(&self.settings.true_tokens) {
            Some(true)
        } else if matches(&self.settings.false_tokens) {
            Some(false)
        } else {
            None
        }
    }
}

fn container(
    text: &str,
    open: char,
    is_kind: impl Fn(&ConcreteValue) -> bool,
) -> Option<ConcreteValue> {
    if !text.starts_with(open) {
        return None;
    }
    literal::parse_literal(text).filter(|value| is_kind(value))
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeInference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInference")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Infer a value from raw text using the default engine
pub fn infer(raw: &str) -> ConcreteValue {
    static DEFAULT: OnceLock<TypeInference> = OnceLock::new();
    DEFAULT.get_or_init(TypeInference::new).infer(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(infer("42"), ConcreteValue::Integer(42));
        assert!(matches!(infer("3.14"), ConcreteValue::Float(n) if n == 3.14));
        assert!(matches!(infer("-7"), ConcreteValue::Integer(-7)));
        assert!(matches!(infer("1e3"), ConcreteValue::Float(n) if n == 1000.0));
        assert_eq!(
            infer("1+2j"),
            ConcreteValue::Complex(Complex64::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_booleans_are_narrow() {
        assert!(matches!(infer("TRUE"), ConcreteValue::Boolean(true)));
        assert!(matches!(infer("false"), ConcreteValue::Boolean(false)));
        assert!(matches!(infer("yes"), ConcreteValue::Text(_)));
        assert!(matches!(infer("1"), ConcreteValue::Integer(1)));
    }

    #[test]
    fn test_calendar() {
        assert!(matches!(infer("2024-01-01"), ConcreteValue::Date(d) if d == date(2024, 1, 1)));
        let expected = date(2024, 1, 1).and_hms_opt(10, 30, 0).unwrap();
        assert!(matches!(infer("2024-01-01T10:30:00"), ConcreteValue::DateTime(dt) if dt == expected));
        // Midnight degrades to a date
        assert!(matches!(infer("2024-01-01T00:00:00"), ConcreteValue::Date(_)));
    }

    #[test]
    fn test_text_fallback() {
        assert_eq!(infer("hello world"), ConcreteValue::text("hello world"));
        assert_eq!(infer(""), ConcreteValue::text(""));
        // Fallback keeps the original text, whitespace included
        assert_eq!(infer("  hi "), ConcreteValue::text("  hi "));
        assert_eq!(infer("1,000"), ConcreteValue::text("1,000"));
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            infer("[1, 'two', 3.0]"),
            ConcreteValue::Sequence(vec![1.into(), "two".into(), 3.0.into()])
        );
        assert_eq!(
            infer("(1, 2)"),
            ConcreteValue::Tuple(vec![1.into(), 2.into()])
        );
        assert!(matches!(infer("{1, 2}"), ConcreteValue::Set(_)));
        assert!(matches!(infer("{'a': 1}"), ConcreteValue::Mapping(_)));
        assert!(matches!(infer("{}"), ConcreteValue::Mapping(_)));
        assert!(matches!(infer("[1, 2"), ConcreteValue::Text(_)));
        assert!(matches!(infer("{[1]: 2}"), ConcreteValue::Text(_)));
        assert!(matches!(infer("{[1], 2}"), ConcreteValue::Text(_)));
    }

    #[test]
    fn test_deep_nesting_falls_back_to_text() {
        let deep = "[".repeat(200_000);
        assert_eq!(infer(&deep), ConcreteValue::Text(deep.clone()));
    }

    #[test]
    fn test_settings() {
        let settings = InferenceSettings {
            true_tokens: vec!["yes".into(), "true".into()],
            false_tokens: vec!["no".into()],
            container_literals: false,
            ..InferenceSettings::default()
        };
        let engine = TypeInference::with_settings(settings);
        assert!(matches!(engine.infer("Yes"), ConcreteValue::Boolean(true)));
        assert!(matches!(engine.infer("NO"), ConcreteValue::Boolean(false)));
        assert!(matches!(engine.infer("[1]"), ConcreteValue::Text(_)));
    }

    #[test]
    fn test_custom_parser() {
        let engine = TypeInference::new().with_parser(|text: &str| -> Option<NaiveDateTime> {
            (text == "today").then(|| date(2020, 2, 29).and_hms_opt(8, 0, 0)).flatten()
        });
        assert!(matches!(engine.infer("today"), ConcreteValue::DateTime(_)));
        // The replacement parser no longer understands ISO dates
        assert!(matches!(engine.infer("2024-01-01"), ConcreteValue::Text(_)));
    }

    #[test]
    fn test_attempt_is_independent() {
        let engine = TypeInference::new();
        assert_eq!(engine.attempt(Conversion::Integer, "3.5"), None);
        assert_eq!(
            engine.attempt(Conversion::Float, "3.5"),
            Some(ConcreteValue::Float(3.5))
        );
        assert_eq!(engine.attempt(Conversion::Tuple, "(7)"), None);
        assert_eq!(engine.attempt(Conversion::Mapping, "{1, 2}"), None);
    }
}
