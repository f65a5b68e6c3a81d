//! Rendering of runtime values as T-SQL literals.
//!
//! Statements carry no bind parameters: every value is inlined by [`render_literal`],
//! so its escaping is the only thing standing between a value and the SQL text.
//!
//! - `NULL` for absent values
//! - enums as their discriminant or as a quoted variant name
//! - bytes as `0x` + uppercase hex
//! - booleans as `1`/`0`
//! - numbers in invariant decimal form (non-finite floats are rejected)
//! - text single-quoted with `'` doubled
//! - dates and times as UTC `'yyyy-MM-ddTHH:mm:ssZ'`
//! - GUIDs lowercase with dashes, quoted
//! - JSON documents (JSON mode only) as quoted JSON text

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{OrmError, OrmResult};
use crate::schema::EnumBehavior;
use crate::value::Value;

/// Rendering policy for one literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralOptions {
    pub enum_behavior: EnumBehavior,
    /// Render JSON documents and value collections as JSON text.
    pub json: bool,
    /// Wrap text-like literals in single quotes.
    pub quoted: bool,
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            enum_behavior: EnumBehavior::AsInt,
            json: false,
            quoted: true,
        }
    }
}

impl LiteralOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enum_as(mut self, behavior: EnumBehavior) -> Self {
        self.enum_behavior = behavior;
        self
    }

    pub fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn unquoted(mut self) -> Self {
        self.quoted = false;
        self
    }
}

/// Render a value with the default policy (enums as integers, quoted, no JSON).
pub fn render(value: &Value) -> OrmResult<String> {
    render_literal(value, LiteralOptions::default())
}

/// Render a value as a T-SQL literal.
pub fn render_literal(value: &Value, options: LiteralOptions) -> OrmResult<String> {
    let text = match value {
        Value::Null => "NULL".to_string(),
        Value::Enum(v) => match options.enum_behavior {
            EnumBehavior::AsInt => v.discriminant.to_string(),
            EnumBehavior::AsString => quote_text(v.name, true),
        },
        Value::Bytes(bytes) => hex_literal(bytes),
        Value::Bool(v) => String::from(if *v { "1" } else { "0" }),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => finite(f64::from(*v), || v.to_string())?,
        Value::F64(v) => finite(*v, || v.to_string())?,
        #[cfg(feature = "decimal")]
        Value::Decimal(v) => v.to_string(),
        Value::Char(c) => quote_text(&c.to_string(), options.quoted),
        Value::String(s) => quote_text(s, options.quoted),
        Value::Date(d) => quote_text(&timestamp(d.and_time(NaiveTime::MIN)), options.quoted),
        Value::Time(t) => {
            let year = Utc::now().year();
            let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
                OrmError::unsupported_type(format!("cannot anchor time of day to year {year}"))
            })?;
            quote_text(&timestamp(date.and_time(*t)), options.quoted)
        }
        Value::DateTime(ts) => quote_text(&timestamp(*ts), options.quoted),
        Value::DateTimeUtc(ts) => quote_text(&timestamp(ts.naive_utc()), options.quoted),
        Value::DateTimeOffset(ts) => quote_text(&timestamp(ts.naive_utc()), options.quoted),
        Value::Uuid(id) => quote_text(&id.hyphenated().to_string(), options.quoted),
        Value::Json(_) | Value::List(_) if options.json => {
            let text = serde_json::to_string(&value.to_json()?)?;
            quote_text(&text, options.quoted)
        }
        Value::Json(_) | Value::List(_) | Value::Record(_) => {
            return Err(OrmError::unsupported_type(format!(
                "cannot render a {} value as a SQL literal",
                value.type_name()
            )));
        }
    };
    Ok(text)
}

/// Single-quote `text`, doubling embedded quotes. Quotes are doubled even when unquoted.
fn quote_text(text: &str, quoted: bool) -> String {
    let escaped = text.replace('\'', "''");
    if quoted {
        format!("'{escaped}'")
    } else {
        escaped
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

fn timestamp(ts: NaiveDateTime) -> String {
    format!("{}Z", ts.format("%Y-%m-%dT%H:%M:%S"))
}

fn finite(v: f64, text: impl FnOnce() -> String) -> OrmResult<String> {
    if v.is_finite() {
        Ok(text())
    } else {
        Err(OrmError::unsupported_type(format!(
            "non-finite float {v} has no SQL literal"
        )))
    }
}
