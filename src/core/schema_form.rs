use crate::models::{ExchangeSchema, FormInput, SchemaFieldSpec};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Typed field kind, so every widget and coercion is matched exhaustively
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Enum { choices: Vec<String> },
    Boolean,
    Number,
    SetOfNumber,
    String,
}

impl FieldKind {
    /// Classify a raw descriptor; unknown types and choice-less enums are text
    pub fn from_spec(spec: &SchemaFieldSpec) -> Self {
        match (spec.field_type.as_deref(), &spec.choices) {
            (Some("enum"), Some(choices)) => FieldKind::Enum {
                choices: choices.iter().map(value_text).collect(),
            },
            (Some("boolean"), _) => FieldKind::Boolean,
            (Some("number"), _) => FieldKind::Number,
            (Some("set_of_number"), _) => FieldKind::SetOfNumber,
            _ => FieldKind::String,
        }
    }
}

/// A schema field after classification
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub help: Option<String>,
}

impl From<&SchemaFieldSpec> for SchemaField {
    fn from(spec: &SchemaFieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            kind: FieldKind::from_spec(spec),
            required: spec.required,
            default: spec.default.clone(),
            help: spec.help.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Input control to render for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Select {
        options: Vec<SelectOption>,
    },
    Checkbox {
        checked: bool,
    },
    NumberInput {
        value: Option<String>,
    },
    TextInput {
        value: Option<String>,
        placeholder: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub input_id: String,
    pub label: String,
    pub required_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub kind: FieldKind,
    pub widget: Widget,
}

/// The exchange creation form for one exchange API type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeForm {
    pub api: String,
    pub config_fields: Vec<FormField>,
    pub credential_fields: Vec<FormField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSection {
    Config,
    Credentials,
}

impl FormSection {
    fn prefix(&self) -> &'static str {
        match self {
            FormSection::Config => "cfg",
            FormSection::Credentials => "cred",
        }
    }
}

/// Human label from a field name: `privacy_group` -> `Privacy group`
pub fn field_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text shown pre-filled in a field, if any
fn default_text(field: &SchemaField) -> Option<String> {
    let default = field.default.as_ref().filter(|v| !v.is_null())?;
    match field.kind {
        FieldKind::SetOfNumber => Some(match default {
            Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
            _ => String::new(),
        }),
        _ => Some(value_text(default)),
    }
}

fn default_checked(field: &SchemaField) -> bool {
    matches!(field.default, Some(Value::Bool(true)))
}

fn widget_for(field: &SchemaField) -> Widget {
    match &field.kind {
        FieldKind::Enum { choices } => {
            let placeholder = if field.required {
                "— Select —"
            } else {
                "— Optional —"
            };
            let mut options = vec![SelectOption {
                value: String::new(),
                label: placeholder.to_string(),
            }];
            options.extend(choices.iter().map(|choice| SelectOption {
                value: choice.clone(),
                label: choice.clone(),
            }));
            Widget::Select { options }
        }
        FieldKind::Boolean => Widget::Checkbox {
            checked: default_checked(field),
        },
        FieldKind::Number => Widget::NumberInput {
            value: default_text(field),
        },
        FieldKind::SetOfNumber => Widget::TextInput {
            value: default_text(field),
            placeholder: Some("e.g. 1, 2, 3".to_string()),
        },
        FieldKind::String => Widget::TextInput {
            value: default_text(field),
            placeholder: None,
        },
    }
}

pub fn render_field(field: &SchemaField, section: FormSection) -> FormField {
    FormField {
        name: field.name.clone(),
        input_id: format!("{}_{}", section.prefix(), field.name),
        label: field_label(&field.name),
        // credentials are all optional as a section
        required_marker: field.required && section == FormSection::Config,
        help: field.help.clone(),
        kind: field.kind.clone(),
        widget: widget_for(field),
    }
}

pub fn config_fields(schema: &ExchangeSchema) -> Vec<SchemaField> {
    schema.config_fields().iter().map(SchemaField::from).collect()
}

pub fn credential_fields(schema: &ExchangeSchema) -> Vec<SchemaField> {
    schema.credential_fields().iter().map(SchemaField::from).collect()
}

/// Build the form for an exchange API from its schema
pub fn build_form(api: &str, schema: &ExchangeSchema) -> ExchangeForm {
    ExchangeForm {
        api: api.to_string(),
        config_fields: config_fields(schema)
            .iter()
            .map(|f| render_field(f, FormSection::Config))
            .collect(),
        credential_fields: credential_fields(schema)
            .iter()
            .map(|f| render_field(f, FormSection::Credentials))
            .collect(),
    }
}

/// Integer prefix of `s`, like JavaScript's `parseInt(s, 10)`
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. `"12abc"` is 12, `"abc"` is `None`. Values outside the `i64`
/// range saturate to `i64::MAX` / `i64::MIN`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = match digits[..end].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}

/// Comma-separated integers, invalid entries dropped: `"1, 2, bad, 3"` -> `[1, 2, 3]`
pub fn parse_set_of_number(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| parse_leading_int(part.trim()))
        .collect()
}

/// Coerce one submitted value; `None` means the field is left out
pub fn coerce_value(kind: &FieldKind, raw: &str) -> Option<Value> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Boolean => Some(Value::Bool(FormInput::Text(text.to_string()).as_flag())),
        FieldKind::Number => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(|n| match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Value::Number(Number::from(f as i64))
                }
                _ => Value::Number(n),
            }),
        FieldKind::SetOfNumber => {
            let numbers = parse_set_of_number(text);
            if numbers.is_empty() {
                None
            } else {
                Some(Value::Array(numbers.into_iter().map(Value::from).collect()))
            }
        }
        FieldKind::Enum { .. } | FieldKind::String => Some(Value::String(text.to_string())),
    }
}

/// Assemble the JSON object for a form section
///
/// Every schema field is read, falling back to its pre-filled default when
/// the operator sent nothing. Checkboxes are always present.
pub fn assemble_object(
    fields: &[SchemaField],
    inputs: &BTreeMap<String, FormInput>,
) -> Map<String, Value> {
    let mut object = Map::new();
    for field in fields {
        let input = inputs.get(&field.name);
        let value = match field.kind {
            FieldKind::Boolean => Some(Value::Bool(
                input.map_or_else(|| default_checked(field), FormInput::as_flag),
            )),
            _ => {
                let raw = input
                    .map(FormInput::as_text)
                    .or_else(|| default_text(field))
                    .unwrap_or_default();
                coerce_value(&field.kind, &raw)
            }
        };
        if let Some(value) = value {
            object.insert(field.name.clone(), value);
        }
    }
    object
}
