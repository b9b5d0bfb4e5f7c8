//! Override engine.
//!
//! An override file (`<stem>.override.json`) maps target field names to one
//! or more value templates. Non-string templates pass through unchanged.
//! String templates may reference fields of the record being built:
//!
//! - `{field}`: the field's value (a one-element list renders as its element)
//! - `{field[N]}`: the N-th value of the field
//! - `{{` / `}}`: literal braces
//!
//! A template whose field is missing is dropped; its siblings still apply.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use tabby_shared::{AssembledObject, Result, TabbyError};

use crate::companions::{json_kind, override_candidate, read_json_object};
use crate::resolver::resolve_existing;

/// Replacement values per target field.
pub type Overrides = IndexMap<String, Vec<Value>>;

/// Matches `{{`, `}}`, or a `{placeholder}`.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("token regex"));

/// Matches `name` or `name[3]` inside a placeholder.
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[\]]+)(?:\[(\d+)\])?$").expect("field regex"));

/// Outcome of rendering one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpolation {
    Rendered(String),
    /// The template needs `field`, which the record cannot supply.
    Skipped { field: String },
}

/// Substitute the placeholders of `template` from `obj`.
pub fn interpolate(template: &str, obj: &AssembledObject) -> Interpolation {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        match (whole.as_str(), caps.get(1)) {
            ("{{", _) => out.push('{'),
            ("}}", _) => out.push('}'),
            (_, Some(inner)) => match lookup(inner.as_str(), obj) {
                Some(text) => out.push_str(&text),
                None => {
                    return Interpolation::Skipped {
                        field: inner.as_str().to_string(),
                    };
                }
            },
            _ => {}
        }
    }
    out.push_str(&template[last..]);
    Interpolation::Rendered(out)
}

/// Render the value a placeholder refers to.
fn lookup(placeholder: &str, obj: &AssembledObject) -> Option<String> {
    let caps = FIELD_RE.captures(placeholder)?;
    let name = caps.get(1)?.as_str();
    // positional arguments do not exist here
    if name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let values = obj.get(name)?;
    match caps.get(2) {
        Some(idx) => {
            let idx: usize = idx.as_str().parse().ok()?;
            values.get(idx).map(render_value)
        }
        None => Some(render_values(values)),
    }
}

fn render_values(values: &[Value]) -> String {
    match values {
        [single] => render_value(single),
        many => Value::Array(many.to_vec()).to_string(),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A parsed override file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSpec {
    entries: serde_json::Map<String, Value>,
}

impl OverrideSpec {
    /// Build a spec from parsed JSON; the top level must be an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(TabbyError::validation(format!(
                "override spec must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Locate and load the override file of `sheet`, if any.
    pub fn locate(sheet: &Path, class_paths: &[PathBuf]) -> Result<Option<Self>> {
        let candidate = override_candidate(sheet);
        let Some(path) = resolve_existing(&candidate, class_paths) else {
            debug!(candidate = %candidate.display(), "no override file");
            return Ok(None);
        };
        debug!(path = %path.display(), "loading overrides");
        Ok(Some(Self {
            entries: read_json_object(&path)?,
        }))
    }

    /// Compute the replacement values of every target field against `obj`.
    pub fn expand(&self, obj: &AssembledObject) -> Overrides {
        let mut overrides = Overrides::with_capacity(self.entries.len());
        for (target, spec) in &self.entries {
            let templates = match spec {
                Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            let mut replacement = Vec::with_capacity(templates.len());
            for template in templates {
                let Value::String(text) = template else {
                    replacement.push(template.clone());
                    continue;
                };
                match interpolate(text, obj) {
                    Interpolation::Rendered(rendered) => replacement.push(Value::String(rendered)),
                    Interpolation::Skipped { field } => {
                        debug!(%target, %field, template = %text, "override template skipped");
                    }
                }
            }
            overrides.insert(target.clone(), replacement);
        }
        overrides
    }
}

/// Compute the overrides that apply to `obj`, a row of `sheet`.
///
/// Returns an empty set when the sheet has no override file.
pub fn build_overrides(
    sheet: &Path,
    obj: &AssembledObject,
    class_paths: &[PathBuf],
) -> Result<Overrides> {
    Ok(OverrideSpec::locate(sheet, class_paths)?
        .map(|spec| spec.expand(obj))
        .unwrap_or_default())
}

/// Replace every overridden field's values wholesale.
pub fn apply_overrides(obj: &mut AssembledObject, overrides: Overrides) {
    for (target, values) in overrides {
        obj.set(target, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(fields: &[(&str, Vec<Value>)]) -> AssembledObject {
        fields.iter().cloned().collect()
    }

    fn spec(value: Value) -> OverrideSpec {
        OverrideSpec::from_json(value).unwrap()
    }

    #[test]
    fn substitutes_single_valued_field() {
        let obj = object(&[("id", vec![json!("x1")])]);
        assert_eq!(
            interpolate("{id}-v1", &obj),
            Interpolation::Rendered("x1-v1".into())
        );
    }

    #[test]
    fn missing_field_skips_template() {
        let obj = AssembledObject::new();
        assert_eq!(
            interpolate("{id}-v1", &obj),
            Interpolation::Skipped { field: "id".into() }
        );
    }

    #[test]
    fn indexed_and_escaped_placeholders() {
        let obj = object(&[("name", vec![json!("Jane"), json!("Doe")])]);
        assert_eq!(
            interpolate("{name[1]}, {name[0]} {{sic}}", &obj),
            Interpolation::Rendered("Doe, Jane {sic}".into())
        );
        assert_eq!(
            interpolate("{name}", &obj),
            Interpolation::Rendered(r#"["Jane","Doe"]"#.into())
        );
        assert!(matches!(
            interpolate("{name[2]}", &obj),
            Interpolation::Skipped { .. }
        ));
    }

    #[test]
    fn positional_and_empty_placeholders_skip() {
        let obj = object(&[("0", vec![json!("zero")])]);
        assert!(matches!(interpolate("{0}", &obj), Interpolation::Skipped { .. }));
        assert!(matches!(interpolate("{}", &obj), Interpolation::Skipped { .. }));
    }

    #[test]
    fn padded_placeholder_names_a_different_field() {
        let obj = object(&[("id", vec![json!("x1")])]);
        assert_eq!(
            interpolate("{ id }-v1", &obj),
            Interpolation::Skipped {
                field: " id ".into()
            }
        );
    }

    #[test]
    fn non_string_values_render_as_json() {
        let obj = object(&[("size", vec![json!(42)])]);
        assert_eq!(
            interpolate("{size} bytes", &obj),
            Interpolation::Rendered("42 bytes".into())
        );
    }

    #[test]
    fn expand_interpolates_each_template() {
        let overrides = spec(json!({"title": "{id}-v1"}))
            .expand(&object(&[("id", vec![json!("x1")])]));
        assert_eq!(overrides.get("title"), Some(&vec![json!("x1-v1")]));

        let overrides = spec(json!({"title": "{id}-v1"})).expand(&AssembledObject::new());
        assert_eq!(overrides.get("title"), Some(&vec![]));
    }

    #[test]
    fn expand_drops_only_the_failing_template() {
        let overrides = spec(json!({
            "identifier": ["doi:{doi}", "urn:{id}", {"@id": "x"}, 7]
        }))
        .expand(&object(&[("id", vec![json!("x1")])]));
        assert_eq!(
            overrides.get("identifier"),
            Some(&vec![json!("urn:x1"), json!({"@id": "x"}), json!(7)])
        );
    }

    #[test]
    fn apply_replaces_fields() {
        let mut obj = object(&[("title", vec![json!("old")]), ("id", vec![json!("x1")])]);
        let overrides = spec(json!({"title": "{id}", "kind": "dataset"})).expand(&obj);
        apply_overrides(&mut obj, overrides);

        assert_eq!(obj.get("title").unwrap(), &[json!("x1")]);
        assert_eq!(obj.get("kind").unwrap(), &[json!("dataset")]);
    }

    #[test]
    fn build_overrides_without_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides =
            build_overrides(&tmp.path().join("data.tsv"), &AssembledObject::new(), &[]).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn build_overrides_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("data.override.json"),
            r#"{"@id": "https://example.org/{id}"}"#,
        )
        .unwrap();

        let obj = object(&[("id", vec![json!("x1")])]);
        let overrides = build_overrides(&tmp.path().join("data.tsv"), &obj, &[]).unwrap();
        assert_eq!(
            overrides.get("@id"),
            Some(&vec![json!("https://example.org/x1")])
        );
    }

    #[test]
    fn non_object_override_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("data.override.json"), r#""{id}""#).unwrap();

        let err = build_overrides(&tmp.path().join("data.tsv"), &AssembledObject::new(), &[])
            .unwrap_err();
        assert!(err.to_string().contains("found a string"));
    }
}
