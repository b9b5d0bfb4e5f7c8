//! Context attachment and record compaction.

use indexmap::IndexMap;
use serde_json::Value;

use tabby_shared::{AssembledObject, ContextMap, FieldValue, Record};

/// Attach `ctx` as the object's `@context`.
///
/// An existing context is extended, new terms winning. Nothing emits a
/// per-sheet context declaration today, so that path only merges maps.
pub fn attach_context(obj: &mut AssembledObject, ctx: ContextMap) {
    if let Some(existing) = obj.context_mut() {
        existing.extend(ctx);
    } else {
        *obj.context_mut() = Some(ctx);
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Collapse value lists into the finalized record shape.
///
/// A field whose values are all empty containers (or that has none) is
/// dropped, a one-element list becomes a scalar, longer lists stay lists.
/// The context is carried over untouched.
pub fn compact(obj: AssembledObject) -> Record {
    let (fields, context) = obj.into_parts();
    let mut compacted = IndexMap::with_capacity(fields.len());

    for (key, mut values) in fields {
        if !values.iter().any(|v| !is_empty_container(v)) {
            continue;
        }
        let value = if values.len() == 1 {
            FieldValue::Scalar(values.remove(0))
        } else {
            FieldValue::List(values)
        };
        compacted.insert(key, value);
    }

    Record::new(compacted, context)
}

/// Attach the context (if any) and compact.
pub fn finalize(mut obj: AssembledObject, context: Option<ContextMap>) -> Record {
    if let Some(ctx) = context {
        attach_context(&mut obj, ctx);
    }
    compact(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(fields: &[(&str, Vec<Value>)]) -> AssembledObject {
        fields.iter().cloned().collect()
    }

    fn context(value: Value) -> ContextMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("context fixture must be an object"),
        }
    }

    #[test]
    fn single_values_collapse_to_scalars() {
        let record = compact(object(&[
            ("id", vec![json!("x1")]),
            ("tag", vec![json!("a"), json!("b"), json!("c")]),
        ]));
        assert_eq!(record.into_json(), json!({"id": "x1", "tag": ["a", "b", "c"]}));
    }

    #[test]
    fn empty_fields_are_dropped() {
        let record = compact(object(&[
            ("title", vec![]),
            ("nested", vec![json!([]), json!({})]),
            ("keep", vec![json!([]), json!("x")]),
        ]));
        assert_eq!(record.get("title"), None);
        assert_eq!(record.get("nested"), None);
        assert_eq!(
            record.get("keep"),
            Some(&FieldValue::List(vec![json!([]), json!("x")]))
        );
    }

    #[test]
    fn nested_objects_survive_compaction() {
        let record = compact(object(&[("author", vec![json!({"name": "Jane"})])]));
        assert_eq!(
            record.get("author"),
            Some(&FieldValue::Scalar(json!({"name": "Jane"})))
        );
    }

    #[test]
    fn context_is_never_compacted() {
        let ctx = context(json!({"tags": {"@container": "@list"}, "empty": {}}));
        let record = finalize(object(&[("id", vec![json!("x1")])]), Some(ctx.clone()));
        assert_eq!(record.context(), Some(&ctx));

        let record = finalize(AssembledObject::new(), Some(ContextMap::new()));
        assert_eq!(record.context(), Some(&ContextMap::new()));
        assert!(record.fields().is_empty());
    }

    #[test]
    fn finalize_without_context_leaves_none() {
        let record = finalize(object(&[("id", vec![json!("x1")])]), None);
        assert_eq!(record.context(), None);
        assert_eq!(record.into_json(), json!({"id": "x1"}));
    }

    #[test]
    fn attach_context_sets_when_absent() {
        let mut obj = AssembledObject::new();
        attach_context(&mut obj, context(json!({"id": "@id"})));
        assert_eq!(obj.context(), Some(&context(json!({"id": "@id"}))));
    }
}
