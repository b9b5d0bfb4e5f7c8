//! Row aggregation.
//!
//! Turns one physical row of cell values plus a header of field names into
//! an [`AssembledObject`] whose fields are all value lists.

use serde_json::Value;

use tabby_shared::AssembledObject;

/// Index just past the last non-empty cell, or 0 for an all-empty row.
pub fn index_after_last_nonempty<S: AsRef<str>>(cells: &[S]) -> usize {
    cells
        .iter()
        .rposition(|c| !c.as_ref().is_empty())
        .map_or(0, |idx| idx + 1)
}

/// Aggregate one value row against its header.
///
/// When the row is longer than the header, every cell from the last field's
/// column onward belongs to the last field (trailing empty cells dropped).
/// Empty cells never contribute a value. Columns without a name are ignored.
pub fn aggregate_row<S, F>(raw_values: &[S], field_names: &[F]) -> AssembledObject
where
    S: AsRef<str>,
    F: AsRef<str>,
{
    let mut obj = AssembledObject::new();
    let Some(last_idx) = field_names.len().checked_sub(1) else {
        return obj;
    };

    for (idx, name) in field_names.iter().enumerate() {
        let name = name.as_ref();
        if name.is_empty() || idx >= raw_values.len() {
            continue;
        }
        let cells = if idx == last_idx {
            let tail = &raw_values[idx..];
            &tail[..index_after_last_nonempty(tail)]
        } else {
            &raw_values[idx..=idx]
        };
        for cell in cells {
            let cell = cell.as_ref();
            if cell.is_empty() {
                continue;
            }
            obj.push(name, Value::String(cell.to_string()));
        }
    }
    obj
}

/// Field names from a header row (trimmed), cut after the last named column.
pub fn header_fields<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    let mut names: Vec<String> = row.iter().map(|c| c.as_ref().trim().to_string()).collect();
    names.truncate(index_after_last_nonempty(&names));
    names
}

/// Split a single-sheet row `key \t values...` into its key and values.
///
/// Returns `None` for rows without a key or without any non-empty value.
pub fn keyed_row<S: AsRef<str>>(row: &[S]) -> Option<(String, Vec<Value>)> {
    let (key, values) = row.split_first()?;
    let key = key.as_ref().trim();
    if key.is_empty() {
        return None;
    }
    let (_, values) = aggregate_row(values, &[key]).into_parts().0.pop()?;
    Some((key.to_string(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values(obj: &AssembledObject, key: &str) -> Vec<Value> {
        obj.get(key).map(<[Value]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn excess_values_merge_into_last_field() {
        let obj = aggregate_row(&["x1", "a", "b", "c"], &["id", "tag"]);
        assert_eq!(obj.len(), 2);
        assert_eq!(values(&obj, "id"), vec![json!("x1")]);
        assert_eq!(values(&obj, "tag"), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn trailing_empty_cells_are_discarded() {
        let obj = aggregate_row(&["x1", "a", "", "b", "", ""], &["id", "tag"]);
        assert_eq!(values(&obj, "tag"), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn empty_cells_contribute_nothing() {
        let obj = aggregate_row(&["", "label", ""], &["id", "name", "tag"]);
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("tag"));
        assert_eq!(values(&obj, "name"), vec![json!("label")]);
    }

    #[test]
    fn short_rows_leave_fields_unset() {
        let obj = aggregate_row(&["x1"], &["id", "name", "tag"]);
        assert_eq!(obj.len(), 1);
        assert_eq!(values(&obj, "id"), vec![json!("x1")]);
    }

    #[test]
    fn repeated_field_names_accumulate() {
        let obj = aggregate_row(&["a", "b", "c"], &["kw", "kw", "kw"]);
        assert_eq!(obj.len(), 1);
        assert_eq!(values(&obj, "kw"), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let raw = ["x1", "", "a", "b"];
        let names = ["id", "name", "tag"];
        assert_eq!(aggregate_row(&raw, &names), aggregate_row(&raw, &names));
    }

    #[test]
    fn unnamed_columns_are_ignored() {
        let obj = aggregate_row(&["x1", "note"], &["id", ""]);
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn header_drops_trailing_unnamed_columns() {
        assert_eq!(
            header_fields(&["name", " keyword ", "", " "]),
            vec!["name".to_string(), "keyword".to_string()]
        );
        assert_eq!(header_fields(&["", "id", ""]), vec!["".to_string(), "id".to_string()]);
    }

    #[test]
    fn excess_values_reach_last_named_column() {
        let header = header_fields(&["name", "keyword", "", ""]);
        let obj = aggregate_row(&["Jane", "a", "b", "c"], &header);
        assert_eq!(values(&obj, "keyword"), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn keyed_row_collects_values() {
        let (key, vals) = keyed_row(&[" keywords ", "a", "", "b", ""]).unwrap();
        assert_eq!(key, "keywords");
        assert_eq!(vals, vec![json!("a"), json!("b")]);

        assert!(keyed_row(&["", "orphan"]).is_none());
        assert!(keyed_row(&["title", "", ""]).is_none());
        assert!(keyed_row::<&str>(&[]).is_none());
    }

    #[test]
    fn last_nonempty_index() {
        assert_eq!(index_after_last_nonempty(&["a", "", "b", ""]), 3);
        assert_eq!(index_after_last_nonempty(&["", ""]), 0);
        assert_eq!(index_after_last_nonempty::<&str>(&[]), 0);
    }
}
