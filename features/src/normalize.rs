use log::trace;
use ndarray::Array2;
use serde_json::{Number, Value};

use crate::{
    error::{FeatureErr, Result},
    schema::{Accept, Coerce, ColumnKind, Schema},
    value::{NormalizedRow, NormalizedValue},
};

/// The request key holding the feature rows.
pub const FEATURES_KEY: &str = "features";

/// Returns the feature payload of a request body.
///
/// # Errors
/// `MissingKey` if the body is not an object or has no `features` entry.
pub fn extract_features(payload: &Value) -> Result<&Value> {
    payload
        .get(FEATURES_KEY)
        .ok_or(FeatureErr::MissingKey { key: FEATURES_KEY })
}

/// Splits a feature payload into rows.
///
/// A list made only of scalars (numbers, strings, booleans or nulls) is taken as a
/// single row, so callers may submit one row without wrapping it. This can't tell one
/// row of `n` scalars apart from `n` rows of one scalar each; the single row reading
/// always wins. An empty list
/// becomes one empty row and is later rejected by the width check.
///
/// # Errors
/// `TypeMismatch` if `features` is not a list.
pub fn auto_wrap(features: &Value) -> Result<Vec<&Value>> {
    let Value::Array(items) = features else {
        return Err(FeatureErr::TypeMismatch {
            row: 0,
            column: FEATURES_KEY.to_string(),
            expected: "a row or a list of rows",
            got: features.clone(),
        });
    };

    if items.iter().all(is_scalar) {
        trace!("wrapping a flat list of {} values as one row", items.len());
        return Ok(vec![features]);
    }

    Ok(items.iter().collect())
}

// Booleans and nulls wrap too, so a bad value in a flat row is reported by column.
fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Validates and transforms every row against `schema`.
///
/// # Arguments
/// * `schema` - The active column layout.
/// * `rows` - The raw rows, usually the output of [`auto_wrap`].
///
/// # Returns
/// One normalized row per input row, in the same order, or the first validation error.
/// No partial result is produced.
pub fn normalize<'a, I>(schema: &Schema, rows: I) -> Result<Vec<NormalizedRow>>
where
    I: IntoIterator<Item = &'a Value>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| normalize_row(schema, i, row))
        .collect()
}

/// Validates and transforms a single row.
///
/// # Arguments
/// * `schema` - The active column layout.
/// * `index` - The row's position in the request, used in error reports.
/// * `row` - The raw row.
///
/// # Returns
/// The normalized row or the first problem found, checking width first and then each
/// column in order.
pub fn normalize_row(schema: &Schema, index: usize, row: &Value) -> Result<NormalizedRow> {
    let Value::Array(values) = row else {
        return Err(FeatureErr::TypeMismatch {
            row: index,
            column: "row".to_string(),
            expected: "a list of values",
            got: row.clone(),
        });
    };

    let expected = schema.width();
    if values.len() != expected {
        return Err(FeatureErr::ShapeMismatch {
            row: index,
            got: values.len(),
            expected,
        });
    }

    let normalized = schema
        .columns()
        .iter()
        .zip(values)
        .map(|(column, value)| {
            let type_mismatch = |expected| FeatureErr::TypeMismatch {
                row: index,
                column: column.name.clone(),
                expected,
                got: value.clone(),
            };

            match &column.kind {
                ColumnKind::Numeric { accept, coerce } => {
                    let Value::Number(n) = value else {
                        return Err(type_mismatch(accept_description(*accept)));
                    };
                    if *accept == Accept::Float && !n.is_f64() {
                        return Err(type_mismatch(accept_description(*accept)));
                    }
                    coerce_number(n, *coerce).ok_or_else(|| type_mismatch("a finite number"))
                }
                ColumnKind::Categorical { mapping } => {
                    let Value::String(label) = value else {
                        return Err(type_mismatch("a string"));
                    };
                    mapping
                        .code(label)
                        .map(NormalizedValue::Int)
                        .ok_or_else(|| FeatureErr::UnknownCategory {
                            row: index,
                            column: column.name.clone(),
                            value: label.clone(),
                        })
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedRow::new(normalized))
}

fn accept_description(accept: Accept) -> &'static str {
    match accept {
        Accept::Float => "a floating point number",
        Accept::Number => "a number",
    }
}

fn coerce_number(n: &Number, coerce: Coerce) -> Option<NormalizedValue> {
    match coerce {
        Coerce::Float => n.as_f64().map(NormalizedValue::Float),
        Coerce::Int => match n.as_i64() {
            Some(v) => Some(NormalizedValue::Int(v)),
            None => n
                .as_f64()
                .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
                .map(|v| NormalizedValue::Int(v.trunc() as i64)),
        },
    }
}

/// Stacks normalized rows into a `(rows, width)` matrix.
///
/// # Errors
/// `ShapeMismatch` naming the first row whose length is not `width`.
pub fn rows_to_matrix(rows: &[NormalizedRow], width: usize) -> Result<Array2<f64>> {
    let mut data = Vec::with_capacity(rows.len() * width);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(FeatureErr::ShapeMismatch {
                row: i,
                got: row.len(),
                expected: width,
            });
        }
        data.extend(row.values().iter().map(|v| v.as_f64()));
    }

    Ok(Array2::from_shape_vec((rows.len(), width), data)
        .unwrap_or_else(|_| unreachable!("every row was checked to have `width` values")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_key() {
        let err = extract_features(&json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingKey);
        assert_eq!(err.to_string(), "Missing 'features' key in request data");

        let err = extract_features(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingKey);

        assert!(extract_features(&json!({"features": []})).is_ok());
    }

    #[test]
    fn test_auto_wrap_flat_row() {
        let features = json!([7420, 4, 2, 3, "yes", "no", "no", "no", "yes", 2, "yes", "furnished"]);
        let rows = auto_wrap(&features).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], &features);
    }

    #[test]
    fn test_auto_wrap_batch() {
        let features = json!([[5.1, 3.5, 1.4, 0.2], [6.2, 3.4, 5.4, 2.3]]);
        let rows = auto_wrap(&features).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &json!([6.2, 3.4, 5.4, 2.3]));
    }

    #[test]
    fn test_auto_wrap_prefers_single_row() {
        let features = json!([1.0, 2.0, 3.0]);
        assert_eq!(auto_wrap(&features).unwrap().len(), 1);
    }

    #[test]
    fn test_auto_wrap_mixed_is_batch() {
        let features = json!([[5.1, 3.5, 1.4, 0.2], 6.2]);
        let rows = auto_wrap(&features).unwrap();
        assert_eq!(rows.len(), 2);

        let err = normalize(&Schema::iris(), rows).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.row(), Some(1));
    }

    #[test]
    fn test_auto_wrap_flat_row_with_bool_or_null() {
        for bad in [json!(true), json!(null)] {
            let features =
                json!([7420, 4, 2, 3, "yes", "no", bad, "no", "yes", 2, "yes", "furnished"]);
            let rows = auto_wrap(&features).unwrap();
            assert_eq!(rows.len(), 1);

            let err = normalize(&Schema::housing(), rows).unwrap_err();
            assert_eq!(
                err,
                FeatureErr::TypeMismatch {
                    row: 0,
                    column: "basement".to_string(),
                    expected: "a string",
                    got: bad.clone(),
                }
            );
        }
    }

    #[test]
    fn test_auto_wrap_rejects_non_list() {
        for features in [json!(5.1), json!("row"), json!({"a": 1}), json!(null)] {
            let err = auto_wrap(&features).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn test_empty_list_is_rejected_by_width() {
        let features = json!([]);
        let rows = auto_wrap(&features).unwrap();
        let err = normalize(&Schema::iris(), rows).unwrap_err();
        assert_eq!(
            err,
            FeatureErr::ShapeMismatch {
                row: 0,
                got: 0,
                expected: 4
            }
        );
    }

    #[test]
    fn test_iris_row() {
        let row = json!([5.1, 3.5, 1.4, 0.2]);
        let normalized = normalize_row(&Schema::iris(), 0, &row).unwrap();
        assert_eq!(normalized.to_f64(), vec![5.1, 3.5, 1.4, 0.2]);
        assert!(
            normalized
                .values()
                .iter()
                .all(|v| matches!(v, NormalizedValue::Float(_)))
        );
    }

    #[test]
    fn test_iris_requires_floats() {
        let row = json!([5, 3, 1, 0]);
        let err = normalize_row(&Schema::iris(), 0, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "Invalid type for 'sepal_length' at index 0: expected a floating point number, got 5"
        );
    }

    #[test]
    fn test_housing_row() {
        let row = json!([7420, 4, 2, 3, "yes", "no", "no", "no", "yes", 2, "yes", "furnished"]);
        let normalized = normalize_row(&Schema::housing(), 0, &row).unwrap();

        let expected: Vec<NormalizedValue> = [7420, 4, 2, 3, 1, 0, 0, 0, 1, 2, 1, 0]
            .into_iter()
            .map(NormalizedValue::Int)
            .collect();
        assert_eq!(normalized.values(), expected.as_slice());
    }

    #[test]
    fn test_housing_truncates_floats() {
        let row = json!([7420.9, 4.0, 2, 3, "yes", "no", "no", "no", "yes", -1.5, "yes", "unfurnished"]);
        let normalized = normalize_row(&Schema::housing(), 0, &row).unwrap();

        assert_eq!(normalized.values()[0], NormalizedValue::Int(7420));
        assert_eq!(normalized.values()[1], NormalizedValue::Int(4));
        assert_eq!(normalized.values()[9], NormalizedValue::Int(-1));
        assert_eq!(normalized.values()[11], NormalizedValue::Int(2));
    }

    #[test]
    fn test_housing_rejects_text_in_numeric_column() {
        let row = json!(["big", 4, 2, 3, "yes", "no", "no", "no", "yes", 2, "yes", "furnished"]);
        let err = normalize_row(&Schema::housing(), 0, &row).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type for 'area' at index 0: expected a number, got \"big\""
        );
    }

    #[test]
    fn test_unknown_category() {
        let rows = json!([
            [7420, 4, 2, 3, "yes", "no", "no", "no", "yes", 2, "yes", "furnished"],
            [8960, 4, 4, 4, "maybe", "no", "no", "no", "yes", 3, "no", "furnished"]
        ]);
        let err = normalize(&Schema::housing(), auto_wrap(&rows).unwrap()).unwrap_err();

        assert_eq!(
            err,
            FeatureErr::UnknownCategory {
                row: 1,
                column: "mainroad".to_string(),
                value: "maybe".to_string()
            }
        );
        assert_eq!(err.to_string(), "Invalid value for 'mainroad' at index 1: maybe");
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let row = json!([7420, 4, 2, 3, "Yes", "no", "no", "no", "yes", 2, "yes", "furnished"]);
        let err = normalize_row(&Schema::housing(), 0, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCategory);
    }

    #[test]
    fn test_category_requires_string() {
        let row = json!([7420, 4, 2, 3, 1, "no", "no", "no", "yes", 2, "yes", "furnished"]);
        let err = normalize_row(&Schema::housing(), 0, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_shape_mismatch_names_row() {
        let rows = json!([[5.1, 3.5, 1.4, 0.2], [6.2, 3.4, 5.4]]);
        let err = normalize(&Schema::iris(), auto_wrap(&rows).unwrap()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(err.row(), Some(1));
        assert_eq!(err.to_string(), "Row at index 1 has 3 values, expected 4");
    }

    #[test]
    fn test_rows_to_matrix() {
        let rows = json!([[5.1, 3.5, 1.4, 0.2], [6.2, 3.4, 5.4, 2.3]]);
        let normalized = normalize(&Schema::iris(), auto_wrap(&rows).unwrap()).unwrap();
        let x = rows_to_matrix(&normalized, 4).unwrap();

        assert_eq!(x.dim(), (2, 4));
        assert_eq!(x[[1, 2]], 5.4);

        let err = rows_to_matrix(&normalized, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }
}
