use features::{ColumnKind, ErrorKind, NormalizedValue, Schema, auto_wrap, normalize};
use serde_json::{Value, json};

/// Builds housing rows covering every label of every categorical column.
fn housing_rows(schema: &Schema) -> Vec<Value> {
    let furnishing: Vec<&str> = schema
        .column("furnishingstatus")
        .and_then(|c| c.mapping())
        .map(|m| m.labels().collect())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for (i, status) in furnishing.iter().enumerate() {
        for flag in ["yes", "no"] {
            rows.push(json!([
                5000 + i, 3, 1, 2, flag, flag, flag, flag, flag, i, flag, status
            ]));
        }
    }
    rows
}

#[test]
fn categorical_codes_map_back_to_labels() {
    let schema = Schema::housing();
    let rows = housing_rows(&schema);
    let normalized = normalize(&schema, &rows).unwrap();

    assert_eq!(normalized.len(), rows.len());

    for (raw, row) in rows.iter().zip(&normalized) {
        let raw = raw.as_array().unwrap();
        for ((column, raw_value), value) in schema.columns().iter().zip(raw).zip(row.values()) {
            match &column.kind {
                ColumnKind::Categorical { mapping } => {
                    let NormalizedValue::Int(code) = *value else {
                        panic!("categorical column {} produced {value:?}", column.name);
                    };
                    assert_eq!(mapping.label(code), raw_value.as_str());
                }
                ColumnKind::Numeric { .. } => {
                    assert_eq!(value.as_f64(), raw_value.as_f64().unwrap());
                }
            }
        }
    }
}

#[test]
fn every_wrong_width_is_rejected() {
    let schema = Schema::iris();

    for width in [0, 1, 3, 5, 12] {
        let row: Vec<f64> = (0..width).map(|v| v as f64 + 0.5).collect();
        let features = json!([row]);
        let err = normalize(&schema, auto_wrap(&features).unwrap()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ShapeMismatch, "width {width}");
        assert_eq!(err.row(), Some(0));
    }
}

#[test]
fn batch_fails_fast_on_first_bad_row() {
    let schema = Schema::housing();
    let features = json!([
        [7420, 4, 2, 3, "yes", "no", "no", "no", "yes", 2, "yes", "furnished"],
        [7420, 4, 2, 3, "yes", "nope", "no", "no", "yes", 2, "yes", "furnished"],
        [7420, 4, 2]
    ]);

    let err = normalize(&schema, auto_wrap(&features).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownCategory);
    assert_eq!(err.row(), Some(1));
    assert!(err.to_string().contains("guestroom"));
    assert!(err.to_string().contains("nope"));
}
