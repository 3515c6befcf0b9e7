//! Integration tests for the reflow pipeline.
//!
//! These exercise the public entry points end to end:
//! - templates without tables come back unchanged
//! - fields below a grown table shift by exactly its delta
//! - overflowing fields move to the next page, creating it if needed
//! - no field is ever lost or duplicated
//! - the JSON entry point with the built-in measurer

use std::collections::HashMap;

use reflow::layout::{normalize, DiffMap};
use reflow::measure::{MeasureRequest, TableMeasurement, TableMeasurer};
use reflow::model::*;
use reflow::registry::Registry;
use reflow::{reflow, reflow_json, reflow_with, ReflowError, Result};
use serde_json::{json, Value};

// ─── Helpers ────────────────────────────────────────────────────

/// Reports a fixed height per table key, split evenly into head and body.
struct StubMeasurer {
    heights: HashMap<String, f64>,
}

impl StubMeasurer {
    fn new(heights: &[(&str, f64)]) -> Self {
        Self {
            heights: heights
                .iter()
                .map(|(k, h)| (k.to_string(), *h))
                .collect(),
        }
    }
}

impl TableMeasurer for StubMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TableMeasurement> {
        let height = self.heights.get(request.key).copied().ok_or_else(|| {
            ReflowError::Measurement(format!("no stub height for `{}`", request.key))
        })?;
        Ok(TableMeasurement {
            head_height: height / 2.0,
            body_height: height / 2.0,
            row_heights: vec![],
        })
    }
}

/// Each bound row adds 10 to a 10-high head.
struct RowMeasurer;

impl TableMeasurer for RowMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TableMeasurement> {
        Ok(TableMeasurement {
            head_height: 10.0,
            body_height: 10.0 * request.rows.len() as f64,
            row_heights: vec![10.0; request.rows.len()],
        })
    }
}

/// The geometry used by the pagination scenarios: 200 high, padding
/// [10, 0, 20, 0], so the printable area ends at 180.
fn small_page() -> PageGeometry {
    PageGeometry::new(100.0, 200.0, Edges::new(10.0, 0.0, 20.0, 0.0))
}

fn text(x: f64, y: f64, height: f64) -> Schema {
    Schema::new("text", x, y, 50.0, height)
}

fn table(y: f64, height: f64) -> Schema {
    Schema::new("table", 0.0, y, 100.0, height)
        .with_property("head", json!(["A"]))
        .with_property("headWidthPercentages", json!([100]))
}

fn page(fields: Vec<(&str, Schema)>) -> Page {
    fields.into_iter().collect()
}

fn no_input() -> BoundInput {
    BoundInput::new()
}

fn sorted_keys(t: &Template) -> Vec<String> {
    let mut keys: Vec<String> = t.fields().map(|(_, k, _)| k.to_string()).collect();
    keys.sort();
    keys
}

// ─── No-op ──────────────────────────────────────────────────────

#[test]
fn test_no_content_dependent_fields_is_identity() {
    let t = Template::new(
        small_page(),
        vec![
            page(vec![("a", text(0.0, 20.0, 10.0)), ("b", text(0.0, 170.0, 30.0))]),
            page(vec![("c", text(10.0, 50.0, 10.0))]),
        ],
    );
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[])).unwrap();
    assert_eq!(out, t);
}

#[test]
fn test_zero_delta_is_identity() {
    let t = Template::new(
        small_page(),
        vec![page(vec![
            ("items", table(20.0, 40.0)),
            ("below", text(0.0, 100.0, 50.0)),
            // Already past the printable area; a zero delta must not move it.
            ("low", text(0.0, 170.0, 20.0)),
        ])],
    );
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 40.0)])).unwrap();
    assert_eq!(out, t);
}

#[test]
fn test_zero_delta_diff_map_directly() {
    let t = Template::new(
        small_page(),
        vec![page(vec![("a", text(0.0, 50.0, 10.0)), ("b", text(0.0, 150.0, 10.0))])],
    );
    let diff: DiffMap = vec![(20.0, 0.0), (100.0, 0.0)].into_iter().collect();
    assert_eq!(normalize(&t, &diff).unwrap(), t);
}

// ─── Shifting ───────────────────────────────────────────────────

#[test]
fn test_fit_without_move() {
    // Table bottom at 60; grows by 10.
    let t = Template::new(
        small_page(),
        vec![page(vec![("items", table(20.0, 40.0)), ("field", text(0.0, 100.0, 50.0))])],
    );
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 50.0)])).unwrap();
    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].get("field").unwrap().position.y, 110.0);
    // The table itself sits above its own threshold.
    assert_eq!(out.pages[0].get("items").unwrap().position.y, 20.0);
}

#[test]
fn test_monotonic_shift_with_bound_rows() {
    let t = Template::new(
        PageGeometry::a4(),
        vec![page(vec![
            ("title", text(0.0, 5.0, 10.0)),
            ("items", table(20.0, 20.0)),
            ("total", text(0.0, 45.0, 10.0)),
        ])],
    );
    let input: BoundInput = [("items".to_string(), r#"[["1"],["2"],["3"],["4"]]"#.to_string())]
        .into_iter()
        .collect();
    let out = reflow(&t, &input, &RowMeasurer).unwrap();
    // 10 + 4 * 10 = 50 measured, 20 declared.
    assert_eq!(out.pages[0].get("total").unwrap().position.y, 75.0);
    assert_eq!(out.pages[0].get("title").unwrap().position.y, 5.0);
}

#[test]
fn test_shrinking_table_pulls_fields_up() {
    let t = Template::new(
        PageGeometry::a4(),
        vec![page(vec![("items", table(20.0, 60.0)), ("total", text(0.0, 90.0, 10.0))])],
    );
    // No rows: only the 10-high head remains.
    let out = reflow(&t, &no_input(), &RowMeasurer).unwrap();
    assert_eq!(out.pages[0].get("total").unwrap().position.y, 40.0);
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_pagination_trigger() {
    let t = Template::new(
        small_page(),
        vec![page(vec![("items", table(20.0, 40.0)), ("field", text(0.0, 100.0, 50.0))])],
    );
    // delta 40: 100 + 40 + 50 = 190 > 180.
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 80.0)])).unwrap();
    assert_eq!(out.pages.len(), 2);
    assert!(!out.pages[0].contains_key("field"));
    assert_eq!(out.pages[1].get("field").unwrap().position.y, 10.0);
}

#[test]
fn test_new_page_creation() {
    let t = Template::new(small_page(), vec![page(vec![("only", text(0.0, 100.0, 50.0))])]);
    let diff: DiffMap = vec![(50.0, 40.0)].into_iter().collect();
    let out = normalize(&t, &diff).unwrap();
    assert_eq!(out.pages.len(), 2);
    assert!(out.pages[0].is_empty());
    assert_eq!(out.pages[1].len(), 1);
    assert_eq!(out.pages[1].get("only").unwrap().position.y, 10.0);
}

#[test]
fn test_overflow_preserves_excess_distance() {
    let t = Template::new(
        small_page(),
        vec![page(vec![("items", table(10.0, 20.0)), ("far", text(0.0, 150.0, 10.0))])],
    );
    // delta 100: shifted 250, 10 + 250 - 180 = 80.
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 120.0)])).unwrap();
    assert_eq!(out.pages[1].get("far").unwrap().position.y, 80.0);
}

#[test]
fn test_overflow_lands_before_next_page_fields() {
    let t = Template::new(
        small_page(),
        vec![
            page(vec![("items", table(20.0, 40.0)), ("footer", text(0.0, 120.0, 40.0))]),
            page(vec![("intro", text(0.0, 10.0, 10.0))]),
        ],
    );
    let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 90.0)])).unwrap();
    assert_eq!(out.pages.len(), 2);
    assert_eq!(out.pages[1].keys().collect::<Vec<_>>(), vec!["footer", "intro"]);
}

#[test]
fn test_non_loss() {
    let t = Template::new(
        small_page(),
        vec![
            page(vec![
                ("items", table(20.0, 20.0)),
                ("a", text(0.0, 60.0, 20.0)),
                ("b", text(0.0, 100.0, 30.0)),
                ("c", text(0.0, 150.0, 20.0)),
            ]),
            page(vec![("d", text(0.0, 30.0, 20.0)), ("e", text(0.0, 120.0, 40.0))]),
        ],
    );
    for height in [0.0, 10.0, 20.0, 45.0, 90.0, 160.0] {
        let out = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", height)])).unwrap();
        assert_eq!(sorted_keys(&out), sorted_keys(&t), "height {}", height);
        assert_eq!(out.field_count(), t.field_count());
        for (_, key, _) in out.fields() {
            let pages_with_key = out.pages.iter().filter(|p| p.contains_key(key)).count();
            assert_eq!(pages_with_key, 1, "`{}` duplicated at height {}", key, height);
        }
    }
}

#[test]
fn test_input_template_untouched() {
    let t = Template::new(
        small_page(),
        vec![page(vec![("items", table(20.0, 40.0)), ("field", text(0.0, 100.0, 50.0))])],
    );
    let before = t.clone();
    let _ = reflow(&t, &no_input(), &StubMeasurer::new(&[("items", 200.0)])).unwrap();
    assert_eq!(t, before);
}

// ─── Multiple thresholds ────────────────────────────────────────

fn two_tables() -> Template {
    Template::new(
        PageGeometry::a4(),
        vec![page(vec![
            ("first", table(10.0, 20.0)),
            ("middle", text(0.0, 40.0, 10.0)),
            ("second", table(60.0, 20.0)),
            ("last", text(0.0, 100.0, 10.0)),
        ])],
    )
}

#[test]
fn test_last_wins_uses_nearest_threshold() {
    let stub = StubMeasurer::new(&[("first", 30.0), ("second", 50.0)]);
    let out = reflow(&two_tables(), &no_input(), &stub).unwrap();
    assert_eq!(out.pages[0].get("middle").unwrap().position.y, 50.0);
    // Only the second table's +30 applies, not +10 +30.
    assert_eq!(out.pages[0].get("last").unwrap().position.y, 130.0);
    // The second table is below the first threshold and moves with it.
    assert_eq!(out.pages[0].get("second").unwrap().position.y, 70.0);
}

#[test]
fn test_cumulative_policy_sums() {
    let stub = StubMeasurer::new(&[("first", 30.0), ("second", 50.0)]);
    let options = ReflowOptions {
        delta_policy: DeltaPolicy::Cumulative,
        ..Default::default()
    };
    let out = reflow_with(&two_tables(), &no_input(), &stub, &Registry::builtin(), &options)
        .unwrap();
    assert_eq!(out.pages[0].get("last").unwrap().position.y, 140.0);
}

// ─── Errors ─────────────────────────────────────────────────────

#[test]
fn test_malformed_content_aborts() {
    let t = Template::new(small_page(), vec![page(vec![("items", table(20.0, 40.0))])]);
    let input: BoundInput = [("items".to_string(), "[[1, 2]]".to_string())]
        .into_iter()
        .collect();
    let err = reflow(&t, &input, &RowMeasurer).unwrap_err();
    assert!(matches!(err, ReflowError::ContentParse { .. }));
}

#[test]
fn test_measurer_failure_aborts() {
    let t = Template::new(small_page(), vec![page(vec![("items", table(20.0, 40.0))])]);
    let err = reflow(&t, &no_input(), &StubMeasurer::new(&[])).unwrap_err();
    assert!(matches!(err, ReflowError::Measurement(_)));
}

#[test]
fn test_bad_geometry_aborts_before_measuring() {
    let t = Template::new(
        PageGeometry::new(100.0, 30.0, Edges::new(20.0, 0.0, 10.0, 0.0)),
        vec![page(vec![("items", table(0.0, 10.0))])],
    );
    // The stub would fail too; the geometry check comes first.
    let err = reflow(&t, &no_input(), &StubMeasurer::new(&[])).unwrap_err();
    assert!(matches!(err, ReflowError::Configuration(_)));
}

#[test]
fn test_unknown_field_type() {
    let t = Template::new(
        small_page(),
        vec![page(vec![("sig", Schema::new("signature", 0.0, 0.0, 10.0, 10.0))])],
    );
    let err = reflow(&t, &no_input(), &RowMeasurer).unwrap_err();
    assert!(matches!(err, ReflowError::UnknownFieldType(ref t) if t == "signature"));
}

// ─── JSON entry point ───────────────────────────────────────────

fn invoice_template() -> Value {
    json!({
        "schemas": [{
            "title": { "type": "text", "position": { "x": 20, "y": 20 }, "width": 170, "height": 12, "content": "Invoice" },
            "items": {
                "type": "table",
                "position": { "x": 20, "y": 40 },
                "width": 170,
                "height": 20,
                "head": ["Description", "Qty"],
                "headWidthPercentages": [80, 20],
                "headStyles": { "fontSize": 10, "padding": { "top": 2, "right": 2, "bottom": 2, "left": 2 } },
                "bodyStyles": { "fontSize": 10, "padding": { "top": 2, "right": 2, "bottom": 2, "left": 2 } }
            },
            "total": { "type": "text", "position": { "x": 130, "y": 70 }, "width": 60, "height": 10 },
            "terms": { "type": "text", "position": { "x": 20, "y": 250 }, "width": 170, "height": 20 }
        }],
        "basePdf": { "width": 210, "height": 297, "padding": [20, 20, 20, 20] }
    })
}

#[test]
fn test_reflow_json_grows_table() {
    let rows: Vec<Vec<String>> = (0..20)
        .map(|i| vec![format!("Line item {}", i), "1".to_string()])
        .collect();
    let input = json!({ "items": serde_json::to_string(&rows).unwrap() });
    let out = reflow_json(
        &invoice_template().to_string(),
        Some(&input.to_string()),
        None,
    )
    .unwrap();
    let out: Template = serde_json::from_str(&out).unwrap();

    let total_y = out.find("total").unwrap().position.y;
    assert!(total_y > 70.0, "total should move down, got {}", total_y);
    assert_eq!(out.page_of("title"), Some(0));
    assert_eq!(out.page_of("total"), Some(0));
    // 21 rows of ~7.7mm push `terms` off page one but keep `total` on it.
    assert_eq!(out.pages.len(), 2);
    assert_eq!(out.page_of("terms"), Some(1));
    assert_eq!(out.field_count(), 4);
}

#[test]
fn test_reflow_json_preserves_unknown_properties() {
    let out = reflow_json(&invoice_template().to_string(), None, None).unwrap();
    let out: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(out["schemas"][0]["title"]["content"], json!("Invoice"));
    assert_eq!(out["schemas"][0]["items"]["head"], json!(["Description", "Qty"]));
}

#[test]
fn test_reflow_json_rejects_bad_template() {
    let err = reflow_json("{\"schemas\": [}", None, None).unwrap_err();
    assert!(matches!(err, ReflowError::TemplateParse { document: "template", .. }));
}

#[test]
fn test_reflow_json_names_bad_input_and_options() {
    let template = invoice_template().to_string();

    let err = reflow_json(&template, Some(r#"{"items": [["a"]]}"#), None).unwrap_err();
    assert!(matches!(err, ReflowError::TemplateParse { document: "bound input", .. }));
    assert!(err.to_string().starts_with("Failed to parse bound input"));

    let err = reflow_json(&template, None, Some(r#"{"deltaPolicy": "sometimes"}"#)).unwrap_err();
    assert!(matches!(err, ReflowError::TemplateParse { document: "options", .. }));
}

#[test]
fn test_reflow_json_rejects_bad_font() {
    let err = reflow_json(
        &invoice_template().to_string(),
        None,
        Some(r#"{"fonts":[{"family":"Broken","src":"%%%"}]}"#),
    )
    .unwrap_err();
    assert!(matches!(err, ReflowError::Measurement(_)));
}
