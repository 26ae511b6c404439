//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod stubs;

use figure_forge::schema::Schema;
use figure_forge::types::Value;

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Assert a value is a float close to `expected`
pub fn assert_value_float(value: &Value, expected: f64) {
    let actual = value
        .as_f64()
        .unwrap_or_else(|| panic!("Expected a number, got {:?}", value));
    assert_float_eq(actual, expected, 1e-9);
}

/// The schema used by most stub-based tests
pub const STUB_SCHEMA: &str = r#"{
    "Line2D": {
        "attributes": {
            "label": { "type": "string", "get": "get_label", "set": "set_label" },
            "width": { "type": "float", "get": "get_linewidth", "set": "set_linewidth" },
            "color": { "type": "color", "get": "get_color", "set": "set_color" },
            "zorder": { "type": "float", "get": "zorder", "set": "zorder" }
        }
    },
    "Axes": {
        "attributes": {
            "xlabel": { "type": "string", "get": "xaxis.label.get_text", "set": "xaxis.label.set_text" },
            "xmin": { "type": "float", "get": "get_xlim", "get_index": 0, "set": "set_xlim", "set_parameter": "left" },
            "data_interval": { "type": "tuple", "get": "get_data_interval", "types": ["float", "float"] }
        }
    },
    "Spine": {
        "attributes": {}
    }
}"#;

pub fn stub_schema() -> Schema {
    Schema::from_json_str(STUB_SCHEMA).expect("stub schema is valid")
}
