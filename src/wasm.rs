use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn reflow_template(
    template_json: &str,
    input_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    crate::reflow_json(template_json, input_json.as_deref(), options_json.as_deref())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
