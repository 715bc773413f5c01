//! JSON result envelope written to stdout.

use box_core::FrequencyResponse;
use serde_json::{json, Map, Value};

/// `{ scenario: values }`
fn keyed(scenario: &str, values: &[f64]) -> Value {
    let mut map = Map::new();
    map.insert(scenario.to_string(), json!(values));
    Value::Object(map)
}

pub fn success(response: &FrequencyResponse) -> Value {
    let scenario = response.scenario.as_str();
    let mut envelope = Map::new();
    envelope.insert("frequencies".into(), json!(response.frequencies));
    envelope.insert("spl".into(), keyed(scenario, &response.spl));
    envelope.insert("impedance".into(), keyed(scenario, &response.impedance));
    envelope.insert("power".into(), keyed(scenario, &response.power));
    if let Some(fb) = response.tuning_frequency {
        envelope.insert("fb".into(), json!(fb));
    }
    if let Some(port) = &response.port_spl {
        envelope.insert("spl_port".into(), keyed(scenario, port));
    }
    if let Some(diaphragm) = &response.diaphragm_spl {
        envelope.insert("spl_diaphragm".into(), keyed(scenario, diaphragm));
    }
    Value::Object(envelope)
}

pub fn failure(message: &str) -> Value {
    json!({ "error": message })
}
