//! Flat JSON payload in user units → SI [`SimRequest`].
//!
//! Payload units: le mH, vas L, cms µm/N, mms g, sd cm², box edges cm or
//! vb L, port length/diameter/width/height cm, port area cm².

use box_core::{
    CabinetSpec, DriverParams, EngineConfig, EnclosureSpec, PortShape, PortSpec, SimError,
    SimRequest,
};
use serde_json::{Map, Value};

const MILLI: f64 = 1e-3;
const MICRO: f64 = 1e-6;
const CENTI: f64 = 1e-2;
const CM2: f64 = 1e-4;

type Payload = Map<String, Value>;

/// Read a numeric field; numeric strings are accepted as well.
fn number(payload: &Payload, name: &str) -> Result<Option<f64>, SimError> {
    let value = match payload.get(name) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| SimError::InvalidParameter {
        name: name.to_string(),
        value: f64::NAN,
        reason: format!("expected a number, got {value}"),
    })
}

fn required(payload: &Payload, name: &str) -> Result<f64, SimError> {
    number(payload, name)?.ok_or_else(|| SimError::MissingParameter {
        name: name.to_string(),
    })
}

fn flag(payload: &Payload, name: &str) -> bool {
    match payload.get(name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "1"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

pub fn driver_params(payload: &Payload) -> Result<DriverParams, SimError> {
    Ok(DriverParams {
        re: required(payload, "re")?,
        le: required(payload, "le")? * MILLI,
        qes: required(payload, "qes")?,
        qms: required(payload, "qms")?,
        fs: required(payload, "fs")?,
        vas: required(payload, "vas")? * MILLI,
        cms: required(payload, "cms")? * MICRO,
        mms: required(payload, "mms")? * MILLI,
        bl: required(payload, "bl")?,
        sd: required(payload, "sd")? * CM2,
        rms: number(payload, "rms")?,
        z: number(payload, "z")?,
    })
}

fn cabinet(payload: &Payload) -> Result<CabinetSpec, SimError> {
    let edges = ["lx", "ly", "lz"];
    let given: Vec<Option<f64>> = edges
        .iter()
        .map(|name| number(payload, name))
        .collect::<Result<_, _>>()?;

    if given.iter().all(Option::is_none) {
        if let Some(vb) = number(payload, "vb")? {
            return Ok(CabinetSpec::Volume { vb: vb * MILLI });
        }
    }
    Ok(CabinetSpec::Dimensions {
        lx: required(payload, "lx")? * CENTI,
        ly: required(payload, "ly")? * CENTI,
        lz: required(payload, "lz")? * CENTI,
    })
}

fn port(payload: &Payload) -> Result<PortSpec, SimError> {
    let length = required(payload, "port_length")? * CENTI;
    let width = number(payload, "port_width")?;
    let height = number(payload, "port_height")?;

    let shape = if width.is_some() || height.is_some() {
        PortShape::Rectangular {
            width: required(payload, "port_width")? * CENTI,
            height: required(payload, "port_height")? * CENTI,
        }
    } else if let Some(diameter) = number(payload, "port_diameter")? {
        PortShape::Circular {
            diameter: diameter * CENTI,
        }
    } else if let Some(area) = number(payload, "port_area")? {
        PortShape::Area { area: area * CM2 }
    } else {
        return Err(SimError::MissingParameter {
            name: "port_diameter".to_string(),
        });
    };
    Ok(PortSpec { length, shape })
}

pub fn enclosure_spec(payload: &Payload) -> Result<EnclosureSpec, SimError> {
    let scenario = match payload.get("scenario") {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(SimError::UnknownScenario {
                name: other.to_string(),
            })
        }
        None => {
            return Err(SimError::MissingParameter {
                name: "scenario".to_string(),
            })
        }
    };
    match scenario {
        "open_air" => Ok(EnclosureSpec::OpenAir),
        "sealed" => Ok(EnclosureSpec::Sealed {
            cabinet: cabinet(payload)?,
        }),
        "ported" => Ok(EnclosureSpec::Ported {
            cabinet: cabinet(payload)?,
            port: port(payload)?,
        }),
        other => Err(SimError::UnknownScenario {
            name: other.to_string(),
        }),
    }
}

/// Build a request from `payload`; a `split` key in the payload turns on
/// the ported contribution split on top of `config`.
pub fn request_from_payload(
    payload: &Payload,
    mut config: EngineConfig,
) -> Result<SimRequest, SimError> {
    let enclosure = enclosure_spec(payload)?;
    let driver = driver_params(payload)?;
    if flag(payload, "split") {
        config.split_contributions = true;
    }
    Ok(SimRequest {
        config,
        ..SimRequest::new(driver, enclosure)
    })
}
