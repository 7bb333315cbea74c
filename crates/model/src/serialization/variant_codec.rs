use serde_json::{json, Value};

use crate::error::{ModelError, ModelResult};
use crate::serialization::format::{TYPE_KEY, VALUE_KEY};
use crate::variant::{ComboProperty, ExternalProperty, RealLimits, Variant, VariantKind};

const NAN_TEXT: &str = "nan";
const INF_TEXT: &str = "inf";
const NEG_INF_TEXT: &str = "-inf";

/// Encodes a value as `{"type": kind, "value": payload}`.
/// 將值編碼為 `{"type": 種類, "value": 內容}`。
pub fn variant_to_json(value: &Variant) -> Value {
    let payload = match value {
        Variant::Bool(v) => json!(v),
        Variant::Int(v) => json!(v),
        Variant::Real(v) => real_to_json(*v),
        Variant::String(v) => json!(v),
        Variant::Combo(combo) => json!({
            "values": combo.values(),
            "selected": combo.current_index(),
        }),
        Variant::External(external) => json!({
            "text": external.text,
            "color": external.color,
            "identifier": external.identifier,
        }),
        Variant::RealVector(values) => values.iter().copied().map(real_to_json).collect(),
    };
    json!({ TYPE_KEY: value.kind().as_str(), VALUE_KEY: payload })
}

/// Decodes a value written by [`variant_to_json`].
pub fn variant_from_json(json: &Value) -> ModelResult<Variant> {
    let kind_name = json
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::malformed("value without a type"))?;
    let kind = VariantKind::from_name(kind_name)
        .ok_or_else(|| ModelError::malformed(format!("unknown value type '{kind_name}'")))?;
    let payload = json
        .get(VALUE_KEY)
        .ok_or_else(|| ModelError::malformed(format!("{kind_name} value without payload")))?;
    let mismatch = || ModelError::malformed(format!("payload does not hold a {kind_name}"));

    let value = match kind {
        VariantKind::Bool => Variant::Bool(payload.as_bool().ok_or_else(mismatch)?),
        VariantKind::Int => Variant::Int(payload.as_i64().ok_or_else(mismatch)?),
        VariantKind::Real => Variant::Real(real_from_json(payload).ok_or_else(mismatch)?),
        VariantKind::String => Variant::String(payload.as_str().ok_or_else(mismatch)?.to_string()),
        VariantKind::Combo => {
            let combo: ComboProperty = serde_json::from_value(payload.clone())
                .map_err(|err| ModelError::malformed(format!("invalid combo: {err}")))?;
            Variant::Combo(combo)
        }
        VariantKind::External => {
            let external: ExternalProperty =
                serde_json::from_value(payload.clone()).map_err(|_| mismatch())?;
            Variant::External(external)
        }
        VariantKind::RealVector => {
            let values = payload
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|v| real_from_json(v).ok_or_else(mismatch))
                .collect::<ModelResult<Vec<f64>>>()?;
            Variant::RealVector(values)
        }
    };
    Ok(value)
}

/// Finite reals are plain JSON numbers; NaN and infinities, which JSON numbers cannot hold,
/// are written as the strings `"nan"`, `"inf"` and `"-inf"`.
/// 有限實數寫成 JSON 數字；NaN 與無限大寫成字串。
fn real_to_json(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else if value.is_nan() {
        json!(NAN_TEXT)
    } else if value > 0.0 {
        json!(INF_TEXT)
    } else {
        json!(NEG_INF_TEXT)
    }
}

fn real_from_json(json: &Value) -> Option<f64> {
    if let Some(value) = json.as_f64() {
        return Some(value);
    }
    match json.as_str()? {
        NAN_TEXT => Some(f64::NAN),
        INF_TEXT => Some(f64::INFINITY),
        NEG_INF_TEXT => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

pub fn limits_to_json(limits: &RealLimits) -> Value {
    json!({ "lower": limits.lower, "upper": limits.upper })
}

pub fn limits_from_json(json: &Value) -> ModelResult<RealLimits> {
    serde_json::from_value(json.clone())
        .map_err(|err| ModelError::malformed(format!("invalid limits: {err}")))
}
