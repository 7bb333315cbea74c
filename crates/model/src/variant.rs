use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant of a [`Variant`], used in type checks and the JSON `type` key.
/// [`Variant`] 的型別標記，用於型別檢查與 JSON 的 `type` 欄位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Bool,
    Int,
    Real,
    String,
    Combo,
    External,
    RealVector,
}

impl VariantKind {
    /// Name written into serialized documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Bool => "bool",
            VariantKind::Int => "int",
            VariantKind::Real => "double",
            VariantKind::String => "string",
            VariantKind::Combo => "combo",
            VariantKind::External => "external",
            VariantKind::RealVector => "vector_double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => VariantKind::Bool,
            "int" => VariantKind::Int,
            "double" => VariantKind::Real,
            "string" => VariantKind::String,
            "combo" => VariantKind::Combo,
            "external" => VariantKind::External,
            "vector_double" => VariantKind::RealVector,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enumerated value: a list of labels with one selected entry.
/// 列舉值：一組標籤與目前選取的索引。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawComboProperty")]
pub struct ComboProperty {
    values: Vec<String>,
    selected: usize,
}

/// Unchecked wire form; the selection is validated before a `ComboProperty` exists.
#[derive(Deserialize)]
struct RawComboProperty {
    values: Vec<String>,
    selected: usize,
}

impl TryFrom<RawComboProperty> for ComboProperty {
    type Error = String;

    fn try_from(raw: RawComboProperty) -> Result<Self, Self::Error> {
        if raw.selected >= raw.values.len() {
            return Err(format!(
                "selection {} is out of range for {} values",
                raw.selected,
                raw.values.len()
            ));
        }
        Ok(Self {
            values: raw.values,
            selected: raw.selected,
        })
    }
}

impl ComboProperty {
    /// Builds a combo selecting the first entry. Returns `None` for an empty list.
    pub fn new<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return None;
        }
        Some(Self {
            values,
            selected: 0,
        })
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn current_index(&self) -> usize {
        self.selected
    }

    pub fn current_value(&self) -> &str {
        &self.values[self.selected]
    }

    /// Selects the entry at `index`; out-of-range indices are ignored and return `false`.
    pub fn set_current_index(&mut self, index: usize) -> bool {
        if index < self.values.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn set_current_value(&mut self, value: &str) -> bool {
        match self.values.iter().position(|candidate| candidate == value) {
            Some(index) => self.set_current_index(index),
            None => false,
        }
    }
}

/// Reference to an item living elsewhere (for example a material), shown as text and color.
/// 指向其他項目（例如材料）的外部參照，以文字與顏色呈現。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProperty {
    pub text: String,
    pub color: String,
    #[serde(default)]
    pub identifier: String,
}

impl ExternalProperty {
    pub fn new(
        text: impl Into<String>,
        color: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
            identifier: identifier.into(),
        }
    }

    /// Placeholder reference pointing nowhere.
    pub fn undefined() -> Self {
        Self::new("Undefined", "#ff0000", "")
    }

    pub fn is_valid(&self) -> bool {
        !self.identifier.is_empty()
    }
}

/// Optional lower/upper bounds attached to numeric properties. Limits are advisory: editors use
/// them, `set_property` does not enforce them.
/// 數值屬性的上下限；僅供編輯器參考。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RealLimits {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl RealLimits {
    pub fn limitless() -> Self {
        Self::default()
    }

    pub fn nonnegative() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }

    pub fn positive() -> Self {
        Self {
            lower: Some(f64::MIN_POSITIVE),
            upper: None,
        }
    }

    pub fn limited(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn is_limitless(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    pub fn is_in_range(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| value >= lower)
            && self.upper.map_or(true, |upper| value <= upper)
    }
}

/// Value stored in a property slot.
/// 屬性欄位中儲存的值。
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Combo(ComboProperty),
    External(ExternalProperty),
    RealVector(Vec<f64>),
}

impl Variant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Int(_) => VariantKind::Int,
            Variant::Real(_) => VariantKind::Real,
            Variant::String(_) => VariantKind::String,
            Variant::Combo(_) => VariantKind::Combo,
            Variant::External(_) => VariantKind::External,
            Variant::RealVector(_) => VariantKind::RealVector,
        }
    }

    pub fn is_same_kind(&self, other: &Variant) -> bool {
        self.kind() == other.kind()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(value) => write!(f, "{value}"),
            Variant::Int(value) => write!(f, "{value}"),
            Variant::Real(value) => write!(f, "{value}"),
            Variant::String(value) => write!(f, "\"{value}\""),
            Variant::Combo(combo) => write!(f, "{}", combo.current_value()),
            Variant::External(external) => write!(f, "{} ({})", external.text, external.color),
            Variant::RealVector(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::Int(i64::from(value))
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Real(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<ComboProperty> for Variant {
    fn from(value: ComboProperty) -> Self {
        Variant::Combo(value)
    }
}

impl From<ExternalProperty> for Variant {
    fn from(value: ExternalProperty) -> Self {
        Variant::External(value)
    }
}

impl From<Vec<f64>> for Variant {
    fn from(value: Vec<f64>) -> Self {
        Variant::RealVector(value)
    }
}

/// Typed extraction used by `SessionItem::property::<T>()`.
pub trait FromVariant: Sized {
    const KIND: VariantKind;

    fn from_variant(value: &Variant) -> Option<Self>;
}

macro_rules! impl_from_variant {
    ($ty:ty, $kind:ident, $pattern:pat => $out:expr) => {
        impl FromVariant for $ty {
            const KIND: VariantKind = VariantKind::$kind;

            fn from_variant(value: &Variant) -> Option<Self> {
                match value {
                    $pattern => Some($out),
                    _ => None,
                }
            }
        }
    };
}

impl_from_variant!(bool, Bool, Variant::Bool(v) => *v);
impl_from_variant!(i64, Int, Variant::Int(v) => *v);
impl_from_variant!(f64, Real, Variant::Real(v) => *v);
impl_from_variant!(String, String, Variant::String(v) => v.clone());
impl_from_variant!(ComboProperty, Combo, Variant::Combo(v) => v.clone());
impl_from_variant!(ExternalProperty, External, Variant::External(v) => v.clone());
impl_from_variant!(Vec<f64>, RealVector, Variant::RealVector(v) => v.clone());
