//! Axis items shared by plotting-oriented applications.
//! 繪圖類應用共用的座標軸項目。

use crate::error::ModelResult;
use crate::factory::ItemFactory;
use crate::item::SessionItem;
use crate::variant::RealLimits;

pub const VIEWPORT_AXIS_TYPE: &str = "ViewportAxis";
pub const FIXED_BIN_AXIS_TYPE: &str = "FixedBinAxis";
pub const POINTWISE_AXIS_TYPE: &str = "PointwiseAxis";

pub const P_TITLE: &str = "P_TITLE";
pub const P_MIN: &str = "P_MIN";
pub const P_MAX: &str = "P_MAX";
pub const P_IS_LOG: &str = "P_IS_LOG";
pub const P_NBINS: &str = "P_NBINS";
pub const P_POINTS: &str = "P_POINTS";

const DEFAULT_AXIS_MIN: f64 = 0.0;
const DEFAULT_AXIS_MAX: f64 = 1.0;

pub fn register_standard_items(factory: &mut ItemFactory) {
    factory.register_type(VIEWPORT_AXIS_TYPE, viewport_axis);
    factory.register_type(FIXED_BIN_AXIS_TYPE, fixed_bin_axis);
    factory.register_type(POINTWISE_AXIS_TYPE, pointwise_axis);
}

fn with_min_max(item: &mut SessionItem) {
    let slots = [(P_MIN, DEFAULT_AXIS_MIN, "Min"), (P_MAX, DEFAULT_AXIS_MAX, "Max")];
    for (role, value, label) in slots {
        if let Ok(slot) = item.add_property(role, value) {
            slot.set_display_name(label)
                .set_limits(RealLimits::limitless());
        }
    }
}

/// Axis of a plot viewport: title, visible range and log flag.
pub fn viewport_axis() -> SessionItem {
    let mut item = SessionItem::new(VIEWPORT_AXIS_TYPE);
    if let Ok(slot) = item.add_property(P_TITLE, "") {
        slot.set_display_name("Title");
    }
    with_min_max(&mut item);
    if let Ok(slot) = item.add_property(P_IS_LOG, false) {
        slot.set_display_name("log10");
    }
    item
}

fn binned_axis(model_type: &str) -> SessionItem {
    let mut item = SessionItem::new(model_type);
    if let Ok(slot) = item.add_property(P_NBINS, 1) {
        slot.set_display_name("Nbins");
    }
    with_min_max(&mut item);
    item
}

/// Axis with `nbins` equal bins between min and max.
pub fn fixed_bin_axis() -> SessionItem {
    binned_axis(FIXED_BIN_AXIS_TYPE)
}

/// Axis defined by an explicit list of bin centers.
pub fn pointwise_axis() -> SessionItem {
    let mut item = binned_axis(POINTWISE_AXIS_TYPE);
    if let Ok(slot) = item.add_property(P_POINTS, vec![DEFAULT_AXIS_MIN, DEFAULT_AXIS_MAX]) {
        slot.set_display_name("Points");
    }
    item
}

/// Returns the (lower, upper) range of any axis item.
pub fn axis_range(item: &SessionItem) -> ModelResult<(f64, f64)> {
    Ok((item.property::<f64>(P_MIN)?, item.property::<f64>(P_MAX)?))
}

pub fn set_axis_range(item: &mut SessionItem, lower: f64, upper: f64) -> ModelResult<()> {
    item.set_property(P_MIN, lower)?;
    item.set_property(P_MAX, upper)
}

pub fn is_in_log(item: &SessionItem) -> ModelResult<bool> {
    item.property::<bool>(P_IS_LOG)
}

/// Builds a fixed-bin axis.
pub fn create_fixed_bin_axis(nbins: i64, xmin: f64, xmax: f64) -> ModelResult<SessionItem> {
    let mut item = fixed_bin_axis();
    item.set_property(P_NBINS, nbins)?;
    set_axis_range(&mut item, xmin, xmax)?;
    Ok(item)
}

/// Builds a pointwise axis. Bin count and range follow the points and become read-only.
/// 以資料點建立軸；bin 數與範圍由資料點決定並設為唯讀。
pub fn create_pointwise_axis(points: Vec<f64>) -> ModelResult<SessionItem> {
    let mut item = pointwise_axis();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => (DEFAULT_AXIS_MIN, DEFAULT_AXIS_MAX),
    };
    item.set_property(P_NBINS, points.len() as i64)?;
    set_axis_range(&mut item, first, last)?;
    item.set_property(P_POINTS, points)?;
    for role in [P_NBINS, P_MIN, P_MAX] {
        if let Some(slot) = item.slot_mut(role) {
            slot.set_editable(false);
        }
    }
    Ok(item)
}

/// Bin centers of a fixed-bin or pointwise axis.
pub fn bin_centers(item: &SessionItem) -> ModelResult<Vec<f64>> {
    if item.model_type() == POINTWISE_AXIS_TYPE {
        return item.property::<Vec<f64>>(P_POINTS);
    }
    let nbins = item.property::<i64>(P_NBINS)?.max(0);
    let (start, end) = axis_range(item)?;
    let step = (end - start) / nbins as f64;
    Ok((0..nbins)
        .map(|i| start + step * (i as f64 + 0.5))
        .collect())
}
