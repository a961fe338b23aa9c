//! Non-destructive filter pipeline.
//!
//! Images keep their source pixels; filters are data on the object
//! ([`FilterSet`]) and the drawn pixels are recomputed from the source every
//! time the set changes. A filter at its neutral value is never stored: the
//! kind is simply absent from the set.

use image::RgbaImage;

use crate::model::{FilterChange, FilterKind, FilterParams, FilterSet, ObjectId};
use crate::scene::SceneModel;

/// Run every active filter over `source` in canonical order.
///
/// `seed` makes noise reproducible; callers pass the object id so one image
/// always renders the same way.
pub fn render(
    source: &RgbaImage,
    filters: &FilterSet,
    seed: u64,
) -> retouch_raster::Result<RgbaImage> {
    let mut pixels = source.clone();
    for params in filters.iter() {
        match *params {
            FilterParams::Brightness { brightness } => {
                retouch_raster::apply_lut(&mut pixels, &retouch_raster::brightness_lut(brightness));
            }
            FilterParams::Averaging { kernel } => {
                pixels = retouch_raster::box_blur(&pixels, kernel)?;
            }
            FilterParams::Noise { noise } => {
                retouch_raster::noise(&mut pixels, noise, seed);
            }
            FilterParams::Contrast { contrast } => {
                retouch_raster::apply_lut(&mut pixels, &retouch_raster::contrast_lut(contrast));
            }
            FilterParams::Gamma { gamma } => {
                retouch_raster::apply_lut(&mut pixels, &retouch_raster::gamma_lut(gamma)?);
            }
        }
    }
    Ok(pixels)
}

/// Outcome of [`apply_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Target missing or not an image; nothing happened
    NotApplicable,
    /// The filter set changed (or was rewritten in place)
    Applied(FilterChange),
}

/// Set filter `kind` on `target` from a raw slider value.
///
/// The value is normalized with [`FilterKind::normalize`]. Neutral values
/// remove the filter; other values insert it or update the existing instance
/// in place. Only images accept filters: a missing target or a rectangle is a
/// silent no-op.
pub fn apply_filter(
    scene: &mut dyn SceneModel,
    target: Option<ObjectId>,
    kind: FilterKind,
    raw: f64,
) -> FilterOutcome {
    let Some(id) = target else {
        return FilterOutcome::NotApplicable;
    };
    let Some(filters) = scene.object(id).and_then(|o| o.filters()) else {
        log::debug!("{} filter ignored: object {} is not an image", kind.name(), id);
        return FilterOutcome::NotApplicable;
    };

    let params = kind.normalize(raw);
    let change = filters.change_for(kind, params.as_ref());
    if change == FilterChange::Unchanged {
        return FilterOutcome::Applied(change);
    }

    scene.update_filters(id, &mut |filters| {
        filters.set(kind, params);
    });
    scene.request_render();
    log::debug!("{} filter on object {}: {:?}", kind.name(), id, change);
    FilterOutcome::Applied(change)
}
