//! Filter kinds, parameters and the per-image filter set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether a float parameter sits at its neutral
/// value.
const NEUTRAL_EPSILON: f64 = 1e-9;

/// Pixel filters an image can carry.
///
/// Declaration order is the canonical application order; `Ord` follows it, so
/// a `BTreeMap<FilterKind, _>` iterates in the order the filters must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Brightness,
    Averaging,
    Noise,
    Contrast,
    Gamma,
}

impl FilterKind {
    /// Get the display name for this filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Brightness => "Brightness",
            FilterKind::Averaging => "Averaging",
            FilterKind::Noise => "Noise",
            FilterKind::Contrast => "Contrast",
            FilterKind::Gamma => "Gamma",
        }
    }

    /// Normalize a raw slider value into this filter's parameter range.
    ///
    /// Returns `None` when the normalized value is the neutral value, meaning
    /// the filter should be absent.
    ///
    /// | kind       | slider range   | parameter                 | neutral |
    /// |------------|----------------|---------------------------|---------|
    /// | brightness | -100..=100     | slider / 100              | 0       |
    /// | contrast   | -100..=100     | slider / 100              | 0       |
    /// | noise      | 0..=1000       | slider                    | 0       |
    /// | gamma      | >= 0.1         | slider                    | 1.0     |
    /// | averaging  | any            | nearest odd integer >= 1  | 1       |
    pub fn normalize(self, raw: f64) -> Option<FilterParams> {
        if raw.is_nan() {
            return None;
        }
        match self {
            FilterKind::Brightness => {
                let value = raw.clamp(-100.0, 100.0) / 100.0;
                (value.abs() > NEUTRAL_EPSILON).then_some(FilterParams::Brightness { brightness: value })
            }
            FilterKind::Contrast => {
                let value = raw.clamp(-100.0, 100.0) / 100.0;
                (value.abs() > NEUTRAL_EPSILON).then_some(FilterParams::Contrast { contrast: value })
            }
            FilterKind::Noise => {
                let value = raw.clamp(0.0, 1000.0);
                (value > NEUTRAL_EPSILON).then_some(FilterParams::Noise { noise: value })
            }
            FilterKind::Gamma => {
                let value = raw.max(0.1);
                ((value - 1.0).abs() > NEUTRAL_EPSILON).then_some(FilterParams::Gamma { gamma: value })
            }
            FilterKind::Averaging => {
                let kernel = odd_kernel(raw);
                (kernel > 1).then_some(FilterParams::Averaging { kernel })
            }
        }
    }
}

/// Round to an integer >= 1, bumping even sizes up to the next odd one.
fn odd_kernel(raw: f64) -> u32 {
    let rounded = raw.round().clamp(1.0, f64::from(u32::MAX - 1)) as u32;
    if rounded % 2 == 0 { rounded + 1 } else { rounded }
}

/// Parameters of one active filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterParams {
    /// Additive brightness in [-1, 1]
    Brightness { brightness: f64 },
    /// Box blur with an odd `kernel x kernel` window
    Averaging { kernel: u32 },
    /// Uniform noise amplitude in (0, 1000]
    Noise { noise: f64 },
    /// Contrast in [-1, 1]
    Contrast { contrast: f64 },
    /// Gamma exponent, >= 0.1
    Gamma { gamma: f64 },
}

impl FilterParams {
    /// The kind this parameter set belongs to.
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterParams::Brightness { .. } => FilterKind::Brightness,
            FilterParams::Averaging { .. } => FilterKind::Averaging,
            FilterParams::Noise { .. } => FilterKind::Noise,
            FilterParams::Contrast { .. } => FilterKind::Contrast,
            FilterParams::Gamma { .. } => FilterKind::Gamma,
        }
    }
}

/// What a filter update did to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// A new instance was created
    Inserted,
    /// An existing instance had its parameter replaced in place
    Updated,
    /// The instance was removed because the value was neutral
    Removed,
    /// Neutral value and no instance present
    Unchanged,
}

/// The active filters of one image: at most one instance per kind, iterated in
/// canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<FilterKind, FilterParams>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the filter of `kind`.
    ///
    /// `Some(params)` inserts or overwrites in place; `None` removes.
    /// `params.kind()` must equal `kind`; mismatched parameters are ignored.
    pub fn set(&mut self, kind: FilterKind, params: Option<FilterParams>) -> FilterChange {
        match params {
            Some(params) if params.kind() != kind => {
                log::warn!(
                    "Ignoring {} parameters for {} filter",
                    params.kind().name(),
                    kind.name()
                );
                FilterChange::Unchanged
            }
            Some(params) => match self.filters.insert(kind, params) {
                Some(_) => FilterChange::Updated,
                None => FilterChange::Inserted,
            },
            None => match self.filters.remove(&kind) {
                Some(_) => FilterChange::Removed,
                None => FilterChange::Unchanged,
            },
        }
    }

    /// Preview what `set` would do without changing anything.
    pub fn change_for(&self, kind: FilterKind, params: Option<&FilterParams>) -> FilterChange {
        match (self.filters.contains_key(&kind), params) {
            (true, Some(_)) => FilterChange::Updated,
            (false, Some(_)) => FilterChange::Inserted,
            (true, None) => FilterChange::Removed,
            (false, None) => FilterChange::Unchanged,
        }
    }

    /// Get the active parameters for a kind.
    pub fn get(&self, kind: FilterKind) -> Option<&FilterParams> {
        self.filters.get(&kind)
    }

    /// Check whether a kind is active.
    pub fn contains(&self, kind: FilterKind) -> bool {
        self.filters.contains_key(&kind)
    }

    /// Iterate active filters in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterParams> {
        self.filters.values()
    }

    /// Number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
