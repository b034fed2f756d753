use std::fmt;

use super::pipeline::Curve;

// ---------------------------------------------------------------------------
// LockColor – fixed cyclic palette for comparison curves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockColor {
    Red,
    Blue,
    Green,
    Orange,
    Purple,
}

impl LockColor {
    pub const CYCLE: [LockColor; 5] = [
        LockColor::Red,
        LockColor::Blue,
        LockColor::Green,
        LockColor::Orange,
        LockColor::Purple,
    ];

    /// Colour for the `n`-th locked curve.
    pub fn nth(n: usize) -> Self {
        Self::CYCLE[n % Self::CYCLE.len()]
    }
}

impl fmt::Display for LockColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockColor::Red => "red",
            LockColor::Blue => "blue",
            LockColor::Green => "green",
            LockColor::Orange => "orange",
            LockColor::Purple => "purple",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// LockedCurve / LockedCurveSet
// ---------------------------------------------------------------------------

/// A frozen snapshot of one timestamp's filtered curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedCurve {
    pub distances: Vec<f64>,
    pub values: Vec<f64>,
    pub label: String,
    pub color: LockColor,
}

/// Append-only list of snapshots; curves are never edited after locking.
#[derive(Debug, Clone, Default)]
pub struct LockedCurveSet {
    curves: Vec<LockedCurve>,
}

impl LockedCurveSet {
    /// Snapshot `curve` under `label`. Returns `false` (and stores nothing)
    /// when the filtered curve is empty.
    pub fn lock(&mut self, curve: Curve, label: impl Into<String>) -> bool {
        if curve.is_empty() {
            return false;
        }
        let color = LockColor::nth(self.curves.len());
        let label = label.into();
        log::debug!("Locked curve '{label}' ({} points, {color})", curve.len());
        self.curves.push(LockedCurve {
            distances: curve.distances,
            values: curve.values,
            label,
            color,
        });
        true
    }

    pub fn clear(&mut self) {
        self.curves.clear();
    }

    pub fn curves(&self) -> &[LockedCurve] {
        &self.curves
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
