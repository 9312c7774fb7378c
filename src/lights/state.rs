//! Authoritative shared state for the installation: the per-LED color map
//! and the calibrated 3D position map. The two are independent, so each
//! carries its own lock and writers never need both at once.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Calibrated 3D coordinates of one LED, reported by a controller after a
/// physical calibration pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Color map for a fixed-size installation.
///
/// Values are opaque color strings ("#ff0000", "red", ...): the hub stores
/// and relays them, controllers interpret them. Index validation happens at
/// the command boundary, so every key in the map lies in `[0, led_count)`.
#[derive(Debug, Clone)]
pub struct LedColors {
    led_count: usize,
    inner: Arc<RwLock<HashMap<usize, String>>>,
}

impl LedColors {
    pub fn new(led_count: usize) -> Self {
        Self {
            led_count,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Installation size. Valid indices are `0..led_count()`.
    pub fn led_count(&self) -> usize {
        self.led_count
    }

    /// Overwrite one LED's color. Callers validate the index first.
    pub fn set(&self, led: usize, color: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(led, color.to_owned());
    }

    /// Set every LED in the installation to the same color. The write lock
    /// is held for the whole sweep so readers never observe a partial batch.
    pub fn set_all(&self, color: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for led in 0..self.led_count {
            map.insert(led, color.to_owned());
        }
    }

    /// Clone of the current color map.
    pub fn snapshot(&self) -> HashMap<usize, String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Position map, keyed by the id controllers report. Ids come from physical
/// calibration and may be sparse or outside the installation's index range,
/// so no bound is enforced here.
#[derive(Debug, Clone, Default)]
pub struct LedPositions {
    inner: Arc<RwLock<HashMap<i64, LedPosition>>>,
}

impl LedPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the coordinates for `id`.
    pub fn set(&self, id: i64, x: f32, y: f32, z: f32) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(id, LedPosition { x, y, z });
    }

    pub fn get(&self, id: i64) -> Option<LedPosition> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
