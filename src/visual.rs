//! # Visual representation boundary
//!
//! The scene graph is owned by an external rendering engine. The scheduler talks to it only
//! through [`VisualManager`], obtaining and relinquishing opaque [`MarkerHandle`]s:
//!
//! - `attach(owner, position, style)` creates a marker at a render-frame position,
//! - `detach(owner, handle)` removes it from the scene,
//! - `dispose(handle)` releases its resources.
//!
//! The core never inspects the concrete representation behind a handle.
//!
//! [`SceneRecorder`] is a headless implementation that keeps the live markers and, when built with
//! [`SceneRecorder::recording`], an event log. It backs the command-line driver and the test-suite.
use std::collections::HashMap;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::constants::{CatalogId, Kilometer};

/// Opaque handle on a marker owned by the visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Appearance of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MarkerStyle {
    /// RGB color, `0xRRGGBB`.
    pub color: u32,
    /// Marker radius in render units (km).
    pub radius: Kilometer,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            color: 0xffff00,
            radius: 10.0,
        }
    }
}

/// Marker styles looked up by display name, with a fallback for every other object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleOverrides {
    default: MarkerStyle,
    by_name: HashMap<String, MarkerStyle>,
}

impl StyleOverrides {
    pub fn new(default: MarkerStyle, by_name: HashMap<String, MarkerStyle>) -> Self {
        StyleOverrides { default, by_name }
    }

    /// Style of the object named `name`.
    pub fn style_for(&self, name: &str) -> MarkerStyle {
        self.by_name.get(name).copied().unwrap_or(self.default)
    }
}

/// Scene-graph operations consumed by the update scheduler.
pub trait VisualManager {
    /// Add a new marker for `owner` at `position` (render frame) and return its handle.
    fn attach(&mut self, owner: CatalogId, position: &Vector3<f64>, style: &MarkerStyle)
        -> MarkerHandle;

    /// Remove a marker from the scene.
    fn detach(&mut self, owner: CatalogId, handle: MarkerHandle);

    /// Release the resources of a detached marker.
    fn dispose(&mut self, handle: MarkerHandle);
}

/// One call received by a [`SceneRecorder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    Attach {
        owner: CatalogId,
        handle: MarkerHandle,
    },
    Detach {
        owner: CatalogId,
        handle: MarkerHandle,
    },
    Dispose {
        handle: MarkerHandle,
    },
}

/// A marker currently present in a [`SceneRecorder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveMarker {
    pub owner: CatalogId,
    pub position: Vector3<f64>,
    pub style: MarkerStyle,
}

/// Headless [`VisualManager`] keeping track of live markers and, optionally, of every call it
/// received.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    next_handle: u64,
    live: HashMap<MarkerHandle, LiveMarker>,
    disposed: usize,
    record_events: bool,
    events: Vec<SceneEvent>,
}

impl SceneRecorder {
    /// Scene without event log: memory follows the number of live markers only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene logging every `attach`, `detach` and `dispose` call until [`Self::take_events`].
    pub fn recording() -> Self {
        SceneRecorder {
            record_events: true,
            ..Self::default()
        }
    }

    fn log(&mut self, event: SceneEvent) {
        if self.record_events {
            self.events.push(event);
        }
    }

    /// Marker behind `handle`, if it is attached.
    pub fn marker(&self, handle: MarkerHandle) -> Option<&LiveMarker> {
        self.live.get(&handle)
    }

    /// Number of attached markers.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of attached markers owned by `owner`.
    pub fn live_count_for(&self, owner: CatalogId) -> usize {
        self.live.values().filter(|m| m.owner == owner).count()
    }

    pub fn disposed_count(&self) -> usize {
        self.disposed
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Drain the event log, keeping the live markers.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

impl VisualManager for SceneRecorder {
    fn attach(
        &mut self,
        owner: CatalogId,
        position: &Vector3<f64>,
        style: &MarkerStyle,
    ) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(
            handle,
            LiveMarker {
                owner,
                position: *position,
                style: *style,
            },
        );
        self.log(SceneEvent::Attach { owner, handle });
        handle
    }

    fn detach(&mut self, owner: CatalogId, handle: MarkerHandle) {
        match self.live.remove(&handle) {
            Some(marker) if marker.owner != owner => {
                tracing::warn!(
                    owner,
                    actual_owner = marker.owner,
                    handle = handle.0,
                    "detaching a marker on behalf of another object"
                );
            }
            Some(_) => {}
            None => tracing::warn!(owner, handle = handle.0, "detaching an unknown marker"),
        }
        self.log(SceneEvent::Detach { owner, handle });
    }

    fn dispose(&mut self, handle: MarkerHandle) {
        self.disposed += 1;
        self.log(SceneEvent::Dispose { handle });
    }
}

#[cfg(test)]
mod visual_test {
    use super::*;

    #[test]
    fn test_style_lookup() {
        let big = MarkerStyle {
            color: 0xffffff,
            radius: 50.0,
        };
        let styles = StyleOverrides::new(
            MarkerStyle::default(),
            HashMap::from([("ISS (ZARYA)".to_string(), big)]),
        );
        assert_eq!(styles.style_for("ISS (ZARYA)"), big);
        assert_eq!(styles.style_for("STARLINK-1007"), MarkerStyle::default());
        assert_eq!(styles.style_for(""), MarkerStyle::default());
    }

    #[test]
    fn test_scene_recorder_lifecycle() {
        let mut scene = SceneRecorder::recording();
        let style = MarkerStyle::default();

        let h1 = scene.attach(7, &Vector3::new(1.0, 2.0, 3.0), &style);
        let h2 = scene.attach(7, &Vector3::new(1.5, 2.0, 3.0), &style);
        assert_ne!(h1, h2);
        assert_eq!(scene.live_count_for(7), 2);

        scene.detach(7, h1);
        scene.dispose(h1);
        assert_eq!(scene.live_count_for(7), 1);
        assert_eq!(scene.marker(h2).unwrap().position, Vector3::new(1.5, 2.0, 3.0));
        assert_eq!(scene.disposed_count(), 1);

        assert_eq!(
            scene.take_events(),
            vec![
                SceneEvent::Attach { owner: 7, handle: h1 },
                SceneEvent::Attach { owner: 7, handle: h2 },
                SceneEvent::Detach { owner: 7, handle: h1 },
                SceneEvent::Dispose { handle: h1 },
            ]
        );
        assert!(scene.events().is_empty());
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn test_event_log_is_opt_in() {
        let mut scene = SceneRecorder::new();
        let style = MarkerStyle::default();

        let mut previous = scene.attach(1, &Vector3::zeros(), &style);
        for step in 1..1000 {
            let handle = scene.attach(1, &Vector3::new(step as f64, 0.0, 0.0), &style);
            scene.detach(1, previous);
            scene.dispose(previous);
            previous = handle;
        }

        assert!(scene.events().is_empty());
        assert_eq!(scene.live_count(), 1);
        assert_eq!(scene.disposed_count(), 999);
    }
}
