//! Viewer position and gaze direction.
//!
//! The streaming loops never cache a viewpoint between iterations; they ask a
//! [`ViewpointSource`] each time so camera motion re-orders pending tiles.

use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

/// Observer position and forward direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::looking(Vec3::Z)
    }
}

impl Viewpoint {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// Viewpoint at the cube centre looking along `forward`
    pub fn looking(forward: Vec3) -> Self {
        Self::new(Vec3::ZERO, forward)
    }
}

/// Trait for anything that can report the current viewpoint
pub trait ViewpointSource: Send + Sync {
    /// Current viewpoint; called once per scheduling iteration
    fn viewpoint(&self) -> Viewpoint;
}

impl ViewpointSource for Viewpoint {
    fn viewpoint(&self) -> Viewpoint {
        *self
    }
}

impl<V: ViewpointSource + ?Sized> ViewpointSource for Arc<V> {
    fn viewpoint(&self) -> Viewpoint {
        (**self).viewpoint()
    }
}

/// A viewpoint the host application updates while loads are running
#[derive(Debug, Clone, Default)]
pub struct SharedViewpoint {
    inner: Arc<RwLock<Viewpoint>>,
}

impl SharedViewpoint {
    pub fn new(viewpoint: Viewpoint) -> Self {
        Self {
            inner: Arc::new(RwLock::new(viewpoint)),
        }
    }

    /// Replace the viewpoint seen by every clone of this handle
    pub fn set(&self, viewpoint: Viewpoint) {
        *self.inner.write() = viewpoint;
    }

    /// Turn the viewer without moving it
    pub fn look(&self, forward: Vec3) {
        self.inner.write().forward = forward;
    }
}

impl ViewpointSource for SharedViewpoint {
    fn viewpoint(&self) -> Viewpoint {
        *self.inner.read()
    }
}
