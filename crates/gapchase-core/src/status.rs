use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for game-specific timed status enums (invincibility, throw windup, ...).
pub trait StatusKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Short name used in logs.
    fn label(&self) -> &'static str;
}

/// A status effect counting down on a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActiveStatus<K: StatusKind> {
    pub kind: K,
    pub remaining: f32,
}

impl<K: StatusKind> ActiveStatus<K> {
    pub fn new(kind: K, duration: f32) -> Self {
        Self {
            kind,
            remaining: duration,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining.is_finite() {
            self.remaining -= dt;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Set of statuses on one body. At most one entry per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StatusSet<K: StatusKind> {
    active: Vec<ActiveStatus<K>>,
}

impl<K: StatusKind> StatusSet<K> {
    pub fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Apply `kind` for `duration` seconds. Re-applying keeps the longer of the
    /// two remaining times.
    pub fn apply(&mut self, kind: K, duration: f32) {
        if let Some(existing) = self.active.iter_mut().find(|s| s.kind == kind) {
            existing.remaining = existing.remaining.max(duration);
            return;
        }
        self.active.push(ActiveStatus::new(kind, duration));
    }

    pub fn clear(&mut self, kind: K) {
        self.active.retain(|s| s.kind != kind);
    }

    pub fn has(&self, kind: K) -> bool {
        self.active.iter().any(|s| s.kind == kind)
    }

    pub fn remaining(&self, kind: K) -> Option<f32> {
        self.active
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.remaining)
    }

    /// Count all statuses down by `dt`, returning the kinds that expired.
    pub fn tick(&mut self, dt: f32) -> Vec<K> {
        for status in &mut self.active {
            status.tick(dt);
        }
        let expired: Vec<K> = self
            .active
            .iter()
            .filter(|s| s.is_expired())
            .map(|s| s.kind)
            .collect();
        for kind in &expired {
            tracing::trace!(status = kind.label(), "Status expired");
        }
        self.active.retain(|s| !s.is_expired());
        expired
    }
}

impl<K: StatusKind> Default for StatusSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
