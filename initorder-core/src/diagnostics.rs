//! Diagnostics
//!
//! Anomalies found while building a dependency graph are reported, never
//! raised. A [`DiagnosticSink`] receives each one as it is found; graph
//! construction always continues afterwards.

use std::fmt::Debug;

use parking_lot::Mutex;
use tracing::warn;

/// An anomaly observed while expanding a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<T> {
    /// `participant` declares a dependency on `dependency`, which is already
    /// being expanded higher up the current chain. The edge is dropped.
    CycleDetected { participant: T, dependency: T },

    /// `ty` is depended upon but lacks the initialization capability. It
    /// keeps its place in the order; the driver takes no action for it.
    MissingCapability { ty: T },
}

impl<T> Diagnostic<T> {
    pub fn is_cycle(&self) -> bool {
        matches!(self, Diagnostic::CycleDetected { .. })
    }
}

/// Append-only observer of [`Diagnostic`]s.
pub trait DiagnosticSink<T>: Send + Sync {
    fn report(&self, diagnostic: Diagnostic<T>);
}

/// Logs every diagnostic at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl<T: Debug> DiagnosticSink<T> for TracingSink {
    fn report(&self, diagnostic: Diagnostic<T>) {
        match diagnostic {
            Diagnostic::CycleDetected {
                participant,
                dependency,
            } => warn!(
                ?participant,
                ?dependency,
                "circular dependency detected, dropping edge"
            ),
            Diagnostic::MissingCapability { ty } => warn!(
                ?ty,
                "type is part of a dependency graph but is not initializable"
            ),
        }
    }
}

/// Records diagnostics in arrival order.
#[derive(Debug)]
pub struct CollectingSink<T> {
    diagnostics: Mutex<Vec<Diagnostic<T>>>,
}

impl<T: Clone> CollectingSink<T> {
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic<T>> {
        self.diagnostics.lock().clone()
    }

    /// Participants of every reported cycle.
    pub fn cycle_participants(&self) -> Vec<T> {
        self.diagnostics
            .lock()
            .iter()
            .filter_map(|d| match d {
                Diagnostic::CycleDetected { participant, .. } => Some(participant.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl<T: Clone> Default for CollectingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> DiagnosticSink<T> for CollectingSink<T> {
    fn report(&self, diagnostic: Diagnostic<T>) {
        self.diagnostics.lock().push(diagnostic);
    }
}

impl<T, S: DiagnosticSink<T> + ?Sized> DiagnosticSink<T> for std::sync::Arc<S> {
    fn report(&self, diagnostic: Diagnostic<T>) {
        (**self).report(diagnostic)
    }
}

/// Decides whether a type can be a dependency target.
///
/// Types failing the check are reported as
/// [`Diagnostic::MissingCapability`] but still ordered.
pub trait CapabilityPolicy<T> {
    fn is_initializable(&self, ty: &T) -> bool;
}

/// Accepts every type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllInitializable;

impl<T> CapabilityPolicy<T> for AllInitializable {
    fn is_initializable(&self, _ty: &T) -> bool {
        true
    }
}

impl<T, F> CapabilityPolicy<T> for F
where
    F: Fn(&T) -> bool,
{
    fn is_initializable(&self, ty: &T) -> bool {
        self(ty)
    }
}
