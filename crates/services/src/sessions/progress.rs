use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    /// Questions already moved past.
    pub position: usize,
    pub correct: usize,
    pub remaining: usize,
    /// `position / total`: questions completed so far.
    pub fraction: f64,
    pub is_complete: bool,
}
