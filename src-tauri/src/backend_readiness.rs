use crate::READINESS_MARKERS;

/// Watches backend error-stream lines for the uvicorn startup banner.
#[derive(Debug, Default)]
pub(crate) struct ReadinessDetector {
    ready: bool,
}

impl ReadinessDetector {
    /// Returns `true` exactly once: for the first line that carries a marker.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        if self.ready || !line_signals_readiness(line) {
            return false;
        }
        self.ready = true;
        true
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn reset(&mut self) {
        self.ready = false;
    }
}

pub(crate) fn line_signals_readiness(line: &str) -> bool {
    READINESS_MARKERS.iter().any(|marker| line.contains(marker))
}
