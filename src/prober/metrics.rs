//! Body metrics
//!
//! Counts are taken over the decoded body text, never the bytes on the wire.

/// Size metrics of a decoded body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyMetrics {
    /// Characters, not bytes
    pub size: usize,
    /// Whitespace-delimited tokens
    pub words: usize,
    /// Newline-delimited segments; an empty body is one line
    pub lines: usize,
}

impl BodyMetrics {
    pub fn measure(body: &str) -> Self {
        Self {
            size: body.chars().count(),
            words: body.split_whitespace().count(),
            lines: body.split('\n').count(),
        }
    }
}
