use std::time::Duration;

/// Rendering strategy used by one attempt of the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Full-quality capture with the copy restyled, embedded at page width.
    Primary,
    /// Unit scale, no restyling, image stretched over the whole page.
    Simplified,
}

impl Strategy {
    /// The first attempt is primary; every later one is simplified, so the
    /// final attempt of a multi-attempt run is always simplified.
    pub fn for_attempt(attempt: u32) -> Self {
        if attempt <= 1 {
            Strategy::Primary
        } else {
            Strategy::Simplified
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Primary => "primary",
            Strategy::Simplified => "simplified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Size of the produced PDF in bytes.
    Succeeded(usize),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based.
    pub attempt: u32,
    pub strategy: Strategy,
    /// Pause taken before this attempt started.
    pub backoff: Duration,
    pub outcome: AttemptOutcome,
}

/// What happened during one `produce` call, attempt by attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionReport {
    pub label: String,
    pub attempts: Vec<AttemptRecord>,
}

impl ProductionReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attempts: Vec::new(),
        }
    }

    pub fn record(&mut self, attempt: u32, strategy: Strategy, backoff: Duration, outcome: AttemptOutcome) {
        self.attempts.push(AttemptRecord {
            attempt,
            strategy,
            backoff,
            outcome,
        });
    }

    pub fn succeeded(&self) -> bool {
        matches!(
            self.attempts.last().map(|a| &a.outcome),
            Some(AttemptOutcome::Succeeded(_))
        )
    }

    pub fn failures(&self, strategy: Strategy) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.strategy == strategy && matches!(a.outcome, AttemptOutcome::Failed(_)))
            .count()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.attempts.iter().rev().find_map(|a| match &a.outcome {
            AttemptOutcome::Failed(message) => Some(message.as_str()),
            AttemptOutcome::Succeeded(_) => None,
        })
    }

    pub fn total_backoff(&self) -> Duration {
        self.attempts.iter().map(|a| a.backoff).sum()
    }
}
