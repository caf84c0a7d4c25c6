use serde::{Deserialize, Serialize};

pub const DEFAULT_GREEN_CEILING: usize = 1_000;
pub const DEFAULT_YELLOW_CEILING: usize = 2_000;

/// Gap applied when a yellow ceiling has to be pushed above the green one.
pub const AUTO_HEAL_GAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBand {
    Healthy,
    Warning,
    Critical,
}

impl CostBand {
    /// Status cell used in markdown reports.
    pub const fn status(self) -> &'static str {
        match self {
            CostBand::Healthy => "✅ OK",
            CostBand::Warning => "⚠️ Warning",
            CostBand::Critical => "🔴 High",
        }
    }
}

/// Two ceilings splitting token counts into cost bands.
///
/// Always satisfies `green < yellow`; see [`Thresholds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    green: usize,
    yellow: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            green: DEFAULT_GREEN_CEILING,
            yellow: DEFAULT_YELLOW_CEILING,
        }
    }
}

impl Thresholds {
    /// A non-increasing pair is corrected by moving `yellow` to
    /// `green + AUTO_HEAL_GAP`, never rejected.
    pub fn new(green: usize, yellow: usize) -> Self {
        let green = green.min(usize::MAX - AUTO_HEAL_GAP);
        if green < yellow {
            return Self { green, yellow };
        }
        let healed = green + AUTO_HEAL_GAP;
        log::warn!(
            "Yellow threshold {yellow} is not above green threshold {green}; using {healed}"
        );
        Self {
            green,
            yellow: healed,
        }
    }

    pub fn green(&self) -> usize {
        self.green
    }

    pub fn yellow(&self) -> usize {
        self.yellow
    }

    pub fn classify(&self, tokens: usize) -> CostBand {
        classify(tokens, self)
    }
}

pub fn classify(tokens: usize, thresholds: &Thresholds) -> CostBand {
    if tokens < thresholds.green {
        CostBand::Healthy
    } else if tokens < thresholds.yellow {
        CostBand::Warning
    } else {
        CostBand::Critical
    }
}
