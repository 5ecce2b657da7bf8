use camino::Utf8PathBuf;
use std::fmt;
use std::time::Duration;

/// Export selected directly on the command line against a single save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleTarget {
    All,
    Map,
    Structures,
    Logs,
    Tribes,
    Players,
    Wild,
    Tamed,
}

impl SingleTarget {
    pub fn parse(mode: &str) -> Option<Self> {
        let target = match mode {
            "all" => Self::All,
            "map" => Self::Map,
            "structures" => Self::Structures,
            "logs" => Self::Logs,
            "tribes" => Self::Tribes,
            "players" => Self::Players,
            "wild" => Self::Wild,
            "tamed" => Self::Tamed,
            _ => return None,
        };
        Some(target)
    }

    /// Label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Map => "map",
            Self::Structures => "structures",
            Self::Logs => "tribe logs",
            Self::Tribes => "tribes",
            Self::Players => "players",
            Self::Wild => "wild",
            Self::Tamed => "tamed",
        }
    }

    /// File written when no output path was given. `All` writes a folder instead.
    pub fn default_file_name(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Map => Some(crate::content::MAP_STRUCTURES_FILE),
            Self::Structures => Some(crate::content::STRUCTURES_FILE),
            Self::Logs => Some(crate::content::TRIBE_LOGS_FILE),
            Self::Tribes => Some(crate::content::TRIBES_FILE),
            Self::Players => Some(crate::content::PLAYERS_FILE),
            Self::Wild => Some(crate::content::WILD_FILE),
            Self::Tamed => Some(crate::content::TAMED_FILE),
        }
    }
}

/// Export target driven by a batch configuration file, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchTarget {
    Tribes,
    Structures,
    MapStructures,
    Players,
    Wild,
    Tamed,
}

impl BatchTarget {
    pub const ALL: [BatchTarget; 6] = [
        BatchTarget::Tribes,
        BatchTarget::Structures,
        BatchTarget::MapStructures,
        BatchTarget::Players,
        BatchTarget::Wild,
        BatchTarget::Tamed,
    ];

    /// Key of the descriptor object in the configuration file.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Tribes => "exportTribes",
            Self::Structures => "exportStructures",
            Self::MapStructures => "exportMapStructures",
            Self::Players => "exportPlayers",
            Self::Wild => "exportWild",
            Self::Tamed => "exportTamed",
        }
    }
}

impl fmt::Display for BatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tribes => "Tribes",
            Self::Structures => "Structures",
            Self::MapStructures => "Map Structures",
            Self::Players => "Players",
            Self::Wild => "Wilds",
            Self::Tamed => "Tames",
        };
        f.write_str(name)
    }
}

/// Status of a single export target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Exported,
    Skipped,
    Failed(String),
}

/// Result of one export target within a batch
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub target: BatchTarget,
    pub destination: Option<Utf8PathBuf>,
    pub status: TargetStatus,
    pub duration: Duration,
}

impl TargetOutcome {
    pub fn skipped(target: BatchTarget) -> Self {
        Self {
            target,
            destination: None,
            status: TargetStatus::Skipped,
            duration: Duration::ZERO,
        }
    }
}

/// Whether a failing target stops the remaining ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    ContinueOnError,
    AbortOnError,
}

/// Ordered outcomes of a batch export.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl BatchReport {
    pub fn outcome(&self, target: BatchTarget) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    pub fn exported(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Exported))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Skipped))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&TargetStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target_parse() {
        assert_eq!(SingleTarget::parse("tribes"), Some(SingleTarget::Tribes));
        assert_eq!(SingleTarget::parse("logs"), Some(SingleTarget::Logs));
        assert_eq!(SingleTarget::parse("pack"), None);
        assert!(SingleTarget::All.default_file_name().is_none());
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.outcomes.push(TargetOutcome {
            target: BatchTarget::Tribes,
            destination: Some(Utf8PathBuf::from("t.json")),
            status: TargetStatus::Exported,
            duration: Duration::from_millis(5),
        });
        report.outcomes.push(TargetOutcome {
            target: BatchTarget::Players,
            destination: Some(Utf8PathBuf::from("p.json")),
            status: TargetStatus::Failed("denied".to_string()),
            duration: Duration::ZERO,
        });
        report.outcomes.push(TargetOutcome::skipped(BatchTarget::Wild));

        assert_eq!(report.exported(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(report.has_failures());
        assert_eq!(
            report.outcome(BatchTarget::Wild).map(|o| &o.status),
            Some(&TargetStatus::Skipped)
        );
    }
}
