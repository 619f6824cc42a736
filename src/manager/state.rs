//! Startup flow states and outcomes

use std::fmt;

use serde::Serialize;

use crate::domain::{BundleRecord, BundleVersion, Location};

/// Stage of the flow an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Checking,
    Downloading,
    Verifying,
    Installing,
    Committing,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::Checking => "checking",
            FlowStage::Downloading => "downloading",
            FlowStage::Verifying => "verifying",
            FlowStage::Installing => "installing",
            FlowStage::Committing => "committing",
        };
        f.write_str(name)
    }
}

/// How a startup flow ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlowOutcome {
    /// A newer bundle was installed and committed
    Updated {
        from: BundleVersion,
        to: BundleVersion,
    },
    /// The service has nothing newer
    UpToDate,
    /// Updates are disabled; only the baseline was resolved
    Skipped,
    /// Another flow was in flight; nothing was done
    AlreadyRunning,
    /// The update was abandoned; the baseline stays active
    Failed { stage: FlowStage, reason: String },
}

impl fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowOutcome::Updated { from, to } => write!(f, "updated {from} -> {to}"),
            FlowOutcome::UpToDate => f.write_str("up to date"),
            FlowOutcome::Skipped => f.write_str("update check disabled"),
            FlowOutcome::AlreadyRunning => f.write_str("already running"),
            FlowOutcome::Failed { stage, reason } => {
                write!(f, "update failed while {stage}: {reason}")
            }
        }
    }
}

/// Observable state of the startup flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Resolving,
    Checking,
    Downloading { version: BundleVersion },
    Verifying,
    Installing,
    Committing,
    Errored { stage: FlowStage, reason: String },
    Done(FlowOutcome),
}

impl FlowState {
    /// Short message suitable for a waiting screen
    pub fn status_message(&self) -> String {
        match self {
            FlowState::Idle => "Starting".to_string(),
            FlowState::Resolving => "Loading".to_string(),
            FlowState::Checking => "Checking for updates".to_string(),
            FlowState::Downloading { version } => format!("Downloading update {version}"),
            FlowState::Verifying => "Verifying update".to_string(),
            FlowState::Installing => "Installing update".to_string(),
            FlowState::Committing => "Finishing update".to_string(),
            FlowState::Errored { .. } => "Update failed, continuing".to_string(),
            FlowState::Done(_) => "Ready".to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, FlowState::Done(_))
    }
}

/// Everything a host needs after the flow: what to load and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub location: Location,
    pub record: BundleRecord,
    #[serde(flatten)]
    pub outcome: FlowOutcome,
}
