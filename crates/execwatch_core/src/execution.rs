//! Execution records and their status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of remote work an execution represents.
///
/// # Examples
///
/// ```
/// use execwatch_core::ExecutionKind;
///
/// let kind: ExecutionKind = serde_json::from_str("\"agent_test\"").unwrap();
/// assert_eq!(kind, ExecutionKind::AgentTest);
/// assert_eq!(kind.label(), "Agent run");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionKind {
    /// A workflow run
    Workflow,
    /// A test run of a single agent
    #[serde(alias = "agent-test")]
    AgentTest,
}

impl ExecutionKind {
    /// Human-facing name used in notification titles.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionKind::Workflow => "Workflow",
            ExecutionKind::AgentTest => "Agent run",
        }
    }
}

/// Lifecycle status of an execution.
///
/// `Pending` and `Running` are non-terminal; the rest are terminal.
///
/// # Examples
///
/// ```
/// use execwatch_core::ExecutionStatus;
///
/// assert!(ExecutionStatus::Failed.is_terminal());
/// assert!(!ExecutionStatus::Pending.is_terminal());
/// assert_eq!(ExecutionStatus::Succeeded.to_string(), "succeeded");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    /// Queued, not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Stopped before completion
    Cancelled,
}

impl ExecutionStatus {
    /// Whether no further transition is expected from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// One tracked unit of asynchronous remote work.
///
/// The same shape doubles as a partial update: every attribute other than `id`
/// may be absent, and an update only carries the fields that changed. The first
/// update seen for an id is stored as-is, so stored records may be partial too.
///
/// # Examples
///
/// ```
/// use execwatch_core::{Execution, ExecutionStatus};
///
/// let mut record = Execution {
///     id: 1,
///     status: Some(ExecutionStatus::Running),
///     test_input: Some("x".to_string()),
///     ..Default::default()
/// };
///
/// record.merge(Execution {
///     id: 1,
///     status: Some(ExecutionStatus::Succeeded),
///     ..Default::default()
/// });
///
/// assert_eq!(record.status, Some(ExecutionStatus::Succeeded));
/// assert_eq!(record.test_input.as_deref(), Some("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Execution {
    /// Unique key within the local collection
    pub id: i64,
    /// Workflow or agent test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExecutionKind>,
    /// Current lifecycle status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    /// Owning agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    /// Owning workflow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<i64>,
    /// Input supplied to an agent test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_input: Option<String>,
    /// Output produced by an agent test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_output: Option<String>,
    /// Error reported by the remote system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When execution began
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When execution ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// When the record was created upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Execution {
    /// Overlay every field present in `update` onto this record.
    ///
    /// Absent fields keep their current value. The id is never changed.
    pub fn merge(&mut self, update: Execution) {
        let Execution {
            id: _,
            kind,
            status,
            agent_id,
            workflow_id,
            test_input,
            test_output,
            error_message,
            started_at,
            finished_at,
            created_at,
        } = update;

        overlay(&mut self.kind, kind);
        overlay(&mut self.status, status);
        overlay(&mut self.agent_id, agent_id);
        overlay(&mut self.workflow_id, workflow_id);
        overlay(&mut self.test_input, test_input);
        overlay(&mut self.test_output, test_output);
        overlay(&mut self.error_message, error_message);
        overlay(&mut self.started_at, started_at);
        overlay(&mut self.finished_at, finished_at);
        overlay(&mut self.created_at, created_at);
    }

    /// Whether the record is pending or running.
    ///
    /// Records whose status is still unknown are not counted as running.
    pub fn is_running(&self) -> bool {
        matches!(
            self.status,
            Some(ExecutionStatus::Pending | ExecutionStatus::Running)
        )
    }

    /// Whether the record has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(|status| status.is_terminal())
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
