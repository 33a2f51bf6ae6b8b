//! Query the live state of units via systemctl

use std::{io, str::FromStr};

use thiserror::Error;

use crate::action::{Action, ActionRequest};
use crate::exec::{Executor, Shell};

/// The active state of a systemd unit, as reported by `systemctl is-active`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    /// The unit is active and responding
    Active,

    /// Systemd is reloading the unit
    Reloading,

    /// The unit is inactive
    Inactive,

    /// The unit has failed
    Failed,

    /// The unit is activating - it has started but is not yet active
    Activating,

    /// The unit is deactivating - it has stopped but is not yet inactive
    Deactivating,

    /// Systemd does not know the unit, or reported something we don't recognise
    Unknown,
}

/// The enablement state of a unit file, as reported by `systemctl is-enabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnablementState {
    /// The unit has no install section and cannot be enabled or disabled
    Static,

    /// Enabled via symlinks in `/etc`
    Enabled,

    /// Enabled via symlinks in `/run`, until the next reboot
    EnabledRuntime,

    /// Made available through a symlink outside the search path
    Linked,

    /// Linked until the next reboot
    LinkedRuntime,

    /// The name is an alias of another unit
    Alias,

    /// Masked in `/etc`
    Masked,

    /// Masked in `/run`, until the next reboot
    MaskedRuntime,

    /// Enabled indirectly through another unit's `Also=` or an alias
    Indirect,

    /// Generated dynamically by a generator
    Generated,

    /// Created dynamically at runtime
    Transient,

    /// The unit file is invalid
    Bad,

    /// Not enabled
    Disabled,

    /// No recognisable answer
    Unknown,
}

/// Errors that can occur when parsing a state reported by systemctl
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid state")]
pub struct StateParseError(String);

impl FromStr for ActiveState {
    type Err = StateParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ActiveState::*;
        match s {
            "active" => Ok(Active),
            "reloading" => Ok(Reloading),
            "inactive" => Ok(Inactive),
            "failed" => Ok(Failed),
            "activating" => Ok(Activating),
            "deactivating" => Ok(Deactivating),
            "unknown" => Ok(Unknown),
            _ => Err(StateParseError(s.into())),
        }
    }
}

impl FromStr for EnablementState {
    type Err = StateParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use EnablementState::*;
        match s {
            "static" => Ok(Static),
            "enabled" => Ok(Enabled),
            "enabled-runtime" => Ok(EnabledRuntime),
            "linked" => Ok(Linked),
            "linked-runtime" => Ok(LinkedRuntime),
            "alias" => Ok(Alias),
            "masked" => Ok(Masked),
            "masked-runtime" => Ok(MaskedRuntime),
            "indirect" => Ok(Indirect),
            "generated" => Ok(Generated),
            "transient" => Ok(Transient),
            "bad" => Ok(Bad),
            "disabled" => Ok(Disabled),
            "unknown" => Ok(Unknown),
            _ => Err(StateParseError(s.into())),
        }
    }
}

impl ActiveState {
    /// Classify raw `is-active` output. Anything unrecognised is [ActiveState::Unknown].
    pub fn classify(output: &str) -> Self {
        output.trim().parse().unwrap_or_else(|err| {
            tracing::debug!("Treating activity as unknown: {err}");
            ActiveState::Unknown
        })
    }
}

impl EnablementState {
    /// Classify raw `is-enabled` output. Anything unrecognised is [EnablementState::Unknown].
    pub fn classify(output: &str) -> Self {
        output.trim().parse().unwrap_or_else(|err| {
            tracing::debug!("Treating enablement as unknown: {err}");
            EnablementState::Unknown
        })
    }
}

/// The state relevant to a single action.
///
/// Each axis is only populated when the requested action depends on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitState {
    /// Populated for enable and disable
    pub enablement: Option<EnablementState>,

    /// Populated for start and stop
    pub activity: Option<ActiveState>,
}

/// Errors that can occur when trying to query unit state
#[derive(Debug, Error)]
pub enum StateQueryError {
    /// The query command could not be run at all
    #[error("Running {command}: {source}")]
    Command {
        /// The command line that failed
        command: String,
        /// Why it failed
        #[source]
        source: io::Error,
    },
}

/// A source of live unit state.
pub trait StateQuery {
    /// Current enablement of the requested unit
    fn enablement(&self, request: &ActionRequest) -> Result<EnablementState, StateQueryError>;

    /// Current activity of the requested unit
    fn activity(&self, request: &ActionRequest) -> Result<ActiveState, StateQueryError>;

    /// Query whatever the requested action depends on.
    ///
    /// Restart, reload and the file actions don't depend on state, so nothing is queried.
    fn state(&self, request: &ActionRequest) -> Result<UnitState, StateQueryError> {
        let state = match request.action {
            Action::Enable | Action::Disable => UnitState {
                enablement: Some(self.enablement(request)?),
                activity: None,
            },
            Action::Start | Action::Stop => UnitState {
                enablement: None,
                activity: Some(self.activity(request)?),
            },
            Action::Restart | Action::Reload | Action::Create | Action::Delete => {
                UnitState::default()
            }
        };

        tracing::trace!(
            unit = %request.unit_name(),
            action = %request.action,
            enablement = ?state.enablement,
            activity = ?state.activity,
            "Queried unit state"
        );

        Ok(state)
    }
}

/// Queries unit state by running `systemctl is-enabled` and `systemctl is-active`.
#[derive(Debug, Default, Clone)]
pub struct Systemctl<E = Shell> {
    executor: E,
}

impl<E: Executor> Systemctl<E> {
    /// Query state through `executor`
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    // Both subcommands exit non-zero for perfectly valid answers ("disabled",
    // "inactive"), so only a failure to run at all is an error.
    fn ask(&self, request: &ActionRequest, subcommand: &str) -> Result<String, StateQueryError> {
        let command = request.systemctl(subcommand);
        let output = self
            .executor
            .run(&command)
            .map_err(|source| StateQueryError::Command {
                command: command.clone(),
                source,
            })?;

        if !output.success {
            tracing::trace!(%command, code = ?output.code, stdout = %output.stdout, "Query exited non-zero");
        }

        Ok(output.stdout)
    }
}

impl<E: Executor> StateQuery for Systemctl<E> {
    fn enablement(&self, request: &ActionRequest) -> Result<EnablementState, StateQueryError> {
        self.ask(request, "is-enabled")
            .map(|output| EnablementState::classify(&output))
    }

    fn activity(&self, request: &ActionRequest) -> Result<ActiveState, StateQueryError> {
        self.ask(request, "is-active")
            .map(|output| ActiveState::classify(&output))
    }
}
