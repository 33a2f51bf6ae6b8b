//! Lifecycle actions and deciding whether they need to run
//!
//! Every mutating action is a single `systemctl {action} {unit}` command. Before
//! running it, the [Reconciler] asks a [StateQuery] whether the unit is already in
//! the requested state and skips the command if so.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::exec::{Executor, Shell};
use crate::spec::ValidationError;
use crate::state::{
    ActiveState, EnablementState, StateQuery, StateQueryError, Systemctl, UnitState,
};
use crate::unit::{Mode, UnitType};

/// Actions that can be requested for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Write the unit file
    Create,
    /// Remove the unit file
    Delete,
    /// `systemctl enable`
    Enable,
    /// `systemctl disable`
    Disable,
    /// `systemctl start`
    Start,
    /// `systemctl stop`
    Stop,
    /// `systemctl restart`
    Restart,
    /// `systemctl reload`
    Reload,
}

impl Action {
    /// Every action, file actions first.
    pub const ALL: [Action; 8] = [
        Action::Create,
        Action::Delete,
        Action::Enable,
        Action::Disable,
        Action::Start,
        Action::Stop,
        Action::Restart,
        Action::Reload,
    ];

    /// The lowercase name, which is also the systemctl verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
            Action::Reload => "reload",
        }
    }

    /// Create and delete act on the unit file, not on the service manager.
    pub fn is_file_action(&self) -> bool {
        matches!(self, Action::Create | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an action name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid action")]
pub struct ActionParseError(String);

impl FromStr for Action {
    type Err = ActionParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ActionParseError(s.into()))
    }
}

/// A single action against a single unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    /// Unit name without its type suffix
    pub name: String,

    /// The unit type
    pub conf_type: UnitType,

    /// Which service manager owns the unit
    pub mode: Mode,

    /// The requested action
    pub action: Action,
}

impl ActionRequest {
    /// The full unit name, `{name}.{conf_type}`
    pub fn unit_name(&self) -> String {
        format!("{}.{}", self.name, self.conf_type)
    }

    /// A systemctl command line running `subcommand` against this unit.
    ///
    /// User-mode units address the per-user manager, so `--user` follows `systemctl`:
    /// `systemctl --user is-active foo.service`. System-mode commands have no flag.
    pub fn systemctl(&self, subcommand: &str) -> String {
        match self.mode {
            Mode::System => format!("systemctl {} {}", subcommand, self.unit_name()),
            Mode::User => format!("systemctl --user {} {}", subcommand, self.unit_name()),
        }
    }

    /// The mutating command for the requested action.
    pub fn command(&self) -> String {
        self.systemctl(self.action.as_str())
    }
}

/// Whether `action` is already satisfied by `state`.
///
/// `static` satisfies both enable and disable, and `stop` treats an unknown
/// activity as already stopped. Restart and reload always run.
pub fn skip(action: Action, state: &UnitState) -> bool {
    use EnablementState::*;

    match action {
        Action::Enable => matches!(state.enablement, Some(Static | Enabled | EnabledRuntime)),
        Action::Disable => matches!(
            state.enablement,
            Some(Static | Disabled | Masked | MaskedRuntime)
        ),
        Action::Start => matches!(state.activity, Some(ActiveState::Active)),
        Action::Stop => matches!(
            state.activity,
            Some(ActiveState::Inactive | ActiveState::Unknown)
        ),
        Action::Restart | Action::Reload | Action::Create | Action::Delete => false,
    }
}

/// Errors running a mutating command
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The command could not be started
    #[error("Running {command}: {source}")]
    Spawn {
        /// The command line
        command: String,
        /// Why it could not be started
        #[source]
        source: std::io::Error,
    },

    /// The command ran and failed
    #[error("{command} failed with exit code {}", .code.map_or_else(|| "none".to_owned(), |code| code.to_string()))]
    Failed {
        /// The command line
        command: String,
        /// Exit code, `None` if killed by a signal
        code: Option<i32>,
        /// What the command printed
        output: String,
    },
}

/// Errors reconciling a single action
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The action is not permitted for this unit
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Create and delete are carried out by writing files, not by systemctl
    #[error("{0} is not a lifecycle action")]
    NotLifecycle(Action),

    /// Querying the current state failed
    #[error(transparent)]
    Query(#[from] StateQueryError),

    /// The mutating command failed
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// The result of reconciling one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The mutating command, whether or not it ran
    pub command: String,

    /// The state that was queried before deciding
    pub state: UnitState,

    /// Whether the command ran
    pub changed: bool,
}

/// Runs lifecycle actions, skipping those that are already satisfied.
#[derive(Debug, Clone)]
pub struct Reconciler<Q, E> {
    query: Q,
    executor: E,
}

impl Default for Reconciler<Systemctl<Shell>, Shell> {
    fn default() -> Self {
        Self::new(Systemctl::new(Shell), Shell)
    }
}

impl<Q: StateQuery, E: Executor> Reconciler<Q, E> {
    /// Reconcile by asking `query` for state and running commands with `executor`.
    pub fn new(query: Q, executor: E) -> Self {
        Self { query, executor }
    }

    /// Query the state the request depends on, then run its command unless it is
    /// already satisfied.
    ///
    /// The state may change between the query and the command; nothing guards that window.
    pub fn run(&self, request: &ActionRequest) -> Result<Outcome, ReconcileError> {
        if request.action.is_file_action() {
            return Err(ReconcileError::NotLifecycle(request.action));
        }

        let state = self.query.state(request)?;
        let command = request.command();

        if skip(request.action, &state) {
            tracing::debug!(%command, ?state, "Unit already in requested state, skipping");
            return Ok(Outcome {
                command,
                state,
                changed: false,
            });
        }

        tracing::debug!(%command, "Running");
        let output = self
            .executor
            .run(&command)
            .map_err(|source| ExecutionError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.success {
            tracing::warn!(%command, code = ?output.code, "Command failed");
            return Err(ExecutionError::Failed {
                command,
                code: output.code,
                output: output.stdout,
            }
            .into());
        }

        Ok(Outcome {
            command,
            state,
            changed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io};

    use super::*;
    use crate::exec::CommandOutput;

    fn enablement(state: &str) -> UnitState {
        UnitState {
            enablement: Some(EnablementState::classify(state)),
            activity: None,
        }
    }

    fn activity(state: &str) -> UnitState {
        UnitState {
            enablement: None,
            activity: Some(ActiveState::classify(state)),
        }
    }

    #[test]
    fn skip_table() {
        assert!(skip(Action::Enable, &enablement("static")));
        assert!(skip(Action::Enable, &enablement("enabled")));
        assert!(skip(Action::Enable, &enablement("enabled-runtime")));
        assert!(!skip(Action::Enable, &enablement("disabled")));
        assert!(!skip(Action::Enable, &enablement("masked")));

        assert!(skip(Action::Disable, &enablement("disabled")));
        assert!(skip(Action::Disable, &enablement("masked")));
        assert!(skip(Action::Disable, &enablement("masked-runtime")));
        assert!(!skip(Action::Disable, &enablement("enabled")));
        assert!(!skip(Action::Disable, &enablement("")));

        assert!(skip(Action::Start, &activity("active")));
        assert!(!skip(Action::Start, &activity("inactive")));
        assert!(!skip(Action::Start, &activity("activating")));

        assert!(skip(Action::Stop, &activity("inactive")));
        assert!(!skip(Action::Stop, &activity("failed")));
        assert!(!skip(Action::Stop, &activity("active")));
    }

    // A static unit can be neither enabled nor disabled, so both are satisfied.
    #[test]
    fn static_satisfies_enable_and_disable() {
        let state = enablement("static");
        assert!(skip(Action::Enable, &state));
        assert!(skip(Action::Disable, &state));
    }

    #[test]
    fn stop_treats_unknown_as_stopped() {
        assert!(skip(Action::Stop, &activity("unknown")));
        assert!(skip(Action::Stop, &activity("")));
    }

    #[test]
    fn restart_and_reload_never_skip() {
        let states = [
            UnitState::default(),
            enablement("enabled"),
            activity("active"),
            activity("inactive"),
        ];
        for state in &states {
            assert!(!skip(Action::Restart, state));
            assert!(!skip(Action::Reload, state));
        }
    }

    #[test]
    fn parse_actions() {
        assert_eq!("reload".parse::<Action>().unwrap(), Action::Reload);
        assert!("mask".parse::<Action>().is_err());
    }

    #[derive(Debug)]
    struct FixedState(UnitState);

    impl StateQuery for FixedState {
        fn enablement(&self, _: &ActionRequest) -> Result<EnablementState, StateQueryError> {
            Ok(self.0.enablement.unwrap_or(EnablementState::Unknown))
        }

        fn activity(&self, _: &ActionRequest) -> Result<ActiveState, StateQueryError> {
            Ok(self.0.activity.unwrap_or(ActiveState::Unknown))
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        fail: bool,
        commands: RefCell<Vec<String>>,
    }

    impl Executor for Recorder {
        fn run(&self, command: &str) -> io::Result<CommandOutput> {
            self.commands.borrow_mut().push(command.into());
            Ok(CommandOutput {
                stdout: String::new(),
                success: !self.fail,
                code: Some(if self.fail { 5 } else { 0 }),
            })
        }
    }

    fn request(action: Action) -> ActionRequest {
        ActionRequest {
            name: "sshd".into(),
            conf_type: UnitType::Service,
            mode: Mode::System,
            action,
        }
    }

    #[test]
    fn runs_unsatisfied_action() {
        let recorder = Recorder::default();
        let reconciler = Reconciler::new(FixedState(enablement("disabled")), &recorder);

        let outcome = reconciler.run(&request(Action::Enable)).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.command, "systemctl enable sshd.service");
        assert_eq!(outcome.state.enablement, Some(EnablementState::Disabled));
        assert_eq!(
            *recorder.commands.borrow(),
            vec!["systemctl enable sshd.service"]
        );
    }

    #[test]
    fn skips_satisfied_action() {
        let recorder = Recorder::default();
        let reconciler = Reconciler::new(FixedState(activity("active")), &recorder);

        let outcome = reconciler.run(&request(Action::Start)).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.command, "systemctl start sshd.service");
        assert!(recorder.commands.borrow().is_empty());
    }

    #[test]
    fn restart_always_runs() {
        let recorder = Recorder::default();
        let reconciler = Reconciler::new(FixedState(activity("active")), &recorder);

        let outcome = reconciler.run(&request(Action::Restart)).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.state, UnitState::default());
    }

    #[test]
    fn failed_command_is_fatal() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let reconciler = Reconciler::new(FixedState(activity("inactive")), &recorder);

        let err = reconciler.run(&request(Action::Start)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "systemctl start sshd.service failed with exit code 5"
        );
        assert!(matches!(
            err,
            ReconcileError::Execution(ExecutionError::Failed { code: Some(5), .. })
        ));
    }

    #[test]
    fn file_actions_are_not_reconciled() {
        let recorder = Recorder::default();
        let reconciler = Reconciler::new(FixedState(UnitState::default()), &recorder);

        for action in [Action::Create, Action::Delete] {
            let err = reconciler.run(&request(action)).unwrap_err();
            assert!(matches!(err, ReconcileError::NotLifecycle(a) if a == action));
        }
        assert!(recorder.commands.borrow().is_empty());
    }

    #[test]
    fn user_commands() {
        let mut user = request(Action::Reload);
        user.mode = Mode::User;
        assert_eq!(user.command(), "systemctl --user reload sshd.service");
    }
}
