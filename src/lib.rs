//! Declarative systemd units
//!
//! This library turns a declared unit specification into unit file contents, and runs
//! unit lifecycle actions only when the unit is not already in the requested state.
//!
//! It eschews the use of libsystemd bindings in favor of using the `systemctl` command line utility
//! to query and change unit state. Writing unit files to disk is left to the caller.
//!
//! ```no_run
//! use systemd_units::{Action, UnitDocument, UnitSpec};
//!
//! let spec: UnitSpec = r#"
//!     name = "sshd"
//!     conf_type = "service"
//!
//!     [service]
//!     ExecStart = "/usr/sbin/sshd -D"
//! "#
//! .parse()?;
//!
//! let contents = UnitDocument::assemble(&spec).to_string();
//! std::fs::write(spec.path(), contents)?;
//!
//! let outcome = systemd_units::reconcile(&spec, Action::Start)?;
//! println!("{} changed={}", outcome.command, outcome.changed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod action;
pub mod document;
pub mod exec;
pub mod schema;
pub mod spec;
pub mod state;
pub mod unit;

pub use self::action::{skip, Action, ActionRequest, Outcome, ReconcileError, Reconciler};
pub use self::document::{Section, UnitDocument};
pub use self::exec::{CommandOutput, Executor, Shell};
pub use self::spec::{OptionValue, UnitDeclaration, UnitSpec, ValidationError};
pub use self::state::{ActiveState, EnablementState, StateQuery, Systemctl, UnitState};
pub use self::unit::{Mode, SectionKind, UnitType};

/// Run a lifecycle action against the unit described by `spec` with the host's `systemctl`.
pub fn reconcile(spec: &UnitSpec, action: Action) -> Result<Outcome, ReconcileError> {
    let request = spec.request(action)?;
    Reconciler::<Systemctl, Shell>::default().run(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_in() -> UnitSpec {
        r#"
            name = "limits"
            conf_type = "service"
            drop_in = true
            override = "automoton"
        "#
        .parse()
        .unwrap()
    }

    #[test]
    fn drop_ins_reject_lifecycle_actions() {
        let err = reconcile(&drop_in(), Action::Restart).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Invalid(ValidationError::ActionNotPermitted { .. })
        ));
    }

    #[test]
    fn file_actions_are_not_reconciled() {
        let err = reconcile(&drop_in(), Action::Create).unwrap_err();
        assert_eq!(err.to_string(), "create is not a lifecycle action");
    }
}
