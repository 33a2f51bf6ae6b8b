//! Declared unit specifications and their validation
//!
//! A [UnitSpec] is built once from a [UnitDeclaration], usually loaded from TOML,
//! and is read-only afterwards. Everything that can be rejected is rejected here,
//! before a document is assembled or a command is run.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::PathBuf,
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

use crate::action::{Action, ActionRequest};
use crate::unit::{Mode, ModeParseError, SectionKind, UnitType, UnitTypeParseError};

/// Errors raised while validating a declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The declared unit type is not one we know about
    #[error(transparent)]
    UnknownConfType(#[from] UnitTypeParseError),

    /// The declared mode is neither system nor user
    #[error(transparent)]
    UnknownMode(#[from] ModeParseError),

    /// A drop-in was declared without naming the unit it overrides
    #[error("drop-in {0} requires a non-empty override")]
    MissingOverride(String),

    /// A unit name, alias or override contains characters systemd does not allow
    #[error("{0:?} is not a valid unit name")]
    InvalidName(String),

    /// Values were declared for a section this unit type does not have
    #[error("{section} is not a section of a {conf_type} unit")]
    UnexpectedSection {
        /// The section key as declared
        section: String,
        /// The unit type of the declaration
        conf_type: UnitType,
    },

    /// An option is not declared in the section schema
    #[error("{option} is not a valid option for the {section} section")]
    UnknownOption {
        /// The section the option was declared in
        section: SectionKind,
        /// The offending option name
        option: String,
    },

    /// An option value spans more than one line
    #[error("{option} in the {section} section must not contain line breaks")]
    InvalidValue {
        /// The section the option was declared in
        section: SectionKind,
        /// The offending option name
        option: String,
    },

    /// Drop-ins only support file actions
    #[error("drop-in {name} only permits create and delete, not {action}")]
    ActionNotPermitted {
        /// Name of the drop-in
        name: String,
        /// The rejected action
        action: Action,
    },
}

/// Errors loading a declaration from TOML
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// The document is not valid TOML or does not have the declaration shape
    #[error("Failed to parse unit declaration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The declaration parsed but failed validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// The value assigned to a single option
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean, rendered as `true` or `false`
    Bool(bool),

    /// An integer, rendered in decimal
    Integer(i64),

    /// A floating point number, rendered in its shortest form
    Float(f64),

    /// A literal string
    Text(String),

    /// A sequence, rendered space separated
    List(Vec<String>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::Float(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
            OptionValue::List(values) => f.write_str(&values.join(" ")),
        }
    }
}

impl OptionValue {
    /// Whether the rendered value stays on a single line.
    pub fn is_single_line(&self) -> bool {
        let single = |value: &str| !value.contains(['\n', '\r']);
        match self {
            OptionValue::Text(value) => single(value),
            OptionValue::List(values) => values.iter().all(|value| single(value)),
            OptionValue::Bool(_) | OptionValue::Integer(_) | OptionValue::Float(_) => true,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.into())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for OptionValue {
    fn from(values: Vec<S>) -> Self {
        OptionValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Option values of one section, keyed by option name.
pub type SectionValues = BTreeMap<String, OptionValue>;

/// The raw, unvalidated description of a unit.
///
/// Section tables are keyed by `unit`, `install` or the unit type name:
///
/// ```toml
/// name = "sshd"
/// conf_type = "service"
/// aliases = ["ssh"]
///
/// [unit]
/// Description = "OpenSSH daemon"
///
/// [install]
/// WantedBy = ["multi-user.target"]
///
/// [service]
/// ExecStart = "/usr/sbin/sshd -D"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitDeclaration {
    /// Unit name without its type suffix
    pub name: String,

    /// Unit type name, e.g. `service`
    pub conf_type: String,

    /// `system` or `user`, defaults to `system`
    #[serde(default)]
    pub mode: Option<String>,

    /// Whether this declares a drop-in rather than a full unit
    #[serde(default)]
    pub drop_in: bool,

    /// Name of the unit a drop-in applies to
    #[serde(default, rename = "override")]
    pub override_name: Option<String>,

    /// Alternate names, without their type suffix
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Options a drop-in resets before assigning its own values
    #[serde(default)]
    pub overrides: Vec<String>,

    /// Option values per section
    #[serde(flatten)]
    pub sections: BTreeMap<String, SectionValues>,
}

/// A validated, immutable unit specification
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSpec {
    name: String,
    conf_type: UnitType,
    mode: Mode,
    drop_in: bool,
    override_name: Option<String>,
    aliases: Vec<String>,
    overrides: Vec<String>,
    values: HashMap<SectionKind, SectionValues>,
}

fn is_valid_unit_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-' | '@' | '\\'))
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_unit_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.into()))
    }
}

impl UnitSpec {
    /// Unit name without its type suffix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit type
    pub fn conf_type(&self) -> UnitType {
        self.conf_type
    }

    /// The service manager instance owning this unit
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether this is a drop-in
    pub fn drop_in(&self) -> bool {
        self.drop_in
    }

    /// The unit a drop-in applies to. Always present for drop-ins.
    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_deref()
    }

    /// Declared aliases, in declaration order
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Options a drop-in resets, in declaration order
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }

    /// Option values declared for a section, if any
    pub fn values(&self, section: SectionKind) -> Option<&SectionValues> {
        self.values.get(&section)
    }

    /// The full unit name, `{name}.{conf_type}`
    pub fn unit_name(&self) -> String {
        format!("{}.{}", self.name, self.conf_type)
    }

    /// Where the file for this unit belongs.
    ///
    /// Units live at `{dir}/{name}.{conf_type}`, drop-ins at
    /// `{dir}/{override}.{conf_type}.d/{name}.conf`.
    pub fn path(&self) -> PathBuf {
        let dir = PathBuf::from(self.mode.unit_dir());
        match (&self.override_name, self.drop_in) {
            (Some(target), true) => dir
                .join(format!("{}.{}.d", target, self.conf_type))
                .join(format!("{}.conf", self.name)),
            _ => dir.join(self.unit_name()),
        }
    }

    /// Whether `action` may be requested for this unit.
    pub fn permits(&self, action: Action) -> bool {
        !self.drop_in || action.is_file_action()
    }

    /// Build the request for a single action against this unit.
    pub fn request(&self, action: Action) -> Result<ActionRequest, ValidationError> {
        if !self.permits(action) {
            return Err(ValidationError::ActionNotPermitted {
                name: self.name.clone(),
                action,
            });
        }

        Ok(ActionRequest {
            name: self.name.clone(),
            conf_type: self.conf_type,
            mode: self.mode,
            action,
        })
    }
}

impl TryFrom<UnitDeclaration> for UnitSpec {
    type Error = ValidationError;

    fn try_from(declaration: UnitDeclaration) -> Result<Self, Self::Error> {
        let conf_type: UnitType = declaration.conf_type.parse()?;
        let mode = match declaration.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => Mode::default(),
        };

        check_name(&declaration.name)?;
        for alias in &declaration.aliases {
            check_name(alias)?;
        }

        let override_name = declaration.override_name.filter(|name| !name.is_empty());
        if declaration.drop_in {
            match &override_name {
                Some(target) => check_name(target)?,
                None => return Err(ValidationError::MissingOverride(declaration.name)),
            }
        }

        let mut values = HashMap::new();
        for (key, options) in declaration.sections {
            let section = match key.as_str() {
                "unit" => SectionKind::Unit,
                "install" => SectionKind::Install,
                name if name == conf_type.as_str() => SectionKind::Type(conf_type),
                _ => {
                    return Err(ValidationError::UnexpectedSection {
                        section: key,
                        conf_type,
                    })
                }
            };

            // Stub sections have no schema; their values are kept but never rendered.
            if let Some(schema) = section.schema() {
                if let Some(option) = options.keys().find(|option| !schema.contains(option)) {
                    return Err(ValidationError::UnknownOption {
                        section,
                        option: option.clone(),
                    });
                }
            }

            if let Some((option, _)) = options.iter().find(|(_, value)| !value.is_single_line()) {
                return Err(ValidationError::InvalidValue {
                    section,
                    option: option.clone(),
                });
            }

            values.insert(section, options);
        }

        Ok(UnitSpec {
            name: declaration.name,
            conf_type,
            mode,
            drop_in: declaration.drop_in,
            override_name,
            aliases: declaration.aliases,
            overrides: declaration.overrides,
            values,
        })
    }
}

impl FromStr for UnitSpec {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let declaration: UnitDeclaration = toml::from_str(s)?;
        Ok(declaration.try_into()?)
    }
}
