//! Unit categories, service manager scopes and the per-type descriptor table

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::schema::{self, SectionSchema};

/// The category of a unit, which is also the suffix of its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitType {
    /// `.automount` units
    Automount,
    /// `.device` units
    Device,
    /// `.mount` units
    Mount,
    /// `.path` units
    Path,
    /// `.service` units
    Service,
    /// `.slice` units
    Slice,
    /// `.socket` units
    Socket,
    /// `.swap` units
    Swap,
    /// `.target` units
    Target,
    /// `.timer` units
    Timer,
}

/// Everything that varies between unit types.
#[derive(Debug, Clone, Copy)]
pub struct UnitDescriptor {
    /// The unit type this descriptor belongs to
    pub conf_type: UnitType,

    /// Header of the type-specific section, e.g. `Service`
    pub label: &'static str,

    /// Options of the type-specific section, `None` for stub types
    pub schema: Option<SectionSchema>,
}

static DESCRIPTORS: [UnitDescriptor; 10] = [
    UnitDescriptor {
        conf_type: UnitType::Automount,
        label: "Automount",
        schema: Some(schema::AUTOMOUNT),
    },
    UnitDescriptor {
        conf_type: UnitType::Device,
        label: "Device",
        schema: None,
    },
    UnitDescriptor {
        conf_type: UnitType::Mount,
        label: "Mount",
        schema: Some(schema::MOUNT),
    },
    UnitDescriptor {
        conf_type: UnitType::Path,
        label: "Path",
        schema: Some(schema::PATH),
    },
    UnitDescriptor {
        conf_type: UnitType::Service,
        label: "Service",
        schema: Some(schema::SERVICE),
    },
    UnitDescriptor {
        conf_type: UnitType::Slice,
        label: "Slice",
        schema: Some(schema::SLICE),
    },
    UnitDescriptor {
        conf_type: UnitType::Socket,
        label: "Socket",
        schema: Some(schema::SOCKET),
    },
    UnitDescriptor {
        conf_type: UnitType::Swap,
        label: "Swap",
        schema: Some(schema::SWAP),
    },
    UnitDescriptor {
        conf_type: UnitType::Target,
        label: "Target",
        schema: None,
    },
    UnitDescriptor {
        conf_type: UnitType::Timer,
        label: "Timer",
        schema: Some(schema::TIMER),
    },
];

impl UnitType {
    /// All unit types, in the order of the descriptor table.
    pub const ALL: [UnitType; 10] = [
        UnitType::Automount,
        UnitType::Device,
        UnitType::Mount,
        UnitType::Path,
        UnitType::Service,
        UnitType::Slice,
        UnitType::Socket,
        UnitType::Swap,
        UnitType::Target,
        UnitType::Timer,
    ];

    /// The lowercase name used as file suffix and section key.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Automount => "automount",
            UnitType::Device => "device",
            UnitType::Mount => "mount",
            UnitType::Path => "path",
            UnitType::Service => "service",
            UnitType::Slice => "slice",
            UnitType::Socket => "socket",
            UnitType::Swap => "swap",
            UnitType::Target => "target",
            UnitType::Timer => "timer",
        }
    }

    /// Look up the descriptor for this unit type.
    pub fn descriptor(&self) -> &'static UnitDescriptor {
        &DESCRIPTORS[*self as usize]
    }

    /// Stub types have no type-specific section of their own.
    pub fn is_stub(&self) -> bool {
        self.descriptor().schema.is_none()
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a unit type name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid unit type")]
pub struct UnitTypeParseError(String);

impl FromStr for UnitType {
    type Err = UnitTypeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::ALL
            .into_iter()
            .find(|conf_type| conf_type.as_str() == s)
            .ok_or_else(|| UnitTypeParseError(s.into()))
    }
}

/// Which service manager instance owns a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The system manager, `/etc/systemd/system`
    #[default]
    System,

    /// The per-user manager, `/etc/systemd/user`
    User,
}

impl Mode {
    /// The lowercase name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::System => "system",
            Mode::User => "user",
        }
    }

    /// Directory holding administrator unit files for this mode.
    pub fn unit_dir(&self) -> &'static str {
        match self {
            Mode::System => "/etc/systemd/system",
            Mode::User => "/etc/systemd/user",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid mode, expected system or user")]
pub struct ModeParseError(String);

impl FromStr for Mode {
    type Err = ModeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Mode::System),
            "user" => Ok(Mode::User),
            _ => Err(ModeParseError(s.into())),
        }
    }
}

/// One of the sections a unit file can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `[Unit]`
    Unit,

    /// `[Install]`
    Install,

    /// The type-specific section, e.g. `[Service]`
    Type(UnitType),
}

impl SectionKind {
    /// The key used for this section in declarations: `unit`, `install` or the type name.
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Unit => "unit",
            SectionKind::Install => "install",
            SectionKind::Type(conf_type) => conf_type.as_str(),
        }
    }

    /// The INI header of this section.
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Unit => "Unit",
            SectionKind::Install => "Install",
            SectionKind::Type(conf_type) => conf_type.descriptor().label,
        }
    }

    /// Options this section accepts, `None` if the section does not exist for a stub type.
    pub fn schema(&self) -> Option<SectionSchema> {
        match self {
            SectionKind::Unit => Some(schema::UNIT),
            SectionKind::Install => Some(schema::INSTALL),
            SectionKind::Type(conf_type) => conf_type.descriptor().schema,
        }
    }

    /// Whether this is a type-specific section of a stub unit type.
    pub fn is_stub(&self) -> bool {
        self.schema().is_none()
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
