//! Ordered option tables for every unit file section
//!
//! Options render in the order they are declared here, so the tables follow the
//! layout of the systemd manual pages rather than alphabetical order.

/// The ordered set of options a single section accepts.
///
/// A schema is made of one or more option groups. Several unit types share the
/// execution, kill and resource-control groups, so those are kept as separate
/// tables and concatenated in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    groups: &'static [&'static [&'static str]],
}

impl SectionSchema {
    const fn new(groups: &'static [&'static [&'static str]]) -> Self {
        Self { groups }
    }

    /// Iterate over the option names in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().flat_map(|group| group.iter().copied())
    }

    /// Whether `option` is declared in this section.
    pub fn contains(&self, option: &str) -> bool {
        self.options().any(|declared| declared == option)
    }
}

/// `[Unit]`, see systemd.unit(5).
pub const UNIT: SectionSchema = SectionSchema::new(&[UNIT_OPTIONS]);

/// `[Install]`, see systemd.unit(5).
///
/// `Alias` is deliberately absent: aliases are declared through the unit's alias
/// list and expanded with the unit suffix.
pub const INSTALL: SectionSchema = SectionSchema::new(&[INSTALL_OPTIONS]);

/// `[Automount]`, see systemd.automount(5).
pub const AUTOMOUNT: SectionSchema = SectionSchema::new(&[AUTOMOUNT_OPTIONS]);

/// `[Mount]`, see systemd.mount(5).
pub const MOUNT: SectionSchema =
    SectionSchema::new(&[MOUNT_OPTIONS, EXEC_OPTIONS, KILL_OPTIONS, RESOURCE_CONTROL_OPTIONS]);

/// `[Path]`, see systemd.path(5).
pub const PATH: SectionSchema = SectionSchema::new(&[PATH_OPTIONS]);

/// `[Service]`, see systemd.service(5).
pub const SERVICE: SectionSchema = SectionSchema::new(&[
    SERVICE_OPTIONS,
    EXEC_OPTIONS,
    KILL_OPTIONS,
    RESOURCE_CONTROL_OPTIONS,
]);

/// `[Slice]`, see systemd.slice(5).
pub const SLICE: SectionSchema = SectionSchema::new(&[RESOURCE_CONTROL_OPTIONS]);

/// `[Socket]`, see systemd.socket(5).
pub const SOCKET: SectionSchema = SectionSchema::new(&[
    SOCKET_OPTIONS,
    EXEC_OPTIONS,
    KILL_OPTIONS,
    RESOURCE_CONTROL_OPTIONS,
]);

/// `[Swap]`, see systemd.swap(5).
pub const SWAP: SectionSchema =
    SectionSchema::new(&[SWAP_OPTIONS, EXEC_OPTIONS, KILL_OPTIONS, RESOURCE_CONTROL_OPTIONS]);

/// `[Timer]`, see systemd.timer(5).
pub const TIMER: SectionSchema = SectionSchema::new(&[TIMER_OPTIONS]);

const UNIT_OPTIONS: &[&str] = &[
    "Description",
    "Documentation",
    "Requires",
    "Requisite",
    "Wants",
    "BindsTo",
    "PartOf",
    "Conflicts",
    "Before",
    "After",
    "OnFailure",
    "PropagatesReloadTo",
    "ReloadPropagatedFrom",
    "JoinsNamespaceOf",
    "RequiresMountsFor",
    "OnFailureJobMode",
    "IgnoreOnIsolate",
    "StopWhenUnneeded",
    "RefuseManualStart",
    "RefuseManualStop",
    "AllowIsolate",
    "DefaultDependencies",
    "JobTimeoutSec",
    "JobTimeoutAction",
    "JobTimeoutRebootArgument",
    "StartLimitIntervalSec",
    "StartLimitBurst",
    "StartLimitAction",
    "RebootArgument",
    "ConditionArchitecture",
    "ConditionVirtualization",
    "ConditionHost",
    "ConditionKernelCommandLine",
    "ConditionSecurity",
    "ConditionCapability",
    "ConditionACPower",
    "ConditionNeedsUpdate",
    "ConditionFirstBoot",
    "ConditionPathExists",
    "ConditionPathExistsGlob",
    "ConditionPathIsDirectory",
    "ConditionPathIsSymbolicLink",
    "ConditionPathIsMountPoint",
    "ConditionPathIsReadWrite",
    "ConditionDirectoryNotEmpty",
    "ConditionFileNotEmpty",
    "ConditionFileIsExecutable",
    "AssertArchitecture",
    "AssertVirtualization",
    "AssertHost",
    "AssertKernelCommandLine",
    "AssertSecurity",
    "AssertCapability",
    "AssertACPower",
    "AssertNeedsUpdate",
    "AssertFirstBoot",
    "AssertPathExists",
    "AssertPathExistsGlob",
    "AssertPathIsDirectory",
    "AssertPathIsSymbolicLink",
    "AssertPathIsMountPoint",
    "AssertPathIsReadWrite",
    "AssertDirectoryNotEmpty",
    "AssertFileNotEmpty",
    "AssertFileIsExecutable",
    "SourcePath",
];

const INSTALL_OPTIONS: &[&str] = &["WantedBy", "RequiredBy", "Also", "DefaultInstance"];

const EXEC_OPTIONS: &[&str] = &[
    "WorkingDirectory",
    "RootDirectory",
    "User",
    "Group",
    "SupplementaryGroups",
    "Nice",
    "OOMScoreAdjust",
    "IOSchedulingClass",
    "IOSchedulingPriority",
    "CPUSchedulingPolicy",
    "CPUSchedulingPriority",
    "CPUSchedulingResetOnFork",
    "CPUAffinity",
    "UMask",
    "Environment",
    "EnvironmentFile",
    "PassEnvironment",
    "StandardInput",
    "StandardOutput",
    "StandardError",
    "TTYPath",
    "TTYReset",
    "TTYVHangup",
    "TTYVTDisallocate",
    "SyslogIdentifier",
    "SyslogFacility",
    "SyslogLevel",
    "SyslogLevelPrefix",
    "TimerSlackNSec",
    "LimitCPU",
    "LimitFSIZE",
    "LimitDATA",
    "LimitSTACK",
    "LimitCORE",
    "LimitRSS",
    "LimitNOFILE",
    "LimitAS",
    "LimitNPROC",
    "LimitMEMLOCK",
    "LimitLOCKS",
    "LimitSIGPENDING",
    "LimitMSGQUEUE",
    "LimitNICE",
    "LimitRTPRIO",
    "LimitRTTIME",
    "PAMName",
    "CapabilityBoundingSet",
    "AmbientCapabilities",
    "SecureBits",
    "Capabilities",
    "ReadWriteDirectories",
    "ReadOnlyDirectories",
    "InaccessibleDirectories",
    "PrivateTmp",
    "PrivateDevices",
    "PrivateNetwork",
    "ProtectSystem",
    "ProtectHome",
    "MountFlags",
    "UtmpIdentifier",
    "UtmpMode",
    "SELinuxContext",
    "AppArmorProfile",
    "SmackProcessLabel",
    "IgnoreSIGPIPE",
    "NoNewPrivileges",
    "SystemCallFilter",
    "SystemCallErrorNumber",
    "SystemCallArchitectures",
    "RestrictAddressFamilies",
    "Personality",
    "RuntimeDirectory",
    "RuntimeDirectoryMode",
];

const KILL_OPTIONS: &[&str] = &["KillMode", "KillSignal", "SendSIGHUP", "SendSIGKILL"];

const RESOURCE_CONTROL_OPTIONS: &[&str] = &[
    "CPUAccounting",
    "CPUShares",
    "StartupCPUShares",
    "CPUQuota",
    "MemoryAccounting",
    "MemoryLimit",
    "TasksAccounting",
    "TasksMax",
    "IOAccounting",
    "IOWeight",
    "StartupIOWeight",
    "IODeviceWeight",
    "IOReadBandwidthMax",
    "IOWriteBandwidthMax",
    "IOReadIOPSMax",
    "IOWriteIOPSMax",
    "BlockIOAccounting",
    "BlockIOWeight",
    "StartupBlockIOWeight",
    "BlockIODeviceWeight",
    "BlockIOReadBandwidth",
    "BlockIOWriteBandwidth",
    "DeviceAllow",
    "DevicePolicy",
    "Slice",
    "Delegate",
];

const AUTOMOUNT_OPTIONS: &[&str] = &["Where", "DirectoryMode", "TimeoutIdleSec"];

const MOUNT_OPTIONS: &[&str] = &[
    "What",
    "Where",
    "Type",
    "Options",
    "SloppyOptions",
    "DirectoryMode",
    "TimeoutSec",
];

const PATH_OPTIONS: &[&str] = &[
    "PathExists",
    "PathExistsGlob",
    "PathChanged",
    "PathModified",
    "DirectoryNotEmpty",
    "Unit",
    "MakeDirectory",
    "DirectoryMode",
];

const SERVICE_OPTIONS: &[&str] = &[
    "Type",
    "RemainAfterExit",
    "GuessMainPID",
    "PIDFile",
    "BusName",
    "BusPolicy",
    "ExecStart",
    "ExecStartPre",
    "ExecStartPost",
    "ExecReload",
    "ExecStop",
    "ExecStopPost",
    "RestartSec",
    "TimeoutStartSec",
    "TimeoutStopSec",
    "TimeoutSec",
    "RuntimeMaxSec",
    "WatchdogSec",
    "Restart",
    "SuccessExitStatus",
    "RestartPreventExitStatus",
    "RestartForceExitStatus",
    "PermissionsStartOnly",
    "RootDirectoryStartOnly",
    "NonBlocking",
    "NotifyAccess",
    "Sockets",
    "FailureAction",
    "FileDescriptorStoreMax",
    "USBFunctionDescriptors",
    "USBFunctionStrings",
];

const SOCKET_OPTIONS: &[&str] = &[
    "ListenStream",
    "ListenDatagram",
    "ListenSequentialPacket",
    "ListenFIFO",
    "ListenSpecial",
    "ListenNetlink",
    "ListenMessageQueue",
    "ListenUSBFunction",
    "SocketProtocol",
    "BindIPv6Only",
    "Backlog",
    "BindToDevice",
    "SocketUser",
    "SocketGroup",
    "SocketMode",
    "DirectoryMode",
    "Accept",
    "Writable",
    "MaxConnections",
    "KeepAlive",
    "KeepAliveTimeSec",
    "KeepAliveIntervalSec",
    "KeepAliveProbes",
    "NoDelay",
    "Priority",
    "DeferAcceptSec",
    "ReceiveBuffer",
    "SendBuffer",
    "IPTOS",
    "IPTTL",
    "Mark",
    "ReusePort",
    "SmackLabel",
    "SmackLabelIPIn",
    "SmackLabelIPOut",
    "SELinuxContextFromNet",
    "PipeSize",
    "MessageQueueMaxMessages",
    "MessageQueueMessageSize",
    "FreeBind",
    "Transparent",
    "Broadcast",
    "PassCredentials",
    "PassSecurity",
    "TCPCongestion",
    "ExecStartPre",
    "ExecStartPost",
    "ExecStopPre",
    "ExecStopPost",
    "TimeoutSec",
    "Service",
    "RemoveOnStop",
    "Symlinks",
    "FileDescriptorName",
    "TriggerLimitIntervalSec",
    "TriggerLimitBurst",
];

const SWAP_OPTIONS: &[&str] = &["What", "Priority", "Options", "TimeoutSec"];

const TIMER_OPTIONS: &[&str] = &[
    "OnActiveSec",
    "OnBootSec",
    "OnStartupSec",
    "OnUnitActiveSec",
    "OnUnitInactiveSec",
    "OnCalendar",
    "AccuracySec",
    "RandomizedDelaySec",
    "Unit",
    "Persistent",
    "WakeSystem",
    "RemainAfterElapse",
];
