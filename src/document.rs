//! Assemble unit file contents from a [UnitSpec]
//!
//! The document is rebuilt from the [UnitSpec] on every run and never read back from disk.
//! Writing it out is left to the caller; [UnitDocument] implements [fmt::Display]
//! with the usual INI layout.

use std::fmt;

use crate::schema::SectionSchema;
use crate::spec::{SectionValues, UnitSpec};
use crate::unit::{SectionKind, UnitType};

/// One rendered section of a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    kind: SectionKind,
    lines: Vec<String>,
}

impl Section {
    /// Which section this is
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// The INI header, e.g. `Install`
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Rendered `Key=Value` lines, in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether the section has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `Key=Value` lines for every option with an assigned value, in schema order.
pub fn option_lines(schema: &SectionSchema, values: Option<&SectionValues>) -> Vec<String> {
    let Some(values) = values else {
        return Vec::new();
    };

    schema
        .options()
        .filter_map(|option| values.get(option).map(|value| format!("{option}={value}")))
        .collect()
}

/// `Key=` lines clearing inherited values, only for drop-ins.
///
/// An override is kept if the section declares it, or if it is `Alias` and the
/// section is `[Install]`.
pub fn override_lines(
    section: SectionKind,
    schema: &SectionSchema,
    overrides: &[String],
    drop_in: bool,
) -> Vec<String> {
    if !drop_in {
        return Vec::new();
    }

    overrides
        .iter()
        .filter(|name| {
            schema.contains(name) || (section == SectionKind::Install && name.as_str() == "Alias")
        })
        .map(|name| format!("{name}="))
        .collect()
}

/// The single `Alias=` line of the install section, each alias suffixed with the unit type.
pub fn alias_lines(section: SectionKind, aliases: &[String], conf_type: UnitType) -> Vec<String> {
    if section != SectionKind::Install || aliases.is_empty() {
        return Vec::new();
    }

    let aliases: Vec<_> = aliases
        .iter()
        .map(|alias| format!("{alias}.{conf_type}"))
        .collect();

    vec![format!("Alias={}", aliases.join(" "))]
}

/// The ordered sections of a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDocument {
    sections: Vec<Section>,
}

impl UnitDocument {
    /// Build the document for `spec`.
    ///
    /// Sections come in the order `[Unit]`, `[Install]`, then the type-specific
    /// section, which stub types never get. Within a section, cleared overrides come
    /// first, then aliases, then option values. Sections without lines are kept.
    pub fn assemble(spec: &UnitSpec) -> Self {
        let conf_type = spec.conf_type();
        let mut sections = Vec::with_capacity(3);

        for kind in [
            SectionKind::Unit,
            SectionKind::Install,
            SectionKind::Type(conf_type),
        ] {
            let Some(schema) = kind.schema() else {
                if spec.values(kind).is_some() {
                    tracing::debug!(unit = %spec.unit_name(), section = %kind, "Ignoring values for stub section");
                }
                continue;
            };

            let mut lines = override_lines(kind, &schema, spec.overrides(), spec.drop_in());
            lines.extend(alias_lines(kind, spec.aliases(), conf_type));
            lines.extend(option_lines(&schema, spec.values(kind)));

            sections.push(Section { kind, lines });
        }

        tracing::trace!(unit = %spec.unit_name(), sections = sections.len(), "Assembled unit document");
        Self { sections }
    }

    /// Sections in file order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a single section
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// Sections as `(label, lines)` pairs, ready for an INI writer.
    pub fn to_pairs(&self) -> Vec<(&'static str, &[String])> {
        self.sections
            .iter()
            .map(|section| (section.label(), section.lines()))
            .collect()
    }
}

impl fmt::Display for UnitDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.label())?;
            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn options_render_in_schema_order() {
        let mut values = SectionValues::new();
        values.insert("After".into(), vec!["network.target", "sshd-keygen.target"].into());
        values.insert("Description".into(), "OpenSSH server daemon".into());
        values.insert("StopWhenUnneeded".into(), true.into());

        assert_eq!(
            option_lines(&schema::UNIT, Some(&values)),
            strings(&[
                "Description=OpenSSH server daemon",
                "After=network.target sshd-keygen.target",
                "StopWhenUnneeded=true",
            ])
        );
        assert!(option_lines(&schema::UNIT, None).is_empty());
    }

    #[test]
    fn float_values_render_literally() {
        let mut values = SectionValues::new();
        values.insert("RestartSec".into(), 1.5_f64.into());
        values.insert("Restart".into(), "on-failure".into());

        assert_eq!(
            option_lines(&schema::SERVICE, Some(&values)),
            strings(&["RestartSec=1.5", "Restart=on-failure"])
        );
    }

    #[test]
    fn overrides_only_apply_to_drop_ins() {
        let overrides = strings(&["WantedBy"]);
        assert_eq!(
            override_lines(SectionKind::Install, &schema::INSTALL, &overrides, true),
            strings(&["WantedBy="])
        );
        assert!(override_lines(SectionKind::Install, &schema::INSTALL, &overrides, false).is_empty());
    }

    #[test]
    fn alias_override_is_install_only() {
        let overrides = strings(&["Alias"]);
        assert_eq!(
            override_lines(SectionKind::Install, &schema::INSTALL, &overrides, true),
            strings(&["Alias="])
        );
        assert!(override_lines(SectionKind::Unit, &schema::UNIT, &overrides, true).is_empty());
    }

    #[test]
    fn overrides_are_filtered_per_section() {
        let overrides = strings(&["ExecStart", "After", "WantedBy", "Bogus"]);
        assert_eq!(
            override_lines(SectionKind::Unit, &schema::UNIT, &overrides, true),
            strings(&["After="])
        );
        assert_eq!(
            override_lines(
                SectionKind::Type(UnitType::Service),
                &schema::SERVICE,
                &overrides,
                true
            ),
            strings(&["ExecStart="])
        );
    }

    #[test]
    fn aliases_keep_their_order() {
        let aliases = strings(&["foo", "bar"]);
        assert_eq!(
            alias_lines(SectionKind::Install, &aliases, UnitType::Service),
            strings(&["Alias=foo.service bar.service"])
        );
        assert!(alias_lines(SectionKind::Unit, &aliases, UnitType::Service).is_empty());
        assert!(alias_lines(SectionKind::Install, &[], UnitType::Service).is_empty());
    }

    fn sshd() -> UnitSpec {
        r#"
            name = "sshd"
            conf_type = "service"
            aliases = ["foo", "bar"]

            [unit]
            Description = "OpenSSH server daemon"
            After = ["network.target"]

            [install]
            WantedBy = "multi-user.target"

            [service]
            ExecStart = "/usr/sbin/sshd -D"
            Restart = "on-failure"
        "#
        .parse()
        .unwrap()
    }

    #[test]
    fn assemble_unit() {
        let document = UnitDocument::assemble(&sshd());

        let labels: Vec<_> = document.sections().iter().map(Section::label).collect();
        assert_eq!(labels, vec!["Unit", "Install", "Service"]);

        let install = document.section(SectionKind::Install).unwrap();
        assert_eq!(
            install.lines(),
            ["Alias=foo.service bar.service", "WantedBy=multi-user.target"]
        );

        assert_eq!(
            document.to_string(),
            "[Unit]\n\
             Description=OpenSSH server daemon\n\
             After=network.target\n\
             \n\
             [Install]\n\
             Alias=foo.service bar.service\n\
             WantedBy=multi-user.target\n\
             \n\
             [Service]\n\
             ExecStart=/usr/sbin/sshd -D\n\
             Restart=on-failure\n"
        );
    }

    #[test]
    fn assembly_is_deterministic() {
        let spec = sshd();
        let first = UnitDocument::assemble(&spec);
        let second = UnitDocument::assemble(&spec);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn stub_types_have_no_type_section() {
        let spec: UnitSpec = r#"
            name = "kiosk"
            conf_type = "target"

            [unit]
            Description = "Kiosk mode"

            [target]
            Ignored = "yes"
        "#
        .parse()
        .unwrap();

        let document = UnitDocument::assemble(&spec);
        let kinds: Vec<_> = document.sections().iter().map(Section::kind).collect();
        assert_eq!(kinds, vec![SectionKind::Unit, SectionKind::Install]);
        assert!(document.section(SectionKind::Type(UnitType::Target)).is_none());
    }

    #[test]
    fn empty_sections_are_kept() {
        let spec: UnitSpec = r#"
            name = "backup"
            conf_type = "timer"
        "#
        .parse()
        .unwrap();

        let document = UnitDocument::assemble(&spec);
        assert_eq!(document.sections().len(), 3);
        assert!(document.sections().iter().all(Section::is_empty));
        assert_eq!(document.to_string(), "[Unit]\n\n[Install]\n\n[Timer]\n");
    }

    #[test]
    fn drop_in_clears_before_assigning() {
        let spec: UnitSpec = r#"
            name = "limits"
            conf_type = "service"
            drop_in = true
            override = "sshd"
            aliases = ["ssh"]
            overrides = ["ExecStart", "Alias", "WantedBy"]

            [install]
            WantedBy = "graphical.target"

            [service]
            ExecStart = "/usr/sbin/sshd -D -e"
            LimitNOFILE = 65536
        "#
        .parse()
        .unwrap();

        let document = UnitDocument::assemble(&spec);
        assert!(document.section(SectionKind::Unit).unwrap().is_empty());
        assert_eq!(
            document.section(SectionKind::Install).unwrap().lines(),
            [
                "Alias=",
                "WantedBy=",
                "Alias=ssh.service",
                "WantedBy=graphical.target"
            ]
        );
        assert_eq!(
            document
                .section(SectionKind::Type(UnitType::Service))
                .unwrap()
                .lines(),
            [
                "ExecStart=",
                "ExecStart=/usr/sbin/sshd -D -e",
                "LimitNOFILE=65536"
            ]
        );
    }

    #[test]
    fn pairs_follow_section_order() {
        let document = UnitDocument::assemble(&sshd());
        let pairs = document.to_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, "Unit");
        assert_eq!(pairs[2].1, ["ExecStart=/usr/sbin/sshd -D", "Restart=on-failure"]);
    }
}
