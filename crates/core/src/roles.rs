//! Groups, permissions and display-role resolution.
//!
//! Group names are the sole authorization currency: the route gatekeeper and
//! the per-handler checks only ever ask "is the caller a member of group G".
//! The permission table exists for provisioning and introspection, expressed
//! as an enumerated verb/resource grid rather than name matching.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The fixed set of clinical staff groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Administrador,
    Medico,
    Matrona,
    Tens,
}

/// Record types covered by the permission grid.
pub const MANAGED_RESOURCES: [&str; 6] = [
    "persona",
    "paciente",
    "ingreso",
    "administracionmedicamento",
    "patologia",
    "usuario",
];

/// Actions a group can be granted over a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionVerb {
    View,
    Add,
    Change,
    Delete,
}

impl PermissionVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionVerb::View => "view",
            PermissionVerb::Add => "add",
            PermissionVerb::Change => "change",
            PermissionVerb::Delete => "delete",
        }
    }
}

impl Group {
    pub const ALL: [Group; 4] = [
        Group::Administrador,
        Group::Medico,
        Group::Matrona,
        Group::Tens,
    ];

    /// Display name, with the accents and casing the clinical staff use.
    pub fn display_name(&self) -> &'static str {
        match self {
            Group::Administrador => "Administrador",
            Group::Medico => "Médico",
            Group::Matrona => "Matrona",
            Group::Tens => "TENS",
        }
    }

    /// Verbs this group is granted over every managed resource.
    pub fn granted_verbs(&self) -> &'static [PermissionVerb] {
        match self {
            Group::Administrador => &[
                PermissionVerb::View,
                PermissionVerb::Add,
                PermissionVerb::Change,
                PermissionVerb::Delete,
            ],
            Group::Medico => &[
                PermissionVerb::View,
                PermissionVerb::Add,
                PermissionVerb::Change,
            ],
            Group::Matrona => &[
                PermissionVerb::View,
                PermissionVerb::Add,
                PermissionVerb::Change,
            ],
            Group::Tens => &[PermissionVerb::View, PermissionVerb::Add],
        }
    }

    /// The full permission codename set for this group, e.g. `view_persona`.
    pub fn permission_codenames(&self) -> Vec<String> {
        let mut codenames = Vec::new();
        for verb in self.granted_verbs() {
            for resource in MANAGED_RESOURCES {
                codenames.push(format!("{}_{}", verb.as_str(), resource));
            }
        }
        codenames
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown group: '{0}'")]
pub struct UnknownGroup(String);

impl FromStr for Group {
    type Err = UnknownGroup;

    /// Parses a group from user-facing input. Accent- and case-insensitive,
    /// so `medico`, `Médico` and `MEDICO` all name the same group.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == 'é' { 'e' } else { c })
            .collect();
        match folded.as_str() {
            "administrador" => Ok(Group::Administrador),
            "medico" => Ok(Group::Medico),
            "matrona" => Ok(Group::Matrona),
            "tens" => Ok(Group::Tens),
            _ => Err(UnknownGroup(s.to_owned())),
        }
    }
}

/// The single role shown to a user after login, resolved in fixed priority
/// order: superuser, then Administrador, Médico, Matrona, TENS. First match
/// wins; membership in several groups never produces more than one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRole {
    SuperAdministrador,
    Administrador,
    Medico,
    Matrona,
    Tens,
    Unassigned,
}

impl DisplayRole {
    /// Resolves the display role from the identity's flags and memberships.
    /// Deterministic and side-effect free.
    pub fn resolve(superuser: bool, groups: &BTreeSet<Group>) -> Self {
        if superuser {
            return DisplayRole::SuperAdministrador;
        }
        if groups.contains(&Group::Administrador) {
            return DisplayRole::Administrador;
        }
        if groups.contains(&Group::Medico) {
            return DisplayRole::Medico;
        }
        if groups.contains(&Group::Matrona) {
            return DisplayRole::Matrona;
        }
        if groups.contains(&Group::Tens) {
            return DisplayRole::Tens;
        }
        DisplayRole::Unassigned
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DisplayRole::SuperAdministrador => "Super Administrador",
            DisplayRole::Administrador => "Administrador",
            DisplayRole::Medico => "Médico",
            DisplayRole::Matrona => "Matrona",
            DisplayRole::Tens => "TENS",
            DisplayRole::Unassigned => "Sin rol asignado",
        }
    }

    /// The dashboard a freshly logged-in user of this role is pointed at.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            DisplayRole::SuperAdministrador | DisplayRole::Administrador => "/dashboard/admin",
            DisplayRole::Medico => "/dashboard/medico",
            DisplayRole::Matrona => "/dashboard/matrona",
            DisplayRole::Tens => "/dashboard/tens",
            DisplayRole::Unassigned => "/",
        }
    }
}

impl fmt::Display for DisplayRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(list: &[Group]) -> BTreeSet<Group> {
        list.iter().copied().collect()
    }

    #[test]
    fn superuser_outranks_every_group() {
        let all = groups(&Group::ALL);
        assert_eq!(
            DisplayRole::resolve(true, &all),
            DisplayRole::SuperAdministrador
        );
    }

    #[test]
    fn priority_order_is_fixed() {
        let medica_y_matrona = groups(&[Group::Matrona, Group::Medico]);
        assert_eq!(
            DisplayRole::resolve(false, &medica_y_matrona),
            DisplayRole::Medico
        );

        let admin_y_tens = groups(&[Group::Tens, Group::Administrador]);
        assert_eq!(
            DisplayRole::resolve(false, &admin_y_tens),
            DisplayRole::Administrador
        );
    }

    #[test]
    fn no_membership_resolves_to_unassigned() {
        let none = BTreeSet::new();
        assert_eq!(DisplayRole::resolve(false, &none), DisplayRole::Unassigned);
        assert_eq!(DisplayRole::resolve(false, &none).dashboard_path(), "/");
    }

    #[test]
    fn resolution_is_deterministic() {
        let memberships = groups(&[Group::Medico, Group::Tens]);
        let first = DisplayRole::resolve(false, &memberships);
        for _ in 0..10 {
            assert_eq!(DisplayRole::resolve(false, &memberships), first);
        }
    }

    #[test]
    fn group_parse_accepts_accents_and_case() {
        assert_eq!("Médico".parse::<Group>().unwrap(), Group::Medico);
        assert_eq!("medico".parse::<Group>().unwrap(), Group::Medico);
        assert_eq!("TENS".parse::<Group>().unwrap(), Group::Tens);
        assert!("enfermera".parse::<Group>().is_err());
    }

    #[test]
    fn administrador_holds_every_verb() {
        let codenames = Group::Administrador.permission_codenames();
        assert_eq!(codenames.len(), 4 * MANAGED_RESOURCES.len());
        assert!(codenames.contains(&"delete_usuario".to_string()));
    }

    #[test]
    fn tens_cannot_change_or_delete() {
        let codenames = Group::Tens.permission_codenames();
        assert!(codenames.contains(&"add_administracionmedicamento".to_string()));
        assert!(!codenames.iter().any(|c| c.starts_with("change_")));
        assert!(!codenames.iter().any(|c| c.starts_with("delete_")));
    }
}
