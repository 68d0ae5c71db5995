//! Role claim normalization
//!
//! The role claim arrives as either a single string or a list of strings.
//! It is turned into a [`RoleSet`] right after verification; unknown role
//! names are dropped.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Roles recognised by the loans service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Student,
    Staff,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "student" => Some(Role::Student),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Normalize a raw claim value
    pub fn from_claim(value: Option<&Value>) -> Self {
        let roles = match value {
            Some(Value::String(name)) => Role::from_name(name).into_iter().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(Role::from_name)
                .collect(),
            _ => BTreeSet::new(),
        };
        Self(roles)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True if at least one of `required` is held
    pub fn has_any(&self, required: &[Role]) -> bool {
        required.iter().any(|r| self.contains(*r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        write!(f, "[{}]", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_string_claim() {
        let roles = RoleSet::from_claim(Some(&json!("staff")));
        assert!(roles.contains(Role::Staff));
        assert!(!roles.contains(Role::Student));
    }

    #[test]
    fn test_list_claim() {
        let roles = RoleSet::from_claim(Some(&json!(["student", "staff", "librarian", 7])));
        assert!(roles.contains(Role::Student));
        assert!(roles.contains(Role::Staff));
        assert_eq!(roles.iter().count(), 2);
    }

    #[test]
    fn test_missing_or_odd_claim() {
        assert!(RoleSet::from_claim(None).is_empty());
        assert!(RoleSet::from_claim(Some(&json!(42))).is_empty());
        assert!(RoleSet::from_claim(Some(&json!({"role": "staff"}))).is_empty());
        assert!(RoleSet::from_claim(Some(&json!("Staff"))).is_empty());
    }

    #[test]
    fn test_has_any() {
        let roles: RoleSet = [Role::Student].into_iter().collect();
        assert!(roles.has_any(&[Role::Student, Role::Staff]));
        assert!(!roles.has_any(&[Role::Staff]));
        assert!(!roles.has_any(&[]));
        assert_eq!(roles.to_string(), "[student]");
    }
}
