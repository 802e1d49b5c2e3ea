//! Shared API Types for the online-judge client
//!
//! This crate is the single source of truth for types crossing the search
//! boundary between the judge server and the resolver inputs.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  Judge Server    │  JSON   │  Resolver Input  │
//! │  (REST)          │ ◄─────► │  (egui / WASM)   │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Entity ids are integers or strings, serialized untagged
//! 2. Category names are plain snake_case strings on the wire

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ENTITIES
// ============================================================================

/// Stable identifier of an entity, unique within its category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric id (users, groups, problems)
    Int(i64),
    /// String id (scopes, problem slugs)
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Int(id)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        EntityId::Int(id.into())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Str(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Str(id)
    }
}

/// An opaque reference returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity id
    pub id: EntityId,
    /// Discriminator (e.g. "user", "group", "scope", "scope_user")
    /// `None` means uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Human-readable display string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            category: None,
            label: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Text shown for this entity: the label, or the id when unlabeled
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.id.to_string(),
        }
    }
}

// ============================================================================
// ACCOUNT KINDS
// ============================================================================

/// Categories an account input can search over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    Group,
    Scope,
    ScopeUser,
}

impl AccountKind {
    pub const ALL: [AccountKind; 4] = [
        AccountKind::User,
        AccountKind::Group,
        AccountKind::Scope,
        AccountKind::ScopeUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Group => "group",
            AccountKind::Scope => "scope",
            AccountKind::ScopeUser => "scope_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(AccountKind::User),
            "group" => Some(AccountKind::Group),
            "scope" => Some(AccountKind::Scope),
            "scope_user" => Some(AccountKind::ScopeUser),
            _ => None,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category used by problem inputs
pub const PROBLEM_CATEGORY: &str = "problem";

// ============================================================================
// SEARCH API
// ============================================================================

/// Query string of `GET /api/search`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntitiesQuery {
    /// Category filter, absent for "any"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Free-text query, absent for "everything"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entity_id_untagged() {
        let numeric: Entity = serde_json::from_str(r#"{"id": 7, "label": "admin"}"#).unwrap();
        assert_eq!(numeric.id, EntityId::Int(7));

        let textual: Entity =
            serde_json::from_str(r#"{"id": "sc-1", "category": "scope"}"#).unwrap();
        assert_eq!(textual.id, EntityId::Str("sc-1".to_string()));
        assert_eq!(textual.category.as_deref(), Some("scope"));
        assert_eq!(textual.label, None);
    }

    #[test]
    fn test_display_label_falls_back_to_id() {
        assert_eq!(Entity::new(42).display_label(), "42");
        assert_eq!(Entity::new("abc").display_label(), "abc");
        assert_eq!(Entity::new(1).with_label("Admin").display_label(), "Admin");
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let json = serde_json::to_string(&Entity::new(3)).unwrap();
        assert_eq!(json, r#"{"id":3}"#);

        let query = SearchEntitiesQuery {
            kind: None,
            q: Some("adm".to_string()),
        };
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"{"q":"adm"}"#);
    }

    #[test]
    fn test_account_kind_names() {
        for kind in AccountKind::ALL {
            assert_eq!(AccountKind::parse(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(AccountKind::parse("team"), None);
    }
}
