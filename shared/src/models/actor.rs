//! Actor Model (who is asking)

use serde::{Deserialize, Serialize};

/// Portal roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Supplier,
}

/// Authenticated caller. Employees and suppliers carry their own directory id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Actor {
    Admin,
    Employee(i64),
    Supplier(i64),
}

impl Actor {
    pub fn role(&self) -> Role {
        match self {
            Actor::Admin => Role::Admin,
            Actor::Employee(_) => Role::Employee,
            Actor::Supplier(_) => Role::Supplier,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_serde() {
        let json = serde_json::to_string(&Actor::Supplier(9)).unwrap();
        assert_eq!(json, r#"{"role":"supplier","id":9}"#);

        let actor: Actor = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(actor, Actor::Admin);
        assert_eq!(actor.role(), Role::Admin);
    }
}
