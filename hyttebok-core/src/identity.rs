//! Session identity, supplied by the profile collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The current user's identity, consumed only when bookings are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable opaque id, minted once per profile.
    pub id: String,
    pub display_name: String,
    /// Preferred calendar color, e.g. "#f59e0b".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Identity {
    /// Mint a fresh identity with a random id.
    pub fn generate(display_name: impl Into<String>, color: Option<String>) -> Self {
        Identity {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Identity::generate("Kari", None);
        let b = Identity::generate("Kari", None);
        assert_ne!(a.id, b.id);
    }
}
