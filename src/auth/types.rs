use serde::{Deserialize, Serialize};

/// JWT claims identifying the caller and what it may do
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActorClaims {
    pub actor_id: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// The authenticated caller, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub actor_id: String,
    pub capabilities: Vec<String>,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            capabilities,
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

impl From<ActorClaims> for ActorContext {
    fn from(claims: ActorClaims) -> Self {
        Self {
            actor_id: claims.actor_id,
            capabilities: claims.capabilities,
        }
    }
}
