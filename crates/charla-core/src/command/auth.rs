//! Authorization for gated commands.
//!
//! An explicit capability check invoked at the top of each gated handler.
//! With no administrators configured the gate is open -- this is a
//! small-group tool and the default config ships an empty list.

/// Checks user ids against the configured administrator list.
#[derive(Debug, Clone)]
pub struct Authorizer {
    admin_ids: Vec<i64>,
}

impl Authorizer {
    pub fn new(admin_ids: Vec<i64>) -> Self {
        Self { admin_ids }
    }

    /// `true` if the user may run gated commands.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}
