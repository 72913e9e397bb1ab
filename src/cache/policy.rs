//! Chat migration collision policies.

/// What happens to records already stored under the destination chat when a
/// chat is migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigratePolicy {
    /// Delete everything under the new chat first; the old chat's records win.
    ReplaceTarget,
    /// Keep the new chat's rows and add the old chat's rows (set union).
    Union,
    /// Re-write the old rows verbatim; a clashing key takes the migrated row.
    Reinsert,
    /// Move counters as they are, replacing a counter with the same key.
    Carry,
}

impl MigratePolicy {
    /// Whether the destination chat is cleared before records are moved.
    pub fn clears_target(self) -> bool {
        matches!(self, Self::ReplaceTarget)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReplaceTarget => "replace-target",
            Self::Union => "union",
            Self::Reinsert => "reinsert",
            Self::Carry => "carry",
        }
    }
}

impl std::fmt::Display for MigratePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_replace_target_clears() {
        assert!(MigratePolicy::ReplaceTarget.clears_target());
        assert!(!MigratePolicy::Union.clears_target());
        assert!(!MigratePolicy::Reinsert.clears_target());
        assert!(!MigratePolicy::Carry.clears_target());
        assert_eq!(MigratePolicy::Carry.to_string(), "carry");
    }
}
