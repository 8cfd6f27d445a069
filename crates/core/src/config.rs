//! Compile options.

use serde::{Deserialize, Serialize};

fn default_max_branches() -> usize {
    4096
}

/// Tunables for [`compile_with`](crate::compile::compile_with).
///
/// Deserializes from a partial document; absent fields take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Upper bound on validation branches. Enumeration stops there and
    /// reports `E_BRANCH_LIMIT`.
    #[serde(default = "default_max_branches")]
    pub max_branches: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_branches: default_max_branches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let opts: CompileOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CompileOptions::default());
        assert_eq!(opts.max_branches, 4096);
    }

    #[test]
    fn explicit_limit_is_kept() {
        let opts: CompileOptions = serde_json::from_str(r#"{"max_branches": 8}"#).unwrap();
        assert_eq!(opts.max_branches, 8);
    }
}
