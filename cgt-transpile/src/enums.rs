//! Enumerator value resolution
//!
//! C gives each unspecified enumerator the previous value plus one, with
//! explicit initializers overriding the sequence. The values are fixed the
//! moment the enum declaration is translated and never change afterwards,
//! so case labels and constant folding can consult this table freely.

use cgt_ast::Enumerator;
use std::collections::HashMap;

/// A resolved enumerator
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub value: i64,
    /// Name of the owning enum, if it has one
    pub owner: Option<String>,
}

/// All enumerators visible in one translation unit
#[derive(Debug, Default)]
pub struct EnumSpace {
    entries: HashMap<String, EnumEntry>,
}

impl EnumSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one enum declaration, applying the increment rule.
    ///
    /// Returns the resolved (name, value) pairs in declaration order, which
    /// the caller turns into a Go const group.
    pub fn add_enum(
        &mut self,
        owner: Option<&str>,
        enumerators: &[Enumerator],
    ) -> Vec<(String, i64)> {
        let mut next = 0i64;
        let mut resolved = Vec::with_capacity(enumerators.len());

        for e in enumerators {
            let value = e.value.unwrap_or(next);
            next = value.wrapping_add(1);
            resolved.push((e.name.clone(), value));
            self.entries.insert(
                e.name.clone(),
                EnumEntry {
                    value,
                    owner: owner.map(str::to_string),
                },
            );
        }

        resolved
    }

    pub fn lookup(&self, name: &str) -> Option<&EnumEntry> {
        self.entries.get(name)
    }
}
