//! Complexity tiers for analyzed template structures
//!
//! The tier is purely informational: clients use it to pick an editing UI
//! (flat form vs. structured builder). It is derived from the structure
//! report alone and never influences rendering.

use serde::{Deserialize, Serialize};

use crate::structure::{StructureReport, CONTEXTUAL_VALUE};

/// Coarse complexity tier of a template's data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// No structure information available (empty report).
    Unknown,
    Simple,
    Medium,
    Complex,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Complexity::Unknown => write!(f, "unknown"),
            Complexity::Simple => write!(f, "simple"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

/// Classify a structure report into a complexity tier.
///
/// Rules apply in order, first match wins:
/// 1. `complex`: more than 20 variables, more than 5 arrays, any nested
///    array, or any primitive array (contextual-value binding).
/// 2. `medium`: more than 10 variables or more than 2 arrays.
/// 3. `simple` otherwise.
///
/// An empty report classifies as `unknown`, distinct from `simple`.
pub fn classify(report: &StructureReport) -> Complexity {
    if report.is_empty() {
        return Complexity::Unknown;
    }

    let variable_count = report.normal_variables.len() + report.conditional_variables.len();
    let has_nested_arrays = report
        .array_info
        .iter()
        .any(|descriptor| !descriptor.nested_arrays.is_empty());
    let has_primitive_arrays = report
        .array_info
        .iter()
        .any(|descriptor| descriptor.variables.as_slice() == [CONTEXTUAL_VALUE]);

    if variable_count > 20
        || report.array_info.len() > 5
        || has_nested_arrays
        || has_primitive_arrays
    {
        Complexity::Complex
    } else if variable_count > 10 || report.array_info.len() > 2 {
        Complexity::Medium
    } else {
        Complexity::Simple
    }
}
