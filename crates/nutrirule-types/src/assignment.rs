//! User condition assignments.
//!
//! [`UserConditions`] associates one user with the conditions they have.
//! While at least one condition is assigned, exactly one is primary; every
//! mutator preserves that invariant before returning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::{AssignmentError, ConditionCode, Severity, UserId};

/// One condition assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionAssignment {
    /// The assigned condition.
    pub code: ConditionCode,
    /// Whether this is the user's primary condition.
    pub is_primary: bool,
    /// Clinical severity (metadata only).
    pub severity: Severity,
    /// Diagnosis date in YYYYMMDD format (metadata only).
    pub diagnosed_on: Option<u32>,
}

/// The set of conditions assigned to one user.
///
/// # Examples
///
/// ```
/// use nutrirule_types::{ConditionCode, Severity, UserConditions, UserId};
///
/// let diabetes = ConditionCode::new("diabetes").unwrap();
/// let gout = ConditionCode::new("gout").unwrap();
///
/// let mut conditions = UserConditions::new(UserId::new("u-42"));
/// conditions.assign(diabetes.clone(), Severity::Moderate, Some(20230115)).unwrap();
/// conditions.assign(gout.clone(), Severity::Mild, None).unwrap();
///
/// // The first assignment becomes primary.
/// assert_eq!(conditions.primary(), Some(&diabetes));
///
/// conditions.set_primary(&gout).unwrap();
/// assert_eq!(conditions.primary(), Some(&gout));
/// assert_eq!(conditions.iter().filter(|a| a.is_primary).count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UserConditions {
    user: UserId,
    assignments: Vec<ConditionAssignment>,
}

impl UserConditions {
    /// Creates an empty assignment set for a user.
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            assignments: Vec::new(),
        }
    }

    /// Returns the user this set belongs to.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Assigns a condition. The first condition assigned becomes primary.
    ///
    /// # Errors
    /// Returns [`AssignmentError::AlreadyAssigned`] if the condition is
    /// already assigned.
    pub fn assign(
        &mut self,
        code: ConditionCode,
        severity: Severity,
        diagnosed_on: Option<u32>,
    ) -> Result<(), AssignmentError> {
        if self.contains(&code) {
            return Err(AssignmentError::AlreadyAssigned(code.to_string()));
        }
        let is_primary = self.assignments.is_empty();
        self.assignments.push(ConditionAssignment {
            code,
            is_primary,
            severity,
            diagnosed_on,
        });
        Ok(())
    }

    /// Makes `code` the primary condition, clearing any previous primary.
    ///
    /// # Errors
    /// Returns [`AssignmentError::NotAssigned`] if the condition is not
    /// assigned; the current primary is left untouched in that case.
    pub fn set_primary(&mut self, code: &ConditionCode) -> Result<(), AssignmentError> {
        if !self.contains(code) {
            return Err(AssignmentError::NotAssigned(code.to_string()));
        }
        for assignment in &mut self.assignments {
            assignment.is_primary = &assignment.code == code;
        }
        Ok(())
    }

    /// Removes a condition.
    ///
    /// If the primary is removed, the earliest remaining assignment is
    /// promoted.
    ///
    /// # Errors
    /// Returns [`AssignmentError::NotAssigned`] if the condition is not
    /// assigned.
    pub fn remove(&mut self, code: &ConditionCode) -> Result<ConditionAssignment, AssignmentError> {
        let index = self
            .assignments
            .iter()
            .position(|a| &a.code == code)
            .ok_or_else(|| AssignmentError::NotAssigned(code.to_string()))?;
        let removed = self.assignments.remove(index);
        if removed.is_primary {
            if let Some(first) = self.assignments.first_mut() {
                first.is_primary = true;
            }
        }
        Ok(removed)
    }

    /// Returns the primary condition, or `None` if nothing is assigned.
    pub fn primary(&self) -> Option<&ConditionCode> {
        self.assignments
            .iter()
            .find(|a| a.is_primary)
            .map(|a| &a.code)
    }

    /// Returns true if the condition is assigned.
    pub fn contains(&self, code: &ConditionCode) -> bool {
        self.assignments.iter().any(|a| &a.code == code)
    }

    /// Returns the assigned condition codes in assignment order.
    pub fn codes(&self) -> impl Iterator<Item = &ConditionCode> + '_ {
        self.assignments.iter().map(|a| &a.code)
    }

    /// Iterates over the assignments in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionAssignment> + '_ {
        self.assignments.iter()
    }

    /// Returns the number of assigned conditions.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns true if no condition is assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns an order-independent fingerprint of the assigned codes.
    pub fn fingerprint(&self) -> u64 {
        let mut codes: Vec<&ConditionCode> = self.codes().collect();
        codes.sort();
        let mut hasher = DefaultHasher::new();
        codes.hash(&mut hasher);
        hasher.finish()
    }
}
