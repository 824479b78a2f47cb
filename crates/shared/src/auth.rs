//! Authentication types: JWT claims, roles, and the caller context.
//!
//! The core crates never look at ambient session state; every operation
//! receives an explicit [`CallerContext`] resolved from the token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// User role determining branch visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Full access across all branches.
    SuperAdmin,
    /// Administers a single branch.
    BranchAdmin,
    /// Staff member of a single branch.
    Staff,
}

impl Role {
    /// Returns true if the role may operate across branches.
    #[must_use]
    pub const fn is_super_admin(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super-admin"),
            Self::BranchAdmin => write!(f, "branch-admin"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role.
    pub role: Role,
    /// Home branch (absent for super-admins).
    pub branch: Option<Uuid>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        role: Role,
        branch_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            branch: branch_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Resolved caller identity passed into every scoped operation.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext {
    /// The authenticated user.
    pub user_id: Uuid,
    /// The caller's role.
    pub role: Role,
    /// The caller's home branch (absent for super-admins).
    pub branch_id: Option<Uuid>,
}

impl CallerContext {
    /// Builds a caller context from validated claims.
    #[must_use]
    pub const fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            branch_id: claims.branch,
        }
    }

    /// Narrows a requested branch filter to what the caller may see.
    ///
    /// Super-admins may request any branch or none (all branches).
    /// Branch-admins and staff are pinned to their own branch; requesting
    /// another branch is rejected.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the caller requests a branch
    /// outside their scope, or `AppError::Unauthorized` if a scoped role
    /// carries no branch.
    pub fn scoped_branch(&self, requested: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
        if self.role.is_super_admin() {
            return Ok(requested);
        }
        let own = self.branch_id.ok_or_else(|| {
            AppError::Unauthorized("token is missing a branch for a branch-scoped role".into())
        })?;
        match requested {
            Some(branch) if branch != own => Err(AppError::Forbidden(
                "cannot access another branch's records".into(),
            )),
            _ => Ok(Some(own)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role, branch_id: Option<Uuid>) -> CallerContext {
        CallerContext {
            user_id: Uuid::new_v4(),
            role,
            branch_id,
        }
    }

    #[test]
    fn test_super_admin_sees_any_branch() {
        let ctx = caller(Role::SuperAdmin, None);
        let other = Uuid::new_v4();
        assert_eq!(ctx.scoped_branch(None).unwrap(), None);
        assert_eq!(ctx.scoped_branch(Some(other)).unwrap(), Some(other));
    }

    #[test]
    fn test_branch_admin_pinned_to_own_branch() {
        let own = Uuid::new_v4();
        let ctx = caller(Role::BranchAdmin, Some(own));
        assert_eq!(ctx.scoped_branch(None).unwrap(), Some(own));
        assert_eq!(ctx.scoped_branch(Some(own)).unwrap(), Some(own));
    }

    #[test]
    fn test_staff_rejected_for_other_branch() {
        let ctx = caller(Role::Staff, Some(Uuid::new_v4()));
        let result = ctx.scoped_branch(Some(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_scoped_role_without_branch_is_rejected() {
        let ctx = caller(Role::Staff, None);
        assert!(matches!(
            ctx.scoped_branch(None),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::SuperAdmin.to_string(), "super-admin");
        assert_eq!(Role::BranchAdmin.to_string(), "branch-admin");
        assert_eq!(Role::Staff.to_string(), "staff");
    }
}
