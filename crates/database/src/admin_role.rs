//! Administrator applications, approvals and the super-admin role.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{AdminRole, AdminRoleWithName, VerificationStatus};
use crate::new_id;
use crate::validation::{require_text, MAX_SHORT_TEXT};

/// Organization recorded for an automatically provisioned super admin.
pub const SUPER_ADMIN_ORGANIZATION: &str = "MangroveWatch HQ";

/// Organization type recorded for an automatically provisioned super admin.
pub const SUPER_ADMIN_ORGANIZATION_TYPE: &str = "government";

/// File a pending admin application for a user.
pub async fn create_application<'e, E>(
    executor: E,
    user_id: &str,
    organization_name: &str,
    organization_type: &str,
) -> Result<AdminRole>
where
    E: SqliteExecutor<'e>,
{
    let organization_name = require_text("organization_name", organization_name, MAX_SHORT_TEXT)?;
    let organization_type = require_text("organization_type", organization_type, MAX_SHORT_TEXT)?;

    sqlx::query_as::<_, AdminRole>(
        r#"
        INSERT INTO admin_roles (id, user_id, organization_name, organization_type,
                                 verification_status, is_super_admin)
        VALUES (?, ?, ?, ?, ?, 0)
        RETURNING id, user_id, organization_name, organization_type, verification_status,
                  is_super_admin, approved_at, approved_by, created_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(organization_name)
    .bind(organization_type)
    .bind(VerificationStatus::Pending)
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "AdminRole", user_id))
}

/// Get a user's admin role regardless of verification state.
pub async fn get_role(pool: &SqlitePool, user_id: &str) -> Result<Option<AdminRole>> {
    let role = sqlx::query_as::<_, AdminRole>(
        r#"
        SELECT id, user_id, organization_name, organization_type, verification_status,
               is_super_admin, approved_at, approved_by, created_at
        FROM admin_roles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

/// Get an admin role by its own ID.
pub async fn get_role_by_id(pool: &SqlitePool, id: &str) -> Result<AdminRole> {
    sqlx::query_as::<_, AdminRole>(
        r#"
        SELECT id, user_id, organization_name, organization_type, verification_status,
               is_super_admin, approved_at, approved_by, created_at
        FROM admin_roles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "AdminRole",
        id: id.to_string(),
    })
}

/// Get a user's role only if it has been approved.
pub async fn get_approved_role(pool: &SqlitePool, user_id: &str) -> Result<Option<AdminRole>> {
    Ok(get_role(pool, user_id)
        .await?
        .filter(|role| role.verification_status == VerificationStatus::Approved))
}

/// Whether the user holds an approved super-admin role.
pub async fn is_super_admin(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    Ok(get_approved_role(pool, user_id)
        .await?
        .map(|role| role.is_super_admin)
        .unwrap_or(false))
}

/// Whether `email` matches the configured super-admin address.
pub fn is_super_admin_email(email: &str, configured: Option<&str>) -> bool {
    match configured.map(str::trim) {
        Some(configured) if !configured.is_empty() => email.trim().eq_ignore_ascii_case(configured),
        _ => false,
    }
}

/// All roles with the holder's display name, newest first.
pub async fn list_roles_with_names(pool: &SqlitePool) -> Result<Vec<AdminRoleWithName>> {
    let roles = sqlx::query_as::<_, AdminRoleWithName>(
        r#"
        SELECT a.id, a.user_id, a.organization_name, a.organization_type,
               a.verification_status, a.is_super_admin, a.approved_at, a.approved_by,
               a.created_at, p.display_name
        FROM admin_roles a
        LEFT JOIN profiles p ON p.user_id = a.user_id
        ORDER BY a.created_at DESC, a.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Approve or reject an application.
///
/// Approval records the approver and time; rejection clears them.
pub async fn set_verification_status(
    pool: &SqlitePool,
    role_id: &str,
    status: VerificationStatus,
    approver_id: &str,
) -> Result<AdminRole> {
    let approved = status == VerificationStatus::Approved;

    let role = sqlx::query_as::<_, AdminRole>(
        r#"
        UPDATE admin_roles
        SET verification_status = ?,
            approved_at = CASE WHEN ? THEN datetime('now') ELSE NULL END,
            approved_by = CASE WHEN ? THEN ? ELSE NULL END
        WHERE id = ?
        RETURNING id, user_id, organization_name, organization_type, verification_status,
                  is_super_admin, approved_at, approved_by, created_at
        "#,
    )
    .bind(status)
    .bind(approved)
    .bind(approved)
    .bind(approver_id)
    .bind(role_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "AdminRole",
        id: role_id.to_string(),
    })?;

    tracing::info!(
        "Admin role {} for {} set to {:?} by {}",
        role.id,
        role.user_id,
        role.verification_status,
        approver_id
    );
    Ok(role)
}

/// Create or upgrade a user's role to an approved super admin.
pub async fn ensure_super_admin(pool: &SqlitePool, user_id: &str) -> Result<AdminRole> {
    let role = sqlx::query_as::<_, AdminRole>(
        r#"
        INSERT INTO admin_roles (id, user_id, organization_name, organization_type,
                                 verification_status, is_super_admin, approved_at, approved_by)
        VALUES (?, ?, ?, ?, ?, 1, datetime('now'), ?)
        ON CONFLICT(user_id) DO UPDATE SET
            verification_status = excluded.verification_status,
            is_super_admin = 1,
            approved_at = COALESCE(admin_roles.approved_at, excluded.approved_at)
        RETURNING id, user_id, organization_name, organization_type, verification_status,
                  is_super_admin, approved_at, approved_by, created_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(SUPER_ADMIN_ORGANIZATION)
    .bind(SUPER_ADMIN_ORGANIZATION_TYPE)
    .bind(VerificationStatus::Approved)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "AdminRole", user_id))?;

    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_db};

    #[test]
    fn test_is_super_admin_email() {
        assert!(is_super_admin_email("Root@Example.org", Some("root@example.org")));
        assert!(!is_super_admin_email("other@example.org", Some("root@example.org")));
        assert!(!is_super_admin_email("root@example.org", None));
        assert!(!is_super_admin_email("", Some("")));
    }

    #[tokio::test]
    async fn test_application_approval_flow() {
        let db = test_db().await;
        let root = seed_user(&db, "root@example.org", "Root").await;
        let applicant = seed_user(&db, "ngo@example.org", "Reef Trust").await;

        let role = create_application(db.pool(), &applicant, "Reef Trust", "ngo")
            .await
            .unwrap();
        assert_eq!(role.verification_status, VerificationStatus::Pending);
        assert!(get_approved_role(db.pool(), &applicant).await.unwrap().is_none());

        let approved = set_verification_status(db.pool(), &role.id, VerificationStatus::Approved, &root)
            .await
            .unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some(root.as_str()));
        assert!(approved.approved_at.is_some());
        assert!(get_approved_role(db.pool(), &applicant).await.unwrap().is_some());
        assert!(!is_super_admin(db.pool(), &applicant).await.unwrap());

        let rejected = set_verification_status(db.pool(), &role.id, VerificationStatus::Rejected, &root)
            .await
            .unwrap();
        assert!(rejected.approved_at.is_none());
        assert!(rejected.approved_by.is_none());

        let listed = list_roles_with_names(db.pool()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].display_name.as_deref(), Some("Reef Trust"));
    }

    #[tokio::test]
    async fn test_duplicate_application_rejected() {
        let db = test_db().await;
        let user_id = seed_user(&db, "dup@example.org", "Dup").await;
        create_application(db.pool(), &user_id, "Org", "ngo").await.unwrap();
        let again = create_application(db.pool(), &user_id, "Org", "ngo").await;
        assert!(matches!(again, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_ensure_super_admin_creates_and_upgrades() {
        let db = test_db().await;
        let fresh = seed_user(&db, "fresh@example.org", "Fresh").await;
        let role = ensure_super_admin(db.pool(), &fresh).await.unwrap();
        assert!(role.is_super_admin);
        assert_eq!(role.organization_name, SUPER_ADMIN_ORGANIZATION);

        let existing = seed_user(&db, "old@example.org", "Old").await;
        create_application(db.pool(), &existing, "Coastal Lab", "research")
            .await
            .unwrap();
        let upgraded = ensure_super_admin(db.pool(), &existing).await.unwrap();
        assert!(upgraded.is_super_admin);
        assert_eq!(upgraded.verification_status, VerificationStatus::Approved);
        assert_eq!(upgraded.organization_name, "Coastal Lab");
        assert!(is_super_admin(db.pool(), &existing).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_status_unknown_role() {
        let db = test_db().await;
        let result =
            set_verification_status(db.pool(), "missing", VerificationStatus::Approved, "x").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
