use super::types::Database;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Bit flags stored in `roles.permissions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission(i64);

impl Permission {
    pub const VIEW: Permission = Permission(1);
    pub const PUBLISH: Permission = Permission(2);
    pub const ADMIN: Permission = Permission(4);

    pub const fn bits(self) -> i64 {
        self.0
    }

    pub const fn union(self, other: Permission) -> Permission {
        Permission(self.0 | other.0)
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Built-in roles as `(name, permissions, is_default)`.
pub const BUILTIN_ROLES: &[(&str, Permission, bool)] = &[
    ("User", Permission::VIEW, true),
    ("Publisher", Permission::VIEW.union(Permission::PUBLISH), false),
    (
        "Administrator",
        Permission::VIEW
            .union(Permission::PUBLISH)
            .union(Permission::ADMIN),
        false,
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub is_default: bool,
    pub permissions: i64,
    pub created: String,
    pub updated: Option<String>,
}

impl Role {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions & permission.bits() == permission.bits()
    }
}

impl Database {
    /// Creates the built-in roles, or resets their permissions if they already exist.
    pub async fn insert_roles(&self) -> Result<()> {
        for &(name, permissions, is_default) in BUILTIN_ROLES {
            sqlx::query(
                "INSERT INTO roles (name, is_default, permissions) VALUES (?, ?, ?)
                 ON CONFLICT(name) DO UPDATE SET
                    is_default = excluded.is_default,
                    permissions = excluded.permissions,
                    updated = CURRENT_TIMESTAMP",
            )
            .bind(name)
            .bind(is_default)
            .bind(permissions.bits())
            .execute(&self.pool)
            .await?;
        }
        tracing::debug!("Built-in roles up to date ({} roles)", BUILTIN_ROLES.len());
        Ok(())
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, is_default, permissions, created, updated FROM roles WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn get_default_role(&self) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, is_default, permissions, created, updated FROM roles WHERE is_default = 1 ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    /// Whether the user's role grants `permission`. Unknown users and users
    /// without a role have no permissions.
    pub async fn user_can(&self, user_id: i64, permission: Permission) -> Result<bool> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name, r.is_default, r.permissions, r.created, r.updated
             FROM roles r JOIN users u ON u.role_id = r.id
             WHERE u.id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.is_some_and(|role| role.has_permission(permission)))
    }

    pub async fn set_user_role(&self, user_id: i64, role_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET role_id = ?, updated = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(role_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
