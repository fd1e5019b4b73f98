//! User repository
//!
//! - exists: single EXISTS query
//! - create: INSERT with ON CONFLICT DO NOTHING; no row back means the
//!   name was taken

use sqlx::{FromRow, PgPool};

use crate::models::UserName;
use super::DbError;

/// User record from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, name: &UserName) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM public.users WHERE name = $1)",
        )
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a user. Fails with `Conflict` if the name is taken.
    pub async fn create(&self, name: &UserName) -> Result<User, DbError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            INSERT INTO public.users (name) VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(self.pool)
        .await?;

        user.ok_or_else(|| DbError::Conflict {
            resource: "user",
            id: name.as_str().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations, DbConfig};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_exists_then_conflict() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = DbConfig {
            url: Some(url),
            ..DbConfig::default()
        };
        let pool = create_pool(&config).await.expect("pool creation failed");
        migrations::users(&pool).await.expect("migration failed");

        let repo = UserRepo::new(&pool);
        let name = UserName::new(&format!("user-{}", std::process::id())).unwrap();

        assert!(!repo.exists(&name).await.unwrap());
        let user = repo.create(&name).await.unwrap();
        assert_eq!(user.name, name.as_str());
        assert!(repo.exists(&name).await.unwrap());

        let err = repo.create(&name).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));
    }
}
