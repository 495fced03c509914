use crate::db::{Database, DbError};
use crate::users::repo_types::User;

impl User {
    /// Find a user by id. Absence is `Ok(None)`.
    pub async fn find_by_id(db: &Database, user_id: i64) -> Result<Option<User>, DbError> {
        let pool = db.handle()?;
        db.run(
            sqlx::query_as::<_, User>(
                r#"
                SELECT user_id, username, display_name, bio, pfp_link, password_hash
                FROM users
                WHERE user_id = ?
                "#,
            )
            .bind(user_id)
            .fetch_optional(&pool),
        )
        .await
    }

    /// Find a user by login name. Absence is `Ok(None)`.
    pub async fn find_by_username(db: &Database, username: &str) -> Result<Option<User>, DbError> {
        let pool = db.handle()?;
        db.run(
            sqlx::query_as::<_, User>(
                r#"
                SELECT user_id, username, display_name, bio, pfp_link, password_hash
                FROM users
                WHERE username = ?
                "#,
            )
            .bind(username)
            .fetch_optional(&pool),
        )
        .await
    }

    /// Overwrite the mutable profile fields. Unknown ids are a silent no-op.
    pub async fn update_profile(
        db: &Database,
        user_id: i64,
        display_name: &str,
        bio: Option<&str>,
    ) -> Result<(), DbError> {
        let pool = db.handle()?;
        db.run(
            sqlx::query("UPDATE users SET display_name = ?, bio = ? WHERE user_id = ?")
                .bind(display_name)
                .bind(bio)
                .bind(user_id)
                .execute(&pool),
        )
        .await?;
        Ok(())
    }

    /// Create a new user with an already hashed password.
    pub async fn create(
        db: &Database,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let pool = db.handle()?;
        db.run(
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (username, display_name, password_hash)
                VALUES (?, ?, ?)
                RETURNING user_id, username, display_name, bio, pfp_link, password_hash
                "#,
            )
            .bind(username)
            .bind(display_name)
            .bind(password_hash)
            .fetch_one(&pool),
        )
        .await
    }
}
