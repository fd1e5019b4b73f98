//! Schema bootstrap
//!
//! Each service creates only the table it serves. Every statement is
//! idempotent, so bootstrap runs on every start. Tables left by earlier
//! deployments are widened in place to the column types read here.

use sqlx::PgPool;

/// Counter table: one row, fixed id, no other columns.
pub async fn counter(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running counter migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public.counter (
            id INTEGER PRIMARY KEY,
            value BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Tables created by earlier deployments hold `value INTEGER`
    sqlx::raw_sql(
        r#"
        DO $$
        BEGIN
            IF EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = 'public' AND table_name = 'counter'
                  AND column_name = 'value' AND data_type <> 'bigint'
            ) THEN
                ALTER TABLE public.counter ALTER COLUMN value TYPE BIGINT;
            END IF;
        END
        $$
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Quote table for the hello service.
pub async fn quotes(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running quote migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public.hello (
            id SERIAL PRIMARY KEY,
            message TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Earlier deployments stored each message as a one-element array
    sqlx::raw_sql(
        r#"
        DO $$
        BEGIN
            IF EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = 'public' AND table_name = 'hello'
                  AND column_name = 'message' AND data_type = 'ARRAY'
            ) THEN
                ALTER TABLE public.hello
                    ALTER COLUMN message TYPE TEXT USING array_to_string(message, ' ');
            END IF;
        END
        $$
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// User table for the query service.
pub async fn users(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running user migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public.users (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) UNIQUE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
