use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Schema, Statement};

use super::entities::{alert_subscriptions, price_samples};

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    for statement in schema_statements(db.get_database_backend()) {
        db.execute(statement).await?;
    }
    Ok(())
}

/// Idempotent DDL for both tables and their indexes
pub fn schema_statements(backend: DbBackend) -> Vec<Statement> {
    let schema = Schema::new(backend);

    let mut price_samples_stmt = schema.create_table_from_entity(price_samples::Entity);
    price_samples_stmt.if_not_exists();

    let mut alert_subscriptions_stmt = schema.create_table_from_entity(alert_subscriptions::Entity);
    alert_subscriptions_stmt.if_not_exists();

    let price_lookup_idx = r#"
        CREATE INDEX IF NOT EXISTS idx_price_samples_chain_time
        ON price_samples (chain, observed_at);
    "#;
    // the natural key of a subscription, upserts conflict on it
    let alert_key_idx = r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_alert_subscriptions_chain_email
        ON alert_subscriptions (chain, email);
    "#;

    vec![
        backend.build(&price_samples_stmt),
        backend.build(&alert_subscriptions_stmt),
        Statement::from_string(backend, price_lookup_idx.to_string()),
        Statement::from_string(backend, alert_key_idx.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_tables_and_unique_alert_key() {
        let statements = schema_statements(DbBackend::Postgres);
        let sql: Vec<&str> = statements.iter().map(|s| s.sql.as_str()).collect();

        assert_eq!(sql.len(), 4);
        assert!(sql[0].contains(r#"CREATE TABLE IF NOT EXISTS "price_samples""#));
        assert!(sql[1].contains(r#"CREATE TABLE IF NOT EXISTS "alert_subscriptions""#));
        assert!(sql[3].contains("UNIQUE INDEX"));
        assert!(sql[3].contains("(chain, email)"));
    }
}
