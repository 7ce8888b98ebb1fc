use sea_orm::entity::prelude::*;

pub mod price_samples {
    use super::*;

    /// One observed USD price. Rows are only ever inserted.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "price_samples")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Normalised chain name, e.g. "ethereum".
        pub chain: String,
        pub price: Decimal,
        /// Stamped by the repository at insert time.
        pub observed_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod alert_subscriptions {
    use super::*;

    /// Target-price subscription; `(chain, email)` is unique.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "alert_subscriptions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub chain: String,
        pub email: String,
        pub target_price: Decimal,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
