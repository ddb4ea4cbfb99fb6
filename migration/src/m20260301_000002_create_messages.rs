use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::MessageId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Messages::ConversationId).text().not_null())
                    .col(ColumnDef::new(Messages::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(Messages::ToUserId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Text).text().not_null())
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Messages::DeliveredAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Messages::ReadAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Messages::Edited).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Messages::DeletedForAll)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_from_user")
                            .from(Messages::Table, Messages::FromUserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_to_user")
                            .from(Messages::Table, Messages::ToUserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        // History reads and unread counts are always per conversation,
        // ordered by creation time.
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_conversation_created")
                    .table(Messages::Table)
                    .col(Messages::ConversationId)
                    .col(Messages::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    MessageId,
    ConversationId,
    FromUserId,
    ToUserId,
    Text,
    CreatedAt,
    DeliveredAt,
    ReadAt,
    Edited,
    DeletedForAll,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
