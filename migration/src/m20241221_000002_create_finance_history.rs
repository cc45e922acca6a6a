// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use super::m20241221_000001_create_finances::Finances;

/// 创建价格历史表
///
/// 每次成功抓取写入一行，删除标的时级联删除
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FinanceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinanceHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinanceHistory::FinanceId).integer().not_null())
                    .col(ColumnDef::new(FinanceHistory::CurrentPrice).double().not_null())
                    .col(
                        ColumnDef::new(FinanceHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_finance_history_finance")
                            .from(FinanceHistory::Table, FinanceHistory::FinanceId)
                            .to(Finances::Table, Finances::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_finance_history_finance_created")
                    .table(FinanceHistory::Table)
                    .col(FinanceHistory::FinanceId)
                    .col(FinanceHistory::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinanceHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FinanceHistory {
    Table,
    Id,
    FinanceId,
    CurrentPrice,
    CreatedAt,
}
