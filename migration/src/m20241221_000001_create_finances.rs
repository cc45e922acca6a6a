// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 创建金融标的表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Finances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Finances::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Finances::Symbol)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Finances::IsTracking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Finances::LastClosingPrice).double())
                    .col(ColumnDef::new(Finances::DailyChangeValue).double())
                    .col(ColumnDef::new(Finances::DailyChangePercentage).double())
                    .col(
                        ColumnDef::new(Finances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Finances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Crawl runs only read tracked rows
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_finances_is_tracking")
                    .table(Finances::Table)
                    .col(Finances::IsTracking)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Finances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Finances {
    Table,
    Id,
    Symbol,
    IsTracking,
    LastClosingPrice,
    DailyChangeValue,
    DailyChangePercentage,
    CreatedAt,
    UpdatedAt,
}
