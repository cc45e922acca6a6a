// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "finance_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub finance_id: i32,
    pub current_price: f64,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::finance::Entity",
        from = "Column::FinanceId",
        to = "super::finance::Column::Id",
        on_delete = "Cascade"
    )]
    Finance,
}

impl Related<super::finance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Finance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
