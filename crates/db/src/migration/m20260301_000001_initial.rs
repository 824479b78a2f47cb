//! Initial schema migration.
//!
//! Creates the full schema:
//!
//! - `branches`, `suppliers`, `customers`, `products`: master records
//! - `branch_stock`: per-branch quantity for each product
//! - `stock_movements`: arrivals, dispatches, transfers, adjustments
//! - `supplier_dues`, `branch_dues`, `customer_dues`: the three due ledgers
//! - `due_payments`: individual payments against a due

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Branches {
    Table,
    Id,
    Name,
    Code,
    Address,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Suppliers {
    Table,
    Id,
    Name,
    Contact,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    Name,
    Contact,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Sku,
    Name,
    UnitPrice,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BranchStock {
    Table,
    Id,
    ProductId,
    BranchId,
    Quantity,
    UpdatedAt,
}

#[derive(Iden)]
enum StockMovements {
    Table,
    Id,
    MovementType,
    Status,
    ProductId,
    BranchId,
    ReferenceBranchId,
    SupplierId,
    Quantity,
    PreviousQuantity,
    UnitPrice,
    TotalAmount,
    PaidAmount,
    AutoUpdateProduct,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
enum SupplierDues {
    Table,
    Id,
    SupplierId,
}

#[derive(Iden, Clone, Copy)]
enum BranchDues {
    Table,
    Id,
    CounterpartyBranchId,
}

#[derive(Iden, Clone, Copy)]
enum CustomerDues {
    Table,
    Id,
    CustomerId,
}

#[derive(Iden)]
enum DuePayments {
    Table,
    Id,
    DueKind,
    DueId,
    BranchId,
    Amount,
    PaymentMethod,
    PaymentDate,
    ReferenceNumber,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Branches::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Branches::Name).string().not_null())
                    .col(ColumnDef::new(Branches::Code).string().not_null())
                    .col(ColumnDef::new(Branches::Address).string())
                    .col(
                        ColumnDef::new(Branches::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Branches::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Branches::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-branches-code-unique")
                    .table(Branches::Table)
                    .col(Branches::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Suppliers::Name).string().not_null())
                    .col(ColumnDef::new(Suppliers::Contact).string())
                    .col(
                        ColumnDef::new(Suppliers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Contact).string())
                    .col(
                        ColumnDef::new(Customers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Customers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Sku).string().not_null())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(
                        ColumnDef::new(Products::UnitPrice)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-sku-unique")
                    .table(Products::Table)
                    .col(Products::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BranchStock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BranchStock::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BranchStock::ProductId).uuid().not_null())
                    .col(ColumnDef::new(BranchStock::BranchId).uuid().not_null())
                    .col(
                        ColumnDef::new(BranchStock::Quantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BranchStock::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-branch_stock-product_id")
                            .from(BranchStock::Table, BranchStock::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-branch_stock-branch_id")
                            .from(BranchStock::Table, BranchStock::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-branch_stock-product-branch-unique")
                    .table(BranchStock::Table)
                    .col(BranchStock::ProductId)
                    .col(BranchStock::BranchId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::MovementType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Status).string().not_null())
                    .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::BranchId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::ReferenceBranchId).uuid())
                    .col(ColumnDef::new(StockMovements::SupplierId).uuid())
                    .col(
                        ColumnDef::new(StockMovements::Quantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::PreviousQuantity).decimal_len(16, 4))
                    .col(
                        ColumnDef::new(StockMovements::UnitPrice)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::TotalAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::PaidAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::AutoUpdateProduct)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Description).string())
                    .col(ColumnDef::new(StockMovements::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_movements-product_id")
                            .from(StockMovements::Table, StockMovements::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_movements-branch_id")
                            .from(StockMovements::Table, StockMovements::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_movements-supplier_id")
                            .from(StockMovements::Table, StockMovements::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_movements-branch-created")
                    .table(StockMovements::Table)
                    .col(StockMovements::BranchId)
                    .col(StockMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        create_due_table(
            manager,
            SupplierDues::Table,
            SupplierDues::Id,
            SupplierDues::SupplierId,
            Suppliers::Table,
            Suppliers::Id,
            "supplier_dues",
        )
        .await?;

        create_due_table(
            manager,
            BranchDues::Table,
            BranchDues::Id,
            BranchDues::CounterpartyBranchId,
            Branches::Table,
            Branches::Id,
            "branch_dues",
        )
        .await?;

        create_due_table(
            manager,
            CustomerDues::Table,
            CustomerDues::Id,
            CustomerDues::CustomerId,
            Customers::Table,
            Customers::Id,
            "customer_dues",
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(DuePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DuePayments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DuePayments::DueKind).string().not_null())
                    .col(ColumnDef::new(DuePayments::DueId).uuid().not_null())
                    .col(ColumnDef::new(DuePayments::BranchId).uuid().not_null())
                    .col(
                        ColumnDef::new(DuePayments::Amount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DuePayments::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DuePayments::PaymentDate).date().not_null())
                    .col(ColumnDef::new(DuePayments::ReferenceNumber).string())
                    .col(ColumnDef::new(DuePayments::Description).string())
                    .col(ColumnDef::new(DuePayments::CreatedBy).uuid())
                    .col(ColumnDef::new(DuePayments::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(DuePayments::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-due_payments-branch_id")
                            .from(DuePayments::Table, DuePayments::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-due_payments-due")
                    .table(DuePayments::Table)
                    .col(DuePayments::DueKind)
                    .col(DuePayments::DueId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DuePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerDues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BranchDues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupplierDues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BranchStock::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// Shared column shape for due-ledger columns present in all three due tables.
#[derive(Iden)]
enum DueColumns {
    BranchId,
    StockMovementId,
    DueType,
    TotalAmount,
    PaidAmount,
    RemainingAmount,
    Status,
    DueDate,
    PaymentDate,
    Description,
    Version,
    CreatedAt,
    UpdatedAt,
}

/// Creates one of the three structurally identical due-ledger tables.
async fn create_due_table<T, I, C, FT, FC>(
    manager: &SchemaManager<'_>,
    table: T,
    id: I,
    counterparty: C,
    fk_table: FT,
    fk_column: FC,
    table_name: &str,
) -> Result<(), DbErr>
where
    T: Iden + Copy + 'static,
    I: Iden + 'static,
    C: Iden + Copy + 'static,
    FT: Iden + 'static,
    FC: Iden + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(ColumnDef::new(id).uuid().not_null().primary_key())
                .col(ColumnDef::new(counterparty).uuid().not_null())
                .col(ColumnDef::new(DueColumns::BranchId).uuid().not_null())
                .col(ColumnDef::new(DueColumns::StockMovementId).uuid())
                .col(ColumnDef::new(DueColumns::DueType).string().not_null())
                .col(
                    ColumnDef::new(DueColumns::TotalAmount)
                        .decimal_len(16, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DueColumns::PaidAmount)
                        .decimal_len(16, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DueColumns::RemainingAmount)
                        .decimal_len(16, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(DueColumns::Status).string().not_null())
                .col(ColumnDef::new(DueColumns::DueDate).date().not_null())
                .col(ColumnDef::new(DueColumns::PaymentDate).date())
                .col(ColumnDef::new(DueColumns::Description).string())
                .col(ColumnDef::new(DueColumns::Version).big_integer().not_null())
                .col(ColumnDef::new(DueColumns::CreatedAt).timestamp().not_null())
                .col(ColumnDef::new(DueColumns::UpdatedAt).timestamp().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk-{table_name}-counterparty"))
                        .from(table, counterparty)
                        .to(fk_table, fk_column),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk-{table_name}-branch_id"))
                        .from(table, DueColumns::BranchId)
                        .to(Branches::Table, Branches::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx-{table_name}-movement-unique"))
                .table(table)
                .col(DueColumns::StockMovementId)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx-{table_name}-status-due_date"))
                .table(table)
                .col(DueColumns::Status)
                .col(DueColumns::DueDate)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx-{table_name}-branch"))
                .table(table)
                .col(DueColumns::BranchId)
                .to_owned(),
        )
        .await
}
