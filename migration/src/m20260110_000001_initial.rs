use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = include_str!("../../migrations/20260110000001_initial.sql");
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE IF EXISTS pagos;
            DROP TABLE IF EXISTS orden_items;
            DROP TABLE IF EXISTS ordenes;
            DROP TABLE IF EXISTS movimientos_caja;
            DROP TABLE IF EXISTS cajas;
            DROP TABLE IF EXISTS sucursales;
        "#;
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }
}
