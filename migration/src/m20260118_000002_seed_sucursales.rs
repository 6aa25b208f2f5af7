use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Sucursales de arranque; se administran despues desde el back-office.
        let sql = r#"
            INSERT INTO sucursales (nombre, activa) VALUES
                ('Centro', TRUE),
                ('Plaza Norte', TRUE)
            ON CONFLICT DO NOTHING;
        "#;
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = "DELETE FROM sucursales WHERE nombre IN ('Centro', 'Plaza Norte');";
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }
}
