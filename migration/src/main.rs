use sea_orm_migration::prelude::*;

/// Standalone migration CLI (`cargo run -p migration -- up`).
#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
