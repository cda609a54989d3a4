use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> MySqlPool {
    let pool = MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database");

    // Schema and uniqueness constraints (attendance day, payroll period row,
    // payslip per payroll) live in ./migrations.
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    pool
}
