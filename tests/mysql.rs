use std::time::Duration;

use ldbc::{Connection, Executor, MySqlConnectOptions, MySqlConnection, Row};

async fn connect() -> anyhow::Result<MySqlConnection> {
    let _ = dotenv::dotenv();
    let _ = env_logger::try_init();

    let url = std::env::var("DATABASE_URL")?;
    Ok(MySqlConnection::establish(MySqlConnectOptions::parse(&url)?).await?)
}

#[async_std::test]
async fn it_connects() -> anyhow::Result<()> {
    let mut conn = connect().await?;
    conn.ping().await?;

    Ok(())
}

#[async_std::test]
async fn it_pings_repeatedly() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    for _ in 0..3 {
        conn.ping().await?;
    }

    Ok(())
}

#[async_std::test]
async fn it_selects_a_literal() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let row = conn.fetch_one("select 1 + 1", Default::default()).await?;
    let sum: i32 = row.get(0);

    assert_eq!(sum, 2);

    Ok(())
}

#[async_std::test]
async fn it_executes_a_ddl_and_dml_round_trip() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    conn.execute("drop table if exists ldbc_mysql_it", Default::default()).await?;
    conn.execute(
        "create table ldbc_mysql_it (id int primary key, name text not null)",
        Default::default(),
    )
    .await?;

    let result = conn
        .execute("insert into ldbc_mysql_it (id, name) values (1, 'alice')", Default::default())
        .await?;
    assert_eq!(result.rows_affected(), 1);

    let row = conn.fetch_one("select name from ldbc_mysql_it where id = 1", Default::default()).await?;
    let name: String = row.get("name");
    assert_eq!(name, "alice");

    conn.execute("drop table ldbc_mysql_it", Default::default()).await?;

    Ok(())
}

#[async_std::test]
async fn it_reports_no_rows_as_none() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let row = conn.fetch_optional("select 1 from (select 1) t where 1 = 0", Default::default()).await?;
    assert!(row.is_none());

    Ok(())
}

#[async_std::test]
async fn it_surfaces_server_errors() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let err = conn.execute("select * from no_such_table_ldbc_it", Default::default()).await;
    assert!(err.is_err());

    // the connection should still be usable after a server-side error
    conn.ping().await?;

    Ok(())
}

#[async_std::test]
async fn it_runs_a_transaction() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    conn.execute("drop table if exists ldbc_mysql_tx_it", Default::default()).await?;
    conn.execute("create table ldbc_mysql_tx_it (id int primary key)", Default::default()).await?;

    let mut tx = conn.begin().await?;
    tx.execute("insert into ldbc_mysql_tx_it (id) values (1)", Default::default()).await?;
    tx.rollback().await?;

    let row = conn
        .fetch_optional("select id from ldbc_mysql_tx_it where id = 1", Default::default())
        .await?;
    assert!(row.is_none());

    conn.execute("drop table ldbc_mysql_tx_it", Default::default()).await?;

    Ok(())
}

#[async_std::test]
async fn it_reports_last_insert_id() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    conn.execute("drop table if exists ldbc_mysql_lastid_it", Default::default()).await?;
    conn.execute(
        "create table ldbc_mysql_lastid_it (id int auto_increment primary key, n int not null)",
        Default::default(),
    )
    .await?;

    let result = conn
        .execute("insert into ldbc_mysql_lastid_it (n) values (1)", Default::default())
        .await?;
    assert_eq!(result.rows_affected(), 1);
    assert_eq!(result.last_insert_id(), 1);
    assert_eq!(result.warnings(), 0);

    let result = conn
        .execute("insert into ldbc_mysql_lastid_it (n) values (2)", Default::default())
        .await?;
    assert_eq!(result.last_insert_id(), 2);

    conn.execute("drop table ldbc_mysql_lastid_it", Default::default()).await?;

    Ok(())
}

#[async_std::test]
async fn it_validates_within_a_timeout() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    assert!(conn.is_valid_within(Duration::from_secs(5)).await);

    Ok(())
}
