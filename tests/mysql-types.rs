use ldbc::{query, Executor, MySqlConnection, Row};

async fn connect() -> anyhow::Result<MySqlConnection> {
    let _ = dotenv::dotenv();
    let _ = env_logger::try_init();

    let url = std::env::var("DATABASE_URL")?;
    Ok(MySqlConnection::establish(ldbc::MySqlConnectOptions::parse(&url)?).await?)
}

macro_rules! test_round_trip {
    ($name:ident, $sql_ty:literal, $value:expr, $ty:ty) => {
        #[async_std::test]
        async fn $name() -> anyhow::Result<()> {
            let mut conn = connect().await?;

            let value: $ty = $value;
            let row = query::<ldbc::MySql>(concat!("select cast(? as ", $sql_ty, ")"))
                .bind(value.clone())
                .fetch_one(&mut conn)
                .await?;

            let out: $ty = row.get(0);
            assert_eq!(out, value);

            Ok(())
        }
    };
}

test_round_trip!(it_round_trips_i32, "signed", 12345_i32, i32);
test_round_trip!(it_round_trips_i64, "signed", -9876543210_i64, i64);
test_round_trip!(it_round_trips_u8, "unsigned", 200_u8, u8);
test_round_trip!(it_round_trips_bool_true, "unsigned", true, bool);
test_round_trip!(it_round_trips_f64, "decimal(20,10)", 3.5_f64, f64);
test_round_trip!(it_round_trips_string, "char(20)", "hello world".to_string(), String);

#[cfg(feature = "chrono")]
test_round_trip!(
    it_round_trips_naive_datetime,
    "datetime(6)",
    chrono::NaiveDate::from_ymd(2023, 6, 15).and_hms_micro(12, 30, 45, 123_456),
    chrono::NaiveDateTime
);

// MySQL's `CAST` doesn't accept `TIMESTAMP` as a target type, so this casts
// to `DATETIME` like the `NaiveDateTime` test above; `Decode` only looks at
// the normalized text bytes, not the source column's `TypeId`, so the round
// trip through `DateTime<Utc>` still exercises the same binary encode path.
#[cfg(feature = "chrono")]
test_round_trip!(
    it_round_trips_datetime_utc,
    "datetime(6)",
    chrono::DateTime::<chrono::Utc>::from_utc(
        chrono::NaiveDate::from_ymd(2023, 6, 15).and_hms_micro(12, 30, 45, 123_456),
        chrono::Utc
    ),
    chrono::DateTime<chrono::Utc>
);

#[async_std::test]
async fn it_round_trips_bytes() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let value: Vec<u8> = vec![0xDE, 0xAD, 0xBE, 0xEF];
    let row = query::<ldbc::MySql>("select cast(? as binary(4))")
        .bind(value.clone())
        .fetch_one(&mut conn)
        .await?;

    let out: Vec<u8> = row.get(0);
    assert_eq!(out, value);

    Ok(())
}

#[async_std::test]
async fn it_decodes_null_as_none() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let row = conn.fetch_one("select null", Default::default()).await?;
    let value: Option<i32> = row.get(0);

    assert_eq!(value, None);

    Ok(())
}

#[async_std::test]
async fn it_rejects_decoding_the_wrong_type() -> anyhow::Result<()> {
    let mut conn = connect().await?;

    let row = conn.fetch_one("select 'not a number'", Default::default()).await?;
    let result: Result<i32, _> = row.try_get(0);

    assert!(result.is_err());

    Ok(())
}
