use byteorder::LittleEndian;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::decode::{require_value, Decode};
use crate::encode::Encode;
use crate::io::BufMut;
use crate::mysql::database::MySql;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

/// Writes the `Protocol::MYSQL_TIME` struct `COM_STMT_EXECUTE` uses for
/// DATE/DATETIME/TIMESTAMP bound parameters: a length byte (0, 4, 7, or 11)
/// followed by only as many fields as that length implies.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_binary_resultset.html>
fn put_date_time(buf: &mut Vec<u8>, year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, micros: u32) {
    if hour == 0 && minute == 0 && second == 0 && micros == 0 {
        buf.put_u8(4);
        buf.put_u16::<LittleEndian>(year);
        buf.put_u8(month);
        buf.put_u8(day);
    } else if micros == 0 {
        buf.put_u8(7);
        buf.put_u16::<LittleEndian>(year);
        buf.put_u8(month);
        buf.put_u8(day);
        buf.put_u8(hour);
        buf.put_u8(minute);
        buf.put_u8(second);
    } else {
        buf.put_u8(11);
        buf.put_u16::<LittleEndian>(year);
        buf.put_u8(month);
        buf.put_u8(day);
        buf.put_u8(hour);
        buf.put_u8(minute);
        buf.put_u8(second);
        buf.put_u32::<LittleEndian>(micros);
    }
}

/// The same `MYSQL_TIME` struct in its TIME-only shape: a length byte (0, 8,
/// or 12), then `is_negative`, `days` (a `TIME` column can span more than 24
/// hours), and finally hour/minute/second[/microsecond]. `chrono::NaiveTime`
/// never carries a day count or sign, so those are always 0.
fn put_time(buf: &mut Vec<u8>, hour: u8, minute: u8, second: u8, micros: u32) {
    if hour == 0 && minute == 0 && second == 0 && micros == 0 {
        buf.put_u8(0);
    } else if micros == 0 {
        buf.put_u8(8);
        buf.put_u8(0); // is_negative
        buf.put_u32::<LittleEndian>(0); // days
        buf.put_u8(hour);
        buf.put_u8(minute);
        buf.put_u8(second);
    } else {
        buf.put_u8(12);
        buf.put_u8(0);
        buf.put_u32::<LittleEndian>(0);
        buf.put_u8(hour);
        buf.put_u8(minute);
        buf.put_u8(second);
        buf.put_u32::<LittleEndian>(micros);
    }
}

impl Type<MySql> for NaiveDate {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::DATE)
    }
}

impl Encode<MySql> for NaiveDate {
    fn encode(&self, buf: &mut Vec<u8>) {
        put_date_time(buf, self.year() as u16, self.month() as u8, self.day() as u8, 0, 0, 0, 0);
    }
}

impl<'r> Decode<'r, MySql> for NaiveDate {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(crate::Error::decode)
    }
}

impl Type<MySql> for NaiveDateTime {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::DATETIME)
    }
}

impl Encode<MySql> for NaiveDateTime {
    fn encode(&self, buf: &mut Vec<u8>) {
        let date = self.date();
        let time = self.time();

        put_date_time(
            buf,
            date.year() as u16,
            date.month() as u8,
            date.day() as u8,
            time.hour() as u8,
            time.minute() as u8,
            time.second() as u8,
            time.nanosecond() / 1_000,
        );
    }
}

impl<'r> Decode<'r, MySql> for NaiveDateTime {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
            .map_err(crate::Error::decode)
    }
}

impl Type<MySql> for DateTime<Utc> {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::TIMESTAMP)
    }
}

impl Encode<MySql> for DateTime<Utc> {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.naive_utc().encode(buf)
    }
}

impl<'r> Decode<'r, MySql> for DateTime<Utc> {
    fn decode(raw: Option<&'r [u8]>, ty: &MySqlTypeInfo) -> crate::Result<Self> {
        NaiveDateTime::decode(raw, ty).map(|naive| DateTime::from_utc(naive, Utc))
    }
}

impl Type<MySql> for NaiveTime {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::TIME)
    }
}

impl Encode<MySql> for NaiveTime {
    fn encode(&self, buf: &mut Vec<u8>) {
        put_time(buf, self.hour() as u8, self.minute() as u8, self.second() as u8, self.nanosecond() / 1_000);
    }
}

impl<'r> Decode<'r, MySql> for NaiveTime {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
            .map_err(crate::Error::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_date_only_as_a_4_byte_struct() {
        let mut buf = Vec::new();
        NaiveDate::from_ymd(2023, 1, 2).encode(&mut buf);

        assert_eq!(buf, vec![4, 0xE7, 0x07, 1, 2]);
    }

    #[test]
    fn it_encodes_datetime_with_micros_as_an_11_byte_struct() {
        let dt = NaiveDate::from_ymd(2023, 1, 2).and_hms_micro(3, 4, 5, 678_901);

        let mut buf = Vec::new();
        dt.encode(&mut buf);

        assert_eq!(buf[0], 11);
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[7..], &[3, 4, 5, 0x35, 0x5B, 0x0A, 0x00]);
    }

    #[test]
    fn it_encodes_datetime_without_fractional_seconds_as_a_7_byte_struct() {
        let dt = NaiveDate::from_ymd(2023, 1, 2).and_hms(3, 4, 5);

        let mut buf = Vec::new();
        dt.encode(&mut buf);

        assert_eq!(buf[0], 7);
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn it_encodes_midnight_time_as_the_zero_length_struct() {
        let mut buf = Vec::new();
        NaiveTime::from_hms(0, 0, 0).encode(&mut buf);

        assert_eq!(buf, vec![0]);
    }
}
