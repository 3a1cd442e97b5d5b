use std::sync::Arc;

use crate::decode::Decode;
use crate::mysql::protocol::column::ColumnDefinition;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::row::Row;

/// One result-set row.
///
/// `buf` holds the row's values in their text-protocol representation
/// regardless of whether they arrived over `COM_QUERY` or a binary
/// `COM_STMT_EXECUTE` result set; binary rows are normalized to text at
/// construction time (see [`MySqlRow::from_binary`]) so [`Decode`] impls only
/// ever have to parse one format.
pub struct MySqlRow {
    buf: Vec<u8>,
    ranges: Vec<Option<(usize, usize)>>,
    columns: Arc<Vec<ColumnDefinition>>,
}

impl MySqlRow {
    pub(crate) fn from_text(row: Vec<u8>, columns: Arc<Vec<ColumnDefinition>>) -> crate::Result<Self> {
        let ranges = crate::mysql::protocol::row::text_row_ranges(&row, columns.len())?;

        Ok(Self { buf: row, ranges, columns })
    }

    pub(crate) fn from_binary(row: Vec<u8>, columns: Arc<Vec<ColumnDefinition>>) -> crate::Result<Self> {
        let binary_ranges = crate::mysql::protocol::row::binary_row_ranges(&row, &columns)?;

        let mut buf = Vec::with_capacity(row.len());
        let mut ranges = Vec::with_capacity(binary_ranges.len());

        for (range, column) in binary_ranges.into_iter().zip(columns.iter()) {
            match range {
                Some((start, end)) => {
                    let start_out = buf.len();
                    write_as_text(&mut buf, &row[start..end], column.type_id, column.is_unsigned());
                    ranges.push(Some((start_out, buf.len())));
                }
                None => ranges.push(None),
            }
        }

        Ok(Self { buf, ranges, columns })
    }

    fn type_info_for(&self, index: usize) -> MySqlTypeInfo {
        let column = &self.columns[index];

        MySqlTypeInfo {
            id: column.type_id,
            is_unsigned: column.is_unsigned(),
            is_binary: column.is_binary(),
        }
    }
}

fn write_as_text(out: &mut Vec<u8>, wire: &[u8], type_id: TypeId, unsigned: bool) {
    use byteorder::{ByteOrder, LittleEndian};
    use std::io::Write;

    macro_rules! fmt_int {
        ($read:ident, $ty:ty, $uty:ty) => {{
            let raw = LittleEndian::$read(wire);
            if unsigned {
                out.extend_from_slice((raw as $uty).to_string().as_bytes());
            } else {
                out.extend_from_slice((raw as $ty).to_string().as_bytes());
            }
        }};
    }

    match type_id {
        TypeId::TINY => {
            let raw = wire[0];
            if unsigned {
                out.extend_from_slice(raw.to_string().as_bytes());
            } else {
                out.extend_from_slice((raw as i8).to_string().as_bytes());
            }
        }
        TypeId::SHORT | TypeId::YEAR => fmt_int!(read_u16, i16, u16),
        TypeId::LONG | TypeId::INT24 => fmt_int!(read_u32, i32, u32),
        TypeId::LONGLONG => fmt_int!(read_u64, i64, u64),
        TypeId::FLOAT => out.extend_from_slice(LittleEndian::read_f32(wire).to_string().as_bytes()),
        TypeId::DOUBLE => out.extend_from_slice(LittleEndian::read_f64(wire).to_string().as_bytes()),

        TypeId::DATE => {
            let (year, month, day, ..) = read_mysql_time(wire);
            let _ = write!(out, "{:04}-{:02}-{:02}", year, month, day);
        }

        TypeId::DATETIME | TypeId::TIMESTAMP => {
            let (year, month, day, hour, minute, second, micros) = read_mysql_time(wire);

            if micros > 0 {
                let _ = write!(
                    out,
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
                    year, month, day, hour, minute, second, micros
                );
            } else {
                let _ = write!(out, "{:04}-{:02}-{:02} {:02}:{:02}:{:02}", year, month, day, hour, minute, second);
            }
        }

        TypeId::TIME => {
            // `days` is folded into `hour` since chrono's `NaiveTime` has no
            // multi-day concept but MySQL's TIME column can exceed 24 hours.
            let (is_negative, days, hour, minute, second, micros) = read_mysql_time_of_day(wire);
            let sign = if is_negative { "-" } else { "" };
            let hour = hour as u32 + days * 24;

            if micros > 0 {
                let _ = write!(out, "{}{:02}:{:02}:{:02}.{:06}", sign, hour, minute, second, micros);
            } else {
                let _ = write!(out, "{}{:02}:{:02}:{:02}", sign, hour, minute, second);
            }
        }

        // lenenc-string family (BLOB/TEXT/DECIMAL/...) is already text or raw
        // bytes on the wire in both protocols
        _ => out.extend_from_slice(wire),
    }
}

/// Decodes a `Protocol::MYSQL_TIME` struct in its DATE/DATETIME/TIMESTAMP
/// shape (`wire` is the content following the length-prefix byte, which
/// `binary_row_ranges` already stripped). Missing trailing fields (a 4-byte
/// date-only struct, say) default to zero.
fn read_mysql_time(wire: &[u8]) -> (u16, u8, u8, u8, u8, u8, u32) {
    use byteorder::{ByteOrder, LittleEndian};

    if wire.is_empty() {
        return (0, 0, 0, 0, 0, 0, 0);
    }

    let year = LittleEndian::read_u16(&wire[0..2]);
    let month = wire[2];
    let day = wire[3];

    if wire.len() < 7 {
        return (year, month, day, 0, 0, 0, 0);
    }

    let hour = wire[4];
    let minute = wire[5];
    let second = wire[6];

    let micros = if wire.len() >= 11 { LittleEndian::read_u32(&wire[7..11]) } else { 0 };

    (year, month, day, hour, minute, second, micros)
}

/// Decodes a `Protocol::MYSQL_TIME` struct in its TIME-only shape:
/// `is_negative`, `days`, then hour/minute/second[/microsecond].
fn read_mysql_time_of_day(wire: &[u8]) -> (bool, u32, u8, u8, u8, u32) {
    use byteorder::{ByteOrder, LittleEndian};

    if wire.is_empty() {
        return (false, 0, 0, 0, 0, 0);
    }

    let is_negative = wire[0] != 0;
    let days = LittleEndian::read_u32(&wire[1..5]);
    let hour = wire[5];
    let minute = wire[6];
    let second = wire[7];

    let micros = if wire.len() >= 12 { LittleEndian::read_u32(&wire[8..12]) } else { 0 };

    (is_negative, days, hour, minute, second, micros)
}

impl Row for MySqlRow {
    type Database = crate::mysql::database::MySql;

    fn len(&self) -> usize {
        self.columns.len()
    }

    fn try_get<'r, I, T>(&'r self, index: I) -> crate::Result<T>
    where
        I: crate::row::ColumnIndex<Self>,
        T: Decode<'r, Self::Database>,
    {
        let index = index.resolve(self)?;
        let ty = self.type_info_for(index);
        let raw = self.ranges[index].map(|(start, end)| &self.buf[start..end]);

        T::decode(raw, &ty)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| &*c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_a_binary_datetime_struct_as_text() {
        let year = 2023u16.to_le_bytes();
        let wire = [
            year[0],
            year[1],
            1,
            2, // year, month, day
            3,
            4,
            5, // hour, minute, second
            0x35,
            0x5B,
            0x0A,
            0x00, // microsecond = 678901 LE
        ];

        let mut out = Vec::new();
        write_as_text(&mut out, &wire, TypeId::DATETIME, false);

        assert_eq!(std::str::from_utf8(&out).unwrap(), "2023-01-02 03:04:05.678901");
    }

    #[test]
    fn it_formats_a_binary_date_only_struct_as_text() {
        let year = 2023u16.to_le_bytes();
        let wire = [year[0], year[1], 1, 2];

        let mut out = Vec::new();
        write_as_text(&mut out, &wire, TypeId::DATE, false);

        assert_eq!(std::str::from_utf8(&out).unwrap(), "2023-01-02");
    }

    #[test]
    fn it_formats_a_binary_time_struct_as_text() {
        let wire = [0u8, 0, 0, 0, 0, 3, 4, 5];

        let mut out = Vec::new();
        write_as_text(&mut out, &wire, TypeId::TIME, false);

        assert_eq!(std::str::from_utf8(&out).unwrap(), "03:04:05");
    }
}
