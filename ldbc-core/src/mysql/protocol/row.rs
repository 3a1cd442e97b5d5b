use byteorder::LittleEndian;

use crate::io::Buf;
use crate::mysql::protocol::column::ColumnDefinition;
use crate::mysql::protocol::r#type::TypeId;

/// Scans a `Text_Resultset_Row` and returns, for each column, the byte range
/// of its value within `row` (or `None` for SQL `NULL`). Values stay encoded
/// as their lenenc-string text representation; decoding happens lazily when
/// a caller asks for a column.
pub fn text_row_ranges(row: &[u8], columns: usize) -> crate::Result<Vec<Option<(usize, usize)>>> {
    let mut buf = row;
    let mut ranges = Vec::with_capacity(columns);

    for _ in 0..columns {
        match buf.get_bytes_lenenc::<LittleEndian>()? {
            Some(bytes) => {
                let value_start = row.len() - buf.len() - bytes.len();
                ranges.push(Some((value_start, value_start + bytes.len())));
            }
            None => ranges.push(None),
        }
    }

    Ok(ranges)
}

/// Scans a `Binary_Resultset_Row` and returns the byte range of each column's
/// still-encoded value (fixed-width wire format per its `TypeId`, or a
/// lenenc-string for the variable-length family). `None` for SQL `NULL`,
/// indicated by the row's NULL bitmap rather than an in-band marker.
pub fn binary_row_ranges(
    row: &[u8],
    columns: &[ColumnDefinition],
) -> crate::Result<Vec<Option<(usize, usize)>>> {
    let mut buf = row;

    let header = buf.get_u8()?;
    if header != 0x00 {
        return Err(protocol_err!("expected binary row header 0x00, found 0x{:x}", header).into());
    }

    let bitmap_len = (columns.len() + 7 + 2) / 8;
    let bitmap = buf.get_bytes(bitmap_len)?;

    let mut ranges = Vec::with_capacity(columns.len());

    for (i, column) in columns.iter().enumerate() {
        let bit = i + 2;
        let is_null = (bitmap[bit / 8] >> (bit % 8)) & 1 == 1;

        if is_null {
            ranges.push(None);
            continue;
        }

        let start = row.len() - buf.len();

        if is_temporal(column.type_id) {
            // `Protocol::MYSQL_TIME`: a length byte (0/4/7/11 for
            // DATE/DATETIME/TIMESTAMP, 0/8/12 for TIME) followed by exactly
            // that many content bytes. The range captured here excludes the
            // length byte itself; `mysql/row.rs` interprets what's left
            // according to `column.type_id`.
            let len = buf.get_u8()? as usize;
            buf.get_bytes(len)?;

            let value_start = row.len() - buf.len() - len;
            ranges.push(Some((value_start, value_start + len)));
            continue;
        }

        let len = fixed_width(column.type_id).unwrap_or(0);

        if len > 0 {
            buf.get_bytes(len)?;
            ranges.push(Some((start, start + len)));
        } else {
            let bytes = buf.get_bytes_lenenc::<LittleEndian>()?.unwrap_or(&[]);
            let value_start = row.len() - buf.len() - bytes.len();
            ranges.push(Some((value_start, value_start + bytes.len())));
        }
    }

    Ok(ranges)
}

/// `true` for the DATE/TIME/DATETIME/TIMESTAMP family: neither a fixed-width
/// integer/float nor a `string<lenenc>`, but its own length-prefixed
/// `Protocol::MYSQL_TIME` struct (see [`binary_row_ranges`]).
fn is_temporal(type_id: TypeId) -> bool {
    matches!(type_id, TypeId::DATE | TypeId::TIME | TypeId::DATETIME | TypeId::TIMESTAMP)
}

/// The fixed wire width of a binary-protocol column value, or `None` for the
/// length-encoded string family (BLOB/TEXT/DECIMAL/JSON/ENUM/SET/BIT/...).
fn fixed_width(type_id: TypeId) -> Option<usize> {
    Some(match type_id {
        TypeId::LONGLONG | TypeId::DOUBLE => 8,
        TypeId::LONG | TypeId::INT24 | TypeId::FLOAT => 4,
        TypeId::SHORT | TypeId::YEAR => 2,
        TypeId::TINY => 1,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BufMut;
    use crate::mysql::protocol::column::{ColumnDefinition, ColumnFlags};

    #[test]
    fn it_scans_text_row_ranges() {
        let mut buf = Vec::new();
        buf.put_bytes_lenenc::<LittleEndian>(b"1");
        buf.put_u8(0xFB); // NULL
        buf.put_bytes_lenenc::<LittleEndian>(b"hello");

        let ranges = text_row_ranges(&buf, 3).unwrap();

        assert_eq!(&buf[ranges[0].unwrap().0..ranges[0].unwrap().1], b"1");
        assert!(ranges[1].is_none());
        assert_eq!(&buf[ranges[2].unwrap().0..ranges[2].unwrap().1], b"hello");
    }

    fn column(type_id: TypeId) -> ColumnDefinition {
        ColumnDefinition {
            name: "c".into(),
            table: "t".into(),
            character_set: 45,
            column_length: 0,
            type_id,
            flags: ColumnFlags::empty(),
            decimals: 0,
        }
    }

    #[test]
    fn it_scans_a_datetime_column_as_its_mysql_time_struct_not_a_lenenc_string() {
        let columns = [column(TypeId::LONG), column(TypeId::DATETIME)];

        let mut buf = Vec::new();
        buf.put_u8(0x00); // header
        buf.put_u8(0x00); // NULL bitmap, 2 columns -> 1 byte, nothing null
        buf.put_u32::<LittleEndian>(7); // LONG column
        buf.put_u8(11); // MYSQL_TIME length
        buf.put_u16::<LittleEndian>(2023); // year
        buf.put_u8(1); // month
        buf.put_u8(2); // day
        buf.put_u8(3); // hour
        buf.put_u8(4); // minute
        buf.put_u8(5); // second
        buf.put_u32::<LittleEndian>(678_901); // microsecond

        let ranges = binary_row_ranges(&buf, &columns).unwrap();
        let (start, end) = ranges[1].unwrap();

        // the captured range is exactly the 11 content bytes, with the
        // length-prefix byte consumed but not included
        assert_eq!(end - start, 11);
        assert_eq!(&buf[start..start + 2], &2023u16.to_le_bytes());
        assert_eq!(buf[start + 2], 1);
        assert_eq!(buf[start + 3], 2);
    }
}
