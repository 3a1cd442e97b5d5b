use crate::arguments::Arguments;
use crate::encode::{Encode, IsNull};
use crate::mysql::database::MySql;
use crate::mysql::protocol::command::BinaryParam;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

/// The set of parameters bound to a query, in binding order. Each value is
/// pre-encoded to the `COM_STMT_EXECUTE` binary-protocol wire format the
/// moment it's added, so `execute`/`fetch` only has to stitch the params
/// together with the statement id.
#[derive(Debug, Default)]
pub struct MySqlArguments {
    pub(crate) params: Vec<BinaryParam>,
}

impl Arguments for MySqlArguments {
    type Database = MySql;

    fn len(&self) -> usize {
        self.params.len()
    }

    fn reserve(&mut self, len: usize, _size_hint: usize) {
        self.params.reserve(len);
    }

    fn add<T>(&mut self, value: T)
    where
        T: Type<MySql> + Encode<MySql>,
    {
        let type_info = T::type_info();

        let mut buf = Vec::with_capacity(value.size_hint());
        let is_null = value.encode_nullable(&mut buf);

        self.params.push(BinaryParam {
            type_id: type_info.id.0,
            unsigned: type_info.is_unsigned,
            value: match is_null {
                IsNull::Yes => None,
                IsNull::No => Some(buf),
            },
        });
    }
}
