//! 字符串与数字转换

mod number_conversion;

pub use number_conversion::{
    double_to_string, hex_encode, hex_string_to_i64, hex_string_to_u64, number_to_string,
    string_to_number,
};
