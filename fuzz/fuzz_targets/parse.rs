#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlsense_core::{completion_context, parse_sql};

fuzz_target!(|data: &[u8]| {
    if let Ok(sql) = std::str::from_utf8(data) {
        let script = parse_sql(sql);
        let _ = script;
        let _ = completion_context(sql, 1, sql.chars().count() as u32 + 1);
    }
});
