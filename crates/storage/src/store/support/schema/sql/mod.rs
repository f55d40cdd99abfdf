#![forbid(unsafe_code)]

mod core;
mod history;
mod pragmas;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(pragmas::SQL);
    sql.push_str(core::SQL);
    sql.push_str(history::SQL);
    sql
}
