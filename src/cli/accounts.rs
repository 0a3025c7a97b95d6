use comfy_table::{Cell, Table};

use crate::db::{add_account, get_connection};
use crate::error::{JurnalError, Result};
use crate::models::TaxFlag;
use crate::rules::RuleSource;
use crate::settings::get_db_path;
use crate::store::SqliteStore;

pub fn add(code: &str, name: &str, nature: &str, tag: Option<&str>, note: Option<&str>) -> Result<()> {
    let tag = tag
        .map(|t| TaxFlag::from_tag(t).ok_or_else(|| JurnalError::InvalidTag(t.to_string())))
        .transpose()?;
    let conn = get_connection(&get_db_path())?;
    add_account(&conn, code, name, nature, tag, note)?;
    match tag {
        Some(flag) => println!("Added account: {code} {name} [{flag}]"),
        None => println!("Added account: {code} {name}"),
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let accounts = SqliteStore::new(&conn).active_accounts()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Code", "Name", "Nature", "Tag", "Note"]);
    for acc in accounts {
        table.add_row(vec![
            Cell::new(acc.id),
            Cell::new(acc.code),
            Cell::new(acc.name),
            Cell::new(acc.nature),
            Cell::new(acc.correction_tag),
            Cell::new(acc.analysis_note),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
