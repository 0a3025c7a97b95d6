use comfy_table::{Cell, Table};

use super::RuleKind;
use crate::db::{add_koreksi_rule, add_obyek_rule, add_tax_keyword, add_withholding_rule, get_connection};
use crate::error::{JurnalError, Result};
use crate::models::{TaxCategory, TaxFlag};
use crate::rules::RuleSource;
use crate::settings::get_db_path;
use crate::store::SqliteStore;

pub fn add_koreksi(keyword: &str, value: &str, exclusion: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let id = add_koreksi_rule(&conn, keyword, value, exclusion)?;
    println!("Added koreksi rule {id}: '{keyword}' \u{2192} {value}");
    Ok(())
}

pub fn add_obyek(keyword: &str, value: &str, exclusion: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let id = add_obyek_rule(&conn, keyword, value, exclusion)?;
    println!("Added obyek rule {id}: '{keyword}' \u{2192} {value}");
    Ok(())
}

pub fn add_wht(keyword: &str, tax_type: &str, rate: f64, priority: i64) -> Result<()> {
    let flag = TaxFlag::from_tax_type(tax_type)
        .ok_or_else(|| JurnalError::InvalidTaxType(tax_type.to_string()))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(JurnalError::Other(format!("Rate must be a non-negative number, got {rate}")));
    }
    let conn = get_connection(&get_db_path())?;
    let id = add_withholding_rule(&conn, keyword, tax_type, rate, priority)?;
    println!("Added withholding rule {id}: '{keyword}' \u{2192} {flag} at {rate}");
    Ok(())
}

pub fn add_keyword(keyword: &str, category: &str, priority: i64) -> Result<()> {
    let category: TaxCategory = category.parse()?;
    let conn = get_connection(&get_db_path())?;
    let id = add_tax_keyword(&conn, keyword, category, priority)?;
    println!("Added {} keyword {id}: '{keyword}'", category.as_str());
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let store = SqliteStore::new(&conn);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Koreksi", "Exclusion"]);
    for rule in store.active_koreksi_rules()? {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.keyword),
            Cell::new(rule.value),
            Cell::new(rule.exclusion_value.unwrap_or_default()),
        ]);
    }
    println!("Koreksi rules\n{table}");

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Obyek", "Exclusion"]);
    for rule in store.active_obyek_rules()? {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.keyword),
            Cell::new(rule.value),
            Cell::new(rule.exclusion_value.unwrap_or_default()),
        ]);
    }
    println!("Obyek rules\n{table}");

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Tax type", "Rate", "Priority"]);
    for rule in store.active_withholding_tax_rules()? {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.keyword),
            Cell::new(rule.tax_type),
            Cell::new(rule.rate),
            Cell::new(rule.priority),
        ]);
    }
    println!("Withholding tax rules\n{table}");

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Category", "Priority"]);
    for kw in store.active_tax_keywords()? {
        table.add_row(vec![
            Cell::new(kw.id),
            Cell::new(kw.keyword),
            Cell::new(kw.category),
            Cell::new(kw.priority),
        ]);
    }
    println!("Tax keywords\n{table}");
    Ok(())
}

/// Deactivates the rule. Its row stays in the table.
pub fn delete(kind: RuleKind, id: i64) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let table = kind.table();

    let row: std::result::Result<(String, i32), _> = conn.query_row(
        &format!("SELECT keyword, is_active FROM {table} WHERE id = ?1"),
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );

    match row {
        Err(_) => Err(JurnalError::Other(format!("No {kind:?} rule with ID {id}"))),
        Ok((_, 0)) => Err(JurnalError::Other(format!("Rule {id} is already inactive"))),
        Ok((keyword, _)) => {
            conn.execute(&format!("UPDATE {table} SET is_active = 0 WHERE id = ?1"), [id])?;
            println!("Deleted rule {id}: '{keyword}'");
            Ok(())
        }
    }
}
