//! Command handlers wiring the CLI to the database and the ledger core
//!
//! Each handler loads the aggregate, applies one mutator, saves the whole
//! profile back, and prints a confirmation. Read commands render tables or
//! JSON from the already-computed line fields.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use rusqlite::Connection;
use std::path::PathBuf;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use costbook::db;
use costbook::error::LedgerError;
use costbook::ledger::{CalculationMethod, LedgerProfile, LineType};
use costbook::reports::{totalize, PeriodTotals};
use costbook::utils::format_amount;

use crate::cli::{LineCommands, ProfileCommands};

pub fn handle_init(db_path: Option<PathBuf>) -> Result<()> {
    db::init_database(db_path)?;
    println!("{} Database initialized", "✓".green().bold());
    Ok(())
}

pub fn handle_profile(
    action: ProfileCommands,
    db_path: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    db::init_database(db_path.clone())?;
    let mut conn = db::open_db(db_path)?;

    match action {
        ProfileCommands::Create {
            name,
            asset,
            currency,
            precision,
            method,
        } => {
            let method = parse_method(&method)?;
            let mut profile = LedgerProfile::new(&name, &asset, &currency, precision, method)?;
            let id = db::save_profile(&mut conn, &mut profile)?;
            info!("Created profile {} ({})", id, profile.name());
            println!(
                "{} Created profile {} ({})",
                "✓".green().bold(),
                id,
                profile.name()
            );
            Ok(())
        }

        ProfileCommands::List => {
            let summaries = db::list_profiles(&conn)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }
            if summaries.is_empty() {
                println!("No profiles found");
                return Ok(());
            }

            #[derive(Tabled)]
            struct ProfileRow {
                #[tabled(rename = "Id")]
                id: i64,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Asset")]
                asset: String,
                #[tabled(rename = "Currency")]
                currency: String,
                #[tabled(rename = "Method")]
                method: String,
                #[tabled(rename = "Lines")]
                lines: i64,
                #[tabled(rename = "Visible")]
                visible: String,
            }

            let rows: Vec<ProfileRow> = summaries
                .iter()
                .map(|s| ProfileRow {
                    id: s.id,
                    name: s.name.clone(),
                    asset: s.asset_name.clone(),
                    currency: s.currency.clone(),
                    method: s.calculation_method.clone(),
                    lines: s.line_count,
                    visible: if s.visible { "yes" } else { "no" }.to_string(),
                })
                .collect();

            println!("{}", Table::new(rows).with(Style::rounded()));
            Ok(())
        }

        ProfileCommands::Show { profile_id } => {
            let profile = load_profile(&conn, profile_id)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                return Ok(());
            }
            print_profile(&profile);
            Ok(())
        }

        ProfileCommands::Rename { profile_id, name } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.rename(&name)?;
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Renamed profile {} to {}", "✓".green().bold(), profile_id, name);
            Ok(())
        }

        ProfileCommands::SetAsset {
            profile_id,
            asset,
            precision,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.change_asset(&asset, precision);
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Updated asset of profile {}", "✓".green().bold(), profile_id);
            Ok(())
        }

        ProfileCommands::SetMethod { profile_id, method } => {
            let method = parse_method(&method)?;
            let mut profile = load_profile(&conn, profile_id)?;
            profile.change_calculation_method(method)?;
            db::save_profile(&mut conn, &mut profile)?;
            info!("Profile {} now uses {}", profile_id, method.as_str());
            println!(
                "{} Profile {} recomputed under {}",
                "✓".green().bold(),
                profile_id,
                method.as_str()
            );
            Ok(())
        }

        ProfileCommands::SetVisible {
            profile_id,
            visible,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.change_visibility(visible);
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Updated visibility of profile {}", "✓".green().bold(), profile_id);
            Ok(())
        }

        ProfileCommands::SetIcon { profile_id, icon } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.change_icon(icon);
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Updated icon of profile {}", "✓".green().bold(), profile_id);
            Ok(())
        }

        ProfileCommands::Delete { profile_id } => {
            if !db::delete_profile(&conn, profile_id)? {
                return Err(LedgerError::ProfileNotFound(profile_id).into());
            }
            println!("{} Deleted profile {}", "✓".green().bold(), profile_id);
            Ok(())
        }
    }
}

pub fn handle_line(
    action: LineCommands,
    db_path: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    db::init_database(db_path.clone())?;
    let mut conn = db::open_db(db_path)?;

    match action {
        LineCommands::Add {
            profile_id,
            date,
            line_type,
            quantity,
            amount,
            display_order,
            comment,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            let line_id = profile.add_line(
                parse_date(&date)?,
                display_order.unwrap_or(profile.lines().len()),
                parse_line_type(&line_type)?,
                parse_decimal(&quantity, "quantity")?,
                parse_decimal(&amount, "amount")?,
                comment,
            )?;
            db::save_profile(&mut conn, &mut profile)?;
            info!("Added line {} to profile {}", line_id, profile_id);
            println!("{} Added line {}", "✓".green().bold(), line_id);
            if !json_output {
                print_profile(&profile);
            }
            Ok(())
        }

        LineCommands::Remove {
            profile_id,
            line_id,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.remove_line(line_id)?;
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Removed line {}", "✓".green().bold(), line_id);
            Ok(())
        }

        LineCommands::MoveUp {
            profile_id,
            line_id,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.move_line_up(line_id)?;
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Moved line {} up", "✓".green().bold(), line_id);
            Ok(())
        }

        LineCommands::MoveDown {
            profile_id,
            line_id,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            profile.move_line_down(line_id)?;
            db::save_profile(&mut conn, &mut profile)?;
            println!("{} Moved line {} down", "✓".green().bold(), line_id);
            Ok(())
        }

        LineCommands::Edit {
            profile_id,
            line_id,
            date,
            line_type,
            quantity,
            amount,
            comment,
        } => {
            let mut profile = load_profile(&conn, profile_id)?;
            let new_id = profile.edit_line(
                line_id,
                parse_date(&date)?,
                parse_line_type(&line_type)?,
                parse_decimal(&quantity, "quantity")?,
                parse_decimal(&amount, "amount")?,
                comment,
            )?;
            db::save_profile(&mut conn, &mut profile)?;
            println!(
                "{} Replaced line {} with line {}",
                "✓".green().bold(),
                line_id,
                new_id
            );
            Ok(())
        }
    }
}

pub fn handle_totals(
    currency: Option<String>,
    year: Option<i32>,
    db_path: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    db::init_database(db_path.clone())?;
    let conn = db::open_db(db_path)?;

    let profiles = db::get_all_profiles(&conn)?;
    let selected: Vec<&LedgerProfile> = profiles
        .iter()
        .filter(|p| currency.as_deref().is_none_or(|c| p.currency() == c))
        .collect();

    let report = totalize(&selected)?;

    let monthly: Vec<(String, &PeriodTotals)> = report
        .monthly
        .iter()
        .filter(|((y, _), _)| year.is_none_or(|wanted| *y == wanted))
        .map(|((y, m), totals)| (format!("{:04}-{:02}", y, m), totals))
        .collect();
    let yearly: Vec<(String, &PeriodTotals)> = report
        .yearly
        .iter()
        .filter(|(y, _)| year.is_none_or(|wanted| **y == wanted))
        .map(|(y, totals)| (format!("{:04}", y), totals))
        .collect();

    if json_output {
        let to_json = |rows: &[(String, &PeriodTotals)]| -> Vec<serde_json::Value> {
            rows.iter()
                .map(|(period, t)| {
                    serde_json::json!({
                        "period": period,
                        "bought": t.bought.to_string(),
                        "sold": t.sold.to_string(),
                        "realized_result": t.realized_result.to_string(),
                        "volume": t.volume.to_string(),
                    })
                })
                .collect()
        };
        let payload = serde_json::json!({
            "currency": report.currency,
            "monthly": to_json(&monthly),
            "yearly": to_json(&yearly),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if monthly.is_empty() {
        println!("No trades found");
        return Ok(());
    }

    #[derive(Tabled)]
    struct TotalsRow {
        #[tabled(rename = "Period")]
        period: String,
        #[tabled(rename = "Bought")]
        bought: String,
        #[tabled(rename = "Sold")]
        sold: String,
        #[tabled(rename = "Result")]
        result: String,
        #[tabled(rename = "Volume")]
        volume: String,
    }

    let row = |(period, t): &(String, &PeriodTotals)| TotalsRow {
        period: period.clone(),
        bought: format_amount(t.bought, 2),
        sold: format_amount(t.sold, 2),
        result: format_amount(t.realized_result, 2),
        volume: format_amount(t.volume, 2),
    };

    println!("Totals in {}", report.currency.bold());
    println!("\nMonthly:");
    println!(
        "{}",
        Table::new(monthly.iter().map(row).collect::<Vec<_>>()).with(Style::rounded())
    );
    println!("\nYearly:");
    println!(
        "{}",
        Table::new(yearly.iter().map(row).collect::<Vec<_>>()).with(Style::rounded())
    );
    Ok(())
}

fn load_profile(conn: &Connection, profile_id: i64) -> Result<LedgerProfile> {
    db::get_profile(conn, profile_id)?
        .ok_or_else(|| LedgerError::ProfileNotFound(profile_id).into())
}

fn print_profile(profile: &LedgerProfile) {
    let precision = profile.precision();

    println!(
        "\n{} - {} [{}], {} method",
        profile.name().bold(),
        profile.asset_name(),
        profile.currency(),
        profile.method().as_str().to_lowercase()
    );

    if profile.lines().is_empty() {
        println!("No lines yet");
        return;
    }

    #[derive(Tabled)]
    struct LineRow {
        #[tabled(rename = "#")]
        order: usize,
        #[tabled(rename = "Id")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Type")]
        line_type: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Unit price")]
        unit_price: String,
        #[tabled(rename = "Avg cost")]
        avg_cost: String,
        #[tabled(rename = "Total cost")]
        total_cost: String,
        #[tabled(rename = "Holdings")]
        holdings: String,
        #[tabled(rename = "Realized")]
        realized: String,
    }

    let rows: Vec<LineRow> = profile
        .lines()
        .iter()
        .map(|line| LineRow {
            order: line.display_order,
            id: line.id,
            date: line.date.format("%Y-%m-%d").to_string(),
            line_type: line.line_type.as_str().to_string(),
            quantity: format_amount(line.quantity, precision),
            amount: format_amount(line.amount, precision),
            unit_price: format_amount(line.unit_price(), precision),
            avg_cost: format_amount(line.avg_cost, precision),
            total_cost: format_amount(line.total_cost, precision),
            holdings: format_amount(line.total_quantity, precision),
            realized: if line.line_type == LineType::Sell {
                format_amount(line.realized_gain, precision)
            } else {
                String::new()
            },
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid date format. Use YYYY-MM-DD")
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(s).with_context(|| format!("Invalid {}. Must be a decimal number", field))
}

fn parse_line_type(s: &str) -> Result<LineType> {
    LineType::from_str(s).map_err(|_| anyhow!("Line type must be 'buy', 'sell', or 'setup'"))
}

fn parse_method(s: &str) -> Result<CalculationMethod> {
    CalculationMethod::from_str(s)
        .map_err(|_| anyhow!("Calculation method must be 'average' or 'fifo'"))
}
