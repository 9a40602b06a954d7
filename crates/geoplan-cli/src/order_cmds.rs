//! CLI handlers for `geoplan orders` subcommands.
//!
//! Each subcommand opens the plan's board, runs one board command, saves the
//! list if the command changed it, and prints the notices and the saved
//! list.

use anyhow::Result;

use geoplan_core::board::{BoardCommand, BoardOutcome, Notice, NoticeLevel};

use crate::OrderCommands;
use crate::plan_cmds::print_orders;
use crate::services::Services;

/// Dispatch an `OrderCommands` variant to the appropriate handler.
pub async fn run_order_command(command: OrderCommands, services: &Services) -> Result<()> {
    let (plan_id, board_command) = match command {
        OrderCommands::Fetch { plan_id } => (plan_id, BoardCommand::FetchFromErp),
        OrderCommands::Geocode { plan_id } => (plan_id, BoardCommand::GeocodeAll),
        OrderCommands::Add {
            plan_id,
            name,
            address,
        } => (plan_id, BoardCommand::AddOrder { name, address }),
    };
    run_and_save(services, &plan_id, board_command).await
}

async fn run_and_save(services: &Services, plan_id: &str, command: BoardCommand) -> Result<()> {
    let controller = &services.boards;
    let board = controller.open(plan_id).await?;

    let outcome = controller.execute(&board, command).await?;
    print_notices(&outcome);

    if !outcome.state.is_dirty() {
        println!("Nothing to save.");
        return Ok(());
    }

    let saved = controller.execute(&outcome.state, BoardCommand::Save).await?;
    println!("Saved {} orders.", saved.state.orders.len());
    println!();
    print_orders(&saved.state.orders);
    Ok(())
}

fn print_notices(outcome: &BoardOutcome) {
    for Notice { level, message } in &outcome.notices {
        match level {
            NoticeLevel::Info => println!("{message}"),
            NoticeLevel::Success => println!("OK: {message}"),
        }
    }
}
