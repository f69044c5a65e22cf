use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stock_ledger::{
    config::Config,
    entry::{InwardEntry, OutwardEntry, ReturnEntry},
    item::InventoryItem,
    logging,
    movement::{MovementKind, StockMovement},
    persist::SnapshotPort,
    report::{self, ReportPeriod},
    store::{Action, Dispatched, InventoryStore},
};

#[derive(Parser)]
#[command(name = "stock-ledger", version, about = "Track stock coming in, going out and coming back")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Snapshot location, overrides the configured path
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a purchase; creates the item if the name is new
    Inward {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        opening_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0.0)]
        reorder_level: f64,
        #[arg(long, default_value = "")]
        purchaser: String,
        #[arg(long, default_value = "")]
        bill_no: String,
        #[arg(long)]
        bill_date: Option<NaiveDate>,
    },
    /// Issue stock to a site or agency
    Outward {
        #[arg(long)]
        item: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long, default_value = "")]
        given_to: String,
        #[arg(long, default_value = "")]
        site: String,
        #[arg(long)]
        tender_no: Option<String>,
    },
    /// Take issued stock back
    Return {
        #[arg(long)]
        item: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long, default_value = "")]
        returned_by: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// List items, optionally filtered by name or description
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Items at or below their reorder level
    LowStock,
    /// One item with its average purchase price
    Show { id: String },
    /// Movement history for one item, newest first
    History {
        id: String,
        #[arg(long, value_enum, conflicts_with_all = ["from", "to"])]
        period: Option<PeriodArg>,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Dashboard counts
    Summary,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Monthly,
    Quarterly,
    Yearly,
}

type Store = InventoryStore<Box<dyn SnapshotPort>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(data) = cli.data {
        config.storage.path = Some(data);
    }

    logging::init_tracing(&config.logging.filter);

    let port = config
        .open_port()
        .with_context(|| format!("Failed to open storage at {}", config.data_path().display()))?;
    let mut store = InventoryStore::load(port);

    run(cli.command, &mut store)
}

fn run(command: Command, store: &mut Store) -> anyhow::Result<()> {
    match command {
        Command::Inward {
            name,
            quantity,
            unit,
            price,
            description,
            opening_date,
            reorder_level,
            purchaser,
            bill_no,
            bill_date,
        } => {
            let mut entry = InwardEntry::new()
                .set_name(&name)
                .set_quantity(quantity)
                .set_unit(&unit)
                .set_purchase_price(price)
                .set_description(&description)
                .set_reorder_level(reorder_level)
                .set_purchaser_name(&purchaser)
                .set_bill_no(&bill_no);
            if let Some(date) = opening_date {
                entry = entry.set_opening_stock_date(date);
            }
            if let Some(date) = bill_date {
                entry = entry.set_bill_date(date);
            }
            let action = entry.validate_and_finalise(&store.state())?;
            apply(store, action)
        }
        Command::Outward {
            item,
            quantity,
            given_to,
            site,
            tender_no,
        } => {
            let mut entry = OutwardEntry::new()
                .set_item_id(&item)
                .set_quantity(quantity)
                .set_given_to(&given_to)
                .set_site_name(&site);
            if let Some(tender_no) = tender_no {
                entry = entry.set_tender_no(&tender_no);
            }
            let action = entry.validate_and_finalise(&store.state())?;
            apply(store, action)
        }
        Command::Return {
            item,
            quantity,
            returned_by,
            reason,
        } => {
            let action = ReturnEntry::new()
                .set_item_id(&item)
                .set_quantity(quantity)
                .set_returned_by(&returned_by)
                .set_reason(&reason)
                .validate_and_finalise(&store.state())?;
            apply(store, action)
        }
        Command::List { search } => {
            let items = report::search(store.items(), search.as_deref().unwrap_or(""));
            if items.is_empty() {
                println!("No items found.");
            }
            for item in items {
                print_item_line(item);
            }
            Ok(())
        }
        Command::LowStock => {
            let items = report::low_stock(store.items());
            if items.is_empty() {
                println!("All items are above their reorder level.");
            }
            for item in items {
                println!(
                    "{:<24} {} {} (reorder at {} {})",
                    item.name, item.current_stock, item.unit, item.reorder_level, item.unit
                );
            }
            Ok(())
        }
        Command::Show { id } => {
            let item = store
                .get_item_by_id(&id)
                .with_context(|| format!("No item with id '{id}'"))?;
            print_item_line(item);
            println!("  description:   {}", item.description);
            println!("  opening date:  {}", item.opening_stock_date);
            println!("  last price:    {:.2}", item.purchase_price);
            println!("  average price: {:.2}", report::average_purchase_price(item));
            println!("  movements:     {}", item.history.len());
            Ok(())
        }
        Command::History { id, period, from, to } => {
            let item = store
                .get_item_by_id(&id)
                .with_context(|| format!("No item with id '{id}'"))?;
            let period = match (period, from, to) {
                (Some(PeriodArg::Monthly), _, _) => Some(ReportPeriod::Monthly),
                (Some(PeriodArg::Quarterly), _, _) => Some(ReportPeriod::Quarterly),
                (Some(PeriodArg::Yearly), _, _) => Some(ReportPeriod::Yearly),
                (None, Some(from), Some(to)) => Some(ReportPeriod::Custom { from, to }),
                _ => None,
            };
            let movements: Vec<&StockMovement> = match period {
                Some(period) => report::history_in_period(item, period, Utc::now()),
                None => item.history.iter().collect(),
            };
            if movements.is_empty() {
                println!("No movements in this period.");
            }
            for movement in movements {
                print_movement(movement);
            }
            Ok(())
        }
        Command::Summary => {
            let summary = report::summarize(store.items());
            println!("Item types:     {}", summary.item_types);
            println!("Low stock:      {}", summary.low_stock);
            println!("Units on hand:  {}", summary.units_on_hand);
            Ok(())
        }
    }
}

fn apply(store: &mut Store, action: Action) -> anyhow::Result<()> {
    let label = action.label();
    let failed_before = store.failed_saves();

    match store.dispatch(action).with_context(|| format!("{label} rejected"))? {
        Dispatched::Applied {
            item_id,
            current_stock,
        } => println!("{item_id}: stock now {current_stock}"),
        Dispatched::UnknownItem { item_id } => println!("{item_id}: no such item, nothing recorded"),
    }

    if store.failed_saves() > failed_before {
        anyhow::bail!("The entry was applied but could not be saved; see the log for details");
    }
    Ok(())
}

fn print_item_line(item: &InventoryItem) {
    let flag = if item.is_low_stock() { " LOW" } else { "" };
    println!(
        "{:<20} {:<24} {:>10} {}{}",
        item.id, item.name, item.current_stock, item.unit, flag
    );
}

fn print_movement(movement: &StockMovement) {
    let sign = if movement.kind.is_inbound() { '+' } else { '-' };
    let details = match &movement.kind {
        MovementKind::Inward(d) => format!("from {} (Bill: {})", d.purchaser_name, d.bill_no),
        MovementKind::Outward(d) => match &d.tender_no {
            Some(tender) => format!("to {} (Site: {}, Tender: {})", d.given_to, d.site_name, tender),
            None => format!("to {} (Site: {})", d.given_to, d.site_name),
        },
        MovementKind::Return(d) => format!("from {} (Reason: {})", d.returned_by, d.reason),
    };
    println!(
        "{}  {:<8} {}{:<8} {}",
        movement.date.to_datetime_utc().format("%Y-%m-%d %H:%M"),
        movement.kind.label(),
        sign,
        movement.quantity,
        details
    );
}
