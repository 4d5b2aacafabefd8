//! Terminal front-end for the reel and the price calculator.
//!
//! ```text
//! skinvault open [--skip-after <ms>] <label>...
//! skinvault quote <units>
//! skinvault value <rank|-> [bundle]...
//! ```

use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};

use skinvault_core::{InventoryId, Item, ItemId};
use skinvault_events::{EventBus, InMemoryEventBus};
use skinvault_inventory::{InMemoryInventoryStore, WinRecorder};
use skinvault_observability::tracing::LogFormat;
use skinvault_pricing::{AccountValuation, BundleCatalog, PurchasePlan, Rank, solve, vp_tiers};
use skinvault_reveal::{RevealConfig, RevealEvent, RevealScheduler, StartOutcome};

const STRIP_SLOTS: usize = 5;

fn main() -> anyhow::Result<()> {
    let format = match std::env::var("SKINVAULT_LOG_FORMAT").as_deref() {
        Ok("pretty") => LogFormat::Pretty,
        _ => LogFormat::Json,
    };
    skinvault_observability::tracing::init(format);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "open" => open(rest),
        Some((cmd, rest)) if cmd == "quote" => quote(rest),
        Some((cmd, rest)) if cmd == "value" => value(rest),
        _ => bail!("usage: skinvault <open|quote|value> ..."),
    }
}

fn open(args: &[String]) -> anyhow::Result<()> {
    let (skip_after, labels) = match args {
        [flag, ms, rest @ ..] if flag == "--skip-after" => {
            let ms: u64 = ms.parse().context("--skip-after expects milliseconds")?;
            (Some(Duration::from_millis(ms)), rest)
        }
        _ => (None, args),
    };
    if labels.is_empty() {
        bail!("open needs at least one item label");
    }
    let items: Vec<Item> = labels
        .iter()
        .map(|label| Item::new(ItemId::new(), label.as_str()))
        .collect();

    let bus = Arc::new(InMemoryEventBus::<RevealEvent>::new());
    let events = bus.subscribe();
    let scheduler = RevealScheduler::new(RevealConfig::from_env(), bus)?;
    let mut recorder = WinRecorder::open(InventoryId::new(), InMemoryInventoryStore::new())?;

    let StartOutcome::Started(handle) = scheduler.open(items)? else {
        bail!("a spin is already running");
    };
    let started = Instant::now();

    loop {
        if skip_after.is_some_and(|after| started.elapsed() >= after) && scheduler.is_spinning() {
            scheduler.skip();
        }

        let event = match events.recv_timeout(Duration::from_millis(10)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => bail!("reveal stream closed before a win"),
        };

        match &event {
            RevealEvent::Frame(frame) => println!("{}", strip(&frame.state)),
            RevealEvent::Settled(settled) => {
                println!("{}", strip(&settled.state));
                if settled.skipped {
                    println!("(skipped)");
                }
            }
            RevealEvent::ItemWon(won) => println!("You received: {}", won.item),
            RevealEvent::SpinStarted(_) | RevealEvent::SlowedDown { .. } => {}
        }

        recorder.on_event(&event)?;
        if matches!(event, RevealEvent::ItemWon(_)) {
            break;
        }
    }
    handle.wait();

    println!("inventory: {} item(s)", recorder.inventory().total_quantity());
    Ok(())
}

fn strip(state: &skinvault_reveal::ReelState) -> String {
    let centre = (STRIP_SLOTS - 1) / 2;
    state
        .window(STRIP_SLOTS)
        .iter()
        .enumerate()
        .map(|(slot, item)| {
            if slot == centre {
                format!("[{}]", item.label)
            } else {
                item.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn quote(args: &[String]) -> anyhow::Result<()> {
    let [units] = args else {
        bail!("quote expects exactly one units amount");
    };
    let units: i64 = units.parse().context("units must be an integer")?;
    let plan = solve(units, &vp_tiers())?;
    print_plan(&plan);
    Ok(())
}

fn value(args: &[String]) -> anyhow::Result<()> {
    let Some((rank, bundles)) = args.split_first() else {
        bail!("value expects a rank (or '-') followed by bundle names");
    };
    let rank = match rank.as_str() {
        "-" => None,
        name => Some(name.parse::<Rank>()?),
    };

    let valuation = AccountValuation::compute(
        &BundleCatalog::new(),
        bundles.iter().map(String::as_str),
        rank,
        &vp_tiers(),
    )?;

    println!("bundles: {} units", valuation.bundle_units);
    print_plan(&valuation.plan);
    if let Some(rank) = valuation.rank {
        println!("rank {rank}: ${}", valuation.rank_value);
    }
    println!("account value: ${}", valuation.total);
    Ok(())
}

fn print_plan(plan: &PurchasePlan) {
    for line in &plan.line_items {
        println!(
            "  {} x {} units @ ${} = ${}",
            line.quantity,
            line.tier.total_units,
            line.tier.cost,
            line.cost
        );
    }
    println!(
        "total: ${} for {} units",
        plan.total_cost,
        plan.units_provided()
    );
}
