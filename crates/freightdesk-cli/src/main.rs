use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use freightdesk_core::{catalog, CollectionParams, ContentRange, EntityRegistry, QueryAssembler};
use freightdesk_storage::sql::{render_count, render_select};
use serde_json::{json, Value as JsonValue};

#[derive(Parser)]
#[command(name = "freightdesk")]
#[command(about = "Freightdesk query admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a filter/sort/range triple and print the SQL it renders to.
    Explain {
        entity: String,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        range: Option<String>,
        /// Row count used for the Content-Range preview.
        #[arg(long, default_value_t = 0)]
        total: u64,
        /// Reference date for relative date presets (YYYY-MM-DD).
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Write the report here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },
    /// List registered entities with field kinds and sortable fields.
    Entities,
}

struct ExplainRequest {
    filter: Option<String>,
    sort: Option<String>,
    range: Option<String>,
    total: u64,
    today: Option<NaiveDate>,
}

fn explain(registry: &EntityRegistry, entity: &str, req: &ExplainRequest) -> Result<JsonValue> {
    let config = registry.get(entity)?;
    let params = CollectionParams::decode(
        req.filter.as_deref(),
        req.sort.as_deref(),
        req.range.as_deref(),
    )?;
    let mut assembler = QueryAssembler::new(&config);
    if let Some(day) = req.today {
        assembler = assembler.with_today(day);
    }
    let (data, count) = assembler.assemble(&params)?;
    Ok(json!({
        "entity": config.name,
        "predicate": data.predicate.as_ref().map(ToString::to_string),
        "order_by": data.order_by.as_ref().map(ToString::to_string),
        "data": render_select(&data),
        "count": render_count(&count),
        "content_range": ContentRange::format(params.range.as_ref(), req.total),
    }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = catalog::logistics()?;
    match cli.cmd {
        Cmd::Explain {
            entity,
            filter,
            sort,
            range,
            total,
            today,
            out,
        } => {
            let request = ExplainRequest {
                filter,
                sort,
                range,
                total,
                today,
            };
            let report = explain(&registry, &entity, &request)?;
            let text = serde_json::to_string_pretty(&report)?;
            match out {
                Some(path) => std::fs::write(&path, text).with_context(|| format!("writing {path}"))?,
                None => println!("{text}"),
            }
        }
        Cmd::Entities => {
            let listing: Vec<_> = registry
                .iter()
                .map(|e| {
                    json!({
                        "name": e.name,
                        "fields": e
                            .schema
                            .fields()
                            .map(|(name, kind)| (name.to_string(), json!(kind)))
                            .collect::<serde_json::Map<_, _>>(),
                        "sortable": e.sortable,
                        "default_order": e.default_order.as_ref().map(ToString::to_string),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }
    Ok(())
}
