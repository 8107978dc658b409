//! Command-line surface: browse listings or print the landing page content.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::content::LandingContent;
use crate::display::cell;
use crate::engine::{EngineMode, ListingEngine, ListingView, ViewStatus};
use crate::filter::{
    FilterAction, FlagField, RangeField, SelectField, TextField, TriState, ViewState,
};
use crate::models::Column;
use crate::store::{ListingStore, MemoryStore, PostgrestStore};

/// Browse the Philippine Real Estate Inventory from the terminal.
#[derive(Debug, Parser)]
#[command(name = "listing-scout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch, filter and print listings.
    Listings(ListingsArgs),
    /// Print the landing page feature board and FAQ.
    Landing(LandingArgs),
}

#[derive(Debug, Default, Args)]
pub struct ListingsArgs {
    /// Read rows from a JSON snapshot instead of the hosted table.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Filter in memory (client) or per query (server).
    #[arg(long)]
    pub mode: Option<EngineMode>,

    /// Global search across code, caption, category, city, property type,
    /// bedrooms, property name and unit number.
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub caption: Option<String>,
    #[arg(long)]
    pub property_name: Option<String>,
    #[arg(long)]
    pub floor: Option<String>,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub parking: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long = "type")]
    pub property_type: Option<String>,
    #[arg(long)]
    pub furnishing: Option<String>,
    #[arg(long)]
    pub bedrooms: Option<String>,
    #[arg(long)]
    pub availability: Option<String>,

    /// any, true or false.
    #[arg(long)]
    pub balcony: Option<TriState>,
    /// any, true or false.
    #[arg(long)]
    pub pets: Option<TriState>,

    #[arg(long)]
    pub area_min: Option<String>,
    #[arg(long)]
    pub area_max: Option<String>,
    #[arg(long)]
    pub lease_min: Option<String>,
    #[arg(long)]
    pub lease_max: Option<String>,
    #[arg(long)]
    pub sale_min: Option<String>,
    #[arg(long)]
    pub sale_max: Option<String>,

    /// Column to sort by, like clicking its header (default: updated_at, newest first).
    #[arg(long)]
    pub sort: Option<Column>,

    /// Click the sort header once more.
    #[arg(long)]
    pub reverse: bool,

    /// Rows to print.
    #[arg(long, default_value = "50")]
    pub limit: usize,

    /// Also write the matching rows to this JSON file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl ListingsArgs {
    /// The table interactions these flags stand for, in order
    pub fn actions(&self) -> Vec<FilterAction> {
        let mut actions = Vec::new();

        if let Some(term) = &self.search {
            actions.push(FilterAction::Search(term.clone()));
        }

        let texts = [
            (TextField::Code, &self.code),
            (TextField::Caption, &self.caption),
            (TextField::PropertyName, &self.property_name),
            (TextField::FloorNumber, &self.floor),
            (TextField::UnitNumber, &self.unit),
            (TextField::Parking, &self.parking),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                actions.push(FilterAction::Text(field, value.clone()));
            }
        }

        let selections = [
            (SelectField::Category, &self.category),
            (SelectField::City, &self.city),
            (SelectField::PropertyType, &self.property_type),
            (SelectField::Furnishing, &self.furnishing),
            (SelectField::Bedrooms, &self.bedrooms),
            (SelectField::Availability, &self.availability),
        ];
        for (field, value) in selections {
            if let Some(value) = value {
                actions.push(FilterAction::Select(field, value.clone()));
            }
        }

        for (field, value) in [
            (FlagField::WithBalcony, self.balcony),
            (FlagField::PetFriendly, self.pets),
        ] {
            if let Some(value) = value {
                actions.push(FilterAction::Flag(field, value));
            }
        }

        let ranges = [
            (RangeField::Area, &self.area_min, &self.area_max),
            (RangeField::Lease, &self.lease_min, &self.lease_max),
            (RangeField::Sale, &self.sale_min, &self.sale_max),
        ];
        for (field, min, max) in ranges {
            if let Some(min) = min {
                actions.push(FilterAction::RangeMin(field, min.clone()));
            }
            if let Some(max) = max {
                actions.push(FilterAction::RangeMax(field, max.clone()));
            }
        }

        let sort_column = self.sort.unwrap_or(Column::UpdatedAt);
        if self.sort.is_some() {
            actions.push(FilterAction::SortBy(sort_column));
        }
        if self.reverse {
            actions.push(FilterAction::SortBy(sort_column));
        }

        actions
    }
}

#[derive(Debug, Args)]
pub struct LandingArgs {
    /// Content revision to print instead of the built-in one.
    #[arg(long)]
    pub content: Option<PathBuf>,
}

pub async fn run_listings(args: ListingsArgs) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }

    let store: Arc<dyn ListingStore> = match &args.snapshot {
        Some(path) => Arc::new(MemoryStore::from_json_file(path).await?),
        None => Arc::new(PostgrestStore::new(config.postgrest()?)?),
    };

    let mut state = ViewState::default();
    for action in args.actions() {
        state.apply(action);
    }

    let engine = ListingEngine::with_state(store, config.engine.clone(), state);
    let view = engine.settled().await;

    match view.status() {
        ViewStatus::Failed(message) => bail!("Could not load listings: {message}"),
        ViewStatus::Empty => info!("No listings match the current filters"),
        ViewStatus::Loading | ViewStatus::Ready => print_rows(&view, args.limit),
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&view.rows)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} listings to {}", view.rows.len(), path.display());
    }

    Ok(())
}

fn print_rows(view: &ListingView, limit: usize) {
    match view.total {
        Some(total) if total > view.rows.len() => {
            info!("✅ Showing {} of {} matching listings", view.rows.len().min(limit), total)
        }
        _ => info!("✅ Showing {} listings", view.rows.len().min(limit)),
    }

    for (i, listing) in view.rows.iter().take(limit).enumerate() {
        let caption = cell(listing, Column::Caption);
        let headline = caption.lines().next().unwrap_or_default();
        println!("{}. [{}] {}", i + 1, cell(listing, Column::Code), headline);
        println!(
            "   {} · {} · {} · {} BR",
            cell(listing, Column::City),
            cell(listing, Column::Category),
            cell(listing, Column::PropertyType),
            cell(listing, Column::Bedrooms)
        );
        println!(
            "   Lease: {}  Sale: {}  sqm: {}",
            cell(listing, Column::LeasingPrice),
            cell(listing, Column::SellingPrice),
            cell(listing, Column::AreaSqm)
        );
        println!(
            "   Balcony: {}  Pet: {}  Availability: {}",
            cell(listing, Column::WithBalcony),
            cell(listing, Column::PetFriendly),
            cell(listing, Column::Availability)
        );
        println!("   Updated: {}", cell(listing, Column::UpdatedAt));
        println!();
    }
}

pub async fn run_landing(args: LandingArgs) -> Result<()> {
    let content = match &args.content {
        Some(path) => LandingContent::from_json_file(path).await?,
        None => LandingContent::builtin()?,
    };

    println!("{}", content.title);
    println!("{}", content.tagline);
    println!();
    println!("{}", content.headline);

    for card in &content.cards {
        println!();
        println!("## {}", card.title);
        println!("{}", card.body);
        if let Some(link) = &card.link {
            println!("-> {} ({})", link.label, link.href);
        }
    }

    println!();
    println!(
        "Feature Board: {} features, {} coming soon",
        content.total_features(),
        content.coming_soon().count()
    );
    for group in &content.feature_groups {
        println!();
        println!("{} ({})", group.title, group.items.len());
        if let Some(subtitle) = &group.subtitle {
            println!("{}", subtitle);
        }
        for item in &group.items {
            let note = if item.coming_soon { "  [coming soon]" } else { "" };
            println!("  - {}{}", item.label, note);
        }
    }

    if !content.faqs.is_empty() {
        println!();
        println!("Frequently Asked Questions");
        for faq in &content.faqs {
            println!();
            println!("Q: {}", faq.question);
            println!("A: {}", faq.answer);
        }
    }

    Ok(())
}
