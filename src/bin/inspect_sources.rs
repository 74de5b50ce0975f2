use anyhow::{Context, Result};
use laserscraper::registry::Extraction;
use laserscraper::workbook;
use laserscraper::Config;
use std::{env, path::PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Print, for every registered source, its sheets and the header row the
/// loader will see. Run this after a new yearly file shows up to write its recipe.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let registry = config.registry()?;

    for recipe in registry.sources() {
        let path = recipe.path(&config.data_dir);
        println!("=== {} ({}) ===", recipe.id, path.display());
        if !path.exists() {
            println!("  MISSING");
            continue;
        }

        let mut wb = workbook::open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        let names = wb.sheet_names();
        println!("  sheets: {}", names.join(", "));

        let wanted: Vec<String> = match &recipe.extraction {
            Extraction::Named { sheets } => sheets.iter().map(|s| s.sheet.clone()).collect(),
            Extraction::Positional => recipe
                .sheet
                .clone()
                .or_else(|| names.first().cloned())
                .into_iter()
                .collect(),
        };

        for name in wanted {
            if !names.contains(&name) {
                println!("  [{}] not in workbook", name);
                continue;
            }
            let sheet = wb.read_sheet(&name)?;
            let header: Vec<&str> = sheet
                .rows
                .get(recipe.skip_rows)
                .map(|r| r.iter().map(|c| c.as_deref().unwrap_or("")).collect())
                .unwrap_or_default();
            println!(
                "  [{}] {} rows, {} cols, header @{}: {:?}",
                name,
                sheet.rows.len(),
                sheet.width(),
                recipe.skip_rows,
                header
            );
        }
    }
    Ok(())
}
