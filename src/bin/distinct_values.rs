use anyhow::Result;
use laserscraper::process::{clean::rules, utils::string_column};
use laserscraper::{build_table, Config};
use std::{collections::HashMap, env, path::PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// List every distinct normalised injury / state / color value in the unioned
/// table with its count, flagging the ones a fixup already rewrites. This is
/// how the fixup tables get curated.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let registry = config.registry()?;
    let fixups = config.fixups()?;

    let (table, summary) = build_table(&registry, &fixups, &config.data_dir)?;
    println!("{} rows from {} sources\n", summary.total_rows, summary.per_source.len());

    for rule in rules(&fixups) {
        let raw = string_column(&table, rule.source)?;
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut nulls = 0;
        for v in raw.iter() {
            match v {
                Some(v) => *counts.entry(rule.case.apply(v.trim())).or_default() += 1,
                None => nulls += 1,
            }
        }

        let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        println!("=== {} → {} ({} distinct, {} null) ===", rule.source, rule.target, sorted.len(), nulls);
        for (value, count) in sorted {
            match rule.table.get(&value) {
                Some(fixed) => println!("{:>7}  {:?} → {:?}", count, value, fixed),
                None => println!("{:>7}  {:?}", count, value),
            }
        }
        println!();
    }
    Ok(())
}
