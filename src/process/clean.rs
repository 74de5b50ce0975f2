// src/process/clean.rs
use anyhow::Result;
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field},
    record_batch::RecordBatch,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

use super::{
    fixups::Fixups,
    utils::{append_columns, string_column},
    COLORS_CLEAN, INJURY, INJURY_CLEAN, LASER_COLOR, STATE, STATE_CLEAN,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
}

impl Case {
    pub fn apply(self, s: &str) -> String {
        match self {
            Case::Upper => s.to_uppercase(),
            Case::Lower => s.to_lowercase(),
        }
    }
}

/// Trim, fold case, then swap in the fixup if there is one. Nulls stay null.
pub fn clean(raw: Option<&str>, fixups: &HashMap<String, String>, case: Case) -> Option<String> {
    raw.map(|r| {
        let norm = case.apply(r.trim());
        match fixups.get(&norm) {
            Some(fixed) => fixed.clone(),
            None => norm,
        }
    })
}

/// Which raw column feeds which clean column, and how.
pub struct CleanRule<'a> {
    pub source: &'static str,
    pub target: &'static str,
    pub table: &'a HashMap<String, String>,
    pub case: Case,
}

pub fn rules(fixups: &Fixups) -> [CleanRule<'_>; 3] {
    [
        CleanRule {
            source: INJURY,
            target: INJURY_CLEAN,
            table: &fixups.injury,
            case: Case::Upper,
        },
        CleanRule {
            source: STATE,
            target: STATE_CLEAN,
            table: &fixups.state,
            case: Case::Upper,
        },
        CleanRule {
            source: LASER_COLOR,
            target: COLORS_CLEAN,
            table: &fixups.color,
            case: Case::Lower,
        },
    ]
}

/// Per clean column, how many values a fixup entry rewrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanStats {
    pub fixed: Vec<(&'static str, usize)>,
}

/// Append `injury_clean`, `state_clean` and `colors_clean`.
#[tracing::instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn add_clean_columns(batch: &RecordBatch, fixups: &Fixups) -> Result<(RecordBatch, CleanStats)> {
    let mut extra = Vec::new();
    let mut stats = CleanStats::default();

    for rule in rules(fixups) {
        let raw = string_column(batch, rule.source)?;
        let mut fixed = 0;
        let cleaned: StringArray = raw
            .iter()
            .map(|v| {
                let out = clean(v, rule.table, rule.case);
                if let (Some(v), Some(o)) = (v, out.as_deref()) {
                    if rule.case.apply(v.trim()) != o {
                        fixed += 1;
                    }
                }
                out
            })
            .collect();
        debug!(column = rule.target, fixed, "cleaned");
        stats.fixed.push((rule.target, fixed));
        extra.push((
            Field::new(rule.target, DataType::Utf8, true),
            Arc::new(cleaned) as ArrayRef,
        ));
    }

    info!(fixed = ?stats.fixed, "categorical columns cleaned");
    Ok((append_columns(batch, extra)?, stats))
}
