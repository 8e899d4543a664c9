//! `--segment ID:COLUMNS` parsing.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Error, Result};
use strip_map::SegmentMap;

/// Upper bound on the columns a single `a-b` range may expand to.
const MAX_RANGE_LEN: usize = 4096;

/// A controller id with its column table, as typed on the command line.
///
/// Columns are comma separated; `a-b` expands to the inclusive range and
/// counts down when `a > b`, so `2:31-0` wires the grid mirrored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentArg {
    pub controller_id: u8,
    pub columns: Vec<usize>,
}

impl SegmentArg {
    pub fn into_map(self) -> SegmentMap {
        SegmentMap::new(self.controller_id, self.columns)
    }
}

impl FromStr for SegmentArg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, columns) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected ID:COLUMNS, got {s:?}"))?;
        let controller_id = id
            .trim()
            .parse()
            .with_context(|| format!("controller id {id:?} is not a number in 0..=255"))?;

        let mut out = Vec::new();
        for part in columns.split(',').map(str::trim) {
            if part.is_empty() {
                bail!("empty column entry in {s:?}");
            }
            match part.split_once('-') {
                Some((from, to)) => {
                    let from = parse_column(from)?;
                    let to = parse_column(to)?;
                    if from.abs_diff(to) >= MAX_RANGE_LEN {
                        bail!("range {part:?} spans more than {MAX_RANGE_LEN} columns");
                    }
                    if from <= to {
                        out.extend(from..=to);
                    } else {
                        out.extend((to..=from).rev());
                    }
                }
                None => out.push(parse_column(part)?),
            }
        }
        Ok(Self {
            controller_id,
            columns: out,
        })
    }
}

fn parse_column(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .with_context(|| format!("column {text:?} is not a number"))
}
