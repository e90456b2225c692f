//! Copy-on-write transforms.
//!
//! Every function clones its input, changes the clone and returns it. The
//! input is never modified, even when the transform fails.

use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::document::Document;
use crate::error::{FcsError, Result};
use crate::text::Parameter;

/// Values for a column added by [`enumerate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumerateFill {
    /// Number events 1, 2, 3, ...
    AutoNumber,
    /// The same value for every event.
    Label(f32),
}

/// Keep the rows at `indices`, in that order. Indices may repeat.
pub fn events(document: &Document, indices: &[usize]) -> Result<Document> {
    let tot = document.tot();
    if let Some(bad) = indices.iter().find(|&&i| i >= tot) {
        return Err(FcsError::validation(format!(
            "event index {bad} out of range for {tot} events"
        )));
    }
    let mut out = document.clone();
    out.matrix.select_rows(indices);
    Ok(out)
}

/// Keep rows whose value for `short_name` is `>= min` and `<= max`.
pub fn gate(
    document: &Document,
    short_name: &str,
    min: Option<f32>,
    max: Option<f32>,
) -> Result<Document> {
    if min.is_none() && max.is_none() {
        return Err(FcsError::validation(format!(
            "gate on {short_name:?} needs a minimum or a maximum"
        )));
    }
    let column = document.parameters.index_of(short_name)?;
    let keep: Vec<usize> = document
        .matrix
        .iter_rows()
        .enumerate()
        .filter(|(_, row)| {
            let value = row[column];
            min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
        })
        .map(|(i, _)| i)
        .collect();
    debug!(
        short_name,
        kept = keep.len(),
        total = document.tot(),
        "gated events"
    );
    events(document, &keep)
}

/// Drop OTHER segments and every keyword outside the required set.
#[must_use]
pub fn minimize(document: &Document) -> Document {
    let mut out = document.clone();
    out.strip_to_required();
    out
}

/// Drop OTHER segments only.
#[must_use]
pub fn strip_other(document: &Document) -> Document {
    let mut out = document.clone();
    out.clear_other();
    out
}

/// Stack the events of several documents on their shared parameters.
///
/// The result keeps the primary's keywords and OTHER segments, and the
/// primary's order for the short names every input has.
pub fn concatenate(primary: &Document, others: &[Document]) -> Result<Document> {
    let shared: Vec<&str> = primary
        .parameters
        .short_names()
        .into_iter()
        .filter(|name| !name.is_empty())
        .filter(|name| others.iter().all(|o| o.parameters.index_of(name).is_ok()))
        .collect();
    if shared.is_empty() {
        return Err(FcsError::validation(
            "inputs share no parameter short names",
        ));
    }

    let mut out = primary.clone();
    out.reorder_parameters_by_name(&shared)?;
    for other in others {
        let mut aligned = other.clone();
        aligned.reorder_parameters_by_name(&shared)?;
        out.matrix.append_rows(&aligned.matrix);
    }
    debug!(
        inputs = others.len() + 1,
        parameters = shared.len(),
        events = out.tot(),
        "concatenated documents"
    );
    Ok(out)
}

/// Keep events `start..=end`, counted from 1.
pub fn event_range(document: &Document, start: usize, end: usize) -> Result<Document> {
    let tot = document.tot();
    if start == 0 || end < start || end > tot {
        return Err(FcsError::validation(format!(
            "event range {start}..={end} invalid for {tot} events (1-based)"
        )));
    }
    let indices: Vec<usize> = (start - 1..end).collect();
    events(document, &indices)
}

/// Keep `count` randomly chosen events in their original order.
///
/// When `count >= TOT` every event is kept.
pub fn downsample<R: Rng + ?Sized>(
    document: &Document,
    count: usize,
    rng: &mut R,
) -> Result<Document> {
    let tot = document.tot();
    if count >= tot {
        return Ok(document.clone());
    }
    let mut indices = index::sample(rng, tot, count).into_vec();
    indices.sort_unstable();
    events(document, &indices)
}

/// Add a parameter holding an event number or a constant label.
pub fn enumerate(
    document: &Document,
    short_name: &str,
    position: usize,
    fill: EnumerateFill,
) -> Result<Document> {
    let column: Vec<f32> = match fill {
        EnumerateFill::AutoNumber => (1..=document.tot()).map(|i| i as f32).collect(),
        EnumerateFill::Label(value) => vec![value; document.tot()],
    };
    let mut out = document.clone();
    out.insert_parameter(Parameter::with_defaults(short_name)?, position, &column)?;
    Ok(out)
}

/// Keep only the named parameters, in their current order.
pub fn select_parameters(document: &Document, short_names: &[&str]) -> Result<Document> {
    let mut out = document.clone();
    out.retain_parameters(short_names)?;
    Ok(out)
}

/// Remove the named parameters.
pub fn drop_parameters(document: &Document, short_names: &[&str]) -> Result<Document> {
    let mut out = document.clone();
    out.remove_parameters(short_names)?;
    Ok(out)
}

/// Rearrange parameters by 0-based positions.
pub fn reorder_parameters(document: &Document, positions: &[usize]) -> Result<Document> {
    let mut out = document.clone();
    out.reorder_parameters(positions)?;
    Ok(out)
}
