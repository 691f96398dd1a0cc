//! Materializes the occurrences a recurring template implies for a date window.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{Occurrence, RecurringTemplate};

/// Expands `template` over `[range_start, range_end)`, reconciled against stored
/// `overrides` keyed by slot date.
///
/// Soft-deleted overrides hide their slot, modified overrides replace the template
/// projection for their slot, and every remaining slot is synthesized from the
/// current template. The result is ordered by effective date. Inactive templates, a
/// zero interval, or an empty range produce no occurrences.
pub fn expand(
    template: &RecurringTemplate,
    range_start: NaiveDate,
    range_end: NaiveDate,
    overrides: &HashMap<NaiveDate, Occurrence>,
) -> Vec<Occurrence> {
    let mut result = Vec::new();
    if !template.active || template.interval == 0 || range_end <= range_start {
        return result;
    }

    let frequency = template.frequency;
    let every = template.interval;
    let mut index = frequency.steps_before(template.start_date, every, range_start);

    while let Some(slot) = frequency.nth_date(template.start_date, every, index) {
        if slot >= range_end || template.end_date.is_some_and(|end| slot > end) {
            break;
        }
        if slot >= range_start {
            match overrides.get(&slot) {
                Some(stored) if stored.is_deleted() => {}
                Some(stored) if stored.is_modified() => {
                    let mut occurrence = stored.clone();
                    occurrence.slot_date = slot;
                    occurrence.template_id = template.id;
                    result.push(occurrence);
                }
                _ => result.push(template.project(slot)),
            }
        }
        index = match index.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }

    result.sort_by_key(|occurrence| occurrence.date);
    tracing::debug!(
        template = %template.id,
        start = %range_start,
        end = %range_end,
        occurrences = result.len(),
        "expanded recurring template"
    );
    result
}

/// Expands several templates into one sequence ordered by date, then template id.
pub fn expand_all<'a, I>(
    templates: I,
    range_start: NaiveDate,
    range_end: NaiveDate,
    overrides: &HashMap<Uuid, HashMap<NaiveDate, Occurrence>>,
) -> Vec<Occurrence>
where
    I: IntoIterator<Item = &'a RecurringTemplate>,
{
    let empty = HashMap::new();
    let mut result: Vec<Occurrence> = templates
        .into_iter()
        .flat_map(|template| {
            let stored = overrides.get(&template.id).unwrap_or(&empty);
            expand(template, range_start, range_end, stored)
        })
        .collect();
    result.sort_by_key(|occurrence| (occurrence.date, occurrence.template_id));
    result
}
