use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    core::expander::expand,
    ledger::{FlowType, Ledger, Occurrence, OccurrenceState, RecurringTemplate},
};

use super::{ServiceError, ServiceResult};

/// What [`TemplateService::remove`] did with the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRemoval {
    /// Stored occurrences exist, so the template was only deactivated.
    Deactivated,
    Deleted,
}

pub struct TemplateService;

impl TemplateService {
    pub fn create(ledger: &mut Ledger, template: RecurringTemplate) -> ServiceResult<Uuid> {
        Self::validate(ledger, &template)?;
        let id = ledger.add_template(template);
        tracing::info!(template = %id, "recurring template created");
        Ok(id)
    }

    /// Replaces the editable fields of template `id`. Stored occurrences keep
    /// their slots, so they only stay attached while the new schedule still
    /// produces those dates.
    pub fn edit(ledger: &mut Ledger, id: Uuid, changes: RecurringTemplate) -> ServiceResult<()> {
        Self::validate(ledger, &changes)?;
        let template = ledger
            .template_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Template not found".into()))?;
        template.amount = changes.amount;
        template.flow = changes.flow;
        template.category_id = changes.category_id;
        template.account_id = changes.account_id;
        template.start_date = changes.start_date;
        template.frequency = changes.frequency;
        template.interval = changes.interval;
        template.end_date = changes.end_date;
        template.note = changes.note;
        ledger.touch();
        Ok(())
    }

    pub fn set_active(ledger: &mut Ledger, id: Uuid, active: bool) -> ServiceResult<()> {
        let template = ledger
            .template_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Template not found".into()))?;
        template.active = active;
        ledger.touch();
        Ok(())
    }

    /// Deletes a template without history, or deactivates it once any of its
    /// occurrences were stored.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<TemplateRemoval> {
        if ledger.template(id).is_none() {
            return Err(ServiceError::Invalid("Template not found".into()));
        }
        if ledger.has_overrides(id) {
            Self::set_active(ledger, id, false)?;
            tracing::info!(template = %id, "recurring template deactivated");
            Ok(TemplateRemoval::Deactivated)
        } else {
            ledger.remove_template(id);
            tracing::info!(template = %id, "recurring template deleted");
            Ok(TemplateRemoval::Deleted)
        }
    }

    /// Stores an individually edited occurrence for the slot it names.
    pub fn modify_occurrence(ledger: &mut Ledger, changes: Occurrence) -> ServiceResult<()> {
        let template = Self::scheduled_template(ledger, changes.template_id, changes.slot_date)?;
        Self::validate_amount(changes.amount)?;
        if let Some(category_id) = changes.category_id {
            Self::require_category(ledger, category_id)?;
        }
        if ledger.account(changes.account_id).is_none() {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        ledger.upsert_occurrence(Occurrence {
            flow: template.flow,
            state: OccurrenceState::Modified,
            ..changes
        });
        Ok(())
    }

    /// Soft-deletes the occurrence at `slot_date`; it stays stored for audit.
    pub fn delete_occurrence(
        ledger: &mut Ledger,
        template_id: Uuid,
        slot_date: NaiveDate,
    ) -> ServiceResult<()> {
        let template = Self::scheduled_template(ledger, template_id, slot_date)?;
        let mut deleted = ledger
            .overrides_for_template(template_id)
            .remove(&slot_date)
            .unwrap_or_else(|| template.project(slot_date));
        deleted.state = OccurrenceState::Deleted;
        ledger.upsert_occurrence(deleted);
        Ok(())
    }

    /// Occurrences of template `id` over `[start, end)`, overrides applied.
    pub fn occurrences(
        ledger: &Ledger,
        id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<Occurrence>> {
        let template = ledger
            .template(id)
            .ok_or_else(|| ServiceError::Invalid("Template not found".into()))?;
        Ok(expand(template, start, end, &ledger.overrides_for_template(id)))
    }

    fn scheduled_template(
        ledger: &Ledger,
        template_id: Uuid,
        slot_date: NaiveDate,
    ) -> ServiceResult<RecurringTemplate> {
        let template = ledger
            .template(template_id)
            .ok_or_else(|| ServiceError::Invalid("Template not found".into()))?;
        if !template.active {
            return Err(ServiceError::Invalid("Template is inactive".into()));
        }
        let next = slot_date
            .succ_opt()
            .ok_or_else(|| ServiceError::Invalid("Date out of range".into()))?;
        if expand(template, slot_date, next, &HashMap::new()).is_empty() {
            return Err(ServiceError::Invalid(format!(
                "Template does not occur on {}",
                slot_date
            )));
        }
        Ok(template.clone())
    }

    fn validate(ledger: &Ledger, template: &RecurringTemplate) -> ServiceResult<()> {
        if template.interval == 0 {
            return Err(ServiceError::Invalid("Interval must be at least 1".into()));
        }
        Self::validate_amount(template.amount)?;
        if template.flow == FlowType::Transfer {
            return Err(ServiceError::Invalid(
                "Transfers cannot be scheduled as recurring templates".into(),
            ));
        }
        if template
            .end_date
            .is_some_and(|end| end < template.start_date)
        {
            return Err(ServiceError::Invalid("End date precedes start date".into()));
        }
        if ledger.account(template.account_id).is_none() {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        if let Some(category_id) = template.category_id {
            Self::require_category(ledger, category_id)?;
        }
        Ok(())
    }

    fn validate_amount(amount: f64) -> ServiceResult<()> {
        if amount.is_finite() && amount > 0.0 {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Amount must be positive".into()))
        }
    }

    fn require_category(ledger: &Ledger, category_id: Uuid) -> ServiceResult<()> {
        ledger
            .category(category_id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::Invalid("Category not found".into()))
    }
}
