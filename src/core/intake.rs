//! Submission flow around the extraction call.
//!
//! At most one extraction is outstanding at a time. That is a property of the
//! [`IntakeState`] (the `Processing` variant), not of a lock.

use crate::core::ledger::LedgerStore;
use crate::core::workflow::Draft;
use crate::domain::model::OrderRecord;
use crate::domain::ports::{ExtractionRequest, Extractor, Storage};
use crate::domain::pricing::PriceSchedule;
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::Validate;

impl Validate for ExtractionRequest {
    fn validate(&self) -> Result<()> {
        let missing = if self.service_name.trim().is_empty() {
            Some("service_name")
        } else if self.weight_photo.is_empty() {
            Some("weight_photo")
        } else if self.customer_photo.is_empty() {
            Some("customer_photo")
        } else {
            None
        };

        match missing {
            Some(field) => Err(LedgerError::InputIncomplete {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IntakeState {
    Input,
    Processing { ticket: u64 },
    Review(Box<Draft>),
    /// Dismissible banner; the submitted inputs are gone.
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct Intake {
    state: IntakeState,
    next_ticket: u64,
    schedule: PriceSchedule,
}

impl Intake {
    pub fn new(schedule: PriceSchedule) -> Self {
        Self {
            state: IntakeState::Input,
            next_ticket: 1,
            schedule,
        }
    }

    pub fn state(&self) -> &IntakeState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, IntakeState::Processing { .. })
    }

    /// Whether the submit control would be enabled for `request`.
    pub fn can_submit(&self, request: &ExtractionRequest) -> bool {
        matches!(self.state, IntakeState::Input | IntakeState::Failed { .. })
            && request.validate().is_ok()
    }

    /// Moves to `Processing` and hands back the ticket the result must be resolved with.
    pub fn submit(&mut self, request: &ExtractionRequest) -> Result<u64> {
        match self.state {
            IntakeState::Processing { .. } => return Err(LedgerError::ExtractionInFlight),
            IntakeState::Review(_) => {
                return Err(LedgerError::InvalidState {
                    message: "confirm or discard the current draft first".to_string(),
                })
            }
            IntakeState::Input | IntakeState::Failed { .. } => {}
        }
        request.validate()?;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.state = IntakeState::Processing { ticket };
        tracing::info!(
            "📸 Submitted '{}' for extraction (ticket {})",
            request.service_name.trim(),
            ticket
        );
        Ok(ticket)
    }

    /// Delivers a successful extraction. Returns `false` when the ticket is stale.
    pub fn complete(&mut self, ticket: u64, record: OrderRecord) -> bool {
        if !self.owns(ticket) {
            tracing::warn!(
                "Dropping extraction result for ticket {}: operator moved on",
                ticket
            );
            return false;
        }
        tracing::debug!("Extraction {} produced order {}", ticket, record.timestamp);
        self.state = IntakeState::Review(Box::new(Draft::new(record, self.schedule)));
        true
    }

    /// Delivers a failed extraction. Returns `false` when the ticket is stale.
    pub fn fail(&mut self, ticket: u64, error: &LedgerError) -> bool {
        if !self.owns(ticket) {
            tracing::warn!(
                "Dropping extraction error for ticket {}: operator moved on ({})",
                ticket,
                error
            );
            return false;
        }
        tracing::error!("❌ Extraction {} failed: {}", ticket, error);
        self.state = IntakeState::Failed {
            message: error.user_friendly_message(),
        };
        true
    }

    pub fn resolve(&mut self, ticket: u64, outcome: Result<OrderRecord>) -> bool {
        match outcome {
            Ok(record) => self.complete(ticket, record),
            Err(e) => self.fail(ticket, &e),
        }
    }

    /// Submit, await the extractor, resolve. On failure the state shows the banner and
    /// the error is also returned.
    pub async fn run<E>(&mut self, extractor: &E, request: &ExtractionRequest) -> Result<()>
    where
        E: Extractor + ?Sized,
    {
        let ticket = self.submit(request)?;
        match extractor.extract(request).await {
            // 同一個呼叫內 ticket 不會過期
            Ok(record) => {
                let delivered = self.complete(ticket, record);
                debug_assert!(delivered);
                Ok(())
            }
            Err(e) => {
                let delivered = self.fail(ticket, &e);
                debug_assert!(delivered);
                Err(e)
            }
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            IntakeState::Review(draft) => Some(&**draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            IntakeState::Review(draft) => Some(&mut **draft),
            _ => None,
        }
    }

    /// Appends the reviewed draft to the ledger and returns its timestamp.
    pub fn confirm<S: Storage>(&mut self, store: &mut LedgerStore<S>) -> Result<i64> {
        match std::mem::replace(&mut self.state, IntakeState::Input) {
            IntakeState::Review(draft) => {
                let record = draft.confirm();
                let timestamp = record.timestamp;
                store.append(record);
                tracing::info!("✅ Order {} saved", timestamp);
                Ok(timestamp)
            }
            other => {
                self.state = other;
                Err(LedgerError::InvalidState {
                    message: "no draft to confirm".to_string(),
                })
            }
        }
    }

    pub fn discard(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, IntakeState::Input) {
            IntakeState::Review(draft) => {
                draft.discard();
                Ok(())
            }
            other => {
                self.state = other;
                Err(LedgerError::InvalidState {
                    message: "no draft to discard".to_string(),
                })
            }
        }
    }

    pub fn dismiss(&mut self) {
        if let IntakeState::Failed { .. } = self.state {
            self.state = IntakeState::Input;
        }
    }

    /// Operator navigated away. Any in-flight ticket becomes stale.
    pub fn reset(&mut self) {
        if let IntakeState::Processing { ticket } = self.state {
            tracing::info!("Abandoning extraction ticket {}", ticket);
        }
        self.state = IntakeState::Input;
    }

    fn owns(&self, ticket: u64) -> bool {
        matches!(self.state, IntakeState::Processing { ticket: current } if current == ticket)
    }
}
