//! Customer aggregate: commands, events and the decisions between them.

use serde::{Deserialize, Serialize};

use customerflow_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult};
use customerflow_events::{Command, Event, EventEnvelope, execute, ordered_payloads};

use crate::values::{ConfirmationHash, CustomerId, EmailAddress, PersonName};

/// Aggregate type recorded on every envelope of a customer stream.
pub const AGGREGATE_TYPE: &str = "customers.customer";

/// Aggregate root: Customer.
///
/// Built either by [`Customer::register`] or by replaying history through
/// [`Customer::reconstitute`]. Outcomes of commands are never returned; they
/// show up in [`Customer::recorded_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    email_address: EmailAddress,
    confirmation_hash: ConfirmationHash,
    is_email_address_confirmed: bool,
    name: PersonName,
    version: u64,
    recorded_events: Vec<CustomerEvent>,
}

impl Customer {
    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn email_address(&self) -> &EmailAddress {
        &self.email_address
    }

    pub fn confirmation_hash(&self) -> &ConfirmationHash {
        &self.confirmation_hash
    }

    pub fn is_email_address_confirmed(&self) -> bool {
        self.is_email_address_confirmed
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    /// Events produced by commands on this instance, oldest first.
    ///
    /// A reconstituted customer starts with none.
    pub fn recorded_events(&self) -> &[CustomerEvent] {
        &self.recorded_events
    }

    pub fn into_recorded_events(self) -> Vec<CustomerEvent> {
        self.recorded_events
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterCustomer.
///
/// The customer id and the first confirmation hash are generated by
/// [`RegisterCustomer::build`]; callers cannot pick them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterCustomer {
    customer_id: CustomerId,
    email_address: EmailAddress,
    confirmation_hash: ConfirmationHash,
    name: PersonName,
}

impl RegisterCustomer {
    pub fn build(email_address: &str, given_name: &str, family_name: &str) -> DomainResult<Self> {
        Ok(Self {
            customer_id: CustomerId::generate(),
            email_address: EmailAddress::parse(email_address)?,
            confirmation_hash: ConfirmationHash::generate(),
            name: PersonName::build(given_name, family_name)?,
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn email_address(&self) -> &EmailAddress {
        &self.email_address
    }

    pub fn confirmation_hash(&self) -> &ConfirmationHash {
        &self.confirmation_hash
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }
}

/// Command: ConfirmCustomerEmailAddress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmCustomerEmailAddress {
    pub customer_id: CustomerId,
    pub confirmation_hash: ConfirmationHash,
}

impl ConfirmCustomerEmailAddress {
    pub fn new(customer_id: CustomerId, confirmation_hash: ConfirmationHash) -> Self {
        Self {
            customer_id,
            confirmation_hash,
        }
    }

    /// Build from raw input, e.g. the two halves of a confirmation link.
    pub fn build(customer_id: &str, confirmation_hash: &str) -> DomainResult<Self> {
        let customer_id = customerflow_core::require("customer_id", Some(customer_id))?;
        Ok(Self::new(
            customer_id.parse()?,
            ConfirmationHash::parse(confirmation_hash)?,
        ))
    }
}

/// Command: ChangeCustomerEmailAddress.
///
/// Carries the confirmation hash for the new address, generated on
/// construction. The hash is not serialized and deserialization mints a new
/// one, so it never comes from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChangeEmailAddressRequest")]
pub struct ChangeCustomerEmailAddress {
    customer_id: CustomerId,
    email_address: EmailAddress,
    #[serde(skip_serializing)]
    confirmation_hash: ConfirmationHash,
}

#[derive(Deserialize)]
struct ChangeEmailAddressRequest {
    customer_id: CustomerId,
    email_address: EmailAddress,
}

impl From<ChangeEmailAddressRequest> for ChangeCustomerEmailAddress {
    fn from(req: ChangeEmailAddressRequest) -> Self {
        Self::new(req.customer_id, req.email_address)
    }
}

impl ChangeCustomerEmailAddress {
    pub fn new(customer_id: CustomerId, email_address: EmailAddress) -> Self {
        Self {
            customer_id,
            email_address,
            confirmation_hash: ConfirmationHash::generate(),
        }
    }

    pub fn build(customer_id: &str, email_address: &str) -> DomainResult<Self> {
        let customer_id = customerflow_core::require("customer_id", Some(customer_id))?;
        Ok(Self::new(
            customer_id.parse()?,
            EmailAddress::parse(email_address)?,
        ))
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn email_address(&self) -> &EmailAddress {
        &self.email_address
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerCommand {
    ConfirmCustomerEmailAddress(ConfirmCustomerEmailAddress),
    ChangeCustomerEmailAddress(ChangeCustomerEmailAddress),
}

impl Command for CustomerCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            CustomerCommand::ConfirmCustomerEmailAddress(cmd) => cmd.customer_id.into(),
            CustomerCommand::ChangeCustomerEmailAddress(cmd) => cmd.customer_id.into(),
        }
    }
}

/// Event: CustomerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub customer_id: CustomerId,
    pub email_address: EmailAddress,
    pub confirmation_hash: ConfirmationHash,
    pub name: PersonName,
}

/// Event: CustomerEmailAddressConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEmailAddressConfirmed {
    pub customer_id: CustomerId,
}

/// Event: CustomerEmailAddressConfirmationFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEmailAddressConfirmationFailed {
    pub customer_id: CustomerId,
}

/// Event: CustomerEmailAddressChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEmailAddressChanged {
    pub customer_id: CustomerId,
    pub email_address: EmailAddress,
    pub confirmation_hash: ConfirmationHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerEvent {
    CustomerRegistered(CustomerRegistered),
    CustomerEmailAddressConfirmed(CustomerEmailAddressConfirmed),
    CustomerEmailAddressConfirmationFailed(CustomerEmailAddressConfirmationFailed),
    CustomerEmailAddressChanged(CustomerEmailAddressChanged),
}

impl CustomerEvent {
    pub fn customer_id(&self) -> CustomerId {
        match self {
            CustomerEvent::CustomerRegistered(e) => e.customer_id,
            CustomerEvent::CustomerEmailAddressConfirmed(e) => e.customer_id,
            CustomerEvent::CustomerEmailAddressConfirmationFailed(e) => e.customer_id,
            CustomerEvent::CustomerEmailAddressChanged(e) => e.customer_id,
        }
    }
}

impl Event for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::CustomerRegistered(_) => "customers.customer.registered",
            CustomerEvent::CustomerEmailAddressConfirmed(_) => {
                "customers.customer.email_address_confirmed"
            }
            CustomerEvent::CustomerEmailAddressConfirmationFailed(_) => {
                "customers.customer.email_address_confirmation_failed"
            }
            CustomerEvent::CustomerEmailAddressChanged(_) => {
                "customers.customer.email_address_changed"
            }
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl Aggregate for Customer {
    type Command = CustomerCommand;
    type Event = CustomerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CustomerEvent::CustomerRegistered(e) => {
                self.id = e.customer_id;
                self.email_address = e.email_address.clone();
                self.confirmation_hash = e.confirmation_hash.clone();
                self.name = e.name.clone();
                self.is_email_address_confirmed = false;
            }
            CustomerEvent::CustomerEmailAddressConfirmed(_) => {
                self.is_email_address_confirmed = true;
            }
            CustomerEvent::CustomerEmailAddressConfirmationFailed(_) => {}
            CustomerEvent::CustomerEmailAddressChanged(e) => {
                self.email_address = e.email_address.clone();
                self.confirmation_hash = e.confirmation_hash.clone();
                self.is_email_address_confirmed = false;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_customer_id(command.target_aggregate_id())?;

        let event = match command {
            CustomerCommand::ConfirmCustomerEmailAddress(cmd) => self.decide_confirmation(cmd),
            CustomerCommand::ChangeCustomerEmailAddress(cmd) => self.decide_change(cmd),
        };

        Ok(event.into_iter().collect())
    }
}

impl Customer {
    /// Register a brand-new customer.
    ///
    /// The returned customer has exactly one recorded event, `CustomerRegistered`.
    pub fn register(command: RegisterCustomer) -> Self {
        let registered = CustomerRegistered {
            customer_id: command.customer_id,
            email_address: command.email_address,
            confirmation_hash: command.confirmation_hash,
            name: command.name,
        };

        let mut customer = Self::unapplied(&registered);
        let event = CustomerEvent::CustomerRegistered(registered);
        customer.apply(&event);
        customer.note_recorded(&event);
        customer.recorded_events.push(event);
        customer
    }

    /// Rebuild a customer by folding its history, oldest first.
    ///
    /// The history must start with `CustomerRegistered` and every event must
    /// belong to the same customer. Nothing is recorded.
    pub fn reconstitute<'a>(
        history: impl IntoIterator<Item = &'a CustomerEvent>,
    ) -> DomainResult<Self> {
        let mut history = history.into_iter();

        let first = history
            .next()
            .ok_or_else(|| DomainError::invariant("cannot reconstitute a customer from an empty history"))?;
        let CustomerEvent::CustomerRegistered(registered) = first else {
            return Err(DomainError::invariant(format!(
                "customer history must start with registration, found '{}'",
                first.event_type()
            )));
        };

        let mut customer = Self::unapplied(registered);
        customer.apply(first);

        for event in history {
            customer.ensure_customer_id(event.customer_id().into())?;
            if let CustomerEvent::CustomerRegistered(_) = event {
                return Err(DomainError::conflict(format!(
                    "customer {} is registered more than once in its history",
                    customer.id
                )));
            }
            customer.apply(event);
        }

        Ok(customer)
    }

    /// Rebuild a customer from a persisted stream.
    pub fn reconstitute_from_envelopes(
        envelopes: &[EventEnvelope<CustomerEvent>],
    ) -> DomainResult<Self> {
        if let Some(first) = envelopes.first() {
            if first.aggregate_type() != AGGREGATE_TYPE {
                return Err(DomainError::invariant(format!(
                    "stream of '{}' is not a customer stream",
                    first.aggregate_type()
                )));
            }
        }

        let (history, cursor) =
            ordered_payloads(envelopes).map_err(|e| DomainError::invariant(e.to_string()))?;

        // New envelopes are numbered from the event count, so the stream must be 1..=n.
        if cursor.last_sequence_number() != history.len() as u64 {
            return Err(DomainError::invariant(format!(
                "customer stream {} is not numbered 1..={} (last sequence {})",
                cursor.aggregate_id(),
                history.len(),
                cursor.last_sequence_number()
            )));
        }

        let customer = Self::reconstitute(&history)?;
        if customer.id.as_aggregate_id() != cursor.aggregate_id() {
            return Err(DomainError::invariant(format!(
                "stream {} carries events of customer {}",
                cursor.aggregate_id(),
                customer.id
            )));
        }
        Ok(customer)
    }

    pub fn confirm_email_address(&mut self, command: ConfirmCustomerEmailAddress) -> DomainResult<()> {
        self.dispatch(CustomerCommand::ConfirmCustomerEmailAddress(command))
    }

    pub fn change_email_address(&mut self, command: ChangeCustomerEmailAddress) -> DomainResult<()> {
        self.dispatch(CustomerCommand::ChangeCustomerEmailAddress(command))
    }

    /// Decide, apply and record. An `Err` means the command itself was unusable.
    pub fn dispatch(&mut self, command: CustomerCommand) -> DomainResult<()> {
        let events = execute(self, &command)?;
        if events.is_empty() {
            tracing::debug!(customer_id = %self.id, ?command, "command already satisfied");
        }
        for event in &events {
            self.note_recorded(event);
        }
        self.recorded_events.extend(events);
        Ok(())
    }

    /// Wrap the recorded events for appending to this customer's stream.
    ///
    /// Sequence numbers continue from the history the customer was built on.
    pub fn recorded_envelopes(&self) -> Vec<EventEnvelope<CustomerEvent>> {
        let base = self.version - self.recorded_events.len() as u64;
        self.recorded_events
            .iter()
            .zip(base + 1..)
            .map(|(event, seq)| {
                EventEnvelope::wrap(self.id.as_aggregate_id(), AGGREGATE_TYPE, seq, event.clone())
            })
            .collect()
    }

    // Storage for the fold; `apply` performs the registration transition itself.
    fn unapplied(registered: &CustomerRegistered) -> Self {
        Self {
            id: registered.customer_id,
            email_address: registered.email_address.clone(),
            confirmation_hash: registered.confirmation_hash.clone(),
            is_email_address_confirmed: false,
            name: registered.name.clone(),
            version: 0,
            recorded_events: Vec::new(),
        }
    }

    fn ensure_customer_id(&self, target: AggregateId) -> DomainResult<()> {
        if self.id.as_aggregate_id() != target {
            return Err(DomainError::invariant(format!(
                "customer_id mismatch (this is {}, got {target})",
                self.id
            )));
        }
        Ok(())
    }

    fn decide_confirmation(&self, cmd: &ConfirmCustomerEmailAddress) -> Option<CustomerEvent> {
        let hash_matches = cmd.confirmation_hash == self.confirmation_hash;

        match (self.is_email_address_confirmed, hash_matches) {
            (false, true) => Some(CustomerEvent::CustomerEmailAddressConfirmed(
                CustomerEmailAddressConfirmed {
                    customer_id: self.id,
                },
            )),
            (true, true) => None,
            // A wrong hash is reported even after confirmation.
            (_, false) => Some(CustomerEvent::CustomerEmailAddressConfirmationFailed(
                CustomerEmailAddressConfirmationFailed {
                    customer_id: self.id,
                },
            )),
        }
    }

    fn decide_change(&self, cmd: &ChangeCustomerEmailAddress) -> Option<CustomerEvent> {
        if cmd.email_address == self.email_address {
            return None;
        }

        Some(CustomerEvent::CustomerEmailAddressChanged(
            CustomerEmailAddressChanged {
                customer_id: self.id,
                email_address: cmd.email_address.clone(),
                confirmation_hash: cmd.confirmation_hash.clone(),
            },
        ))
    }

    fn note_recorded(&self, event: &CustomerEvent) {
        if let CustomerEvent::CustomerEmailAddressConfirmationFailed(_) = event {
            tracing::warn!(customer_id = %self.id, "email address confirmation failed");
        }
        tracing::debug!(
            customer_id = %self.id,
            event_type = event.event_type(),
            version = self.version,
            "recorded customer event"
        );
    }
}
