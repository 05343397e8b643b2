/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: calls `aggregate.handle(command)` to get events (pure, no mutation)
/// 2. **Evolve**: applies each event to the aggregate via `aggregate.apply(event)`
///
/// The decided events are returned so the caller can record or persist them.
/// An empty vector means the command was already satisfied.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: customerflow_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use customerflow_core::{Aggregate, AggregateId, AggregateRoot, DomainError};

    #[derive(Debug, Clone)]
    struct Toggle {
        id: AggregateId,
        on: bool,
        version: u64,
    }

    #[derive(Debug, Clone)]
    enum ToggleCommand {
        SwitchOn,
        Explode,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ToggleEvent {
        SwitchedOn,
    }

    impl AggregateRoot for Toggle {
        type Id = AggregateId;

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn version(&self) -> u64 {
            self.version
        }
    }

    impl Aggregate for Toggle {
        type Command = ToggleCommand;
        type Event = ToggleEvent;
        type Error = DomainError;

        fn apply(&mut self, event: &Self::Event) {
            match event {
                ToggleEvent::SwitchedOn => self.on = true,
            }
            self.version += 1;
        }

        fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
            match command {
                ToggleCommand::SwitchOn if self.on => Ok(vec![]),
                ToggleCommand::SwitchOn => Ok(vec![ToggleEvent::SwitchedOn]),
                ToggleCommand::Explode => Err(DomainError::invariant("boom")),
            }
        }
    }

    fn toggle() -> Toggle {
        Toggle {
            id: AggregateId::new(),
            on: false,
            version: 0,
        }
    }

    #[test]
    fn execute_applies_decided_events() {
        let mut t = toggle();
        let events = execute(&mut t, &ToggleCommand::SwitchOn).unwrap();
        assert_eq!(events, vec![ToggleEvent::SwitchedOn]);
        assert!(t.on);
        assert_eq!(t.version(), 1);
    }

    #[test]
    fn execute_returns_nothing_for_satisfied_command() {
        let mut t = toggle();
        execute(&mut t, &ToggleCommand::SwitchOn).unwrap();
        let events = execute(&mut t, &ToggleCommand::SwitchOn).unwrap();
        assert!(events.is_empty());
        assert_eq!(t.version(), 1);
    }

    #[test]
    fn execute_leaves_state_alone_on_error() {
        let mut t = toggle();
        let err = execute(&mut t, &ToggleCommand::Explode).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(!t.on);
        assert_eq!(t.version(), 0);
    }
}
