use crate::{stmt::Value, Error, Result};

/// Operations that publish `Before` and `After` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    First,
    Prior,
    Next,
    Last,
    New,
    Save,
    Cancel,
    Requery,
    Delete,
    PointerMove,
    ChildRequery,
    CreateCursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// What a subscriber sees when an event fires.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    pub operation: Operation,
    pub phase: Phase,
    pub data_source: &'a str,
    pub row_number: Option<usize>,
    pub pk: Option<Value>,
}

/// An event subscriber. Returning `Err` with a non-empty message from a
/// `Before` event aborts the operation; results of `After` events are only
/// logged.
pub type Handler = Box<dyn Fn(&Event<'_>) -> std::result::Result<(), String> + Send + Sync>;

#[derive(Default)]
pub(crate) struct Events {
    handlers: Vec<(Operation, Phase, Handler)>,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::First => "first",
            Operation::Prior => "prior",
            Operation::Next => "next",
            Operation::Last => "last",
            Operation::New => "new",
            Operation::Save => "save",
            Operation::Cancel => "cancel",
            Operation::Requery => "requery",
            Operation::Delete => "delete",
            Operation::PointerMove => "pointer move",
            Operation::ChildRequery => "child requery",
            Operation::CreateCursor => "create cursor",
        }
    }
}

impl Events {
    pub(crate) fn subscribe(&mut self, operation: Operation, phase: Phase, handler: Handler) {
        self.handlers.push((operation, phase, handler));
    }

    pub(crate) fn fire(&self, event: &Event<'_>) -> Result<()> {
        let handlers = self
            .handlers
            .iter()
            .filter(|(operation, phase, _)| *operation == event.operation && *phase == event.phase);

        for (_, _, handler) in handlers {
            let Err(message) = handler(event) else {
                continue;
            };

            match event.phase {
                Phase::Before if !message.is_empty() => {
                    tracing::info!(
                        data_source = event.data_source,
                        operation = event.operation.name(),
                        reason = %message,
                        "operation vetoed"
                    );
                    return Err(Error::aborted(event.operation.name(), message));
                }
                _ => tracing::warn!(
                    data_source = event.data_source,
                    operation = event.operation.name(),
                    reason = %message,
                    "event handler failed"
                ),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Events {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|(operation, phase, _)| (operation, phase)))
            .finish()
    }
}
