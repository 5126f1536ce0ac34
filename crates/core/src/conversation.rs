//! Conversation-related types.

use abacus_model::ModelMessage;

/// The full ordered message history of a conversation, plus a counter
/// of Reason transitions taken for the query currently in flight.
///
/// The conversation is owned by the caller: it can be discarded after a
/// query, or threaded into the next [`process_query`] call to continue
/// the same conversation.
///
/// [`process_query`]: crate::Controller::process_query
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
    steps: u32,
}

impl Conversation {
    /// Returns the messages in this conversation, in append order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the number of Reason transitions taken for the last
    /// processed query.
    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Returns the number of messages in this conversation.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the conversation has no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the conversation, returning its messages.
    #[inline]
    pub fn into_messages(self) -> Vec<ModelMessage> {
        self.messages
    }

    #[inline]
    pub(crate) fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }

    #[inline]
    pub(crate) fn begin_query(&mut self) {
        self.steps = 0;
    }

    #[inline]
    pub(crate) fn count_step(&mut self) {
        self.steps += 1;
    }
}
