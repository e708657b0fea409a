//! The tick-scoped broadcast channel.
//!
//! The scheduler owns the only [`TickChannel`]. Agents never hold it: they
//! read an immutable `&[Message]` snapshot and write into their own
//! [`Outbox`], which the scheduler publishes once the agent's turn is over.
//! Messages published earlier in a tick are visible to every agent that
//! runs later in the same tick. The channel is cleared when the next tick
//! starts.

use std::collections::BTreeMap;

use tileworld_types::{Message, Outbox, Topic};

/// Messages published during the current tick, in publication order.
#[derive(Debug, Clone, Default)]
pub struct TickChannel {
    messages: Vec<Message>,
}

impl TickChannel {
    /// An empty channel.
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Drop everything published during the previous tick.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Append an agent's outbox. Returns the number of messages published.
    pub fn publish(&mut self, outbox: Outbox) -> usize {
        let published = outbox.len();
        self.messages.extend(outbox.into_messages());
        published
    }

    /// The snapshot agents read from.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages published this tick.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing was published this tick.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message count per topic.
    pub fn topic_counts(&self) -> BTreeMap<Topic, usize> {
        let mut counts = BTreeMap::new();
        for message in &self.messages {
            let count: &mut usize = counts.entry(message.topic()).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use tileworld_types::{AgentId, MessageBody, ObjectKind, Position, Target};

    use super::*;

    fn outbox(agent: u32, targets: &[(i32, i32)]) -> Outbox {
        let mut outbox = Outbox::new(AgentId::new(agent));
        outbox.announce(
            targets
                .iter()
                .map(|&(x, y)| Target::new(ObjectKind::Tile, Position::new(x, y)))
                .collect(),
        );
        outbox
    }

    #[test]
    fn publish_appends_in_order() {
        let mut channel = TickChannel::new();
        assert_eq!(channel.publish(outbox(0, &[(1, 1)])), 1);
        assert_eq!(channel.publish(outbox(1, &[(2, 2)])), 1);
        let senders: Vec<AgentId> = channel.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![AgentId::new(0), AgentId::new(1)]);
    }

    #[test]
    fn empty_announcements_publish_nothing() {
        let mut channel = TickChannel::new();
        assert_eq!(channel.publish(outbox(0, &[])), 0);
        assert!(channel.is_empty());
    }

    #[test]
    fn clear_starts_a_new_tick() {
        let mut channel = TickChannel::new();
        channel.publish(outbox(0, &[(1, 1)]));
        channel.clear();
        assert_eq!(channel.len(), 0);
    }

    #[test]
    fn counts_by_topic() {
        let mut channel = TickChannel::new();
        let mut mixed = outbox(0, &[(1, 1)]);
        mixed.broadcast(MessageBody::AuctionTile {
            items: vec![Target::new(ObjectKind::Tile, Position::new(3, 3))],
            zone: 0,
        });
        channel.publish(mixed);
        channel.publish(outbox(1, &[(2, 2)]));
        let counts = channel.topic_counts();
        assert_eq!(counts.get(&Topic::Goals), Some(&2));
        assert_eq!(counts.get(&Topic::AuctionTile), Some(&1));
        assert_eq!(counts.get(&Topic::Map), None);
    }
}
