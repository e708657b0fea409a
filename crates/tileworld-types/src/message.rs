//! Broadcast messages and the per-agent outbox.
//!
//! Messages are buffered for a single tick. The scheduler hands each agent
//! an immutable slice of everything published so far in the tick and an
//! [`Outbox`] it may only append to; the scheduler publishes the outbox
//! after the agent's turn.

use serde::{Deserialize, Serialize};

use crate::enums::Topic;
use crate::geometry::Position;
use crate::ids::AgentId;
use crate::percept::{PerceptGrid, Target};

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// Every agent.
    All,
    /// One named agent.
    Agent(AgentId),
}

/// Message payload. The variant determines the [`Topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageBody {
    /// The sender's full percept snapshot and position.
    Map {
        /// Snapshot of the sender's percept store.
        snapshot: PerceptGrid,
        /// Sender position when the snapshot was taken.
        position: Position,
    },
    /// Targets the sender has committed to; others must drop them.
    Goals {
        /// Committed targets.
        targets: Vec<Target>,
    },
    /// Surplus tiles offered to agents in nearby zones.
    AuctionTile {
        /// Offered tiles.
        items: Vec<Target>,
        /// Zone index of the sender.
        zone: u32,
    },
    /// Surplus holes offered to agents in nearby zones.
    AuctionHole {
        /// Offered holes.
        items: Vec<Target>,
        /// Zone index of the sender.
        zone: u32,
    },
}

impl MessageBody {
    /// The topic of this payload.
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Map { .. } => Topic::Map,
            Self::Goals { .. } => Topic::Goals,
            Self::AuctionTile { .. } => Topic::AuctionTile,
            Self::AuctionHole { .. } => Topic::AuctionHole,
        }
    }
}

/// One broadcast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sending agent.
    pub sender: AgentId,
    /// Addressee.
    pub recipient: Recipient,
    /// Payload.
    pub body: MessageBody,
}

impl Message {
    /// A message addressed to every agent.
    pub const fn to_all(sender: AgentId, body: MessageBody) -> Self {
        Self {
            sender,
            recipient: Recipient::All,
            body,
        }
    }

    /// The topic of the payload.
    pub const fn topic(&self) -> Topic {
        self.body.topic()
    }

    /// Whether `agent` should process this message: addressed to it (or to
    /// all) and not sent by it.
    pub fn is_for_peer(&self, agent: AgentId) -> bool {
        if self.sender == agent {
            return false;
        }
        match self.recipient {
            Recipient::All => true,
            Recipient::Agent(target) => target == agent,
        }
    }
}

/// Append-only sink for one agent's messages during its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbox {
    sender: AgentId,
    messages: Vec<Message>,
}

impl Outbox {
    /// Create an empty outbox for the given sender.
    pub const fn new(sender: AgentId) -> Self {
        Self {
            sender,
            messages: Vec::new(),
        }
    }

    /// The agent writing into this outbox.
    pub const fn sender(&self) -> AgentId {
        self.sender
    }

    /// Broadcast a payload to every agent.
    pub fn broadcast(&mut self, body: MessageBody) {
        self.messages.push(Message::to_all(self.sender, body));
    }

    /// Announce committed targets with a GOALS broadcast. Empty lists are
    /// not sent.
    pub fn announce(&mut self, targets: Vec<Target>) {
        if !targets.is_empty() {
            self.broadcast(MessageBody::Goals { targets });
        }
    }

    /// Messages written so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages written so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the outbox and return its messages in write order.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::enums::ObjectKind;

    #[test]
    fn topic_follows_body() {
        let body = MessageBody::AuctionHole {
            items: Vec::new(),
            zone: 2,
        };
        assert_eq!(body.topic(), Topic::AuctionHole);
        let map = MessageBody::Map {
            snapshot: PerceptGrid::new(1, 1),
            position: Position::new(0, 0),
        };
        assert_eq!(map.topic(), Topic::Map);
    }

    #[test]
    fn own_messages_are_not_for_peer() {
        let a = AgentId::new(0);
        let b = AgentId::new(1);
        let c = AgentId::new(2);
        let msg = Message::to_all(a, MessageBody::Goals { targets: Vec::new() });
        assert!(!msg.is_for_peer(a));
        assert!(msg.is_for_peer(b));

        let direct = Message {
            sender: a,
            recipient: Recipient::Agent(b),
            body: MessageBody::Goals { targets: Vec::new() },
        };
        assert!(direct.is_for_peer(b));
        assert!(!direct.is_for_peer(c));
    }

    #[test]
    fn empty_announcements_are_dropped() {
        let mut outbox = Outbox::new(AgentId::new(0));
        outbox.announce(Vec::new());
        assert!(outbox.is_empty());
        outbox.announce(vec![Target::new(ObjectKind::Tile, Position::new(1, 1))]);
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.messages().first().map(Message::topic), Some(Topic::Goals));
    }

    #[test]
    fn body_serializes_with_topic_tag() {
        let body = MessageBody::Goals {
            targets: vec![Target::new(ObjectKind::Hole, Position::new(2, 3))],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json.get("topic").and_then(|t| t.as_str()), Some("GOALS"));
    }
}
