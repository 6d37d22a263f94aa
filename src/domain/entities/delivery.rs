/// One physical delivery of a queued message.
///
/// The same logical message may be delivered several times; `delivery_count`
/// starts at 1 and grows with every redelivery. `lease_token` identifies this
/// particular delivery so a late acknowledgement cannot remove a message that
/// has since been handed to another consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: String,
    pub queue: String,
    pub body: Vec<u8>,
    pub delivery_count: i32,
    pub lease_token: String,
}

impl Delivery {
    pub fn is_redelivery(&self) -> bool {
        self.delivery_count > 1
    }
}

/// What the consumer did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Handler succeeded; the delivery was acknowledged.
    Acked,
    /// Payload could not be decoded or the job can never succeed; acknowledged and discarded.
    Dropped,
    /// Handler failed transiently; left unacknowledged for redelivery.
    Unacked,
    /// Handler finished but the lease had already passed to a newer
    /// delivery, so the ack was refused and the message stays queued.
    Superseded,
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Acked => write!(f, "acked"),
            DeliveryOutcome::Dropped => write!(f, "dropped"),
            DeliveryOutcome::Unacked => write!(f, "unacked"),
            DeliveryOutcome::Superseded => write!(f, "superseded"),
        }
    }
}
