use crate::util;

// ------------------------------------------------------------
// Endpoint statistics record
// ------------------------------------------------------------
//
// One record per spool endpoint, as returned by the broker's
// paginated statistics command.
//
// A record is immutable once decoded: it is either forwarded to
// the sink exactly once or dropped as a boundary duplicate.
//
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointStats {
    /// Scope (VPN) the endpoint lives under
    pub vpn_name: String,

    /// Endpoint name, unique within its scope
    pub endpoint_name: String,

    /// Spool counter block
    pub spool: SpoolStats,
}

impl EndpointStats {
    /// Dedup key: scope and name joined with the wire separator.
    ///
    /// The pair is process-unique within one collection pass, so the
    /// key identifies a record across a page boundary.
    pub fn key(&self) -> String {
        util::record_key(&self.vpn_name, &self.endpoint_name)
    }
}

// ------------------------------------------------------------
// Spool counter block
// ------------------------------------------------------------
//
// The 16 named counters of the `message-spool-stats` element, in
// wire order. All counters are non-negative and maintained by the
// broker; the broker may reset them independently of this
// collector.
//
// Counters missing from a response decode as 0, matching the
// broker's own omission rules for zero-valued elements.
//
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpoolStats {
    pub total_bytes_spooled: f64,
    pub total_messages_spooled: f64,
    pub messages_redelivered: f64,
    pub messages_transport_retransmit: f64,
    pub spool_usage_exceeded: f64,
    pub max_message_size_exceeded: f64,
    pub spool_shutdown_discard: f64,
    pub destination_group_error: f64,
    pub low_priority_msg_congestion_discard: f64,
    pub total_deleted_messages: f64,
    pub total_ttl_expired_discard_messages: f64,
    pub total_ttl_expired_to_dmq_messages: f64,
    pub total_ttl_expired_to_dmq_failures: f64,
    pub max_redelivery_exceeded_discard_messages: f64,
    pub max_redelivery_exceeded_to_dmq_messages: f64,
    pub max_redelivery_exceeded_to_dmq_failures: f64,
}

impl SpoolStats {
    /// Resolves a wire element name to its counter slot.
    ///
    /// Returns None for element names outside the known counter set;
    /// the decoder skips those instead of failing.
    pub fn counter_mut(&mut self, tag: &str) -> Option<&mut f64> {
        match tag {
            "total-bytes-spooled" => Some(&mut self.total_bytes_spooled),
            "total-messages-spooled" => Some(&mut self.total_messages_spooled),
            "messages-redelivered" => Some(&mut self.messages_redelivered),
            "messages-transport-retransmit" => Some(&mut self.messages_transport_retransmit),
            "spool-usage-exceeded" => Some(&mut self.spool_usage_exceeded),
            "max-message-size-exceeded" => Some(&mut self.max_message_size_exceeded),
            "spool-shutdown-discard" => Some(&mut self.spool_shutdown_discard),
            "destination-group-error" => Some(&mut self.destination_group_error),
            "low-priority-msg-congestion-discard" => {
                Some(&mut self.low_priority_msg_congestion_discard)
            }
            "total-deleted-messages" => Some(&mut self.total_deleted_messages),
            "total-ttl-expired-discard-messages" => {
                Some(&mut self.total_ttl_expired_discard_messages)
            }
            "total-ttl-expired-to-dmq-messages" => {
                Some(&mut self.total_ttl_expired_to_dmq_messages)
            }
            "total-ttl-expired-to-dmq-failures" => {
                Some(&mut self.total_ttl_expired_to_dmq_failures)
            }
            "max-redelivery-exceeded-discard-messages" => {
                Some(&mut self.max_redelivery_exceeded_discard_messages)
            }
            "max-redelivery-exceeded-to-dmq-messages" => {
                Some(&mut self.max_redelivery_exceeded_to_dmq_messages)
            }
            "max-redelivery-exceeded-to-dmq-failures" => {
                Some(&mut self.max_redelivery_exceeded_to_dmq_failures)
            }
            _ => None,
        }
    }

    /// Enumerates the counters as (field name, value) pairs, in wire
    /// order. Field names are the keys the metric catalog is indexed by.
    pub fn counters(&self) -> [(&'static str, f64); 16] {
        [
            ("total_bytes_spooled", self.total_bytes_spooled),
            ("total_messages_spooled", self.total_messages_spooled),
            ("messages_redelivered", self.messages_redelivered),
            (
                "messages_transport_retransmit",
                self.messages_transport_retransmit,
            ),
            ("spool_usage_exceeded", self.spool_usage_exceeded),
            ("max_message_size_exceeded", self.max_message_size_exceeded),
            ("spool_shutdown_discard", self.spool_shutdown_discard),
            ("destination_group_error", self.destination_group_error),
            (
                "low_priority_msg_congestion_discard",
                self.low_priority_msg_congestion_discard,
            ),
            ("total_deleted_messages", self.total_deleted_messages),
            (
                "total_ttl_expired_discard_messages",
                self.total_ttl_expired_discard_messages,
            ),
            (
                "total_ttl_expired_to_dmq_messages",
                self.total_ttl_expired_to_dmq_messages,
            ),
            (
                "total_ttl_expired_to_dmq_failures",
                self.total_ttl_expired_to_dmq_failures,
            ),
            (
                "max_redelivery_exceeded_discard_messages",
                self.max_redelivery_exceeded_discard_messages,
            ),
            (
                "max_redelivery_exceeded_to_dmq_messages",
                self.max_redelivery_exceeded_to_dmq_messages,
            ),
            (
                "max_redelivery_exceeded_to_dmq_failures",
                self.max_redelivery_exceeded_to_dmq_failures,
            ),
        ]
    }
}

// ------------------------------------------------------------
// Page
// ------------------------------------------------------------
//
// One decoded response of the paginated statistics command.
//
// A page is created per request/response cycle, its records are
// drained into dedup/translation, and it is dropped before the
// next request is issued.
//
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in broker-returned order
    pub records: Vec<EndpointStats>,

    /// Verbatim next request body; empty means the walk is done
    pub continuation: String,

    /// Server-reported result of this page
    pub status: ResultStatus,
}

/// Server-reported result of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Failed(String),
}

impl ResultStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ResultStatus::Ok)
    }
}
