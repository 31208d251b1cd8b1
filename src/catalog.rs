//! Metric descriptor table.
//!
//! The catalog maps `(category, field)` pairs to metric definitions.
//! It is passed into the translator explicitly; nothing in the
//! pipeline consults a process-global registry.

/// Category of the spool counter block.
pub const ENDPOINT_SPOOL: &str = "endpoint_spool";

/// Label names attached to every sample, in emission order.
pub const SAMPLE_LABELS: [&str; 2] = ["vpn_name", "endpoint_name"];

/// One metric definition.
#[derive(Debug)]
pub struct MetricDef {
    /// Record category the field belongs to
    pub category: &'static str,

    /// Field name within the record, as enumerated by the schema
    pub field: &'static str,

    /// Exported metric name
    pub name: &'static str,

    /// Exported help string
    pub help: &'static str,
}

/// Spool counter definitions, in wire order.
static SPOOL_METRICS: &[MetricDef] = &[
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_bytes_spooled",
        name: "broker_endpoint_total_bytes_spooled",
        help: "Total bytes spooled for the endpoint",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_messages_spooled",
        name: "broker_endpoint_total_messages_spooled",
        help: "Total messages spooled for the endpoint",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "messages_redelivered",
        name: "broker_endpoint_messages_redelivered",
        help: "Messages redelivered from the endpoint",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "messages_transport_retransmit",
        name: "broker_endpoint_messages_transport_retransmit",
        help: "Messages retransmitted at the transport layer",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "spool_usage_exceeded",
        name: "broker_endpoint_spool_usage_exceeded",
        help: "Messages discarded because spool usage was exceeded",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "max_message_size_exceeded",
        name: "broker_endpoint_max_message_size_exceeded",
        help: "Messages discarded because the maximum message size was exceeded",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "spool_shutdown_discard",
        name: "broker_endpoint_spool_shutdown_discard",
        help: "Messages discarded during spool shutdown",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "destination_group_error",
        name: "broker_endpoint_destination_group_error",
        help: "Messages discarded due to a destination group error",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "low_priority_msg_congestion_discard",
        name: "broker_endpoint_low_priority_msg_congestion_discard",
        help: "Low-priority messages discarded under congestion",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_deleted_messages",
        name: "broker_endpoint_total_deleted_messages",
        help: "Messages deleted from the endpoint spool",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_ttl_expired_discard_messages",
        name: "broker_endpoint_total_ttl_expired_discard_messages",
        help: "Messages discarded after TTL expiry",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_ttl_expired_to_dmq_messages",
        name: "broker_endpoint_total_ttl_expired_to_dmq_messages",
        help: "TTL-expired messages moved to the dead message queue",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "total_ttl_expired_to_dmq_failures",
        name: "broker_endpoint_total_ttl_expired_to_dmq_failures",
        help: "TTL-expired messages that failed to move to the dead message queue",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "max_redelivery_exceeded_discard_messages",
        name: "broker_endpoint_max_redelivery_exceeded_discard_messages",
        help: "Messages discarded after exceeding max redelivery",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "max_redelivery_exceeded_to_dmq_messages",
        name: "broker_endpoint_max_redelivery_exceeded_to_dmq_messages",
        help: "Max-redelivery messages moved to the dead message queue",
    },
    MetricDef {
        category: ENDPOINT_SPOOL,
        field: "max_redelivery_exceeded_to_dmq_failures",
        name: "broker_endpoint_max_redelivery_exceeded_to_dmq_failures",
        help: "Max-redelivery messages that failed to move to the dead message queue",
    },
];

/// Lookup table from `(category, field)` to a metric definition.
///
/// CONTRACT:
/// - Lookup misses are a normal outcome (the caller skips the field),
///   never an error.
/// - Definitions are 'static; a resolved handle stays valid for the
///   process lifetime.
pub struct MetricCatalog {
    table: &'static [MetricDef],
}

impl MetricCatalog {
    /// Catalog over an explicit definition table.
    pub fn new(table: &'static [MetricDef]) -> Self {
        Self { table }
    }

    /// The full broker catalog: all spool counters.
    pub fn broker_defaults() -> Self {
        Self::new(SPOOL_METRICS)
    }

    /// Resolves a metric definition by category and field name.
    pub fn lookup(&self, category: &str, field: &str) -> Option<&'static MetricDef> {
        self.table
            .iter()
            .find(|def| def.category == category && def.field == field)
    }

    /// Iterates all definitions, in table order.
    pub fn defs(&self) -> impl Iterator<Item = &'static MetricDef> {
        self.table.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spool_counter_is_cataloged() {
        let catalog = MetricCatalog::broker_defaults();
        let spool = crate::schema::SpoolStats::default();
        for (field, _) in spool.counters() {
            let def = catalog.lookup(ENDPOINT_SPOOL, field);
            assert!(def.is_some(), "no definition for {field}");
        }
    }

    #[test]
    fn unknown_field_misses() {
        let catalog = MetricCatalog::broker_defaults();
        assert!(catalog.lookup(ENDPOINT_SPOOL, "bind_count").is_none());
        assert!(catalog.lookup("queue_spool", "total_bytes_spooled").is_none());
    }

    #[test]
    fn metric_names_are_unique() {
        let catalog = MetricCatalog::broker_defaults();
        let mut names: Vec<&str> = catalog.defs().map(|d| d.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
