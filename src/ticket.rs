//! Ticket records as returned by the search endpoint.
//!
//! Tickets are kept as opaque JSON trees. Nothing downstream relies on a
//! schema beyond the optional top-level `fields` mapping.

/// One issue record, exactly as the API returned it.
pub type Ticket = serde_json::Value;

/// All tickets fetched in one run, in arrival order.
pub type TicketBatch = Vec<Ticket>;

/// Top-level key holding the per-ticket field values.
pub const FIELDS_KEY: &str = "fields";
