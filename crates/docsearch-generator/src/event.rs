//! Visitor event documents.

use crate::values::{letters, pick, referrer, tagged, timestamp_before, url};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{json, Value};

const INTERACTIONS: &[&str] = &["scroll", "click_cta", "hover", "form_submit"];
const DEVICE_TYPES: &[&str] = &["desktop", "mobile", "tablet"];

/// How far back event timestamps may reach, in minutes.
const EVENT_WINDOW_MINUTES: i64 = 10_000;

/// Generate one visitor event.
///
/// `identifiers.cmec_visitor_id` equals `visitor_data.visitor_id`.
pub fn generate_event<R: Rng>(rng: &mut R, anchor: DateTime<Utc>) -> Value {
    let visitor_id = letters(rng, 3);
    let session_id = letters(rng, 3);
    let interactions = &INTERACTIONS[..rng.random_range(1..=INTERACTIONS.len())];

    json!({
        "event_type": "visitor_event",
        "event_id": format!("evt_{}", letters(rng, 6)),
        "timestamp": timestamp_before(rng, anchor, EVENT_WINDOW_MINUTES),
        "source": letters(rng, 8),
        "visitor_data": {
            "behavior": {
                "interactions": interactions,
                "pages_viewed": rng.random_range(1..=10),
                "time_on_site": rng.random_range(10..=600),
            },
            "device_info": {
                "device_type": pick(rng, DEVICE_TYPES),
                "ip_address": format!(
                    "192.168.{}.{}",
                    rng.random_range(0..255),
                    rng.random_range(0..255)
                ),
                "user_agent": letters(rng, 10),
            },
            "page_url": url(rng),
            "referrer": referrer(rng),
            "session_id": session_id,
            "utm_params": {
                "utm_campaign": format!("camp{}", letters(rng, 5)),
                "utm_medium": format!("med{}", letters(rng, 5)),
                "utm_source": format!("src{}", letters(rng, 4)),
            },
            "visitor_id": visitor_id,
        },
        "data": {
            "cookie": format!("cookie_{}", letters(rng, 8)),
            "email": format!("{}@example.com", letters(rng, 10)),
            "phone": letters(rng, 10),
        },
        "identifiers": {
            "cmec_contact_call_id": tagged(rng, "call_", 5),
            "cmec_contact_chat_id": tagged(rng, "chat_", 5),
            "cmec_contact_external_id": tagged(rng, "ext_", 5),
            "cmec_contact_form2lead_id": tagged(rng, "f2l_", 5),
            "cmec_contact_tickets_id": tagged(rng, "ticket_", 5),
            "cmec_visitor_id": visitor_id,
        },
    })
}
