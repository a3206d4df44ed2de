//! Customer profile documents.

use crate::values::{date_before, pick, uuid_v4};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{json, Value};

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elena", "Filipe", "Grace", "Hugo", "Ines", "Joao",
    "Kira", "Luis", "Marta", "Nuno", "Olga", "Pedro", "Rita", "Sofia", "Tiago", "Vera",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Barros", "Costa", "Duarte", "Esteves", "Ferreira", "Gomes", "Henriques",
    "Lopes", "Martins", "Nunes", "Oliveira", "Pereira", "Ribeiro", "Santos", "Teixeira",
];

const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella Ltd", "Hooli", "Stark Industries",
    "Wayne Enterprises", "Soylent", "Vandelay Imports", "Cyberdyne",
];

const TITLES: &[&str] = &[
    "Account Manager", "Data Analyst", "Engineering Lead", "Marketing Director",
    "Operations Manager", "Product Owner", "Sales Representative", "Support Specialist",
];

const CITIES: &[&str] = &[
    "Lisbon", "Porto", "Madrid", "Paris", "Berlin", "London", "Dublin", "Amsterdam",
];

const COUNTRIES: &[&str] = &[
    "Portugal", "Spain", "France", "Germany", "United Kingdom", "Ireland", "Netherlands",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "mail.test", "inbox.example.org"];

/// Generate one customer profile.
///
/// The first visitor id doubles as `primaryIdentifiers.cmec_visitor_id` so
/// the indexed visitor field always resolves to a known visitor.
pub fn generate_customer<R: Rng>(rng: &mut R, anchor: DateTime<Utc>) -> Value {
    let visitor_ids = [uuid_v4(rng), uuid_v4(rng)];
    let session_ids = [uuid_v4(rng), uuid_v4(rng)];

    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.random_range(0..10_000),
        pick(rng, EMAIL_DOMAINS)
    );
    let phone = format!(
        "({:03}) {:03}-{:04}",
        rng.random_range(200..1000),
        rng.random_range(0..1000),
        rng.random_range(0..10_000)
    );

    json!({
        "customerId": uuid_v4(rng),
        "createdAt": date_before(rng, anchor, 5),
        "updatedAt": date_before(rng, anchor, 1),
        "merged": rng.random_range(0..=1),
        "deleted": rng.random_range(0..=1),
        "identifiers": {
            "visitor_ids": visitor_ids,
            "session_ids": session_ids,
        },
        "primaryIdentifiers": {
            "email": email,
            "phone": phone,
            "cmec_visitor_id": visitor_ids[0],
        },
        "personalData": {
            "name": format!("{first} {last}"),
            "company": pick(rng, COMPANIES),
            "title": pick(rng, TITLES),
            "inferred_location": format!("{}, {}", pick(rng, CITIES), pick(rng, COUNTRIES)),
        },
        "confidenceScore": rng.random_range(0.6..1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::is_uuid_v4;
    use docsearch_core::IndexDefinition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn anchor() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_customer_shape() {
        let doc = generate_customer(&mut StdRng::seed_from_u64(42), anchor());

        assert!(is_uuid_v4(doc["customerId"].as_str().unwrap()));
        assert_eq!(doc["identifiers"]["visitor_ids"].as_array().unwrap().len(), 2);
        assert_eq!(doc["identifiers"]["session_ids"].as_array().unwrap().len(), 2);
        assert!(doc["primaryIdentifiers"]["email"]
            .as_str()
            .unwrap()
            .contains('@'));
        assert_eq!(
            doc["primaryIdentifiers"]["cmec_visitor_id"],
            doc["identifiers"]["visitor_ids"][0]
        );

        let score = doc["confidenceScore"].as_f64().unwrap();
        assert!((0.6..1.0).contains(&score));
        assert!(doc["merged"].as_i64().unwrap() <= 1);
    }

    #[test]
    fn test_customer_indexed_fields_present() {
        let doc = generate_customer(&mut StdRng::seed_from_u64(7), anchor());
        let row = IndexDefinition::customer().project(&doc);
        assert!(row.iter().all(|v| !v.is_empty()));
    }
}
