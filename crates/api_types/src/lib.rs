use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Field rules shared by the request bodies.
pub mod rules {
    use std::sync::LazyLock;

    use regex::Regex;
    use validator::ValidationError;

    /// National mobile number: `01`, an operator digit `3`-`9`, eight digits.
    const PHONE_PATTERN: &str = r"^01[3-9][0-9]{8}$";

    static PHONE: LazyLock<Result<Regex, regex::Error>> =
        LazyLock::new(|| Regex::new(PHONE_PATTERN));

    /// Accepts a blank phone (treated as absent) or a national mobile number.
    pub fn phone(value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match PHONE.as_ref() {
            Ok(re) if re.is_match(value) => Ok(()),
            _ => Err(ValidationError::new("phone")
                .with_message(format!("{value} is not a valid phone number").into())),
        }
    }

    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank").with_message("must not be empty".into()));
        }
        Ok(())
    }
}

pub mod party {
    use super::*;

    /// Request body for a customer or agent, standalone or embedded in a
    /// transaction.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
    pub struct PartyPayload {
        #[validate(length(min = 3, max = 50))]
        pub name: String,
        #[validate(length(min = 3, max = 50))]
        pub father: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[validate(custom(function = "crate::rules::phone"))]
        pub phone: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub address: Option<String>,
    }

    impl PartyPayload {
        /// Whether a non-blank phone was submitted.
        pub fn has_phone(&self) -> bool {
            self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
        }
    }

    /// A registry record.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PartyView {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub name: String,
        pub slug: String,
        pub father: String,
        pub phone: Option<String>,
        pub address: Option<String>,
        pub version: i32,
        #[serde(rename = "createdAt")]
        pub created_at: DateTime<Utc>,
    }

    /// A party as embedded in a transaction or ledger entry.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SnapshotView {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub name: String,
        pub slug: String,
        pub father: String,
        pub phone: Option<String>,
        pub address: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PartyOrBlank {
        Party(PartyPayload),
        Blank(String),
    }

    /// Reads an optional embedded party where clients may send `null` or
    /// `""` for "none".
    pub fn optional_party<'de, D>(deserializer: D) -> Result<Option<PartyPayload>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<PartyOrBlank>::deserialize(deserializer)?;
        Ok(match value {
            Some(PartyOrBlank::Party(party)) => Some(party),
            Some(PartyOrBlank::Blank(_)) | None => None,
        })
    }

    /// Like [`optional_party`], but an agent without a phone also means
    /// "no agent": agents are only ever referenced by phone.
    pub fn optional_agent<'de, D>(deserializer: D) -> Result<Option<PartyPayload>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_party(deserializer)?.filter(PartyPayload::has_phone))
    }
}

pub mod inventory {
    use super::{
        party::{PartyPayload, SnapshotView, optional_agent},
        *,
    };

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum InventoryType {
        #[default]
        Receive,
        Delivery,
    }

    /// Request body to create or update a transaction.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
    pub struct TransactionNew {
        pub date: DateTime<Utc>,
        #[serde(rename = "inventoryType", default)]
        pub inventory_type: InventoryType,
        #[validate(range(min = 0))]
        pub vouchar_no: i64,
        #[validate(custom(function = "crate::rules::not_blank"))]
        pub sr_no: String,
        #[validate(length(min = 3, max = 50))]
        pub name: String,
        #[validate(range(min = 0))]
        pub year: i32,
        #[validate(range(min = 0.0))]
        pub quantity: f64,
        #[validate(nested)]
        pub customer: PartyPayload,
        #[serde(default, deserialize_with = "optional_agent")]
        #[validate(nested)]
        pub agent: Option<PartyPayload>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub date: DateTime<Utc>,
        #[serde(rename = "inventoryType")]
        pub inventory_type: InventoryType,
        pub vouchar_no: i64,
        pub sr_no: String,
        pub name: String,
        pub year: i32,
        pub quantity: f64,
        pub customer: SnapshotView,
        pub agent: Option<SnapshotView>,
        pub version: i32,
        #[serde(rename = "createdAt")]
        pub created_at: DateTime<Utc>,
    }
}

pub mod ledger {
    use super::{
        party::{PartyPayload, SnapshotView, optional_party},
        *,
    };

    /// Request body to create or update a ledger entry.
    ///
    /// Party fields and derived amounts are accepted for compatibility with
    /// existing clients but never read: parties come from the referenced
    /// transaction and amounts are always recomputed.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
    pub struct LedgerNew {
        #[validate(custom(function = "crate::rules::not_blank"))]
        pub sr_no: String,
        #[validate(range(min = 0))]
        pub year: i32,
        #[serde(
            default,
            deserialize_with = "optional_party",
            skip_serializing_if = "Option::is_none"
        )]
        pub customer: Option<PartyPayload>,
        #[serde(
            default,
            deserialize_with = "optional_party",
            skip_serializing_if = "Option::is_none"
        )]
        pub agent: Option<PartyPayload>,
        #[validate(range(min = 0.0))]
        pub loan_amount: f64,
        #[validate(range(min = 0.0))]
        pub loan_rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub loan_profit: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub loan_payable: Option<f64>,
        #[validate(range(min = 0.0))]
        pub quantity: f64,
        #[validate(range(min = 0.0))]
        pub rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub service_amount: Option<f64>,
        #[serde(rename = "emptyBag_quantity", default)]
        #[validate(range(min = 0.0))]
        pub empty_bag_quantity: f64,
        #[serde(rename = "emptyBag_rate", default)]
        #[validate(range(min = 0.0))]
        pub empty_bag_rate: f64,
        #[serde(
            rename = "emptyBag_amount",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub empty_bag_amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub total_amount: Option<f64>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct LedgerView {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub sr_no: String,
        pub year: i32,
        pub customer: SnapshotView,
        pub agent: Option<SnapshotView>,
        pub loan_amount: f64,
        pub loan_rate: f64,
        pub loan_profit: f64,
        pub loan_payable: f64,
        pub quantity: f64,
        pub rate: f64,
        pub service_amount: f64,
        #[serde(rename = "emptyBag_quantity")]
        pub empty_bag_quantity: f64,
        #[serde(rename = "emptyBag_rate")]
        pub empty_bag_rate: f64,
        #[serde(rename = "emptyBag_amount")]
        pub empty_bag_amount: f64,
        pub total_amount: f64,
        pub version: i32,
        #[serde(rename = "createdAt")]
        pub created_at: DateTime<Utc>,
    }
}

pub mod chamber {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
    pub struct ChamberNew {
        #[validate(length(min = 3, max = 50))]
        pub name: String,
        #[validate(range(min = 0.0))]
        pub capacity: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ChamberView {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub name: String,
        pub slug: String,
        pub capacity: f64,
        pub version: i32,
        #[serde(rename = "createdAt")]
        pub created_at: DateTime<Utc>,
    }
}

pub mod page {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use super::*;

    /// Query string of a listing.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub param: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub sort: Option<String>,
    }

    /// Query string of a date-range listing. Both bounds are inclusive.
    ///
    /// A bound is either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
    /// A bare `start` is the first instant of that UTC day, a bare `end` the
    /// last.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DateRangeQuery {
        #[serde(deserialize_with = "day_start")]
        pub start: DateTime<Utc>,
        #[serde(deserialize_with = "day_end")]
        pub end: DateTime<Utc>,
        pub page: Option<u64>,
        pub sort: Option<String>,
    }

    fn range_bound<'de, D>(
        deserializer: D,
        from_day: fn(NaiveDate) -> DateTime<Utc>,
    ) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(at.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(from_day)
            .map_err(|_| {
                serde::de::Error::custom(format!(
                    "{raw} is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"
                ))
            })
    }

    fn day_start<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        range_bound(deserializer, |day| day.and_time(NaiveTime::MIN).and_utc())
    }

    fn day_end<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        range_bound(deserializer, |day| {
            day.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::milliseconds(1)
        })
    }

    /// One page of a listing.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Page<T> {
        pub docs: Vec<T>,
        pub total_docs: u64,
        pub limit: u64,
        pub page: u64,
        pub total_pages: u64,
        pub has_prev_page: bool,
        pub has_next_page: bool,
        pub prev_page: Option<u64>,
        pub next_page: Option<u64>,
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::{inventory::TransactionNew, ledger::LedgerNew, party::PartyPayload, rules};

    fn payload(name: &str, phone: Option<&str>) -> PartyPayload {
        PartyPayload {
            name: name.to_string(),
            father: "customerFather".to_string(),
            phone: phone.map(ToString::to_string),
            address: None,
        }
    }

    #[test]
    fn phone_pattern() {
        assert!(rules::phone("01912239655").is_ok());
        assert!(rules::phone("01312345678").is_ok());
        assert!(rules::phone("").is_ok());
        assert!(rules::phone("01212345678").is_err());
        assert!(rules::phone("0191223965").is_err());
        assert!(rules::phone("+8801912239655").is_err());
    }

    #[test]
    fn party_lengths_and_blank_phone() {
        assert!(payload("customer1", None).validate().is_ok());
        assert!(payload("customer1", Some("")).validate().is_ok());
        assert!(payload("ab", None).validate().is_err());
        assert!(payload(&"x".repeat(51), None).validate().is_err());
        assert!(payload("customer1", Some("12345")).validate().is_err());
    }

    #[test]
    fn agent_without_phone_is_dropped_before_validation() {
        let body = r#"{"date":"2024-01-15T09:00:00Z","vouchar_no":2,"sr_no":"2/30",
            "name":"potato","year":2024,"quantity":40,
            "customer":{"name":"customer1","father":"customerFather"},
            "agent":{"name":"x","father":"y","phone":" "}}"#;
        let tx: TransactionNew = serde_json::from_str(body).unwrap();
        assert!(tx.agent.is_none());
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn nested_customer_and_numbers_are_checked() {
        let body = r#"{"date":"2024-01-15T09:00:00Z","vouchar_no":-1,"sr_no":" ",
            "name":"potato","year":2024,"quantity":40,
            "customer":{"name":"customer1","father":"customerFather","phone":"123"}}"#;
        let tx: TransactionNew = serde_json::from_str(body).unwrap();
        let errors = tx.validate().unwrap_err().to_string();
        assert!(errors.contains("vouchar_no"));
        assert!(errors.contains("sr_no"));
        assert!(errors.contains("phone"));
    }

    #[test]
    fn ledger_rejects_negative_inputs() {
        let ledger = LedgerNew {
            sr_no: "2/30".to_string(),
            year: 2024,
            loan_amount: -1.0,
            ..LedgerNew::default()
        };
        let errors = ledger.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("loan_amount"));
    }

    #[test]
    fn blank_or_null_agent_means_none() {
        for agent in ["null", "\"\""] {
            let body = format!(
                r#"{{"date":"2024-01-15T09:00:00Z","vouchar_no":2,"sr_no":"2/30",
                "name":"potato","year":2024,"quantity":40,
                "customer":{{"name":"customer1","father":"customerFather","phone":"01912239655"}},
                "agent":{agent}}}"#
            );
            let tx: TransactionNew = serde_json::from_str(&body).unwrap();
            assert!(tx.agent.is_none());
        }
    }

    #[test]
    fn ledger_body_uses_client_field_names() {
        let body = r#"{"sr_no":"2/30","year":2024,"loan_amount":20000,"loan_rate":12,
            "quantity":40,"rate":250,"emptyBag_quantity":70,"emptyBag_rate":78,
            "total_amount":1}"#;
        let ledger: LedgerNew = serde_json::from_str(body).unwrap();

        assert_eq!(ledger.empty_bag_quantity, 70.0);
        assert_eq!(ledger.total_amount, Some(1.0));
        assert!(ledger.customer.is_none());
    }

    #[test]
    fn inventory_type_defaults_to_receive() {
        let body = r#"{"date":"2024-01-15T09:00:00Z","vouchar_no":2,"sr_no":"2/30",
            "name":"potato","year":2024,"quantity":40,
            "customer":{"name":"customer1","father":"customerFather"}}"#;
        let tx: TransactionNew = serde_json::from_str(body).unwrap();
        assert_eq!(tx.inventory_type, super::inventory::InventoryType::Receive);
        assert!(tx.agent.is_none());
    }

    #[test]
    fn date_range_accepts_bare_days() {
        use chrono::{TimeZone, Utc};

        let range: super::page::DateRangeQuery =
            serde_json::from_str(r#"{"start":"2024-01-10","end":"2024-01-15"}"#).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(
            range.end,
            Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );

        let range: super::page::DateRangeQuery = serde_json::from_str(
            r#"{"start":"2024-01-10T06:00:00+06:00","end":"2024-01-15T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());

        let err = serde_json::from_str::<super::page::DateRangeQuery>(
            r#"{"start":"15/01/2024","end":"2024-01-15"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("15/01/2024"));
    }
}
