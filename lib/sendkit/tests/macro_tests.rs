//! Integration tests for `#[derive(Validate)]` and user-defined endpoints.

#![allow(missing_docs)]

use assert2::{check, let_assert};
use sendkit::prelude::*;
use sendkit::{Encoded, SessionBuilder};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

#[derive(Debug, Serialize, Validate)]
struct Recipient {
    #[validate(email)]
    email: String,
}

#[derive(Debug, Serialize, Validate)]
#[validate(custom = "Campaign::check_name")]
struct Campaign {
    name: String,
    #[validate(count(min = 1, max = 3), nested)]
    recipients: Vec<Recipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    priority: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(email)]
    cc: Vec<String>,
}

impl Campaign {
    fn check_name(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            Err(ValidationError::invalid_value("name", "must not be blank"))
        } else {
            Ok(())
        }
    }
}

fn campaign() -> Campaign {
    Campaign {
        name: "Launch".to_string(),
        recipients: vec![Recipient {
            email: "ada@example.com".to_string(),
        }],
        priority: Some(5),
        cc: Vec::new(),
    }
}

#[test]
fn test_valid_struct_passes() {
    check!(campaign().validate() == Ok(()));
}

#[test]
fn test_custom_check_runs_first() {
    let mut campaign = campaign();
    campaign.name = " ".to_string();
    campaign.recipients.clear();

    let_assert!(Err(ValidationError::InvalidValue { field, .. }) = campaign.validate());
    check!(field == "name");
}

#[test]
fn test_fields_in_declaration_order() {
    let mut campaign = campaign();
    campaign.recipients.clear();
    campaign.priority = Some(42);

    let_assert!(Err(ValidationError::InvalidCount { field, count, .. }) = campaign.validate());
    check!(field == "recipients");
    check!(count == 0);
}

#[test]
fn test_nested_and_optional_rules() {
    let mut campaign = campaign();
    campaign.recipients[0].email = "ada".to_string();
    check!(
        campaign.validate() == Err(ValidationError::MalformedEmailAddress("ada".to_string()))
    );

    let mut campaign = self::campaign();
    campaign.priority = Some(0);
    check!(
        campaign.validate()
            == Err(ValidationError::LimitOutOfRange {
                value: 0,
                range: 1..=10
            })
    );

    campaign.priority = None;
    campaign.cc = vec!["ok@example.com".to_string(), "nope".to_string()];
    check!(
        campaign.validate() == Err(ValidationError::MalformedEmailAddress("nope".to_string()))
    );
}

// A user-defined endpoint built from the same pieces as the bundled ones.

#[derive(Debug, Serialize, Validate)]
struct ListFilter {
    #[serde(flatten)]
    #[validate(nested)]
    page: Page,
    #[serde(flatten)]
    #[validate(nested)]
    range: DateRange,
}

#[derive(Debug, Deserialize)]
struct Unsubscribe {
    email: String,
    created: Timestamp,
}

struct ListUnsubscribes {
    filter: ListFilter,
}

impl Request for ListUnsubscribes {
    type Params = ListFilter;
    type Model = Vec<Unsubscribe>;

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> String {
        "/v3/suppression/unsubscribes".to_string()
    }

    fn parameters(&self) -> Option<&ListFilter> {
        Some(&self.filter)
    }

    fn encoding_strategy(&self) -> EncodingStrategy {
        EncodingStrategy::unix_seconds()
    }
}

fn list(limit: u32) -> ListUnsubscribes {
    ListUnsubscribes {
        filter: ListFilter {
            page: Page::new(limit, 0),
            range: DateRange::since(Timestamp::from_unix(100).expect("timestamp")),
        },
    }
}

#[test]
fn test_user_endpoint_encoding() {
    let request = list(25);
    check!(
        request.encode_parameters().expect("encode")
            == Encoded::Query("limit=25&offset=0&start_time=100".to_string())
    );
    check!(request.validate_parameters().is_ok());
    check!(list(0).validate_parameters().is_err());
}

#[tokio::test]
async fn test_user_endpoint_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/suppression/unsubscribes"))
        .and(query_param("limit", "25"))
        .and(query_param("start_time", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"email": "a@example.com", "created": 150}])),
        )
        .mount(&mock_server)
        .await;

    let session = SessionBuilder::new(HyperTransport::new())
        .host(mock_server.uri())
        .api_key("SG.test")
        .build()
        .expect("session");

    let response = session.send(&list(25)).await.expect("send");

    let_assert!([entry] = response.model.as_slice());
    check!(entry.email == "a@example.com");
    check!(entry.created.unix_seconds() == 150);
}
