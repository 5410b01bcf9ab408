// Dashboard API Step Definitions
//
// Steps that call the proxy's HTTP API and check its responses.

use cucumber::{then, when};
use serde_json::Value;

use super::common::ProxyWorld;

/// Numbers compare by value so `150` matches `150.0`.
fn json_matches(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(e)) => (a - e).abs() < 1e-9,
        _ => actual == expected,
    }
}

#[when(expr = "I request {string}")]
async fn request(world: &mut ProxyWorld, path: String) {
    let response = world
        .http
        .get(world.proxy_url(&path))
        .send()
        .await
        .expect("Proxy request failed");

    world.last_status = Some(response.status().as_u16());
    world.last_body = Some(response.json().await.expect("Proxy response is not JSON"));
}

#[then(expr = "the response status is {int}")]
async fn response_status(world: &mut ProxyWorld, status: u16) {
    assert_eq!(world.last_status, Some(status), "body: {:?}", world.last_body);
}

// Fields are JSON pointers without the leading slash, e.g. `holders/0/address`.
// Expected values are JSON literals: `"ok"`, `150`, `true`.
#[then(regex = r#"^the response field "([^"]+)" is (.+)$"#)]
async fn response_field(world: &mut ProxyWorld, field: String, expected: String) {
    let expected: Value = serde_json::from_str(&expected).expect("expected value is a JSON literal");
    let actual = world
        .body()
        .pointer(&format!("/{}", field))
        .unwrap_or_else(|| panic!("field {} missing from {}", field, world.body()));

    assert!(
        json_matches(actual, &expected),
        "field {}: expected {}, got {}",
        field,
        expected,
        actual
    );
}

#[then(expr = "the response field {string} has {int} entries")]
async fn response_field_len(world: &mut ProxyWorld, field: String, len: usize) {
    let entries = world
        .body()
        .pointer(&format!("/{}", field))
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("field {} is not an array in {}", field, world.body()));
    assert_eq!(entries.len(), len);
}
