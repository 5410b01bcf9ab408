use solana_dashboard_proxy::ApiDoc;
use utoipa::OpenApi;

const ROUTES: &[&str] = &[
    "/api/health",
    "/api/metrics",
    "/api/performance",
    "/api/account/{address}",
    "/api/balance/{address}",
    "/api/token/{mintAddress}",
    "/api/token/{mintAddress}/holders",
];

#[test]
fn test_openapi_spec_lists_every_route() {
    let spec = ApiDoc::openapi();

    for route in ROUTES {
        let item = spec
            .paths
            .paths
            .get(*route)
            .unwrap_or_else(|| panic!("OpenAPI spec is missing {}", route));
        assert!(item.get.is_some(), "{} should be documented as GET", route);
    }
    assert_eq!(spec.paths.paths.len(), ROUTES.len());
}

#[test]
fn test_openapi_spec_serializes() {
    let json: serde_json::Value = serde_json::from_str(&ApiDoc::openapi().to_pretty_json().unwrap()).unwrap();
    let schemas = &json["components"]["schemas"];
    for schema in ["NetworkMetrics", "PerformanceWindow", "AccountInfo", "TokenInfo", "TokenHolder", "ApiError"] {
        assert!(schemas.get(schema).is_some(), "schema {} missing", schema);
    }
}
