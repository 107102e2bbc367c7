#[macro_use]
extern crate time_test;

mod common;

use rocket::http::Status;
use serde_json::Value;

use common::{bearer, client, user_token};

#[rocket::async_test]
async fn test_dashboard_statistics() {
    let client = client().await;
    time_test!("test_dashboard_statistics");

    let user = user_token(&client).await;
    let response = client
        .get("/api/ESGDashboard/statistics")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    let stats = &body["data"];
    assert_eq!(stats["totalCarbonEmissions"], 15.5);
    assert_eq!(stats["totalEnergyConsumption"], 2500.0);
    assert_eq!(stats["averageRenewablePercentage"], 35.0);
    assert_eq!(stats["totalCompanies"], 1);
    assert_eq!(stats["totalReports"], 0);
    assert_eq!(stats["emissionsByCategory"]["Escopo 2"], 15.5);

    let response = client
        .get("/api/ESGDashboard/statistics?companyId=1&startDate=2024-02-01")
        .header(bearer(&user))
        .dispatch()
        .await;
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["data"]["totalCarbonEmissions"], 0.0);
    assert_eq!(body["data"]["totalCompanies"], 1);

    let response = client.get("/api/ESGDashboard/statistics").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_emissions_trends() {
    let client = client().await;
    time_test!("test_emissions_trends");

    let user = user_token(&client).await;
    let response = client
        .get("/api/ESGDashboard/emissions-trends?period=quarter")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    let buckets = body["data"].as_array().expect("trend buckets");
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["year"], 2024);
    assert_eq!(buckets[0]["quarter"], 1);
    assert_eq!(buckets[0]["totalEmissions"], 15.5);

    let response = client
        .get("/api/ESGDashboard/emissions-trends?period=week")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["message"], "Invalid period. Use: month, quarter or year");
}

#[rocket::async_test]
async fn test_company_ranking() {
    let client = client().await;
    time_test!("test_company_ranking");

    let user = user_token(&client).await;
    let response = client
        .get("/api/ESGDashboard/company-ranking?metric=emissions")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["data"][0]["companyName"], "EcoTech Solutions Ltda");
    assert_eq!(body["data"][0]["totalEmissions"], 15.5);

    for limit in ["0", "101"] {
        let response = client
            .get(format!("/api/ESGDashboard/company-ranking?limit={}", limit))
            .header(bearer(&user))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("valid JSON response");
        assert_eq!(body["message"], "The limit must be between 1 and 100");
    }

    let response = client
        .get("/api/ESGDashboard/company-ranking?metric=water")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_company_comparison() {
    let client = client().await;
    time_test!("test_company_comparison");

    let user = user_token(&client).await;
    let response = client
        .get("/api/ESGDashboard/comparison?companyIds=1")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    let companies = body["data"]["companies"].as_array().expect("compared companies");
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0]["companyId"], 1);
    assert_eq!(companies[0]["totalEmissions"], 15.5);
    assert_eq!(companies[0]["employeeCount"], 150);

    let response = client
        .get("/api/ESGDashboard/comparison")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["message"], "At least one company must be specified for comparison");

    let response = client
        .get("/api/ESGDashboard/comparison?companyIds=1,2,3,4,5,6,7,8,9,10,11")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["message"], "A maximum of 10 companies can be compared at once");

    let response = client
        .get("/api/ESGDashboard/comparison?companyIds=abc")
        .header(bearer(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["message"], "Invalid companyIds 'abc'");
}
